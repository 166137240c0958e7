//! Library for confstore, a service storing named configuration entries and
//! log entries for a project in a relational database, driven by JSON
//! operation requests.

pub mod config;
pub mod configrefs;
pub mod conn;
pub mod db;
pub mod deadline;
pub mod error;
pub mod ops;
pub mod types;
