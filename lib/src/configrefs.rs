use std::path::PathBuf;
use std::time::Duration;
use crate::config::{ValueRef, parse, validate};

pub const DB_SQLITE_DATA_DIR: ValueRef<'_, PathBuf> = ValueRef {
    names: &["db", "sqlite", "data-dir"],
    def: "/var/lib/confstore",
    type_: &parse::FILE_PATH,
    validators: &[],
};

pub const DB_SQLITE_SCHEMA_PATH: ValueRef<'_, PathBuf> = ValueRef {
    names: &["db", "sqlite", "schema-path"],
    def: "/usr/share/confstore/db-schema",
    type_: &parse::FILE_PATH,
    validators: &[],
};

pub const DB_SQLITE_BUSY_TIMEOUT: ValueRef<'_, Option<Duration>> = ValueRef {
    names: &["db", "sqlite", "busy-timeout-ms"],
    def: "5000",
    type_: &parse::MILLIS,
    validators: &[],
};

pub const DB_CONNECT_ON_START: ValueRef<'_, bool> = ValueRef {
    names: &["db", "connect-on-start"],
    def: "false",
    type_: &parse::BOOL,
    validators: &[],
};

pub const DB_DEFAULT_HOST: ValueRef<'_, String> = ValueRef {
    names: &["db", "default", "host"],
    def: "127.0.0.1",
    type_: &parse::STRING,
    validators: &[validate::NON_EMPTY],
};

pub const DB_DEFAULT_PORT: ValueRef<'_, String> = ValueRef {
    names: &["db", "default", "port"],
    def: "3306",
    type_: &parse::STRING,
    validators: &[validate::NON_EMPTY],
};

pub const DB_DEFAULT_USERNAME: ValueRef<'_, String> = ValueRef {
    names: &["db", "default", "username"],
    def: "root",
    type_: &parse::STRING,
    validators: &[validate::NON_EMPTY],
};

pub const DB_DEFAULT_PASSWORD: ValueRef<'_, String> = ValueRef {
    names: &["db", "default", "password"],
    def: "root",
    type_: &parse::STRING,
    validators: &[],
};

pub const DB_DEFAULT_NAME: ValueRef<'_, String> = ValueRef {
    names: &["db", "default", "dbname"],
    def: "test",
    type_: &parse::STRING,
    validators: &[validate::NON_EMPTY],
};

/// Environment variables starting with this are read as configuration.
pub const ENV_PREFIX: &str = "CONFSTORE_";
