use std::time::Duration;
use confstore::config::{ValueRef, parse, validate};

pub const SERVER_ALL_INTERFACES: ValueRef<'_, bool> = ValueRef {
    names: &["webserver", "server", "all-interfaces"],
    def: "false",
    type_: &parse::BOOL,
    validators: &[],
};

pub const SERVER_PORT: ValueRef<'_, u16> = ValueRef {
    names: &["webserver", "server", "port"],
    def: "9000",
    type_: &parse::WEB_PORT,
    validators: &[],
};

pub const SERVER_ROOT_PATH: ValueRef<'_, String> = ValueRef {
    names: &["webserver", "server", "root-path"],
    def: "/",
    type_: &parse::STRING,
    validators: &[validate::WEB_PATH],
};

pub const SERVER_API_PATH: ValueRef<'_, String> = ValueRef {
    names: &["webserver", "server", "paths", "api"],
    def: "/",
    type_: &parse::STRING,
    validators: &[validate::WEB_PATH],
};

pub const SERVER_REQUEST_TIMEOUT: ValueRef<'_, Option<Duration>> = ValueRef {
    names: &["webserver", "server", "request-timeout-ms"],
    def: "30000",
    type_: &parse::MILLIS,
    validators: &[],
};

/// Largest accepted request body.
pub const SERVER_MAX_BODY: ValueRef<'_, usize> = ValueRef {
    names: &["webserver", "server", "max-body-bytes"],
    def: "16777216",
    type_: &parse::BYTE_SIZE,
    validators: &[],
};
