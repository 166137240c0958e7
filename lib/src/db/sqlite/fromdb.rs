use rusqlite::Row;
use crate::db::DbResult;
use crate::types::{ConfigItem, LogItem};

/// Errors from the store are passed on with the store's own message.
pub fn store_err(e: rusqlite::Error) -> String {
    e.to_string()
}

pub fn store_err_fn<T, F>(f: F) -> DbResult<T>
where
    F: FnOnce() -> rusqlite::Result<T>
{
    f().map_err(store_err)
}

pub const CONFIGS_SQL: &str = "name, value, memo";

/// for result selected by [`CONFIGS_SQL`]
pub fn config(r: &Row) -> rusqlite::Result<ConfigItem> {
    Ok(ConfigItem {
        name: r.get(0)?,
        value: r.get(1)?,
        memo: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

pub const LOGS_SQL: &str = "type, detail, ts";
pub const LOGS_ORDER_COL: &str = "id";

/// for result selected by [`LOGS_SQL`]
pub fn log(r: &Row) -> rusqlite::Result<LogItem> {
    Ok(LogItem {
        type_: r.get(0)?,
        detail: r.get(1)?,
        timestamp: r.get(2)?,
    })
}
