use rusqlite::{Connection, named_params};
use crate::db::DbResults;
use crate::types::{ConfigItem, LogItem};
use super::dbtypes::table::{CONFIGS, LOGS};
use super::fromdb::{self, CONFIGS_SQL, LOGS_ORDER_COL, LOGS_SQL};

pub fn get_all_configs(conn: &Connection) -> DbResults<ConfigItem> {
    fromdb::store_err_fn(|| {
        let mut stmt = conn.prepare(&format!("
            SELECT {CONFIGS_SQL} FROM {CONFIGS}
        "))?;
        let rows = stmt.query_map((), fromdb::config)?;
        rows.collect()
    })
}

pub fn find_configs(conn: &Connection, name: &str) -> DbResults<ConfigItem> {
    fromdb::store_err_fn(|| {
        let mut stmt = conn.prepare(&format!("
            SELECT {CONFIGS_SQL} FROM {CONFIGS}
            WHERE name = :name
        "))?;
        let rows = stmt.query_map(
            named_params! { ":name": name },
            fromdb::config)?;
        rows.collect()
    })
}

/// Oldest first.
pub fn get_logs(conn: &Connection) -> DbResults<LogItem> {
    fromdb::store_err_fn(|| {
        let mut stmt = conn.prepare(&format!("
            SELECT {LOGS_SQL} FROM {LOGS}
            ORDER BY {LOGS_ORDER_COL} ASC
        "))?;
        let rows = stmt.query_map((), fromdb::log)?;
        rows.collect()
    })
}
