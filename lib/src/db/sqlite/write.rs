//! Helpers for writing to the database.

use rusqlite::{Connection, named_params};
use crate::db::DbResult;
use crate::types::{ConfigUpdate, LogItem, NewConfig};
use super::dbtypes::table::{CONFIGS, LOGS};
use super::fromdb;

pub fn create_config(conn: &Connection, item: &NewConfig) -> DbResult<()> {
    match &item.memo {
        Some(memo) => conn.execute(&format!("
            INSERT INTO {CONFIGS} (name, value, memo)
            VALUES (:name, :value, :memo)
        "), named_params! {
            ":name": item.name,
            ":value": item.value,
            ":memo": memo,
        }),
        None => conn.execute(&format!("
            INSERT INTO {CONFIGS} (name, value)
            VALUES (:name, :value)
        "), named_params! {
            ":name": item.name,
            ":value": item.value,
        }),
    }
        .map(|_| ())
        .map_err(fromdb::store_err)
}

/// Matching no row is not an error.
pub fn update_config(conn: &Connection, update: &ConfigUpdate)
-> DbResult<()> {
    conn.execute(&format!("
        UPDATE {CONFIGS}
        SET name = :new_name, value = :value, memo = :memo
        WHERE name = :key
    "), named_params! {
        ":key": update.key,
        ":new_name": update.target_name(),
        ":value": update.value,
        ":memo": update.memo,
    })
        .map(|_| ())
        .map_err(fromdb::store_err)
}

/// Matching no row is not an error.
pub fn delete_config(conn: &Connection, name: &str) -> DbResult<()> {
    conn.execute(&format!("
        DELETE FROM {CONFIGS}
        WHERE name = :name
    "), named_params! {
        ":name": name,
    })
        .map(|_| ())
        .map_err(fromdb::store_err)
}

pub fn clear_configs(conn: &Connection) -> DbResult<()> {
    conn.execute(&format!("DELETE FROM {CONFIGS}"), ())
        .map(|_| ())
        .map_err(fromdb::store_err)
}

pub fn create_log(conn: &Connection, log: &LogItem) -> DbResult<()> {
    match &log.timestamp {
        Some(ts) => conn.execute(&format!("
            INSERT INTO {LOGS} (type, detail, ts)
            VALUES (:type, :detail, :ts)
        "), named_params! {
            ":type": log.type_,
            ":detail": log.detail,
            ":ts": ts,
        }),
        None => conn.execute(&format!("
            INSERT INTO {LOGS} (type, detail)
            VALUES (:type, :detail)
        "), named_params! {
            ":type": log.type_,
            ":detail": log.detail,
        }),
    }
        .map(|_| ())
        .map_err(fromdb::store_err)
}
