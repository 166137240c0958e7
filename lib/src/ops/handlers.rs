//! One handler per operation.
//!
//! Every handler except [`config`] needs the live connection, and fails with
//! [`Error::NotInitialized`](crate::error::Error::NotInitialized) before
//! reading the rest of the request if there is none.  Batch records are all
//! decoded before anything is written.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use crate::conn::ConnectionManager;
use crate::db::{util, DbUpdate, WriteMode};
use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::types::{decode_records, ConfigItem, ConfigUpdate, ConnectionParams,
                   LogItem, NewConfig, RawRecord};
use super::reply::Outcome;

#[derive(Debug, Deserialize)]
struct Batch<T> {
    records: Option<Vec<T>>,
    #[serde(default)]
    atomic: bool,
}

impl<T> Batch<T> {
    fn mode(&self) -> WriteMode {
        WriteMode::atomic(self.atomic)
    }

    fn into_records(self) -> Vec<T> {
        self.records.unwrap_or_default()
    }
}

fn batch<T: DeserializeOwned>(body: &[u8]) -> Result<Batch<T>> {
    Ok(serde_json::from_slice(body)?)
}

pub fn config(manager: &ConnectionManager, body: &[u8]) -> Result<Outcome> {
    let params: ConnectionParams = serde_json::from_slice(body)?;
    manager.reconfigure(&params)?;
    Ok(Outcome::Done)
}

pub fn add_config(
    manager: &ConnectionManager,
    body: &[u8],
    deadline: &Deadline,
) -> Result<Outcome> {
    let live = manager.require_initialized()?;
    let batch = batch::<RawRecord>(body)?;
    let mode = batch.mode();
    let items: Vec<NewConfig> = decode_records(batch.into_records())?;
    let updates: Vec<DbUpdate> = items.iter()
        .map(DbUpdate::CreateConfig)
        .collect();
    live.db.write(&updates, mode, deadline)?;
    Ok(Outcome::Done)
}

pub fn update_config(
    manager: &ConnectionManager,
    body: &[u8],
    deadline: &Deadline,
) -> Result<Outcome> {
    let live = manager.require_initialized()?;
    let batch = batch::<RawRecord>(body)?;
    let mode = batch.mode();
    let changes: Vec<ConfigUpdate> = decode_records(batch.into_records())?;
    let updates: Vec<DbUpdate> = changes.iter()
        .map(DbUpdate::UpdateConfig)
        .collect();
    live.db.write(&updates, mode, deadline)?;
    Ok(Outcome::Done)
}

/// With no keys, every item; otherwise one item per key, in order, with
/// [`ConfigItem::missing`] standing in for keys that do not exist.
pub fn get_config(
    manager: &ConnectionManager,
    body: &[u8],
    deadline: &Deadline,
) -> Result<Outcome> {
    let live = manager.require_initialized()?;
    let keys = batch::<String>(body)?.into_records();

    if keys.is_empty() {
        deadline.check()?;
        let items = live.db.get_all_configs().map_err(Error::Persistence)?;
        return Ok(Outcome::Records(items));
    }

    let items = keys.iter()
        .map(|key| -> Result<ConfigItem> {
            deadline.check()?;
            Ok(util::get_config(live.db.as_ref(), key)
                .map_err(Error::Persistence)?
                .unwrap_or_else(|| ConfigItem::missing(key)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(Outcome::Records(items))
}

pub fn del_config(
    manager: &ConnectionManager,
    body: &[u8],
    deadline: &Deadline,
) -> Result<Outcome> {
    let live = manager.require_initialized()?;
    let batch = batch::<String>(body)?;
    let mode = batch.mode();
    let keys = batch.into_records();
    if keys.is_empty() {
        return Err(Error::Validation("no records supplied".to_owned()));
    }
    let updates: Vec<DbUpdate> = keys.iter()
        .map(|name| DbUpdate::DeleteConfig { name: name.as_str() })
        .collect();
    live.db.write(&updates, mode, deadline)?;
    Ok(Outcome::Done)
}

pub fn clear_config(manager: &ConnectionManager, deadline: &Deadline)
-> Result<Outcome> {
    let live = manager.require_initialized()?;
    live.db.write(&[DbUpdate::ClearConfigs], WriteMode::Each, deadline)?;
    Ok(Outcome::Done)
}

pub fn add_log(
    manager: &ConnectionManager,
    body: &[u8],
    deadline: &Deadline,
) -> Result<Outcome> {
    let live = manager.require_initialized()?;
    let batch = batch::<RawRecord>(body)?;
    let mode = batch.mode();
    let logs: Vec<LogItem> = decode_records(batch.into_records())?;
    let updates: Vec<DbUpdate> = logs.iter()
        .map(DbUpdate::CreateLog)
        .collect();
    live.db.write(&updates, mode, deadline)?;
    Ok(Outcome::Done)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_records_may_be_absent() {
        let keys = batch::<String>(br#"{"op":"get_config"}"#).unwrap();
        assert_eq!(keys.records, None);
        assert_eq!(keys.mode(), WriteMode::Each);

        let logs = batch::<RawRecord>(
            br#"{"op":"add_log","atomic":true,"records":[["info","up"]]}"#)
            .unwrap();
        assert_eq!(logs.mode(), WriteMode::Atomic);
        assert_eq!(logs.into_records(), vec![vec!["info".to_owned(),
                                                  "up".to_owned()]]);
    }

    #[test]
    fn null_records_read_as_empty() {
        let keys = batch::<String>(br#"{"records":null}"#).unwrap();
        assert!(keys.into_records().is_empty());
    }
}
