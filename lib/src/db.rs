//! Backing store access.
//!
//! A [`Connector`] opens a [`Db`] for a [`ConnectionConfig`]; the resulting
//! connection is shared by every request until it is replaced.

use std::sync::Arc;
use crate::config::{self, Config};
use crate::configrefs;
use crate::deadline::Deadline;
use crate::error::Result;
use crate::types::{ConfigItem, ConfigUpdate, ConnectionConfig, LogItem,
                   NewConfig};

pub mod sqlite;
pub mod util;

pub type DbResult<T> = std::result::Result<T, String>;
pub type DbResults<T> = DbResult<Vec<T>>;

#[derive(Debug)]
pub enum DbUpdate<'a> {
    CreateConfig(&'a NewConfig),
    UpdateConfig(&'a ConfigUpdate),
    DeleteConfig { name: &'a str },
    ClearConfigs,
    CreateLog(&'a LogItem),
}

/// How a list of updates is applied.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum WriteMode {
    /// One at a time, in order.  The first failure stops the write and
    /// earlier updates stay applied.
    #[default]
    Each,
    /// All updates in a single transaction, or none.
    Atomic,
}

impl WriteMode {
    pub fn atomic(atomic: bool) -> WriteMode {
        if atomic { WriteMode::Atomic } else { WriteMode::Each }
    }
}

/// A live connection to the store.
pub trait Db: Send + Sync {
    /// Check that the connection answers queries.
    fn probe(&self) -> DbResult<()>;

    /// Apply `updates`.  `deadline` is checked before each one.
    fn write(&self, updates: &[DbUpdate], mode: WriteMode, deadline: &Deadline)
    -> Result<()>;

    /// In store order.
    fn get_all_configs(&self) -> DbResults<ConfigItem>;

    /// All rows named exactly `name`.
    fn find_configs(&self, name: &str) -> DbResults<ConfigItem>;

    /// Oldest first.
    fn get_logs(&self) -> DbResults<LogItem>;
}

/// Opens connections to the store.
pub trait Connector: Send + Sync {
    /// Open and probe a new connection.  Nothing is shared with connections
    /// opened earlier.
    fn connect(&self, cfg: &ConnectionConfig) -> DbResult<Arc<dyn Db>>;
}

/// Build the configured [`Connector`].
pub fn connector<C>(cfg: &C) -> DbResult<sqlite::Connector>
where
    C: Config + ?Sized,
{
    Ok(sqlite::Connector::new(
        config::get_ref(cfg, &configrefs::DB_SQLITE_DATA_DIR)?,
        config::get_ref(cfg, &configrefs::DB_SQLITE_BUSY_TIMEOUT)?))
}

/// Read the connection parameters used until the first reconfiguration.
pub fn default_connection<C>(cfg: &C) -> DbResult<ConnectionConfig>
where
    C: Config + ?Sized,
{
    Ok(ConnectionConfig::new(
        &config::get_ref(cfg, &configrefs::DB_DEFAULT_HOST)?,
        &config::get_ref(cfg, &configrefs::DB_DEFAULT_PORT)?,
        &config::get_ref(cfg, &configrefs::DB_DEFAULT_USERNAME)?,
        &config::get_ref(cfg, &configrefs::DB_DEFAULT_PASSWORD)?,
        &config::get_ref(cfg, &configrefs::DB_DEFAULT_NAME)?))
}

/// Create a project database, named by prefixing `project`.
pub fn create_project<C>(cfg: &C, project: &str, replace: bool)
-> DbResult<std::path::PathBuf>
where
    C: Config + ?Sized,
{
    sqlite::create_database(
        &config::get_ref(cfg, &configrefs::DB_SQLITE_DATA_DIR)?,
        &config::get_ref(cfg, &configrefs::DB_SQLITE_SCHEMA_PATH)?,
        &crate::types::normalise_db_name(project),
        replace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::map;

    #[test]
    fn default_connection_reads_config() {
        let cfg = map::from_pairs([
            ("db.default.host", "10.0.0.9"),
            ("db.default.dbname", "alpha"),
        ]);
        let conn = default_connection(&cfg).unwrap();
        assert_eq!(conn.host, "10.0.0.9");
        assert_eq!(conn.port, "3306");
        assert_eq!(conn.username, "root");
        assert_eq!(conn.password, "root");
        assert_eq!(conn.db_name, "db_project_alpha");
    }

    #[test]
    fn create_project_prefixes_name() {
        let dir = tempfile::tempdir().unwrap();
        let schema = sqlite::tests::schema_path();
        let cfg = map::from_pairs([
            ("db.sqlite.data-dir", dir.path().to_str().unwrap()),
            ("db.sqlite.schema-path", schema.to_str().unwrap()),
        ]);
        let path = create_project(&cfg, "demo", false).unwrap();
        assert_eq!(path, dir.path().join("db_project_demo.sqlite"));

        let conn = ConnectionConfig::new("h", "1", "u", "p", "demo");
        let db = connector(&cfg).unwrap().connect(&conn).unwrap();
        assert!(db.get_all_configs().unwrap().is_empty());
    }
}
