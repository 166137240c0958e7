//! SQLite database implementation.
//!
//! Each configured database name maps to one file, `<data-dir>/<name>.sqlite`,
//! which must already have been created with [`create_database`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use log::{debug, info};
use parking_lot::Mutex;
use rusqlite::{Connection, OpenFlags};
use crate::deadline::Deadline;
use crate::db::{DbResult, DbResults, DbUpdate, WriteMode};
use crate::error::{Error, Result};
use crate::types::{ConfigItem, ConnectionConfig, LogItem};

mod dbtypes;
mod fromdb;
mod read;
mod write;

/// SQLite [`Db`](crate::db::Db) implementation.
#[derive(Debug)]
pub struct Db { conn: Mutex<Connection> }

/// SQLite [`Connector`](crate::db::Connector) implementation.
#[derive(Clone, Debug)]
pub struct Connector {
    data_dir: PathBuf,
    busy_timeout: Option<Duration>,
}

impl Connector {
    pub fn new(data_dir: PathBuf, busy_timeout: Option<Duration>) -> Connector {
        Connector { data_dir, busy_timeout }
    }
}

/// Only plain names are accepted, so a database name can never point outside
/// the data directory.
fn check_db_name(db_name: &str) -> DbResult<()> {
    let valid = !db_name.is_empty() && db_name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(format!("invalid database name: {db_name:?}"))
    }
}

/// Path of the file holding the database named `db_name`.
pub fn db_path(data_dir: &Path, db_name: &str) -> DbResult<PathBuf> {
    check_db_name(db_name)?;
    Ok(data_dir.join(format!("{db_name}.{}", dbtypes::DB_FILE_EXTENSION)))
}

/// Initialise the database schema, reading SQL files from the directory given
/// by `schema_path`.
fn init_schema(conn: &Connection, schema_path: &Path) -> DbResult<()> {
    dbtypes::SCHEMA_FILES.iter()
        .try_for_each(|filename| {
            let path = schema_path.join(filename);
            let sql = fs::read_to_string(&path)
                .map_err(|e| format!("error reading schema file ({}): {e}",
                                     path.display()))?;
            conn.execute_batch(&sql)
                .map_err(|e| format!(
                    "error executing schema file ({}): {e}",
                    path.display()))
        })
}

/// Create the database named `db_name` with its tables, and log its creation.
///
/// An existing database is an error unless `replace` is set, in which case it
/// is deleted first.
pub fn create_database(
    data_dir: &Path,
    schema_path: &Path,
    db_name: &str,
    replace: bool,
) -> DbResult<PathBuf> {
    let db_path = db_path(data_dir, db_name)?;
    fs::create_dir_all(data_dir)
        .map_err(|e| format!("error creating directory ({}): {e}",
                             data_dir.display()))?;

    if db_path.exists() {
        if !replace {
            return Err(format!("database already exists ({})",
                               db_path.display()));
        }
        info!("removing existing database ({})", db_path.display());
        fs::remove_file(&db_path)
            .map_err(|e| format!("error removing database ({}): {e}",
                                 db_path.display()))?;
    }

    let conn = Connection::open(&db_path)
        .map_err(|e| format!("error creating database ({}): {e}",
                             db_path.display()))?;
    init_schema(&conn, schema_path)?;
    write::create_log(&conn, &LogItem {
        type_: "INFO".to_owned(),
        detail: "database created".to_owned(),
        timestamp: None,
    })?;
    Ok(db_path)
}

/// Open an existing database and check that it answers queries.
pub fn open(
    data_dir: &Path,
    cfg: &ConnectionConfig,
    busy_timeout: Option<Duration>,
) -> DbResult<Db> {
    let db_path = db_path(data_dir, &cfg.db_name)?;
    let conn = Connection::open_with_flags(
        &db_path,
        OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX)
        .map_err(|e| format!("unknown database '{}' ({}): {e}",
                             cfg.db_name, db_path.display()))?;
    if let Some(timeout) = busy_timeout {
        conn.busy_timeout(timeout).map_err(fromdb::store_err)?;
    }
    let db = Db { conn: Mutex::new(conn) };
    crate::db::Db::probe(&db)?;
    debug!("opened database {cfg} ({})", db_path.display());
    Ok(db)
}

impl crate::db::Connector for Connector {
    fn connect(&self, cfg: &ConnectionConfig)
    -> DbResult<Arc<dyn crate::db::Db>> {
        Ok(Arc::new(open(&self.data_dir, cfg, self.busy_timeout)?))
    }
}

/// Run a single `update` against the database.
fn write_update(conn: &Connection, update: &DbUpdate) -> DbResult<()> {
    match update {
        DbUpdate::CreateConfig(item) => write::create_config(conn, item),
        DbUpdate::UpdateConfig(update) => write::update_config(conn, update),
        DbUpdate::DeleteConfig { name } => write::delete_config(conn, name),
        DbUpdate::ClearConfigs => write::clear_configs(conn),
        DbUpdate::CreateLog(log) => write::create_log(conn, log),
    }
}

/// Run `updates` in order, stopping at the first failure.
fn write_updates(conn: &Connection, updates: &[DbUpdate], deadline: &Deadline)
-> Result<()> {
    updates.iter().try_for_each(|update| {
        deadline.check()?;
        write_update(conn, update).map_err(Error::Persistence)
    })
}

impl crate::db::Db for Db {
    fn probe(&self) -> DbResult<()> {
        self.conn.lock()
            .query_row("SELECT 1", (), |r| r.get::<_, i64>(0))
            .map(|_| ())
            .map_err(fromdb::store_err)
    }

    fn write(&self, updates: &[DbUpdate], mode: WriteMode, deadline: &Deadline)
    -> Result<()> {
        let mut conn = self.conn.lock();
        match mode {
            WriteMode::Each => write_updates(&conn, updates, deadline),
            WriteMode::Atomic => {
                let tx = conn.transaction()
                    .map_err(|e| Error::Persistence(fromdb::store_err(e)))?;
                write_updates(&tx, updates, deadline)?;
                tx.commit()
                    .map_err(|e| Error::Persistence(fromdb::store_err(e)))
            }
        }
    }

    fn get_all_configs(&self) -> DbResults<ConfigItem> {
        read::get_all_configs(&self.conn.lock())
    }

    fn find_configs(&self, name: &str) -> DbResults<ConfigItem> {
        read::find_configs(&self.conn.lock(), name)
    }

    fn get_logs(&self) -> DbResults<LogItem> {
        read::get_logs(&self.conn.lock())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::Db as _;
    use crate::types::{ConfigUpdate, NewConfig};

    pub fn schema_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("db-schema")
    }

    fn setup() -> (tempfile::TempDir, Db) {
        let dir = tempfile::tempdir().unwrap();
        create_database(dir.path(), &schema_path(), "db_project_t", false)
            .unwrap();
        let cfg = ConnectionConfig::new("127.0.0.1", "3306", "u", "p", "t");
        let db = open(dir.path(), &cfg, None).unwrap();
        (dir, db)
    }

    fn new_config(name: &str, value: &str, memo: Option<&str>) -> NewConfig {
        NewConfig {
            name: name.to_owned(),
            value: value.to_owned(),
            memo: memo.map(str::to_owned),
        }
    }

    #[test]
    fn open_requires_existing_database() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ConnectionConfig::new("h", "1", "u", "p", "absent");
        let err = open(dir.path(), &cfg, None).unwrap_err();
        assert!(err.contains("db_project_absent"), "{err}");
        assert!(!dir.path().join("db_project_absent.sqlite").exists());
    }

    #[test]
    fn db_names_cannot_escape_data_dir() {
        assert!(db_path(Path::new("/data"), "db_project_../etc").is_err());
        assert!(db_path(Path::new("/data"), "").is_err());
        assert_eq!(db_path(Path::new("/data"), "db_project_a-1").unwrap(),
                   Path::new("/data/db_project_a-1.sqlite"));
    }

    #[test]
    fn create_database_keeps_existing_unless_replaced() {
        let (dir, db) = setup();
        let item = new_config("k", "v", None);
        db.write(&[DbUpdate::CreateConfig(&item)], WriteMode::Each,
                 &Deadline::none()).unwrap();
        drop(db);

        assert!(create_database(dir.path(), &schema_path(), "db_project_t",
                                false).is_err());
        create_database(dir.path(), &schema_path(), "db_project_t", true)
            .unwrap();
        let cfg = ConnectionConfig::new("h", "1", "u", "p", "t");
        let db = open(dir.path(), &cfg, None).unwrap();
        assert!(db.get_all_configs().unwrap().is_empty());
    }

    #[test]
    fn insert_without_memo_uses_default() {
        let (_dir, db) = setup();
        let a = new_config("a", "1", None);
        let b = new_config("b", "2", Some("second"));
        db.write(&[DbUpdate::CreateConfig(&a), DbUpdate::CreateConfig(&b)],
                 WriteMode::Each, &Deadline::none()).unwrap();
        let a_rows = db.find_configs("a").unwrap();
        assert_eq!(a_rows, vec![ConfigItem {
            name: "a".to_owned(), value: "1".to_owned(), memo: "".to_owned(),
        }]);
        assert_eq!(db.find_configs("b").unwrap()[0].memo, "second");
    }

    #[test]
    fn update_renames_matched_row() {
        let (_dir, db) = setup();
        let a = new_config("a", "1", Some("m"));
        let rename = ConfigUpdate {
            key: "a".to_owned(),
            value: "2".to_owned(),
            memo: "n".to_owned(),
            new_key: Some("b".to_owned()),
        };
        db.write(&[DbUpdate::CreateConfig(&a), DbUpdate::UpdateConfig(&rename)],
                 WriteMode::Each, &Deadline::none()).unwrap();
        assert!(db.find_configs("a").unwrap().is_empty());
        assert_eq!(db.find_configs("b").unwrap()[0].value, "2");
    }

    #[test]
    fn each_mode_keeps_writes_before_failure() {
        let (_dir, db) = setup();
        let a = new_config("a", "1", None);
        let err = db.write(
            &[DbUpdate::CreateConfig(&a), DbUpdate::CreateConfig(&a)],
            WriteMode::Each, &Deadline::none()).unwrap_err();
        assert!(matches!(err, Error::Persistence(ref m) if m.contains("UNIQUE")),
                "{err:?}");
        assert_eq!(db.get_all_configs().unwrap().len(), 1);
    }

    #[test]
    fn atomic_mode_rolls_back_on_failure() {
        let (_dir, db) = setup();
        let a = new_config("a", "1", None);
        let b = new_config("b", "1", None);
        let result = db.write(
            &[DbUpdate::CreateConfig(&b), DbUpdate::CreateConfig(&a),
              DbUpdate::CreateConfig(&a)],
            WriteMode::Atomic, &Deadline::none());
        assert!(result.is_err());
        assert!(db.get_all_configs().unwrap().is_empty());
    }

    #[test]
    fn expired_deadline_writes_nothing() {
        let (_dir, db) = setup();
        let a = new_config("a", "1", None);
        let expired = Deadline::at(
            std::time::Instant::now() - Duration::from_millis(1));
        let err = db.write(&[DbUpdate::CreateConfig(&a)], WriteMode::Each,
                           &expired).unwrap_err();
        assert_eq!(err, Error::DeadlineExceeded);
        assert!(db.get_all_configs().unwrap().is_empty());
    }

    #[test]
    fn logs_get_default_timestamp() {
        let (_dir, db) = setup();
        let log = LogItem {
            type_: "INFO".to_owned(),
            detail: "hello".to_owned(),
            timestamp: None,
        };
        db.write(&[DbUpdate::CreateLog(&log)], WriteMode::Each,
                 &Deadline::none()).unwrap();
        let logs = db.get_logs().unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[1].detail, "hello");
        let ts = logs[1].timestamp.as_deref().unwrap();
        assert!(crate::types::normalise_timestamp(ts).is_ok(), "{ts}");
    }

    #[test]
    fn new_database_logs_its_creation() {
        let (_dir, db) = setup();
        let logs = db.get_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].type_, "INFO");
        assert_eq!(logs[0].detail, "database created");
        assert!(logs[0].timestamp.is_some());
        assert!(db.get_all_configs().unwrap().is_empty());
    }
}
