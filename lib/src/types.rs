use std::fmt;
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

/// Every database name starts with this.
pub const DB_NAME_PREFIX: &str = "db_project_";

/// Storage format for log timestamps: millisecond precision, no zone.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// A named configuration entry.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
pub struct ConfigItem {
    /// Unique within the configuration table.
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub memo: String,
}

impl ConfigItem {
    /// The item returned in place of a key which does not exist.
    pub fn missing(key: &str) -> ConfigItem {
        ConfigItem {
            name: format!("***{key}***"),
            value: "***Key dosn't exists.***".to_owned(),
            memo: String::new(),
        }
    }
}

/// An append-only log entry.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct LogItem {
    /// Always upper-case.
    #[serde(rename = "type")]
    pub type_: String,
    pub detail: String,
    /// Formatted with [`TIMESTAMP_FORMAT`].  `None` lets the store use the
    /// insertion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Parameters for the live database connection.
#[derive(Clone, Eq, PartialEq)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: String,
    pub username: String,
    pub password: String,
    /// Always starts with [`DB_NAME_PREFIX`].
    pub db_name: String,
}

impl ConnectionConfig {
    pub fn new(
        host: &str,
        port: &str,
        username: &str,
        password: &str,
        db_name: &str,
    ) -> ConnectionConfig {
        ConnectionConfig {
            host: host.to_owned(),
            port: port.to_owned(),
            username: username.to_owned(),
            password: password.to_owned(),
            db_name: normalise_db_name(db_name),
        }
    }

    /// Build a config from `params`, taking any blank field from `self`.
    pub fn inherit(&self, params: &ConnectionParams) -> ConnectionConfig {
        fn pick(given: &Option<String>, current: &str) -> String {
            match given.as_deref() {
                Some(v) if !v.is_empty() => v.to_owned(),
                _ => current.to_owned(),
            }
        }

        ConnectionConfig {
            host: pick(&params.host, &self.host),
            port: pick(&params.port, &self.port),
            username: pick(&params.username, &self.username),
            password: pick(&params.password, &self.password),
            db_name: normalise_db_name(&pick(&params.db_name, &self.db_name)),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("db_name", &self.db_name)
            .finish()
    }
}

impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}/{}",
               self.username, self.host, self.port, self.db_name)
    }
}

/// Connection parameters as sent with the `config` operation.  Missing and
/// empty fields are equivalent.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
pub struct ConnectionParams {
    #[serde(default, rename = "ip")]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, rename = "pwd")]
    pub password: Option<String>,
    #[serde(default, rename = "dbname")]
    pub db_name: Option<String>,
}

/// Prefix `name` with [`DB_NAME_PREFIX`] unless it already starts with it.
pub fn normalise_db_name(name: &str) -> String {
    if name.starts_with(DB_NAME_PREFIX) {
        name.to_owned()
    } else {
        format!("{DB_NAME_PREFIX}{name}")
    }
}

/// Parse a caller-supplied log timestamp, accepting either
/// `YYYY-MM-DD HH:MM:SS[.fff]` or RFC 3339 (converted to UTC).
pub fn normalise_timestamp(ts: &str) -> Result<String> {
    NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| DateTime::parse_from_rfc3339(ts).map(|d| d.naive_utc()))
        .map(|d| d.format(TIMESTAMP_FORMAT).to_string())
        .map_err(|_| Error::Validation(format!("invalid timestamp: {ts}")))
}

/// One positional record of a batch request.
pub type RawRecord = Vec<String>;

/// A record type decoded from a [`RawRecord`] by field count.
pub trait FromRecord: Sized {
    /// Description of the accepted field counts, for error messages.
    const ARITY: &'static str;

    /// `None` if the number of fields is not accepted.
    fn from_fields(fields: RawRecord) -> Option<Result<Self>>;
}

/// Decode every record of a batch, failing on the first bad one.
pub fn decode_records<T: FromRecord>(records: Vec<RawRecord>)
-> Result<Vec<T>> {
    if records.is_empty() {
        return Err(Error::Validation("no records supplied".to_owned()));
    }
    records.into_iter()
        .enumerate()
        .map(|(i, fields)| {
            let count = fields.len();
            T::from_fields(fields).unwrap_or_else(|| {
                Err(Error::Validation(format!(
                    "wrong field count in record {i}: expected {}, got {count}",
                    T::ARITY)))
            })
        })
        .collect()
}

/// `[name, value]` or `[name, value, memo]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewConfig {
    pub name: String,
    pub value: String,
    /// `None` leaves the memo at the store default.
    pub memo: Option<String>,
}

impl FromRecord for NewConfig {
    const ARITY: &'static str = "2 or 3 fields";

    fn from_fields(fields: RawRecord) -> Option<Result<Self>> {
        let mut fields = fields.into_iter();
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(name), Some(value), memo, None) => {
                Some(Ok(NewConfig { name, value, memo }))
            }
            _ => None,
        }
    }
}

/// `[key, value]`, `[key, value, memo]` or `[key, value, memo, new_key]`.
///
/// The row named `key` is always the one changed; with no memo the memo is
/// cleared, and `new_key` renames the row.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigUpdate {
    pub key: String,
    pub value: String,
    pub memo: String,
    pub new_key: Option<String>,
}

impl ConfigUpdate {
    /// The name the row has after the update.
    pub fn target_name(&self) -> &str {
        self.new_key.as_deref().unwrap_or(&self.key)
    }
}

impl FromRecord for ConfigUpdate {
    const ARITY: &'static str = "2, 3 or 4 fields";

    fn from_fields(fields: RawRecord) -> Option<Result<Self>> {
        if !(2..=4).contains(&fields.len()) {
            return None;
        }
        let mut fields = fields.into_iter();
        let key = fields.next()?;
        let value = fields.next()?;
        let memo = fields.next().unwrap_or_default();
        let new_key = fields.next();
        Some(Ok(ConfigUpdate { key, value, memo, new_key }))
    }
}

impl FromRecord for LogItem {
    const ARITY: &'static str = "2 or 3 fields";

    fn from_fields(fields: RawRecord) -> Option<Result<Self>> {
        let mut fields = fields.into_iter();
        match (fields.next(), fields.next(), fields.next(), fields.next()) {
            (Some(type_), Some(detail), timestamp, None) => {
                Some(timestamp.as_deref()
                    .map(normalise_timestamp)
                    .transpose()
                    .map(|timestamp| LogItem {
                        type_: type_.to_uppercase(),
                        detail,
                        timestamp,
                    }))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(fields: &[&str]) -> RawRecord {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn db_name_prefix_added_once() {
        assert_eq!(normalise_db_name("test"), "db_project_test");
        assert_eq!(normalise_db_name("db_project_test"), "db_project_test");
        assert_eq!(normalise_db_name(""), "db_project_");
        assert_eq!(normalise_db_name("x_db_project_"), "db_project_x_db_project_");
    }

    #[test]
    fn inherit_keeps_blank_fields() {
        let current = ConnectionConfig::new(
            "127.0.0.1", "3306", "root", "root", "test");
        let params = ConnectionParams {
            host: Some("10.1.1.1".to_owned()),
            port: Some("".to_owned()),
            db_name: Some("other".to_owned()),
            ..Default::default()
        };
        let next = current.inherit(&params);
        assert_eq!(next.host, "10.1.1.1");
        assert_eq!(next.port, "3306");
        assert_eq!(next.username, "root");
        assert_eq!(next.db_name, "db_project_other");
        assert_eq!(current.inherit(&ConnectionParams::default()), current);
    }

    #[test]
    fn debug_hides_password() {
        let cfg = ConnectionConfig::new("h", "1", "u", "hunter2", "d");
        assert!(!format!("{cfg:?}").contains("hunter2"));
        assert_eq!(cfg.to_string(), "u@h:1/db_project_d");
    }

    #[test]
    fn connection_params_use_wire_names() {
        let params: ConnectionParams = serde_json::from_str(
            r#"{"op":"config","ip":"1.2.3.4","pwd":"p","dbname":"x"}"#)
            .unwrap();
        assert_eq!(params.host.as_deref(), Some("1.2.3.4"));
        assert_eq!(params.password.as_deref(), Some("p"));
        assert_eq!(params.db_name.as_deref(), Some("x"));
        assert_eq!(params.port, None);
    }

    #[test]
    fn new_config_accepts_two_or_three_fields() {
        let items: Vec<NewConfig> = decode_records(vec![
            raw(&["a", "1"]),
            raw(&["b", "2", "memo"]),
        ]).unwrap();
        assert_eq!(items[0].memo, None);
        assert_eq!(items[1].memo.as_deref(), Some("memo"));

        let err = decode_records::<NewConfig>(vec![
            raw(&["a", "1"]),
            raw(&["b"]),
        ]).unwrap_err();
        assert_eq!(err, Error::Validation(
            "wrong field count in record 1: expected 2 or 3 fields, got 1"
                .to_owned()));
        assert!(decode_records::<NewConfig>(vec![raw(&["a", "1", "m", "x"])])
                .is_err());
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert_eq!(decode_records::<NewConfig>(vec![]),
                   Err(Error::Validation("no records supplied".to_owned())));
    }

    #[test]
    fn update_arity_selects_fields() {
        let updates: Vec<ConfigUpdate> = decode_records(vec![
            raw(&["k", "v"]),
            raw(&["k", "v", "m"]),
            raw(&["k", "v", "m", "k2"]),
        ]).unwrap();
        assert_eq!(updates[0].memo, "");
        assert_eq!(updates[0].target_name(), "k");
        assert_eq!(updates[1].memo, "m");
        assert_eq!(updates[1].target_name(), "k");
        assert_eq!(updates[2].key, "k");
        assert_eq!(updates[2].target_name(), "k2");
        assert!(decode_records::<ConfigUpdate>(vec![raw(&["k"])]).is_err());
        assert!(decode_records::<ConfigUpdate>(
            vec![raw(&["k", "v", "m", "k2", "x"])]).is_err());
    }

    #[test]
    fn log_type_is_upper_cased() {
        let logs: Vec<LogItem> = decode_records(vec![
            raw(&["warn", "disk low"]),
            raw(&["Info", "started", "2024-03-01 10:20:30.5"]),
        ]).unwrap();
        assert_eq!(logs[0].type_, "WARN");
        assert_eq!(logs[0].timestamp, None);
        assert_eq!(logs[1].type_, "INFO");
        assert_eq!(logs[1].timestamp.as_deref(),
                   Some("2024-03-01 10:20:30.500"));
    }

    #[test]
    fn timestamps_are_normalised() {
        assert_eq!(normalise_timestamp("2024-03-01 10:20:30").unwrap(),
                   "2024-03-01 10:20:30.000");
        assert_eq!(normalise_timestamp("2024-03-01T10:20:30.123+02:00")
                       .unwrap(),
                   "2024-03-01 08:20:30.123");
        assert!(normalise_timestamp("yesterday").is_err());
    }

    #[test]
    fn missing_item_wraps_key() {
        let item = ConfigItem::missing("host");
        assert_eq!(item.name, "***host***");
        assert_eq!(item.value, "***Key dosn't exists.***");
        assert_eq!(serde_json::to_string(&item).unwrap(),
                   r#"{"name":"***host***","value":"***Key dosn't exists.***"}"#);
    }
}
