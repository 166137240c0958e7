//! Errors returned by operations.
//!
//! Every error reaches the client as an `ERROR` reply carrying the display
//! text as its message, along with the [`ErrorKind`] name.

use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// The request body is not valid JSON of the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(String),

    /// The request is well-formed JSON but asks for something invalid.
    #[error("{0}")]
    Validation(String),

    #[error("database is not connected: use the 'config' operation to \
             initialise the connection")]
    NotInitialized,

    /// Opening or probing a connection failed during reconfiguration.
    #[error("database connection failed: {0}")]
    Connection(String),

    /// The store rejected a statement.  The message is the store's own.
    #[error("{0}")]
    Persistence(String),

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize,
         strum::AsRefStr, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Parse,
    Validation,
    NotInitialized,
    Connection,
    Persistence,
    DeadlineExceeded,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(_) => ErrorKind::Parse,
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotInitialized => ErrorKind::NotInitialized,
            Error::Connection(_) => ErrorKind::Connection,
            Error::Persistence(_) => ErrorKind::Persistence,
            Error::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Parse(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_message_is_verbatim() {
        let e = Error::Persistence("UNIQUE constraint failed: tbl_config.name"
                                   .to_owned());
        assert_eq!(e.to_string(), "UNIQUE constraint failed: tbl_config.name");
        assert_eq!(e.kind().as_ref(), "persistence");
    }

    #[test]
    fn kind_serialises_in_snake_case() {
        let json = serde_json::to_string(&ErrorKind::NotInitialized).unwrap();
        assert_eq!(json, "\"not_initialized\"");
    }
}
