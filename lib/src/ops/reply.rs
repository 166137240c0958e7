use serde::Serialize;
use crate::error::{Error, ErrorKind};
use crate::types::ConfigItem;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Error,
}

/// What a handler produced on success.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Done,
    Records(Vec<ConfigItem>),
}

/// The body of every response.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Reply {
    /// The operation as sent by the client.  Only set on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    pub result: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<ConfigItem>>,
}

impl Reply {
    pub fn ok(op: String, outcome: Outcome) -> Reply {
        Reply {
            op: Some(op),
            result: Status::Ok,
            message: None,
            kind: None,
            records: match outcome {
                Outcome::Done => None,
                Outcome::Records(records) => Some(records),
            },
        }
    }

    pub fn error(error: &Error) -> Reply {
        Reply {
            op: None,
            result: Status::Error,
            message: Some(error.to_string()),
            kind: Some(error.kind()),
            records: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == Status::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_reply_has_no_message() {
        let reply = Reply::ok("add_config".to_owned(), Outcome::Done);
        assert_eq!(serde_json::to_string(&reply).unwrap(),
                   r#"{"op":"add_config","result":"OK"}"#);
    }

    #[test]
    fn empty_records_are_kept() {
        let reply = Reply::ok("get_config".to_owned(), Outcome::Records(vec![]));
        assert_eq!(serde_json::to_string(&reply).unwrap(),
                   r#"{"op":"get_config","result":"OK","records":[]}"#);
    }

    #[test]
    fn error_reply_has_kind_and_no_op() {
        let reply = Reply::error(&Error::NotInitialized);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["result"], "ERROR");
        assert_eq!(json["kind"], "not_initialized");
        assert!(json.get("op").is_none());
        assert!(json["message"].as_str().unwrap().contains("'config'"));
    }
}
