//! Operation dispatch.
//!
//! A request is a JSON object whose `op` field names the operation; the rest
//! of the object is read by the operation's handler.  Whatever happens, the
//! result is a [`Reply`].

use std::str::FromStr;
use log::{debug, warn};
use serde::Deserialize;
use crate::conn::ConnectionManager;
use crate::deadline::Deadline;
use crate::error::{Error, Result};

pub mod handlers;
pub mod reply;

pub use self::reply::{Outcome, Reply, Status};

/// Operations, matched case-insensitively.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq,
         strum::AsRefStr, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Op {
    /// Set the database connection parameters and connect.
    Config,
    AddConfig,
    UpdateConfig,
    GetConfig,
    DelConfig,
    ClearConfig,
    AddLog,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    /// Missing and `null` are both read as an empty name.
    op: Option<String>,
}

/// Handle one request body.
pub fn dispatch(manager: &ConnectionManager, body: &[u8], deadline: &Deadline)
-> Reply {
    match handle(manager, body, deadline) {
        Ok((op, outcome)) => Reply::ok(op, outcome),
        Err(e) => {
            warn!("request failed ({}): {e}", e.kind());
            Reply::error(&e)
        }
    }
}

/// Returns the operation name as sent, with the outcome.
fn handle(manager: &ConnectionManager, body: &[u8], deadline: &Deadline)
-> Result<(String, Outcome)> {
    if body.is_empty() {
        return Err(Error::Validation("empty request body".to_owned()));
    }
    let envelope: Envelope = serde_json::from_slice(body)?;
    let name = envelope.op.unwrap_or_default();
    let op = Op::from_str(&name)
        .map_err(|_| Error::Validation(
            format!("unknown operation '{name}'")))?;
    debug!("dispatching {}", op.as_ref());

    let outcome = match op {
        Op::Config => handlers::config(manager, body),
        Op::AddConfig => handlers::add_config(manager, body, deadline),
        Op::UpdateConfig => handlers::update_config(manager, body, deadline),
        Op::GetConfig => handlers::get_config(manager, body, deadline),
        Op::DelConfig => handlers::del_config(manager, body, deadline),
        Op::ClearConfig => handlers::clear_config(manager, deadline),
        Op::AddLog => handlers::add_log(manager, body, deadline),
    }?;
    Ok((name, outcome))
}
