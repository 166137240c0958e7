use std::net::Ipv4Addr;
use std::time::Duration;
use log::{info, warn};
use confstore::config::{self, Config};
use confstore::configrefs as db_configrefs;
use confstore::conn::ConnectionManager;
use confstore::types::ConnectionParams;
use crate::configrefs;

pub struct State {
    pub manager: ConnectionManager,
    /// Per-request limit on starting persistence calls.
    pub request_timeout: Option<Duration>,
    /// Request bodies above this many bytes are refused.
    pub max_body: usize,
}

impl State {
    pub fn new<C>(cfg: &C) -> Result<State, String>
    where
        C: Config + ?Sized,
    {
        let manager = ConnectionManager::from_config(cfg)?;
        if config::get_ref(cfg, &db_configrefs::DB_CONNECT_ON_START)? {
            match manager.reconfigure(&ConnectionParams::default()) {
                Ok(conn) => info!("connected on start: {conn}"),
                Err(e) => warn!("not connected on start: {e}"),
            }
        }
        Ok(State {
            manager,
            request_timeout: config::get_ref(
                cfg, &configrefs::SERVER_REQUEST_TIMEOUT)?,
            max_body: config::get_ref(cfg, &configrefs::SERVER_MAX_BODY)?,
        })
    }
}

pub fn addr<C>(cfg: &C) -> Result<(Ipv4Addr, u16), String>
where
    C: Config + ?Sized,
{
    let all_interfaces =
        config::get_ref(cfg, &configrefs::SERVER_ALL_INTERFACES)?;
    let addr = if all_interfaces { Ipv4Addr::UNSPECIFIED }
               else { Ipv4Addr::LOCALHOST };
    Ok((addr, config::get_ref(cfg, &configrefs::SERVER_PORT)?))
}

/// Normalised so that it can prefix paths that start with `/`.
pub fn root_path<C>(cfg: &C) -> Result<String, String>
where
    C: Config + ?Sized,
{
    Ok(config::get_ref(cfg, &configrefs::SERVER_ROOT_PATH)?
        .trim_end_matches('/').to_string())
}
