//! Ownership of the live database connection.

use std::sync::Arc;
use log::{info, warn};
use parking_lot::RwLock;
use crate::config::Config;
use crate::db::{self, Connector, Db, DbResult};
use crate::error::{Error, Result};
use crate::types::{ConnectionConfig, ConnectionParams};

/// A connection together with the parameters it was opened with.
pub struct Live {
    pub config: ConnectionConfig,
    pub db: Arc<dyn Db>,
}

struct State {
    /// Blank reconfiguration parameters are taken from here.
    current: ConnectionConfig,
    live: Option<Arc<Live>>,
}

/// Holds the single live connection shared by all requests.
///
/// Requests borrow the live connection through [`require_initialized`]; a
/// reconfiguration opens and probes its new connection before taking the
/// write lock, and only holds it to swap the new connection in.
///
/// [`require_initialized`]: ConnectionManager::require_initialized
pub struct ConnectionManager {
    connector: Box<dyn Connector>,
    state: RwLock<State>,
}

impl ConnectionManager {
    /// `defaults` fill blank parameters until the first successful
    /// reconfiguration.
    pub fn new<T>(connector: T, defaults: ConnectionConfig) -> ConnectionManager
    where
        T: Connector + 'static,
    {
        ConnectionManager {
            connector: Box::new(connector),
            state: RwLock::new(State { current: defaults, live: None }),
        }
    }

    /// Build a manager using the configured connector and defaults.
    pub fn from_config<C>(cfg: &C) -> DbResult<ConnectionManager>
    where
        C: Config + ?Sized,
    {
        Ok(ConnectionManager::new(
            db::connector(cfg)?, db::default_connection(cfg)?))
    }

    /// Connect using `params`, with blank fields taken from the current
    /// configuration, and replace the live connection.
    ///
    /// On failure the live connection is left as it was.
    pub fn reconfigure(&self, params: &ConnectionParams)
    -> Result<ConnectionConfig> {
        let candidate = self.state.read().current.inherit(params);
        let db = self.connector.connect(&candidate)
            .map_err(|e| {
                warn!("connecting to {candidate} failed: {e}");
                Error::Connection(e)
            })?;

        let live = Arc::new(Live { config: candidate.clone(), db });
        {
            let mut state = self.state.write();
            state.current = candidate.clone();
            state.live = Some(live);
        }
        info!("connected to {candidate}");
        Ok(candidate)
    }

    /// Borrow the live connection.
    pub fn require_initialized(&self) -> Result<Arc<Live>> {
        self.state.read().live.clone().ok_or(Error::NotInitialized)
    }

    pub fn is_initialized(&self) -> bool {
        self.state.read().live.is_some()
    }

    /// The parameters of the live connection, or the defaults if there is
    /// none yet.
    pub fn current_config(&self) -> ConnectionConfig {
        self.state.read().current.clone()
    }
}
