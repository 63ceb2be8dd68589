//! Store connection setup.
//!
//! Uses the sync `postgres` crate: one client, one blocking round trip
//! per statement. The crate manages its own internal tokio runtime.

use postgres::{Client, NoTls};
use tracing::debug;

use crate::config::Config;
use crate::error::{Result, TargetError};

/// Open a connection and verify it with a `SELECT 1` round trip.
pub fn connect(config: &Config) -> Result<Client> {
    let mut client = Client::connect(&config.connection_string(), NoTls)
        .map_err(|e| TargetError::Connection(e.to_string()))?;
    client
        .query("SELECT 1", &[])
        .map_err(|e| TargetError::Connection(e.to_string()))?;
    debug!(host = %config.host, database = %config.database, "connected");
    Ok(client)
}
