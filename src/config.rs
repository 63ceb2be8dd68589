//! Connection configuration loaded from a JSON file.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, TargetError};

/// PostgreSQL connection settings.
///
/// Key names keep the historical `postgres_*` spelling so existing
/// config files load unchanged; every field has a local-development
/// default.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "postgres_host", default = "default_host")]
    pub host: String,
    #[serde(rename = "postgres_port", default = "default_port")]
    pub port: u16,
    #[serde(rename = "postgres_database", default = "default_database")]
    pub database: String,
    #[serde(rename = "postgres_username", default = "default_username")]
    pub username: String,
    #[serde(rename = "postgres_password", default = "default_password")]
    pub password: String,
    /// Target namespace tables are provisioned in.
    #[serde(rename = "postgres_schema", default = "default_schema")]
    pub schema: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    5432
}

fn default_database() -> String {
    "postgres".to_string()
}

fn default_username() -> String {
    "postgres".to_string()
}

fn default_password() -> String {
    "postgres".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database: default_database(),
            username: default_username(),
            password: default_password(),
            schema: default_schema(),
        }
    }
}

impl Config {
    /// Load from a JSON file; absent keys fall back to defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| TargetError::Config(format!("cannot read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| TargetError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// libpq-style key/value connection string.
    pub fn connection_string(&self) -> String {
        format!(
            "host={} port={} user={} password={} dbname={}",
            self.host, self.port, self.username, self.password, self.database
        )
    }
}
