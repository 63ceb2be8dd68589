//! Singer-style PostgreSQL destination.
//!
//! Consumes a stream of SCHEMA and RECORD messages, provisions one
//! table per announced stream, and writes each record with an insert
//! that falls back to an update on a primary-key conflict.

#![warn(clippy::pedantic)]

pub mod bind;
pub mod client;
pub mod config;
pub mod ddl;
pub mod error;
pub mod logging;
pub mod protocol;
pub mod sql;
pub mod target;
pub mod type_map;
pub mod writer;

pub use config::Config;
pub use error::{Result, TargetError};
pub use protocol::Message;
pub use target::Target;
pub use writer::WriteOutcome;
