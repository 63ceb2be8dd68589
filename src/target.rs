//! Session facade: owns the connection, the target namespace, and the
//! currently bound stream.

use postgres::Client;
use tracing::info;

use crate::client;
use crate::config::Config;
use crate::ddl;
use crate::error::{Result, TargetError};
use crate::protocol::{DataRecord, Message, PropertyDescriptor, StreamSchema};
use crate::writer::{self, WriteOutcome};

/// The currently bound stream: the announced schema plus the derived
/// bits the write path needs. Built only from a validated schema whose
/// table has been provisioned, and replaced wholesale by the next
/// schema message.
#[derive(Debug, Clone)]
pub struct StreamState {
    schema: StreamSchema,
}

impl StreamState {
    pub(crate) fn new(schema: StreamSchema) -> Self {
        Self { schema }
    }

    /// Table name for the bound stream.
    pub fn table(&self) -> &str {
        &self.schema.tap_stream_id
    }

    /// Primary-key column: the first `key_properties` entry.
    pub fn key_column(&self) -> &str {
        self.schema.key_column().unwrap_or_default()
    }

    /// Descriptor for a declared column, if the schema announced one.
    pub fn descriptor(&self, column: &str) -> Option<&PropertyDescriptor> {
        self.schema.schema.properties.get(column)
    }
}

/// A destination session: one connection, strictly sequential message
/// handling, one bound stream at a time.
pub struct Target {
    client: Client,
    namespace: String,
    state: Option<StreamState>,
}

impl Target {
    /// Connect with the given config and verify the session.
    pub fn connect(config: &Config) -> Result<Self> {
        let client = client::connect(config)?;
        Ok(Self::new(client, config.schema.clone()))
    }

    /// Wrap an existing connection. Used by embedders and tests.
    pub fn new(client: Client, namespace: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            state: None,
        }
    }

    /// Dispatch one protocol message. Schema messages rebind the
    /// stream; record messages report how the row landed.
    pub fn handle_message(&mut self, message: Message) -> Result<Option<WriteOutcome>> {
        match message {
            Message::Schema(schema) => {
                self.apply_schema(schema)?;
                Ok(None)
            }
            Message::Record(message) => self.write_record(&message.record).map(Some),
        }
    }

    /// Bind a stream schema, provisioning its table when missing.
    ///
    /// Any announcement replaces the prior binding wholesale: a failed
    /// one leaves no stream bound, so records cannot silently land in
    /// the previously bound table. The new binding only takes effect
    /// when provisioning succeeds, so a bound stream always has a
    /// table behind it.
    pub fn apply_schema(&mut self, schema: StreamSchema) -> Result<()> {
        self.state = None;
        schema.validate()?;
        ddl::ensure_table(&mut self.client, &self.namespace, &schema)?;
        info!(stream = %schema.tap_stream_id, "stream bound");
        self.state = Some(StreamState::new(schema));
        Ok(())
    }

    /// Write one record against the currently bound stream.
    pub fn write_record(&mut self, record: &DataRecord) -> Result<WriteOutcome> {
        let Some(state) = &self.state else {
            return Err(TargetError::SchemaNotSet);
        };
        writer::write_record(&mut self.client, &self.namespace, state, record)
    }

    /// Name of the currently bound stream, if any.
    pub fn current_stream(&self) -> Option<&str> {
        self.state.as_ref().map(StreamState::table)
    }
}
