//! Wire types for the tap/target message stream.
//!
//! Two message kinds arrive interleaved, one JSON object per line:
//! SCHEMA announces the shape of a stream, RECORD carries one row for
//! the most recently announced stream.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, TargetError};

/// One protocol message, discriminated by its `type` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum Message {
    Schema(StreamSchema),
    Record(RecordMessage),
}

impl Message {
    /// Parse one newline-delimited JSON message.
    ///
    /// A missing or unrecognized `type` discriminant, or a body that
    /// does not match the declared kind, is an invalid-input error
    /// scoped to this message.
    pub fn parse(line: &str) -> Result<Self> {
        serde_json::from_str(line)
            .map_err(|e| TargetError::InvalidInput(format!("unparseable message: {e}")))
    }
}

/// SCHEMA message body: declares a stream and the table shape to
/// provision for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamSchema {
    /// Stream name; doubles as the table name, verbatim.
    pub tap_stream_id: String,
    #[serde(default)]
    pub schema: SchemaBody,
    #[serde(default)]
    pub key_properties: Vec<String>,
}

/// The `schema` envelope inside a SCHEMA message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaBody {
    /// Column declarations, in announcement order.
    #[serde(default)]
    pub properties: IndexMap<String, PropertyDescriptor>,
}

/// RECORD message body: one row for the currently bound stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordMessage {
    pub record: DataRecord,
}

/// Ordered column → value mapping, as sent on the wire.
pub type DataRecord = IndexMap<String, Value>;

/// Column descriptor: a JSON Schema primitive (or a union of them)
/// plus the optional length/format hints the translator understands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    #[serde(rename = "type")]
    pub type_decl: TypeDecl,
    #[serde(rename = "maxLength", default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

/// A declared type: one primitive name, or a set of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeDecl {
    Single(String),
    Union(Vec<String>),
}

impl StreamSchema {
    /// Check the fields table provisioning cannot work without.
    pub fn validate(&self) -> Result<()> {
        if self.schema.properties.is_empty() {
            return Err(TargetError::InvalidSchema(format!(
                "stream '{}' declares no properties",
                self.tap_stream_id
            )));
        }
        if self.key_properties.is_empty() {
            return Err(TargetError::InvalidSchema(format!(
                "stream '{}' declares no key_properties",
                self.tap_stream_id
            )));
        }
        Ok(())
    }

    /// Primary-key column: the first `key_properties` entry. Later
    /// entries are ignored (composite keys are out of scope).
    pub fn key_column(&self) -> Option<&str> {
        self.key_properties.first().map(String::as_str)
    }
}
