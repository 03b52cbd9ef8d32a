//! Payload decoding: one canonical metadata record from two payload schemas.
//!
//! Collections indexed by older versions of the pipeline carry metadata
//! fields flat at the payload top level; current collections nest them under
//! a `metadata` key. [`ChunkMetadata::decode`] accepts either transparently
//! so no call site branches on the schema.

use std::collections::HashMap;

use qdrant_client::qdrant::Value as QdrantValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical per-point metadata, decoded from either payload schema.
///
/// Every field is optional: an indexer bug or a foreign point must never
/// fail a scan. Points without a decodable `topic` are simply invisible to
/// aggregates and listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub topic: Option<String>,
    pub source_file: Option<String>,
    pub page: Option<i64>,
    pub uploaded_at: Option<String>,
    pub original_filename: Option<String>,
}

impl ChunkMetadata {
    /// Decodes a point payload into the canonical record.
    ///
    /// A nested `metadata` object wins; otherwise the legacy flat fields are
    /// read from the top level. Missing or mistyped fields map to `None`,
    /// never to an error. Pure function, no I/O.
    pub fn decode(payload: &Value) -> Self {
        let fields = match payload.get("metadata").and_then(Value::as_object) {
            Some(nested) => nested,
            None => match payload.as_object() {
                Some(flat) => flat,
                None => return Self::default(),
            },
        };

        Self {
            topic: str_field(fields, "topic"),
            source_file: str_field(fields, "source_file"),
            page: fields.get("page").and_then(Value::as_i64),
            uploaded_at: str_field(fields, "uploaded_at"),
            original_filename: str_field(fields, "original_filename"),
        }
    }

    /// Filename this point should be listed under: `source_file`, falling
    /// back to `original_filename` for pre-rename uploads.
    pub fn filename(&self) -> Option<&str> {
        self.source_file
            .as_deref()
            .or(self.original_filename.as_deref())
    }
}

fn str_field(fields: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Converts a Qdrant wire payload into JSON, preserving nested objects.
pub(crate) fn payload_to_json(payload: HashMap<String, QdrantValue>) -> Value {
    let mut map = serde_json::Map::with_capacity(payload.len());
    for (key, value) in payload {
        map.insert(key, value.into_json());
    }
    Value::Object(map)
}
