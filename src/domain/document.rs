// src/domain/document.rs
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::domain::DomainError;

/// The logical collections of the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Notes,
    Todos,
    Comments,
    Likes,
    Follows,
}

impl Collection {
    pub fn name(&self) -> &'static str {
        match self {
            Collection::Notes => "notes",
            Collection::Todos => "todos",
            Collection::Comments => "comments",
            Collection::Likes => "likes",
            Collection::Follows => "follows",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stored record: system attributes plus free-form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            created_at,
            fields,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Reads a counter field, treating missing or non-numeric values as zero.
    pub fn counter(&self, field: &str) -> i64 {
        self.fields.get(field).and_then(Value::as_i64).unwrap_or(0)
    }

    /// Decodes the document into an entity type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        let value = serde_json::to_value(self).map_err(|e| DomainError::Decode(e.to_string()))?;
        serde_json::from_value(value)
            .map_err(|e| DomainError::Decode(format!("{} ({})", e, self.id)))
    }
}

/// Decodes a result page, skipping documents that do not fit the entity shape.
pub fn decode_all<T: DeserializeOwned>(documents: &[Document]) -> Vec<T> {
    documents
        .iter()
        .filter_map(|doc| match doc.decode() {
            Ok(entity) => Some(entity),
            Err(e) => {
                warn!(id = %doc.id, error = %e, "Skipping malformed document");
                None
            }
        })
        .collect()
}

/// Serializes an entity payload into document fields.
pub fn to_fields<T: Serialize>(payload: &T) -> Result<Map<String, Value>, DomainError> {
    match serde_json::to_value(payload).map_err(|e| DomainError::Decode(e.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::Decode(format!(
            "expected an object payload, got {other}"
        ))),
    }
}
