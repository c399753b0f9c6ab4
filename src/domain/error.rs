// src/domain/error.rs
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Failures reported by the remote platform.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BackendError::NotFound { .. })
            || matches!(self, BackendError::Rejected { status: 404, .. })
    }
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Note not found: {0}")]
    NoteNotFound(String),
    #[error("Todo not found: {0}")]
    TodoNotFound(String),
    #[error("Note has not been loaded yet")]
    NoteNotLoaded,
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Invalid input: {0}")]
    Validation(ValidationErrors),
    #[error("Malformed document: {0}")]
    Decode(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Per-field form errors, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        // first error per field wins, like a form library reporting one rule at a time
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    pub fn require(&mut self, field: &'static str, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.add(field, message);
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when no field failed, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
