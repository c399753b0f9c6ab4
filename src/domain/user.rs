// src/domain/user.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The signed-in account, as reported by the identity service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn initial(&self) -> char {
        self.name
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or('U')
    }
}
