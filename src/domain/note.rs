// src/domain/note.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteKind {
    Note,
    Question,
}

impl NoteKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Note => "note",
            NoteKind::Question => "question",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NoteKind::Note => "Study Note",
            NoteKind::Question => "Question Paper",
        }
    }
}

impl fmt::Display for NoteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "note" => Ok(NoteKind::Note),
            "question" => Ok(NoteKind::Question),
            other => Err(format!("unknown note type: {other}")),
        }
    }
}

/// A shared study material as stored in the `notes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub academic_year: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    #[serde(default)]
    pub tags: Vec<String>,
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_size: u64,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub downloads: i64,
}

impl Note {
    pub fn author_display(&self) -> &str {
        if self.author_name.is_empty() {
            "Anonymous"
        } else {
            &self.author_name
        }
    }
}

/// Payload written when a note is uploaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub academic_year: String,
    #[serde(rename = "type")]
    pub kind: NoteKind,
    pub tags: Vec<String>,
    pub file_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub author_id: String,
    pub author_name: String,
    pub likes: i64,
    pub comments: i64,
    pub downloads: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Document;
    use serde_json::json;

    #[test]
    fn given_document_without_counters_when_decoding_then_defaults_to_zero() {
        let doc: Document = serde_json::from_value(json!({
            "$id": "n1",
            "$createdAt": "2024-03-01T10:00:00Z",
            "title": "Thermodynamics",
            "type": "question",
            "fileId": "f1"
        }))
        .unwrap();

        let note: Note = doc.decode().unwrap();

        assert_eq!(note.kind, NoteKind::Question);
        assert_eq!(note.likes, 0);
        assert_eq!(note.downloads, 0);
        assert_eq!(note.author_display(), "Anonymous");
    }

    #[test]
    fn given_unknown_kind_when_parsing_then_fails() {
        assert!("lecture".parse::<NoteKind>().is_err());
        assert_eq!("note".parse::<NoteKind>().unwrap(), NoteKind::Note);
    }
}
