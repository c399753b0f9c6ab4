// src/application/upload.rs
use tracing::{debug, info, instrument};

use crate::application::{Backend, FileUpload};
use crate::constants::{MAX_UPLOAD_BYTES, PDF_CONTENT_TYPE, PROGRESS_FILE_STORED};
use crate::domain::document::to_fields;
use crate::domain::{Collection, DomainError, NewNote, Note, NoteKind, Route, User, ValidationErrors};
use crate::ports::Notifier;

/// Fields of the upload form, as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadForm {
    pub title: String,
    pub description: String,
    pub subject: String,
    pub academic_year: String,
    /// "note" or "question"; empty until chosen.
    pub kind: String,
    /// Comma-separated.
    pub tags: String,
}

impl UploadForm {
    fn validate(&self) -> Result<NoteKind, DomainError> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Title is required");
        errors.require("description", &self.description, "Description is required");
        errors.require("subject", &self.subject, "Subject is required");
        let kind = if self.kind.is_empty() {
            errors.add("type", "Type is required");
            None
        } else {
            match self.kind.parse::<NoteKind>() {
                Ok(kind) => Some(kind),
                Err(message) => {
                    errors.add("type", message);
                    None
                }
            }
        };
        errors.into_result()?;
        kind.ok_or_else(|| DomainError::Decode("type".to_string()))
    }
}

/// Splits comma-separated tags, trimming each and dropping empty entries.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Upload screen: file selection, form and two-step submit.
pub struct Uploader<B: Backend> {
    backend: B,
    author: User,
    file: Option<FileUpload>,
    progress: u8,
    notifier: Notifier,
}

impl<B: Backend> Uploader<B> {
    pub fn new(backend: B, author: &User) -> Self {
        Self {
            backend,
            author: author.clone(),
            file: None,
            progress: 0,
            notifier: Notifier::new(),
        }
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn file(&self) -> Option<&FileUpload> {
        self.file.as_ref()
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Accepts a PDF within the size limit. Rejected files never reach the backend.
    pub fn select_file(&mut self, file: FileUpload) -> bool {
        if file.content_type != PDF_CONTENT_TYPE {
            self.notifier.error("Please select a PDF file");
            return false;
        }
        if file.size() > MAX_UPLOAD_BYTES {
            debug!(size = file.size(), "Rejecting oversized upload");
            self.notifier.error("File size must be less than 10MB");
            return false;
        }
        self.file = Some(file);
        true
    }

    pub fn remove_file(&mut self) {
        self.file = None;
    }

    /// Stores the file, then creates the note. Returns the route of the new note.
    #[instrument(level = "debug", skip(self, form), fields(title = %form.title))]
    pub fn submit(&mut self, form: &UploadForm) -> Result<Route, DomainError> {
        let kind = form.validate()?;
        let Some(file) = self.file.clone() else {
            self.notifier.error("Please select a file to upload");
            return Err(DomainError::Validation({
                let mut errors = ValidationErrors::new();
                errors.add("file", "Please select a file to upload");
                errors
            }));
        };

        self.progress = 0;
        let result = self.store(&file, form, kind);
        self.progress = 0;

        match result {
            Ok(note) => {
                info!(note_id = %note.id, "Note uploaded");
                self.notifier.success("Note uploaded successfully!");
                self.file = None;
                Ok(Route::NoteDetail(note.id))
            }
            Err(e) => {
                self.notifier.error("Failed to upload note. Please try again.");
                Err(e)
            }
        }
    }

    fn store(&mut self, file: &FileUpload, form: &UploadForm, kind: NoteKind) -> Result<Note, DomainError> {
        let stored = self.backend.create_file(file)?;
        self.progress = PROGRESS_FILE_STORED;
        debug!(file_id = %stored.id, progress = self.progress, "File stored");

        let payload = NewNote {
            title: form.title.clone(),
            description: form.description.clone(),
            subject: form.subject.clone(),
            academic_year: form.academic_year.clone(),
            kind,
            tags: parse_tags(&form.tags),
            file_id: stored.id,
            file_name: file.name.clone(),
            file_size: file.size(),
            author_id: self.author.id.clone(),
            author_name: self.author.name.clone(),
            likes: 0,
            comments: 0,
            downloads: 0,
        };

        let note = self
            .backend
            .create_document(Collection::Notes, to_fields(&payload)?)?
            .decode::<Note>()?;
        self.progress = 100;
        debug!(progress = self.progress, "Note created");
        Ok(note)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_tags_with_spaces_and_blanks_when_parsing_then_trims_and_drops_empty() {
        assert_eq!(
            parse_tags(" calculus, derivatives ,, limits,"),
            vec!["calculus", "derivatives", "limits"]
        );
        assert!(parse_tags("").is_empty());
    }

    #[test]
    fn given_empty_form_when_validating_then_reports_required_fields() {
        let form = UploadForm::default();

        match form.validate() {
            Err(DomainError::Validation(errors)) => {
                assert_eq!(errors.get("title"), Some("Title is required"));
                assert_eq!(errors.get("description"), Some("Description is required"));
                assert_eq!(errors.get("subject"), Some("Subject is required"));
                assert_eq!(errors.get("type"), Some("Type is required"));
                assert!(errors.get("tags").is_none());
            }
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn given_complete_form_when_validating_then_returns_kind() {
        let form = UploadForm {
            title: "Past paper 2023".to_string(),
            description: "Final exam".to_string(),
            subject: "Physics".to_string(),
            kind: "question".to_string(),
            ..Default::default()
        };
        assert_eq!(form.validate().unwrap(), NoteKind::Question);
    }
}
