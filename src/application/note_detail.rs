// src/application/note_detail.rs
use tracing::{debug, info, instrument, warn};

use crate::application::likes::{self, LikeState};
use crate::application::Backend;
use crate::domain::document::{decode_all, to_fields};
use crate::domain::query::CREATED_AT;
use crate::domain::{Collection, Comment, DomainError, NewComment, Note, Query, Route, User};
use crate::ports::Notifier;

/// Where the browser should fetch a note's file from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub url: String,
    pub file_id: String,
    pub file_name: String,
}

/// One note with its comments and the viewer's like state.
pub struct NoteDetailView<B: Backend> {
    backend: B,
    note_id: String,
    viewer: Option<User>,
    note: Option<Note>,
    like: LikeState,
    comments: Vec<Comment>,
    redirect: Option<Route>,
    notifier: Notifier,
}

impl<B: Backend> NoteDetailView<B> {
    pub fn new(backend: B, note_id: &str, viewer: Option<&User>) -> Self {
        Self {
            backend,
            note_id: note_id.to_string(),
            viewer: viewer.cloned(),
            note: None,
            like: LikeState::new(false, 0),
            comments: Vec::new(),
            redirect: None,
            notifier: Notifier::new(),
        }
    }

    /// Fetches the note. On failure nothing is kept and the view asks to go home.
    #[instrument(level = "debug", skip(self), fields(note_id = %self.note_id))]
    pub fn load(&mut self) -> Result<&Note, DomainError> {
        let fetched = self
            .backend
            .get_document(Collection::Notes, &self.note_id)
            .map_err(|e| {
                if e.is_not_found() {
                    DomainError::NoteNotFound(self.note_id.clone())
                } else {
                    e.into()
                }
            })
            .and_then(|doc| doc.decode::<Note>());

        let note = match fetched {
            Ok(note) => note,
            Err(e) => {
                debug!(error = %e, "Loading note failed");
                self.note = None;
                self.notifier.error("Failed to load note details");
                self.redirect = Some(Route::Home);
                return Err(e);
            }
        };

        let liked = match &self.viewer {
            Some(user) => likes::has_liked(&self.backend, &note.id, &user.id).unwrap_or_else(|e| {
                warn!(error = %e, "Could not read like state");
                false
            }),
            None => false,
        };
        self.like = LikeState::new(liked, note.likes);
        self.comments = self.fetch_comments();
        self.redirect = None;
        Ok(self.note.insert(note))
    }

    fn fetch_comments(&self) -> Vec<Comment> {
        let queries = [
            Query::equal("noteId", self.note_id.as_str()),
            Query::order_desc(CREATED_AT),
        ];
        match self.backend.list_documents(Collection::Comments, &queries) {
            Ok(documents) => decode_all(&documents),
            Err(e) => {
                warn!(error = %e, "Could not load comments");
                Vec::new()
            }
        }
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn like_state(&self) -> &LikeState {
        &self.like
    }

    /// Route the view asked to navigate to, if any.
    pub fn redirect(&self) -> Option<&Route> {
        self.redirect.as_ref()
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    fn loaded_note_mut(&mut self) -> Result<&mut Note, DomainError> {
        self.note.as_mut().ok_or(DomainError::NoteNotLoaded)
    }

    /// Toggles the like optimistically and waits for the store.
    pub fn toggle_like(&mut self) -> Result<bool, DomainError> {
        self.loaded_note_mut()?;
        let pending = self.like.begin_toggle();
        let user_id = self.viewer.as_ref().map(|u| u.id.clone());
        let result = likes::push_like(&self.backend, &self.note_id, user_id.as_deref(), pending.delta);
        let failure = result.as_ref().err().cloned();

        self.like.settle(pending, result);
        let count = self.like.count();
        self.loaded_note_mut()?.likes = count;

        match failure {
            None => Ok(self.like.liked()),
            Some(e) => {
                self.notifier.error("Failed to update like");
                Err(e.into())
            }
        }
    }

    /// Counts the download and resolves where to fetch the file from.
    #[instrument(level = "debug", skip(self), fields(note_id = %self.note_id))]
    pub fn download(&mut self) -> Result<DownloadTarget, DomainError> {
        let (file_id, file_name) = {
            let note = self.loaded_note_mut()?;
            (note.file_id.clone(), note.file_name.clone())
        };

        match self
            .backend
            .increment_field(Collection::Notes, &self.note_id, "downloads", 1)
        {
            Ok(updated) => {
                let downloads = updated.counter("downloads");
                self.loaded_note_mut()?.downloads = downloads;
                self.notifier.success("Download started!");
                Ok(DownloadTarget {
                    url: self.backend.file_download_url(&file_id),
                    file_id,
                    file_name,
                })
            }
            Err(e) => {
                self.notifier.error("Failed to download file");
                Err(e.into())
            }
        }
    }

    /// Adds a comment. Blank comments are ignored and return `Ok(None)`.
    #[instrument(level = "debug", skip(self, content), fields(note_id = %self.note_id))]
    pub fn add_comment(&mut self, content: &str) -> Result<Option<&Comment>, DomainError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        self.loaded_note_mut()?;
        let viewer = self.viewer.clone().ok_or(DomainError::NotAuthenticated)?;

        let payload = NewComment {
            note_id: self.note_id.clone(),
            user_id: viewer.id,
            user_name: viewer.name,
            content: content.to_string(),
        };

        let stored = self
            .backend
            .create_document(Collection::Comments, to_fields(&payload)?)
            .map_err(DomainError::from)
            .and_then(|doc| doc.decode::<Comment>());

        let comment = match stored {
            Ok(comment) => comment,
            Err(e) => {
                self.notifier.error("Failed to add comment");
                return Err(e);
            }
        };
        self.comments.insert(0, comment);

        match self
            .backend
            .increment_field(Collection::Notes, &self.note_id, "comments", 1)
        {
            Ok(updated) => {
                self.loaded_note_mut()?.comments = updated.counter("comments");
                info!("Comment added");
                self.notifier.success("Comment added!");
                Ok(self.comments.first())
            }
            Err(e) => {
                // the body is stored; the count is left for the next load to correct
                warn!(error = %e, "Comment counter not updated");
                self.notifier.error("Failed to add comment");
                Err(e.into())
            }
        }
    }

    /// Link to this note under the given application base URL.
    pub fn share_link(&self, base_url: &str) -> String {
        format!(
            "{}{}",
            base_url.trim_end_matches('/'),
            Route::NoteDetail(self.note_id.clone())
        )
    }
}
