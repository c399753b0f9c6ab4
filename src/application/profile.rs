// src/application/profile.rs
use serde::Serialize;
use tracing::instrument;

use crate::application::Backend;
use crate::domain::document::decode_all;
use crate::domain::query::CREATED_AT;
use crate::domain::{Collection, Note, Query, User};
use crate::ports::Notifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub total_notes: usize,
    pub total_likes: i64,
    pub total_downloads: i64,
}

impl ProfileStats {
    pub fn from_notes(notes: &[Note]) -> Self {
        Self {
            total_notes: notes.len(),
            total_likes: notes.iter().map(|n| n.likes).sum(),
            total_downloads: notes.iter().map(|n| n.downloads).sum(),
        }
    }
}

/// A user's uploads and their totals.
pub struct ProfileView<B: Backend> {
    backend: B,
    user_id: String,
    own_profile: bool,
    notes: Vec<Note>,
    stats: ProfileStats,
    notifier: Notifier,
}

impl<B: Backend> ProfileView<B> {
    /// `user_id == None` shows the viewer's own profile.
    pub fn new(backend: B, viewer: &User, user_id: Option<&str>) -> Self {
        let target = user_id.unwrap_or(&viewer.id).to_string();
        Self {
            backend,
            own_profile: target == viewer.id,
            user_id: target,
            notes: Vec::new(),
            stats: ProfileStats::default(),
            notifier: Notifier::new(),
        }
    }

    pub fn is_own_profile(&self) -> bool {
        self.own_profile
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[instrument(level = "debug", skip(self), fields(user_id = %self.user_id))]
    pub fn load(&mut self) {
        let queries = [
            Query::equal("authorId", self.user_id.as_str()),
            Query::order_desc(CREATED_AT),
        ];
        match self.backend.list_documents(Collection::Notes, &queries) {
            Ok(documents) => {
                self.notes = decode_all(&documents);
                self.stats = ProfileStats::from_notes(&self.notes);
            }
            Err(_) => self.notifier.error("Failed to load profile"),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn stats(&self) -> ProfileStats {
        self.stats
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}
