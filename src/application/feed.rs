// src/application/feed.rs
use tracing::instrument;

use crate::application::Backend;
use crate::constants::FEED_PAGE_SIZE;
use crate::domain::document::decode_all;
use crate::domain::query::CREATED_AT;
use crate::domain::{Collection, Note, Query};
use crate::ports::Notifier;

/// Home screen: the newest uploads.
pub struct HomeFeed<B: Backend> {
    backend: B,
    notes: Vec<Note>,
    notifier: Notifier,
}

impl<B: Backend> HomeFeed<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            notes: Vec::new(),
            notifier: Notifier::new(),
        }
    }

    pub fn queries() -> Vec<Query> {
        vec![Query::order_desc(CREATED_AT), Query::limit(FEED_PAGE_SIZE)]
    }

    /// Loads or reloads the feed; on failure the previous notes stay.
    #[instrument(level = "debug", skip(self))]
    pub fn refresh(&mut self) -> &[Note] {
        match self.backend.list_documents(Collection::Notes, &Self::queries()) {
            Ok(documents) => self.notes = decode_all(&documents),
            Err(_) => self.notifier.error("Failed to load notes"),
        }
        &self.notes
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn notifier(&mut self) -> &mut Notifier {
        &mut self.notifier
    }
}
