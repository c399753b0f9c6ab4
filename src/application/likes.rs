// src/application/likes.rs
use tracing::{debug, instrument, warn};

use crate::application::Backend;
use crate::domain::{BackendError, Collection, Query};

/// Optimistic like flag and counter as displayed for one note.
///
/// The last state confirmed by the store is kept apart from the toggles still
/// pending, so the display can be recomputed when any of them settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeState {
    liked: bool,
    count: i64,
    confirmed_liked: bool,
    confirmed_count: i64,
    confirmed_seq: u64,
    next_seq: u64,
    pending: Vec<PendingLike>,
}

/// A toggle applied locally whose remote write has not settled yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a pending like must be settled"]
pub struct PendingLike {
    seq: u64,
    /// +1 when this toggle liked the note, -1 when it unliked it.
    pub delta: i64,
    /// The flag this toggle left on screen.
    pub liked_after: bool,
}

impl PendingLike {
    pub fn liked(&self) -> bool {
        self.liked_after
    }
}

impl LikeState {
    pub fn new(liked: bool, count: i64) -> Self {
        Self {
            liked,
            count,
            confirmed_liked: liked,
            confirmed_count: count,
            confirmed_seq: 0,
            next_seq: 1,
            pending: Vec::new(),
        }
    }

    pub fn liked(&self) -> bool {
        self.liked
    }

    pub fn count(&self) -> i64 {
        self.count
    }

    pub fn in_flight(&self) -> usize {
        self.pending.len()
    }

    /// Flips the flag and adjusts the count before anything is sent.
    pub fn begin_toggle(&mut self) -> PendingLike {
        let delta = if self.liked { -1 } else { 1 };
        self.liked = !self.liked;
        self.count += delta;
        let pending = PendingLike {
            seq: self.next_seq,
            delta,
            liked_after: self.liked,
        };
        self.next_seq += 1;
        self.pending.push(pending);
        pending
    }

    /// Reconciles a settled write.
    ///
    /// Success confirms this toggle's flag and the server count unless a newer
    /// toggle was already confirmed. Failure drops the toggle; the display is
    /// then rebuilt from the confirmed state and the newer toggles still pending.
    pub fn settle(&mut self, pending: PendingLike, result: Result<i64, BackendError>) -> bool {
        self.pending.retain(|p| p.seq != pending.seq);
        let applied = match result {
            Ok(server_count) => {
                if pending.seq > self.confirmed_seq {
                    self.confirmed_seq = pending.seq;
                    self.confirmed_liked = pending.liked_after;
                    self.confirmed_count = server_count;
                }
                true
            }
            Err(e) => {
                debug!(error = %e, delta = pending.delta, "Rolling back like");
                false
            }
        };
        self.recompute();
        applied
    }

    fn recompute(&mut self) {
        let confirmed_seq = self.confirmed_seq;
        self.liked = self
            .pending
            .iter()
            .filter(|p| p.seq > confirmed_seq)
            .max_by_key(|p| p.seq)
            .map_or(self.confirmed_liked, |p| p.liked_after);
        self.count =
            self.confirmed_count + i64::from(self.liked) - i64::from(self.confirmed_liked);
    }
}

/// Writes one toggle to the store and returns the note's new like count.
///
/// The counter moves by atomic increment; when a user is given, a membership
/// record in `likes` is added or removed as well. The record is read first:
/// a like that already exists or an unlike with nothing to remove leaves the
/// counter alone. If the record cannot be written the counter change is
/// compensated.
#[instrument(level = "debug", skip(backend))]
pub fn push_like<B: Backend>(
    backend: &B,
    note_id: &str,
    user_id: Option<&str>,
    delta: i64,
) -> Result<i64, BackendError> {
    let Some(user_id) = user_id else {
        let updated = backend.increment_field(Collection::Notes, note_id, "likes", delta)?;
        return Ok(updated.counter("likes"));
    };

    if has_liked(backend, note_id, user_id)? == (delta > 0) {
        debug!(note_id, user_id, delta, "Like record already matches");
        return Ok(backend.get_document(Collection::Notes, note_id)?.counter("likes"));
    }

    let updated = backend.increment_field(Collection::Notes, note_id, "likes", delta)?;

    let record = if delta > 0 {
        let mut fields = serde_json::Map::new();
        fields.insert("noteId".to_string(), note_id.into());
        fields.insert("userId".to_string(), user_id.into());
        backend.create_document(Collection::Likes, fields).map(|_| ())
    } else {
        remove_like_records(backend, note_id, user_id)
    };

    match record {
        Ok(()) => Ok(updated.counter("likes")),
        Err(e) => {
            if let Err(undo) = backend.increment_field(Collection::Notes, note_id, "likes", -delta) {
                warn!(error = %undo, note_id, "Failed to compensate like counter");
            }
            Err(e)
        }
    }
}

fn remove_like_records<B: Backend>(
    backend: &B,
    note_id: &str,
    user_id: &str,
) -> Result<(), BackendError> {
    let records = backend.list_documents(Collection::Likes, &like_record_queries(note_id, user_id))?;
    for record in records {
        backend.delete_document(Collection::Likes, &record.id)?;
    }
    Ok(())
}

pub fn like_record_queries(note_id: &str, user_id: &str) -> Vec<Query> {
    vec![
        Query::equal("noteId", note_id),
        Query::equal("userId", user_id),
        Query::limit(1),
    ]
}

/// Whether the user already has a like record for the note.
pub fn has_liked<B: Backend>(backend: &B, note_id: &str, user_id: &str) -> Result<bool, BackendError> {
    let records = backend.list_documents(Collection::Likes, &like_record_queries(note_id, user_id))?;
    Ok(!records.is_empty())
}
