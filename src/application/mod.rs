// src/application/mod.rs
pub mod auth;
pub mod backend;
pub mod explore;
pub mod feed;
pub mod likes;
pub mod note_detail;
pub mod profile;
pub mod sequencer;
pub mod todos;
pub mod upload;

pub use auth::{AuthGate, GateDecision, SessionState};
pub use backend::{Backend, FileUpload, StoredFile};
pub use explore::{ExploreFilters, ExploreView, SortBy};
pub use feed::HomeFeed;
pub use likes::LikeState;
pub use note_detail::{DownloadTarget, NoteDetailView};
pub use profile::{ProfileStats, ProfileView};
pub use todos::{TodoForm, TodoList};
pub use upload::{UploadForm, Uploader};
