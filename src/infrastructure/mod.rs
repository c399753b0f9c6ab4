// src/infrastructure/mod.rs
pub mod appwrite;
pub mod config;
pub mod memory;
pub mod session_store;

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

use crate::application::Backend;
pub use appwrite::AppwriteBackend;
pub use config::{BackendKind, Config};
pub use memory::MemoryBackend;
pub use session_store::SessionStore;

/// Backend handle shared by every view of one run.
pub type SharedBackend = Arc<dyn Backend + Send + Sync>;

/// Builds the backend selected by the configuration.
pub fn connect(config: &Config, session_store: Option<SessionStore>) -> Result<SharedBackend> {
    debug!(kind = ?config.backend.kind, "Connecting backend");
    Ok(match config.backend.kind {
        BackendKind::Appwrite => Arc::new(AppwriteBackend::new(config, session_store)?),
        BackendKind::Memory => Arc::new(MemoryBackend::new()),
    })
}
