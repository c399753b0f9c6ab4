// src/util/testing.rs

use anyhow::Result;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::env;
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{Backend, FileUpload, StoredFile};
use crate::domain::{BackendError, Collection, Document, Query, User};
use crate::infrastructure::MemoryBackend;

/// One call against the backend, as seen by the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CurrentUser,
    CreateSession,
    CreateAccount,
    DeleteSession,
    List(Collection),
    Get(Collection),
    Create(Collection),
    Update(Collection),
    Delete(Collection),
    Increment(Collection),
    CreateFile,
    FetchFile,
}

/// Shared mock backend for testing views that depend on [`Backend`]
///
/// Stores data in a [`MemoryBackend`], records every call, and fails the
/// operations it has been told to fail with a network error.
///
/// # Examples
///
/// ```
/// use studyshare::util::testing::{note_fields, MockBackend, Operation};
/// use studyshare::domain::Collection;
///
/// let mock = MockBackend::builder()
///     .with_user("u1", "Ada", "ada@example.com")
///     .signed_in()
///     .with_note("n1", note_fields("Calculus", "note"))
///     .failing(Operation::Increment(Collection::Notes))
///     .build();
/// assert_eq!(mock.calls().len(), 0);
/// ```
pub struct MockBackend {
    store: MemoryBackend,
    failing: Mutex<HashSet<Operation>>,
    calls: Mutex<Vec<Operation>>,
}

pub const TEST_PASSWORD: &str = "password123";

impl MockBackend {
    pub fn builder() -> MockBackendBuilder {
        MockBackendBuilder::new()
    }

    /// The underlying store, for seeding after construction and for assertions.
    pub fn store(&self) -> &MemoryBackend {
        &self.store
    }

    pub fn set_failing(&self, operation: Operation, failing: bool) {
        let mut set = self.failing.lock().unwrap();
        if failing {
            set.insert(operation);
        } else {
            set.remove(&operation);
        }
    }

    pub fn calls(&self) -> Vec<Operation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, operation: Operation) -> usize {
        self.calls.lock().unwrap().iter().filter(|op| **op == operation).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Counter value of a stored document, 0 when missing.
    pub fn counter(&self, collection: Collection, id: &str, field: &str) -> i64 {
        self.store
            .get_document(collection, id)
            .map(|doc| doc.counter(field))
            .unwrap_or(0)
    }

    fn enter(&self, operation: Operation) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(operation);
        if self.failing.lock().unwrap().contains(&operation) {
            debug!(?operation, "Injected failure");
            return Err(BackendError::Network(format!("injected failure: {operation:?}")));
        }
        Ok(())
    }
}

impl Backend for MockBackend {
    fn current_user(&self) -> Result<User, BackendError> {
        self.enter(Operation::CurrentUser)?;
        self.store.current_user()
    }

    fn create_email_session(&self, email: &str, password: &str) -> Result<(), BackendError> {
        self.enter(Operation::CreateSession)?;
        self.store.create_email_session(email, password)
    }

    fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError> {
        self.enter(Operation::CreateAccount)?;
        self.store.create_account(email, password, name)
    }

    fn delete_current_session(&self) -> Result<(), BackendError> {
        self.enter(Operation::DeleteSession)?;
        self.store.delete_current_session()
    }

    fn list_documents(&self, collection: Collection, queries: &[Query]) -> Result<Vec<Document>, BackendError> {
        self.enter(Operation::List(collection))?;
        self.store.list_documents(collection, queries)
    }

    fn get_document(&self, collection: Collection, id: &str) -> Result<Document, BackendError> {
        self.enter(Operation::Get(collection))?;
        self.store.get_document(collection, id)
    }

    fn create_document(&self, collection: Collection, fields: Map<String, Value>) -> Result<Document, BackendError> {
        self.enter(Operation::Create(collection))?;
        self.store.create_document(collection, fields)
    }

    fn update_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, BackendError> {
        self.enter(Operation::Update(collection))?;
        self.store.update_document(collection, id, fields)
    }

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), BackendError> {
        self.enter(Operation::Delete(collection))?;
        self.store.delete_document(collection, id)
    }

    fn increment_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<Document, BackendError> {
        self.enter(Operation::Increment(collection))?;
        self.store.increment_field(collection, id, field, delta)
    }

    fn create_file(&self, file: &FileUpload) -> Result<StoredFile, BackendError> {
        self.enter(Operation::CreateFile)?;
        self.store.create_file(file)
    }

    fn file_download_url(&self, file_id: &str) -> String {
        self.store.file_download_url(file_id)
    }

    fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, BackendError> {
        self.enter(Operation::FetchFile)?;
        self.store.fetch_file(file_id)
    }
}

/// Builder for MockBackend
///
/// Provides a fluent interface for seeding data and configuring failures.
pub struct MockBackendBuilder {
    store: MemoryBackend,
    last_email: Option<String>,
    signed_in: bool,
    failing: HashSet<Operation>,
}

impl MockBackendBuilder {
    pub fn new() -> Self {
        Self {
            store: MemoryBackend::new(),
            last_email: None,
            signed_in: false,
            failing: HashSet::new(),
        }
    }

    /// Register an account with [`TEST_PASSWORD`]
    pub fn with_user(mut self, id: &str, name: &str, email: &str) -> Self {
        self.store.seed_account(id, name, email, TEST_PASSWORD);
        self.last_email = Some(email.to_string());
        self
    }

    /// Open a session for the most recently added user
    pub fn signed_in(mut self) -> Self {
        self.signed_in = true;
        self
    }

    /// Add a note document with the given id
    pub fn with_note(self, id: &str, fields: Map<String, Value>) -> Self {
        self.with_document(Collection::Notes, id, fields)
    }

    pub fn with_document(self, collection: Collection, id: &str, fields: Map<String, Value>) -> Self {
        self.store.seed(collection, id, fields);
        self
    }

    /// Make every call of this operation fail with a network error
    pub fn failing(mut self, operation: Operation) -> Self {
        self.failing.insert(operation);
        self
    }

    pub fn build(self) -> MockBackend {
        if self.signed_in {
            if let Some(email) = &self.last_email {
                self.store
                    .create_email_session(email, TEST_PASSWORD)
                    .expect("seeded account should sign in");
            }
        }
        MockBackend {
            store: self.store,
            failing: Mutex::new(self.failing),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl Default for MockBackendBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal field set of a stored note, counters at zero.
pub fn note_fields(title: &str, kind: &str) -> Map<String, Value> {
    as_fields(json!({
        "title": title,
        "description": format!("{title} summary"),
        "subject": "Mathematics",
        "academicYear": "2nd Year",
        "type": kind,
        "tags": [],
        "fileId": format!("file-{}", title.to_lowercase().replace(' ', "-")),
        "fileName": format!("{title}.pdf"),
        "fileSize": 2048,
        "authorId": "u1",
        "authorName": "Ada",
        "likes": 0,
        "comments": 0,
        "downloads": 0,
    }))
}

/// Unwraps a JSON object literal into a field map.
pub fn as_fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A PDF upload of the given size.
pub fn pdf_upload(name: &str, size: usize) -> FileUpload {
    FileUpload {
        name: name.to_string(),
        content_type: crate::constants::PDF_CONTENT_TYPE.to_string(),
        bytes: vec![b'%'; size],
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "rustls", "mio"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
