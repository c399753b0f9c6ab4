// src/application/backend.rs
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::domain::{BackendError, Collection, Document, Query, User};

/// A file selected for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FileUpload {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FileUpload {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Metadata of a file held by the binary store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub size: u64,
}

/// The remote platform: identity, document store and binary store.
///
/// Use cases receive a handle to an implementation instead of reaching for a
/// shared global client, so tests can pass an in-memory one.
pub trait Backend {
    /// Reads the account behind the current session.
    fn current_user(&self) -> Result<User, BackendError>;

    fn create_email_session(&self, email: &str, password: &str) -> Result<(), BackendError>;

    fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError>;

    fn delete_current_session(&self) -> Result<(), BackendError>;

    fn list_documents(
        &self,
        collection: Collection,
        queries: &[Query],
    ) -> Result<Vec<Document>, BackendError>;

    fn get_document(&self, collection: Collection, id: &str) -> Result<Document, BackendError>;

    fn create_document(
        &self,
        collection: Collection,
        fields: Map<String, Value>,
    ) -> Result<Document, BackendError>;

    fn update_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, BackendError>;

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), BackendError>;

    /// Atomically adds `delta` to a numeric field and returns the updated document.
    fn increment_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<Document, BackendError>;

    fn create_file(&self, file: &FileUpload) -> Result<StoredFile, BackendError>;

    /// URL that downloads the file directly.
    fn file_download_url(&self, file_id: &str) -> String;

    fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, BackendError>;
}

macro_rules! delegate_backend {
    ($($ty:ty),*) => {$(
        impl<B: Backend + ?Sized> Backend for $ty {
            fn current_user(&self) -> Result<User, BackendError> {
                (**self).current_user()
            }

            fn create_email_session(&self, email: &str, password: &str) -> Result<(), BackendError> {
                (**self).create_email_session(email, password)
            }

            fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError> {
                (**self).create_account(email, password, name)
            }

            fn delete_current_session(&self) -> Result<(), BackendError> {
                (**self).delete_current_session()
            }

            fn list_documents(&self, collection: Collection, queries: &[Query]) -> Result<Vec<Document>, BackendError> {
                (**self).list_documents(collection, queries)
            }

            fn get_document(&self, collection: Collection, id: &str) -> Result<Document, BackendError> {
                (**self).get_document(collection, id)
            }

            fn create_document(&self, collection: Collection, fields: Map<String, Value>) -> Result<Document, BackendError> {
                (**self).create_document(collection, fields)
            }

            fn update_document(&self, collection: Collection, id: &str, fields: Map<String, Value>) -> Result<Document, BackendError> {
                (**self).update_document(collection, id, fields)
            }

            fn delete_document(&self, collection: Collection, id: &str) -> Result<(), BackendError> {
                (**self).delete_document(collection, id)
            }

            fn increment_field(&self, collection: Collection, id: &str, field: &str, delta: i64) -> Result<Document, BackendError> {
                (**self).increment_field(collection, id, field, delta)
            }

            fn create_file(&self, file: &FileUpload) -> Result<StoredFile, BackendError> {
                (**self).create_file(file)
            }

            fn file_download_url(&self, file_id: &str) -> String {
                (**self).file_download_url(file_id)
            }

            fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, BackendError> {
                (**self).fetch_file(file_id)
            }
        }
    )*};
}

delegate_backend!(&B, Arc<B>, Box<B>);
