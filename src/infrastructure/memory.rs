// src/infrastructure/memory.rs
use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::application::{Backend, FileUpload, StoredFile};
use crate::domain::query::CREATED_AT;
use crate::domain::{BackendError, Collection, Document, Query, User};

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    session: Option<String>,
    documents: HashMap<Collection, Vec<Document>>,
    files: HashMap<String, (StoredFile, Vec<u8>)>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl State {
    /// Strictly increasing creation times, so "newest first" is deterministic.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_timestamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(ts);
        ts
    }

    fn document_mut(&mut self, collection: Collection, id: &str) -> Result<&mut Document, BackendError> {
        self.documents
            .entry(collection)
            .or_default()
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(collection, id))
    }
}

fn not_found(collection: Collection, id: &str) -> BackendError {
    BackendError::NotFound {
        collection: collection.name().to_string(),
        id: id.to_string(),
    }
}

fn unique_id() -> String {
    Uuid::new_v4().simple().to_string().chars().take(20).collect()
}

/// In-process implementation of the remote platform.
///
/// Mirrors the query semantics of the REST store closely enough for offline use and tests.
#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // a panic while holding the lock leaves plain data behind; keep using it
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Inserts a document with the given id, bypassing the session.
    pub fn seed(&self, collection: Collection, id: &str, fields: Map<String, Value>) -> Document {
        let mut state = self.lock();
        let doc = Document::new(id, state.next_timestamp(), fields);
        state.documents.entry(collection).or_default().push(doc.clone());
        doc
    }

    /// Registers an account without signing in.
    pub fn seed_account(&self, id: &str, name: &str, email: &str, password: &str) -> User {
        let mut state = self.lock();
        let user = User {
            id: id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            created_at: state.next_timestamp(),
        };
        state.accounts.insert(
            email.to_string(),
            Account {
                user: user.clone(),
                password: password.to_string(),
            },
        );
        user
    }

    pub fn document_count(&self, collection: Collection) -> usize {
        self.lock().documents.get(&collection).map_or(0, Vec::len)
    }

    pub fn file_count(&self) -> usize {
        self.lock().files.len()
    }
}

fn attribute(doc: &Document, name: &str) -> Option<Value> {
    match name {
        "$id" => Some(Value::String(doc.id.clone())),
        CREATED_AT => Some(Value::String(doc.created_at.to_rfc3339())),
        _ => doc.fields.get(name).cloned(),
    }
}

fn value_equals(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Bool(b) => b.to_string() == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Array(items) => items.iter().any(|item| value_equals(item, expected)),
        _ => false,
    }
}

fn value_matches_search(value: &Value, search: &str) -> bool {
    let Value::String(text) = value else {
        return false;
    };
    let text = text.to_lowercase();
    search
        .split_whitespace()
        .all(|term| text.contains(&term.to_lowercase()))
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn compare_docs(a: &Document, b: &Document, attribute_name: &str) -> Ordering {
    if attribute_name == CREATED_AT {
        return a.created_at.cmp(&b.created_at);
    }
    compare_values(a.fields.get(attribute_name), b.fields.get(attribute_name))
}

/// Applies filters, then orderings, then the limit.
fn evaluate(documents: &[Document], queries: &[Query]) -> Vec<Document> {
    let mut matched: Vec<Document> = documents
        .iter()
        .filter(|doc| {
            queries.iter().all(|query| match query {
                Query::Equal { attribute: name, value } => {
                    attribute(doc, name).is_some_and(|v| value_equals(&v, value))
                }
                Query::Search { attribute: name, value } => {
                    attribute(doc, name).is_some_and(|v| value_matches_search(&v, value))
                }
                _ => true,
            })
        })
        .cloned()
        .collect();

    let orderings: Vec<&Query> = queries.iter().filter(|q| q.is_ordering()).collect();
    if !orderings.is_empty() {
        matched.sort_by(|a, b| {
            orderings
                .iter()
                .map(|query| match query {
                    Query::OrderAsc(name) => compare_docs(a, b, name),
                    Query::OrderDesc(name) => compare_docs(b, a, name),
                    _ => Ordering::Equal,
                })
                .find(|ordering| *ordering != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });
    }

    let limit = queries.iter().rev().find_map(|q| match q {
        Query::Limit(n) => Some(*n),
        _ => None,
    });
    if let Some(limit) = limit {
        matched.truncate(limit);
    }
    matched
}

impl Backend for MemoryBackend {
    fn current_user(&self) -> Result<User, BackendError> {
        let state = self.lock();
        state
            .session
            .as_ref()
            .and_then(|email| state.accounts.get(email))
            .map(|account| account.user.clone())
            .ok_or_else(|| BackendError::Unauthorized("User (role: guests) missing scope (account)".to_string()))
    }

    fn create_email_session(&self, email: &str, password: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        let valid = state
            .accounts
            .get(email)
            .is_some_and(|account| account.password == password);
        if !valid {
            return Err(BackendError::Unauthorized(
                "Invalid credentials. Please check the email and password.".to_string(),
            ));
        }
        state.session = Some(email.to_string());
        Ok(())
    }

    fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError> {
        if self.lock().accounts.contains_key(email) {
            return Err(BackendError::Rejected {
                status: 409,
                message: "A user with the same id, email, or phone already exists in this project."
                    .to_string(),
            });
        }
        Ok(self.seed_account(&unique_id(), name, email, password))
    }

    fn delete_current_session(&self) -> Result<(), BackendError> {
        let mut state = self.lock();
        match state.session.take() {
            Some(_) => Ok(()),
            None => Err(BackendError::Unauthorized(
                "User (role: guests) missing scope (account)".to_string(),
            )),
        }
    }

    #[instrument(level = "trace", skip(self))]
    fn list_documents(&self, collection: Collection, queries: &[Query]) -> Result<Vec<Document>, BackendError> {
        let state = self.lock();
        let documents = state.documents.get(&collection).map(Vec::as_slice).unwrap_or_default();
        let result = evaluate(documents, queries);
        debug!(%collection, total = result.len(), "Listed documents");
        Ok(result)
    }

    fn get_document(&self, collection: Collection, id: &str) -> Result<Document, BackendError> {
        self.lock()
            .documents
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned()
            .ok_or_else(|| not_found(collection, id))
    }

    fn create_document(&self, collection: Collection, fields: Map<String, Value>) -> Result<Document, BackendError> {
        let mut state = self.lock();
        let doc = Document::new(unique_id(), state.next_timestamp(), fields);
        state.documents.entry(collection).or_default().push(doc.clone());
        Ok(doc)
    }

    fn update_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, BackendError> {
        let mut state = self.lock();
        let doc = state.document_mut(collection, id)?;
        doc.fields.extend(fields);
        Ok(doc.clone())
    }

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), BackendError> {
        let mut state = self.lock();
        let docs = state.documents.entry(collection).or_default();
        let before = docs.len();
        docs.retain(|d| d.id != id);
        if docs.len() == before {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    fn increment_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<Document, BackendError> {
        let mut state = self.lock();
        let doc = state.document_mut(collection, id)?;
        let next = doc.counter(field) + delta;
        doc.fields.insert(field.to_string(), Value::from(next));
        Ok(doc.clone())
    }

    fn create_file(&self, file: &FileUpload) -> Result<StoredFile, BackendError> {
        let stored = StoredFile {
            id: unique_id(),
            name: file.name.clone(),
            size: file.size(),
        };
        self.lock()
            .files
            .insert(stored.id.clone(), (stored.clone(), file.bytes.clone()));
        Ok(stored)
    }

    fn file_download_url(&self, file_id: &str) -> String {
        format!("memory://files/{file_id}/download")
    }

    fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, BackendError> {
        self.lock()
            .files
            .get(file_id)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| BackendError::NotFound {
                collection: "files".to_string(),
                id: file_id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn seeded() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.seed(Collection::Notes, "a", fields(json!({"title": "Calculus basics", "type": "note", "likes": 3})));
        backend.seed(Collection::Notes, "b", fields(json!({"title": "Organic chemistry", "type": "question", "likes": 9})));
        backend.seed(Collection::Notes, "c", fields(json!({"title": "Advanced calculus", "type": "note", "likes": 1})));
        backend
    }

    #[test]
    fn given_search_and_equal_when_listing_then_filters_case_insensitively() {
        let backend = seeded();

        let docs = backend
            .list_documents(
                Collection::Notes,
                &[Query::search("title", "CALCULUS"), Query::equal("type", "note")],
            )
            .unwrap();

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn given_order_desc_and_limit_when_listing_then_sorts_then_truncates() {
        let backend = seeded();

        let by_likes = backend
            .list_documents(Collection::Notes, &[Query::limit(2), Query::order_desc("likes")])
            .unwrap();
        let newest = backend
            .list_documents(Collection::Notes, &[Query::order_desc(CREATED_AT)])
            .unwrap();

        assert_eq!(by_likes.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(newest[0].id, "c");
    }

    #[test]
    fn given_counter_when_incrementing_then_adds_delta() {
        let backend = seeded();

        let doc = backend.increment_field(Collection::Notes, "a", "downloads", 1).unwrap();
        let doc2 = backend.increment_field(Collection::Notes, "a", "likes", -1).unwrap();

        assert_eq!(doc.counter("downloads"), 1);
        assert_eq!(doc2.counter("likes"), 2);
    }

    #[test]
    fn given_missing_document_when_incrementing_then_not_found() {
        let backend = MemoryBackend::new();
        let err = backend.increment_field(Collection::Notes, "nope", "likes", 1).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn given_account_when_signing_in_then_session_reads_user() {
        let backend = MemoryBackend::new();
        backend.seed_account("u1", "Ada", "ada@example.com", "password123");

        assert!(backend.current_user().is_err());
        assert!(backend.create_email_session("ada@example.com", "wrong-pass").is_err());
        backend.create_email_session("ada@example.com", "password123").unwrap();

        assert_eq!(backend.current_user().unwrap().id, "u1");
        backend.delete_current_session().unwrap();
        assert!(backend.current_user().is_err());
    }
}
