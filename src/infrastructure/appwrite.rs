// src/infrastructure/appwrite.rs
use anyhow::{Context, Result};
use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::application::{Backend, FileUpload, StoredFile};
use crate::domain::{BackendError, Collection, Document, Query, User};
use crate::infrastructure::config::{BackendConfig, CollectionIds, Config};
use crate::infrastructure::SessionStore;

const RESPONSE_FORMAT: &str = "1.5.0";
const FALLBACK_COOKIES: &str = "x-fallback-cookies";

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct DocumentList {
    documents: Vec<Document>,
}

#[derive(Deserialize)]
struct FileBody {
    #[serde(rename = "$id")]
    id: String,
    name: String,
    #[serde(rename = "sizeOriginal", default)]
    size: u64,
}

/// REST client for an Appwrite project.
pub struct AppwriteBackend {
    client: Client,
    settings: BackendConfig,
    collections: CollectionIds,
    cookies: Mutex<Option<String>>,
    session_store: Option<SessionStore>,
}

impl AppwriteBackend {
    pub fn new(config: &Config, session_store: Option<SessionStore>) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .user_agent(concat!("studyshare/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;

        let cookies = session_store.as_ref().and_then(SessionStore::load);
        debug!(restored = cookies.is_some(), endpoint = %config.backend.endpoint, "Creating AppwriteBackend");

        Ok(Self {
            client,
            settings: config.backend.clone(),
            collections: config.collections.clone(),
            cookies: Mutex::new(cookies),
            session_store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.settings.endpoint.trim_end_matches('/'), path)
    }

    fn documents_path(&self, collection: Collection) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            self.settings.database_id,
            self.collections.id(collection)
        )
    }

    fn current_cookies(&self) -> Option<String> {
        self.cookies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn set_cookies(&self, cookies: Option<String>) {
        if let Some(store) = &self.session_store {
            let persisted = match &cookies {
                Some(value) => store.save(value),
                None => store.clear(),
            };
            if let Err(e) = persisted {
                warn!(error = %e, "Could not persist session");
            }
        }
        *self.cookies.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = cookies;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self
            .client
            .request(method, self.url(path))
            .header("X-Appwrite-Project", &self.settings.project)
            .header("X-Appwrite-Response-Format", RESPONSE_FORMAT);
        if let Some(cookies) = self.current_cookies() {
            request = request.header("X-Fallback-Cookies", cookies);
        }
        request
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request
            .send()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if let Some(cookies) = response
            .headers()
            .get(FALLBACK_COOKIES)
            .and_then(|value| value.to_str().ok())
        {
            self.set_cookies(Some(cookies.to_string()));
        }

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<ErrorBody>()
            .map(|body| body.message)
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Request failed").to_string());
        debug!(status = status.as_u16(), %message, "Request rejected");

        Err(match status.as_u16() {
            401 => BackendError::Unauthorized(message),
            code => BackendError::Rejected { status: code, message },
        })
    }

    fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, BackendError> {
        self.send(request)?
            .json::<T>()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn document_request(
        &self,
        method: Method,
        collection: Collection,
        id: &str,
    ) -> RequestBuilder {
        self.request(method, &format!("{}/{}", self.documents_path(collection), id))
    }

    fn map_missing(err: BackendError, collection: Collection, id: &str) -> BackendError {
        if err.is_not_found() {
            BackendError::NotFound {
                collection: collection.name().to_string(),
                id: id.to_string(),
            }
        } else {
            err
        }
    }
}

impl Backend for AppwriteBackend {
    fn current_user(&self) -> Result<User, BackendError> {
        self.send_json(self.request(Method::GET, "/account"))
    }

    #[instrument(level = "debug", skip(self, password))]
    fn create_email_session(&self, email: &str, password: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, "/account/sessions/email")
            .json(&json!({ "email": email, "password": password }));
        self.send(request)?;
        info!("Session created");
        Ok(())
    }

    #[instrument(level = "debug", skip(self, password))]
    fn create_account(&self, email: &str, password: &str, name: &str) -> Result<User, BackendError> {
        let request = self.request(Method::POST, "/account").json(&json!({
            "userId": "unique()",
            "email": email,
            "password": password,
            "name": name,
        }));
        self.send_json(request)
    }

    fn delete_current_session(&self) -> Result<(), BackendError> {
        self.send(self.request(Method::DELETE, "/account/sessions/current"))?;
        self.set_cookies(None);
        Ok(())
    }

    #[instrument(level = "debug", skip(self, queries), fields(queries = queries.len()))]
    fn list_documents(&self, collection: Collection, queries: &[Query]) -> Result<Vec<Document>, BackendError> {
        let params: Vec<(&str, String)> = queries.iter().map(|q| ("queries[]", q.to_wire())).collect();
        let request = self
            .request(Method::GET, &self.documents_path(collection))
            .query(&params);
        let list: DocumentList = self.send_json(request)?;
        debug!(total = list.documents.len(), "Listed documents");
        Ok(list.documents)
    }

    fn get_document(&self, collection: Collection, id: &str) -> Result<Document, BackendError> {
        self.send_json(self.document_request(Method::GET, collection, id))
            .map_err(|e| Self::map_missing(e, collection, id))
    }

    fn create_document(&self, collection: Collection, fields: Map<String, Value>) -> Result<Document, BackendError> {
        let request = self
            .request(Method::POST, &self.documents_path(collection))
            .json(&json!({ "documentId": "unique()", "data": fields }));
        self.send_json(request)
    }

    fn update_document(
        &self,
        collection: Collection,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<Document, BackendError> {
        let request = self
            .document_request(Method::PATCH, collection, id)
            .json(&json!({ "data": fields }));
        self.send_json(request)
            .map_err(|e| Self::map_missing(e, collection, id))
    }

    fn delete_document(&self, collection: Collection, id: &str) -> Result<(), BackendError> {
        self.send(self.document_request(Method::DELETE, collection, id))
            .map(|_| ())
            .map_err(|e| Self::map_missing(e, collection, id))
    }

    #[instrument(level = "debug", skip(self))]
    fn increment_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        delta: i64,
    ) -> Result<Document, BackendError> {
        let (operation, value) = if delta >= 0 {
            ("increment", delta)
        } else {
            ("decrement", -delta)
        };
        let path = format!("{}/{}/{}/{}", self.documents_path(collection), id, field, operation);
        let request = self
            .request(Method::PATCH, &path)
            .json(&json!({ "value": value }));
        self.send_json(request)
            .map_err(|e| Self::map_missing(e, collection, id))
    }

    #[instrument(level = "debug", skip(self, file), fields(name = %file.name, size = file.size()))]
    fn create_file(&self, file: &FileUpload) -> Result<StoredFile, BackendError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let form = multipart::Form::new()
            .text("fileId", "unique()")
            .part("file", part);

        let request = self
            .request(Method::POST, &format!("/storage/buckets/{}/files", self.settings.bucket_id))
            .multipart(form);
        let body: FileBody = self.send_json(request)?;

        Ok(StoredFile {
            id: body.id,
            name: body.name,
            size: if body.size == 0 { file.size() } else { body.size },
        })
    }

    fn file_download_url(&self, file_id: &str) -> String {
        format!(
            "{}?project={}",
            self.url(&format!(
                "/storage/buckets/{}/files/{}/download",
                self.settings.bucket_id, file_id
            )),
            self.settings.project
        )
    }

    fn fetch_file(&self, file_id: &str) -> Result<Vec<u8>, BackendError> {
        let path = format!(
            "/storage/buckets/{}/files/{}/download",
            self.settings.bucket_id, file_id
        );
        let bytes = self
            .send(self.request(Method::GET, &path))?
            .bytes()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
