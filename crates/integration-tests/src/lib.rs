//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! Everything runs in process: the real services and router over the
//! in-memory store, with [`ScriptedGateway`] standing in for the media host.
//! No database or network is needed.
//!
//! # Test Categories
//!
//! - `catalog` - Slugs, listing, updates, delete cascade
//! - `favourites` - Toggle semantics and concurrency
//! - `insights` - Aggregation
//! - `upload` - Partial upload failure
//! - `api` - HTTP status codes and wire format

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use vitrine_core::{AnonymousUserId, Item, Media, NewItemInput};
use vitrine_server::config::{CloudinaryConfig, ServerConfig};
use vitrine_server::db::MemoryStore;
use vitrine_server::media::{MediaError, MediaFile, MediaGateway};
use vitrine_server::state::AppState;

/// Base URL used for share links in tests.
pub const BASE_URL: &str = "https://vitrine.test/";

/// Server configuration with no database, no admin and fake media credentials.
#[must_use]
pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: None,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: Url::parse(BASE_URL).unwrap(),
        max_upload_bytes: 1024 * 1024,
        cloudinary: CloudinaryConfig {
            api_base: Url::parse("https://media.invalid/v1_1").unwrap(),
            cloud_name: "test".to_string(),
            api_key: "key".to_string(),
            api_secret: SecretString::from("unused"),
            folder: "catalog-items".to_string(),
        },
        admin: None,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Parse an anonymous user id, panicking on bad test input.
#[must_use]
pub fn user(id: &str) -> AnonymousUserId {
    AnonymousUserId::parse(id).unwrap()
}

/// Media host double.
///
/// Uploads succeed with `https://media.test/catalog-items/<file name>` unless
/// the file name was marked as failing; deletes are recorded and succeed
/// unless [`ScriptedGateway::fail_deletes`] was called.
#[derive(Default)]
pub struct ScriptedGateway {
    failing_uploads: Mutex<Vec<String>>,
    upload_delays: Mutex<HashMap<String, Duration>>,
    fail_deletes: AtomicBool,
    upload_calls: AtomicUsize,
    delete_calls: Mutex<Vec<Media>>,
}

impl ScriptedGateway {
    /// Make uploads of `file_name` fail upstream.
    pub fn fail_upload_of(&self, file_name: &str) {
        self.failing_uploads
            .lock()
            .unwrap()
            .push(file_name.to_string());
    }

    /// Hold the upload of `file_name` for `delay` before answering.
    pub fn delay_upload_of(&self, file_name: &str, delay: Duration) {
        self.upload_delays
            .lock()
            .unwrap()
            .insert(file_name.to_string(), delay);
    }

    /// Make every delete fail upstream.
    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    /// Number of upload attempts received.
    #[must_use]
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Media passed to delete, in call order.
    #[must_use]
    pub fn delete_calls(&self) -> Vec<Media> {
        self.delete_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaGateway for ScriptedGateway {
    async fn upload(&self, file: MediaFile) -> Result<Media, MediaError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let name = file.file_name.clone().unwrap_or_default();

        let delay = self.upload_delays.lock().unwrap().get(&name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing_uploads.lock().unwrap().contains(&name) {
            return Err(MediaError::Api {
                status: 502,
                message: format!("upload of {name} failed"),
            });
        }

        let kind = file
            .kind()
            .ok_or_else(|| MediaError::UnsupportedContentType(file.content_type.clone()))?;
        Ok(Media {
            kind,
            url: format!("https://media.test/catalog-items/{name}"),
        })
    }

    async fn delete(&self, media: &Media) -> Result<(), MediaError> {
        self.delete_calls.lock().unwrap().push(media.clone());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(MediaError::Api {
                status: 500,
                message: "delete failed".to_string(),
            });
        }
        Ok(())
    }
}

/// Application wired over one in-memory store and a scripted media host.
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub media: Arc<ScriptedGateway>,
    pub state: AppState,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    #[must_use]
    pub fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(MemoryStore::new());
        let media = Arc::new(ScriptedGateway::default());
        let state = AppState::new(config, store.clone(), store.clone(), media.clone());
        Self {
            store,
            media,
            state,
        }
    }

    /// The full router, as served by the binary minus the Sentry layers.
    #[must_use]
    pub fn router(&self) -> Router {
        vitrine_server::app(self.state.clone())
    }

    /// Create an item through the catalog service.
    pub async fn create_item(&self, name: &str, category: &str, media: Vec<Media>) -> Item {
        self.state
            .catalog()
            .create(NewItemInput {
                name: Some(name.to_string()),
                description: None,
                price: Some(Decimal::new(999, 2)),
                media: Some(media),
                category: Some(category.to_string()),
            })
            .await
            .unwrap()
    }

    /// Send a request through the router and return status and raw body.
    pub async fn send_raw(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    /// Send a request and parse the body as JSON (`Null` when empty).
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let (status, bytes) = self.send_raw(request).await;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_json(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send_json("POST", uri, body).await
    }

    pub async fn send_json(&self, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }
}
