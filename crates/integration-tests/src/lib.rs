//! # integration-tests
//!
//! A fake REST document database for end-to-end tests. It answers
//! `{path}.json` requests the way the hosted database does, backed by a
//! [`MemoryStore`], and can be told to fail every request with a given status.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use rb_core::traits::DocumentStore;
use rb_store_memory::MemoryStore;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// Request metadata captured by the fake, for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub content_type: Option<String>,
}

struct Shared {
    store: Arc<MemoryStore>,
    fail_status: AtomicU16,
    seen: Mutex<Vec<SeenRequest>>,
}

pub struct FakeDatabase {
    addr: SocketAddr,
    shared: Arc<Shared>,
}

impl FakeDatabase {
    /// Serves `root` on an ephemeral localhost port.
    pub async fn spawn(root: Value) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            store: Arc::new(MemoryStore::with_root(root)),
            fail_status: AtomicU16::new(0),
            seen: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/{*path}", any(handle))
            .with_state(Arc::clone(&shared));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                tracing::error!(%err, "fake database stopped");
            }
        });

        Ok(Self { addr, shared })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Makes every following request answer with `status`. `None` heals it.
    pub fn fail_with(&self, status: Option<u16>) {
        self.shared.fail_status.store(status.unwrap_or(0), Ordering::SeqCst);
    }

    /// The backing store, for seeding and inspection.
    pub fn store(&self) -> &MemoryStore {
        &self.shared.store
    }

    pub async fn seen(&self) -> Vec<SeenRequest> {
        self.shared.seen.lock().await.clone()
    }
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    shared.seen.lock().await.push(SeenRequest {
        method: method.clone(),
        path: path.clone(),
        query,
        content_type,
    });

    let injected = shared.fail_status.load(Ordering::SeqCst);
    if injected != 0 {
        let status = StatusCode::from_u16(injected).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "error": "injected failure" }))).into_response();
    }

    let Some(path) = path.strip_suffix(".json") else {
        return (StatusCode::NOT_FOUND, Json(json!({ "error": "404 Not Found" }))).into_response();
    };

    let result = match method {
        Method::GET => shared.store.get(path).await.map(Json),
        Method::DELETE => shared.store.delete(path).await.map(|()| Json(Value::Null)),
        Method::POST | Method::PUT => {
            let Ok(value) = serde_json::from_slice::<Value>(&body) else {
                return (StatusCode::BAD_REQUEST, Json(json!({ "error": "Invalid data" })))
                    .into_response();
            };
            if method == Method::POST {
                shared.store.post(path, &value).await.map(|name| Json(json!({ "name": name })))
            } else {
                shared.store.put(path, &value).await.map(|()| Json(value))
            }
        }
        _ => return StatusCode::METHOD_NOT_ALLOWED.into_response(),
    };

    match result {
        Ok(body) => body.into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": err.to_string() })))
            .into_response(),
    }
}
