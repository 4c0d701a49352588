//! # rb-store-firebase
//!
//! Reqwest-backed `DocumentStore` for a Firebase-style REST database.
//!
//! This adapter owns transport details only: URL building, JSON bodies,
//! timeout and HTTP error mapping. Every store path `p` is served at
//! `{base}/{p}.json`.

use std::time::Duration;

use async_trait::async_trait;
use rb_core::error::{Result, SyncError};
use rb_core::traits::DocumentStore;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

/// Body of a successful POST: the generated child key.
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

pub struct FirebaseStore {
    client: Client,
    base_url: Url,
    /// Database credential sent as the `auth` query parameter.
    auth_token: Option<SecretString>,
}

impl FirebaseStore {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(base_url: Url, timeout: Duration) -> std::result::Result<Self, reqwest::Error> {
        Self::with_auth(base_url, timeout, None)
    }

    /// Same as [`FirebaseStore::new`], attaching a database credential to every request.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_auth(
        base_url: Url,
        timeout: Duration,
        auth_token: Option<SecretString>,
    ) -> std::result::Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url, auth_token })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let (last, parents) = match parts.split_last() {
            Some((last, parents)) => (format!("{last}.json"), parents),
            None => (".json".to_owned(), &[][..]),
        };

        url.path_segments_mut()
            .map_err(|()| SyncError::Config(format!("database url cannot be a base: {}", self.base_url)))?
            .pop_if_empty()
            .extend(parents)
            .push(&last);

        if let Some(token) = &self.auth_token {
            url.query_pairs_mut().append_pair("auth", token.expose_secret());
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Vec<u8>> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl DocumentStore for FirebaseStore {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path)?;
        tracing::debug!(path, "GET");
        let body = self.send(self.client.get(url)).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<String> {
        let url = self.endpoint(path)?;
        tracing::debug!(path, "POST");
        let body = self.send(self.client.post(url).json(body)).await?;
        let pushed: PushResponse = serde_json::from_slice(&body)?;
        Ok(pushed.name)
    }

    async fn put(&self, path: &str, body: &Value) -> Result<()> {
        let url = self.endpoint(path)?;
        tracing::debug!(path, "PUT");
        self.send(self.client.put(url).json(body)).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let url = self.endpoint(path)?;
        tracing::debug!(path, "DELETE");
        self.send(self.client.delete(url)).await?;
        Ok(())
    }
}

fn map_transport_error(error: reqwest::Error) -> SyncError {
    if error.is_timeout() {
        SyncError::Network(format!("request timed out: {error}"))
    } else {
        SyncError::Network(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> SyncError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        status.canonical_reason().unwrap_or("unexpected status").to_owned()
    } else {
        preview
    };
    SyncError::http(status.as_u16(), message)
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(base: &str, token: Option<&str>) -> FirebaseStore {
        FirebaseStore::with_auth(
            Url::parse(base).unwrap(),
            Duration::from_secs(5),
            token.map(|t| SecretString::from(t.to_owned())),
        )
        .unwrap()
    }

    #[test]
    fn appends_json_suffix_to_last_segment() {
        let store = store("https://griffin-default-rtdb.firebaseio.com", None);
        assert_eq!(
            store.endpoint("boards").unwrap().as_str(),
            "https://griffin-default-rtdb.firebaseio.com/boards.json"
        );
        assert_eq!(
            store.endpoint("boards/-NxYz").unwrap().as_str(),
            "https://griffin-default-rtdb.firebaseio.com/boards/-NxYz.json"
        );
    }

    #[test]
    fn keeps_base_path_and_ignores_trailing_slash() {
        let store = store("http://127.0.0.1:9000/db/", None);
        assert_eq!(
            store.endpoint("boards/K1").unwrap().as_str(),
            "http://127.0.0.1:9000/db/boards/K1.json"
        );
    }

    #[test]
    fn root_path_maps_to_dot_json() {
        let store = store("http://localhost:9000", None);
        assert_eq!(store.endpoint("").unwrap().as_str(), "http://localhost:9000/.json");
    }

    #[test]
    fn auth_token_goes_into_query() {
        let store = store("http://localhost:9000", Some("s3cret"));
        assert_eq!(
            store.endpoint("boards").unwrap().as_str(),
            "http://localhost:9000/boards.json?auth=s3cret"
        );
    }

    #[test]
    fn non_success_status_keeps_code_and_body() {
        let error = map_status_error(StatusCode::UNAUTHORIZED, b"{\n  \"error\" : \"Permission denied\"\n}");
        assert_eq!(error, SyncError::http(401, "{ \"error\" : \"Permission denied\" }"));
    }

    #[test]
    fn empty_error_body_falls_back_to_reason() {
        let error = map_status_error(StatusCode::SERVICE_UNAVAILABLE, b"");
        assert_eq!(error, SyncError::http(503, "Service Unavailable"));
    }

    #[test]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 163);
        assert!(preview.ends_with("..."));
    }
}
