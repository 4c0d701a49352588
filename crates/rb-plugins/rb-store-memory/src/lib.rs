//! # rb-store-memory
//!
//! In-process implementation of `DocumentStore`.
//! Keeps the whole database as one JSON tree and follows the same path rules
//! as the REST store: missing nodes read as `null`, writing `null` deletes,
//! pushed keys are time-ordered.

use async_trait::async_trait;
use rb_core::error::Result;
use rb_core::traits::DocumentStore;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    root: RwLock<Value>,
    /// Every request served, as `"<METHOD> <path>"`.
    requests: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing database tree.
    pub fn with_root(root: Value) -> Self {
        Self {
            root: RwLock::new(root),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Copy of the whole database.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    /// Requests served so far, oldest first.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    async fn record(&self, method: &str, path: &str) {
        self.requests.lock().await.push(format!("{method} {path}"));
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Walks to `segments`, turning anything in the way into an object.
fn node_mut<'a>(root: &'a mut Value, segments: &[&str]) -> &'a mut Value {
    let mut node = root;
    for segment in segments {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = &mut node[*segment];
    }
    node
}

fn remove(root: &mut Value, segments: &[&str]) {
    let Some((last, parents)) = segments.split_last() else {
        *root = Value::Null;
        return;
    };

    let mut node = root;
    for segment in parents {
        match node.get_mut(*segment) {
            Some(next) => node = next,
            None => return,
        }
    }
    if let Value::Object(map) = node {
        map.shift_remove(*last);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Value> {
        self.record("GET", path).await;
        let root = self.root.read().await;
        let mut node = &*root;
        for segment in segments(path) {
            match node.get(segment) {
                Some(next) => node = next,
                None => return Ok(Value::Null),
            }
        }
        Ok(node.clone())
    }

    async fn post(&self, path: &str, body: &Value) -> Result<String> {
        self.record("POST", path).await;
        // v7 keys sort in creation order, matching the hosted store's push ids.
        let key = Uuid::now_v7().simple().to_string();
        let mut path_segments = segments(path);
        path_segments.push(&key);

        let mut root = self.root.write().await;
        *node_mut(&mut root, &path_segments) = body.clone();
        tracing::debug!(path, %key, "memory store: pushed child");
        Ok(key)
    }

    async fn put(&self, path: &str, body: &Value) -> Result<()> {
        self.record("PUT", path).await;
        let path_segments = segments(path);
        let mut root = self.root.write().await;
        if body.is_null() {
            remove(&mut root, &path_segments);
        } else {
            *node_mut(&mut root, &path_segments) = body.clone();
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.record("DELETE", path).await;
        let mut root = self.root.write().await;
        remove(&mut root, &segments(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_nodes_read_as_null() {
        let store = MemoryStore::new();
        assert_eq!(store.get("boards").await.unwrap(), Value::Null);
        assert_eq!(store.get("boards/nope").await.unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn post_keys_follow_insertion_order() {
        let store = MemoryStore::new();
        let first = store.post("boards", &json!({ "title": "a" })).await.unwrap();
        let second = store.post("boards", &json!({ "title": "b" })).await.unwrap();
        let third = store.post("boards", &json!({ "title": "c" })).await.unwrap();

        let boards = store.get("boards").await.unwrap();
        let keys: Vec<&String> = boards.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec![&first, &second, &third]);
    }

    #[tokio::test]
    async fn put_replaces_whole_node() {
        let store = MemoryStore::with_root(json!({
            "boards": { "K1": { "title": "old", "content": "body" } }
        }));

        store.put("boards/K1", &json!({ "title": "new" })).await.unwrap();

        assert_eq!(store.get("boards/K1").await.unwrap(), json!({ "title": "new" }));
    }

    #[tokio::test]
    async fn put_null_and_delete_remove_the_node() {
        let store = MemoryStore::with_root(json!({
            "boards": { "K1": { "title": "a" }, "K2": { "title": "b" } }
        }));

        store.put("boards/K1", &Value::Null).await.unwrap();
        store.delete("boards/K2").await.unwrap();
        store.delete("boards/missing").await.unwrap();

        assert_eq!(store.snapshot().await, json!({ "boards": {} }));
    }

    #[tokio::test]
    async fn delete_keeps_sibling_order() {
        let store = MemoryStore::with_root(json!({
            "boards": { "Z": {}, "M": {}, "A": {}, "Q": {} }
        }));

        store.delete("boards/M").await.unwrap();

        let boards = store.get("boards").await.unwrap();
        let keys: Vec<&str> = boards.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Z", "A", "Q"]);
    }

    #[tokio::test]
    async fn records_requests_in_order() {
        let store = MemoryStore::new();
        store.get("boards").await.unwrap();
        store.put("boards/K1", &json!({ "title": "x" })).await.unwrap();
        store.delete("boards/K1").await.unwrap();

        assert_eq!(
            store.requests().await,
            vec!["GET boards", "PUT boards/K1", "DELETE boards/K1"]
        );
    }
}
