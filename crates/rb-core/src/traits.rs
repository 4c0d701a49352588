//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the sync client.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::models::Board;

/// Key-addressed JSON document store.
///
/// Paths are slash separated and carry no format suffix (`boards`,
/// `boards/<key>`); adapters translate them to their own addressing.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the node at `path`. A missing node reads as `Value::Null`.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Appends `body` under `path` with a store-generated key and returns that key.
    async fn post(&self, path: &str, body: &Value) -> Result<String>;

    /// Replaces the node at `path` with `body`.
    async fn put(&self, path: &str, body: &Value) -> Result<()>;

    /// Removes the node at `path`. Removing a missing node is not an error.
    async fn delete(&self, path: &str) -> Result<()>;
}

/// Client-side board state the sync client commits into.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait BoardState: Send + Sync {
    /// Replaces the whole collection.
    fn set_boards(&self, boards: Vec<Board>);
    /// Appends one board.
    fn register_board(&self, board: Board);
    /// Removes every board with this id.
    fn delete_board(&self, board_id: &str);
    /// Replaces the board with the same id, if present.
    fn update_board(&self, board: Board);
}
