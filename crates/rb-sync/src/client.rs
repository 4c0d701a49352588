//! # BoardSyncClient
//!
//! The five board operations. Each one is a short, linear sequence of store
//! requests followed by a commit into [`BoardState`]:
//!
//! | Operation     | Requests                          | Commit                      |
//! |---------------|-----------------------------------|-----------------------------|
//! | `fetch_all`   | GET boards                        | replace all (reversed)      |
//! | `create`      | POST boards                       | append one, then resync     |
//! | `delete`      | DELETE boards/{id}                | remove by id                |
//! | `update`      | PUT boards/{id}                   | replace one                 |
//! | `add_comment` | GET boards/{id}, PUT boards/{id}  | resync only                 |
//!
//! `try_*` methods report failures as [`SyncError`]. The plain methods keep the
//! fire-and-forget contract: they log one error event and return nothing.
//!
//! Nothing here serialises operations against each other. Two `add_comment`
//! calls on the same board can both read the same record, and the second PUT
//! then drops the first comment.

use std::sync::Arc;

use rb_core::error::{Result, SyncError};
use rb_core::models::{Board, BoardRecord, Comment, NewBoard};
use rb_core::traits::{BoardState, DocumentStore};
use rb_core::{board_path, BOARDS_PATH};
use serde_json::{Map, Value};

#[derive(Clone)]
pub struct BoardSyncClient {
    store: Arc<dyn DocumentStore>,
    state: Arc<dyn BoardState>,
}

impl BoardSyncClient {
    pub fn new(store: Arc<dyn DocumentStore>, state: Arc<dyn BoardState>) -> Self {
        Self { store, state }
    }

    /// Reads the whole collection and replaces local state with it,
    /// last-enumerated board first.
    pub async fn try_fetch_all(&self) -> Result<Vec<Board>> {
        let collection = self.store.get(BOARDS_PATH).await?;
        let boards = boards_from_collection(collection)?;
        tracing::debug!(count = boards.len(), "fetched boards");
        self.state.set_boards(boards.clone());
        Ok(boards)
    }

    pub async fn fetch_all(&self) {
        if let Err(error) = self.try_fetch_all().await {
            tracing::error!(%error, "error fetching initial data");
        }
    }

    /// Stores a new board, commits it locally under its generated key, then
    /// resyncs the whole collection. Returns the locally committed board.
    pub async fn try_create(&self, data: NewBoard) -> Result<Board> {
        let record = data.into_record();
        let mut body = serde_json::to_value(&record)?;
        // New boards start with an explicit empty comment list.
        if let Value::Object(fields) = &mut body {
            fields.insert("comments".to_owned(), Value::Array(Vec::new()));
        }
        let key = self.store.post(BOARDS_PATH, &body).await?;

        let board = Board::from_record(key, record);
        tracing::info!(board_id = %board.id, "registered board");
        self.state.register_board(board.clone());

        self.fetch_all().await;
        Ok(board)
    }

    pub async fn create(&self, data: NewBoard) {
        if let Err(error) = self.try_create(data).await {
            tracing::error!(%error, "error registering board");
        }
    }

    pub async fn try_delete(&self, board_id: &str) -> Result<()> {
        self.store.delete(&board_path(board_id)).await?;
        tracing::info!(board_id, "deleted board");
        self.state.delete_board(board_id);
        Ok(())
    }

    pub async fn delete(&self, board_id: &str) {
        if let Err(error) = self.try_delete(board_id).await {
            tracing::error!(board_id, %error, "error deleting board");
        }
    }

    /// Overwrites the stored record with `board`. Fields left as `None` are
    /// gone from the store afterwards.
    pub async fn try_update(&self, board: Board) -> Result<()> {
        let body = serde_json::to_value(board.to_record())?;
        self.store.put(&board_path(&board.id), &body).await?;
        tracing::info!(board_id = %board.id, "updated board");
        self.state.update_board(board);
        Ok(())
    }

    pub async fn update(&self, board: Board) {
        let board_id = board.id.clone();
        if let Err(error) = self.try_update(board).await {
            tracing::error!(%board_id, %error, "error updating board");
        }
    }

    /// Appends a comment by rewriting the whole board record, then resyncs.
    /// Fields of the stored record this crate does not model are written
    /// back untouched.
    pub async fn try_add_comment(
        &self,
        board_id: &str,
        comment: &str,
        user_name: &str,
        user_id: &str,
    ) -> Result<Comment> {
        let path = board_path(board_id);
        let mut fields = match self.store.get(&path).await? {
            Value::Object(fields) => fields,
            Value::Null => return Err(SyncError::not_found("board", board_id)),
            other => {
                return Err(SyncError::Decode(format!(
                    "board {board_id} is not an object: {other}"
                )))
            }
        };

        let new_comment = Comment::new(comment, user_name, user_id);
        append_comment(&mut fields, serde_json::to_value(&new_comment)?);

        self.store.put(&path, &Value::Object(fields)).await?;
        tracing::info!(board_id, "added comment");

        self.fetch_all().await;
        Ok(new_comment)
    }

    pub async fn add_comment(&self, board_id: &str, comment: &str, user_name: &str, user_id: &str) {
        if let Err(error) = self.try_add_comment(board_id, comment, user_name, user_id).await {
            tracing::error!(board_id, %error, "error adding comment");
        }
    }
}

/// Turns the `boards` node (key -> record) into the cache ordering.
/// An empty database reads as `null`.
fn boards_from_collection(collection: Value) -> Result<Vec<Board>> {
    let entries = match collection {
        Value::Null => return Ok(Vec::new()),
        Value::Object(entries) => entries,
        other => {
            return Err(SyncError::Decode(format!(
                "expected an object of boards, got {other}"
            )))
        }
    };

    let mut boards = entries
        .into_iter()
        .map(|(key, record)| -> Result<Board> {
            let record: BoardRecord = serde_json::from_value(record)?;
            Ok(Board::from_record(key, record))
        })
        .collect::<Result<Vec<_>>>()?;
    boards.reverse();
    Ok(boards)
}

fn append_comment(fields: &mut Map<String, Value>, comment: Value) {
    let comments = fields
        .entry("comments")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !comments.is_array() {
        *comments = Value::Array(Vec::new());
    }
    if let Value::Array(items) = comments {
        items.push(comment);
    }
}
