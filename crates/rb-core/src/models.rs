//! # Domain Models
//!
//! These structs represent the entities synced with the remote document store.
//! The store is schemaless, so every scalar field of a stored board is optional:
//! whatever was written is what comes back, and a missing field stays missing.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A reply attached to a board. Has no identity of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub text: String,
    /// ISO-8601 timestamp set when the comment is appended.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_id: String,
}

impl Comment {
    /// Builds a comment stamped with the current time.
    pub fn new(text: impl Into<String>, user_name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            time: timestamp_now(),
            user_name: user_name.into(),
            user_id: user_id.into(),
        }
    }
}

/// A board as stored server-side: everything but the `id`, which is the
/// storage key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Creation timestamp. Never touched by later edits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "comments_or_empty", skip_serializing_if = "Vec::is_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_uid: Option<String>,
}

/// A board as held in the local cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    /// Server-generated key. Immutable after creation.
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "comments_or_empty")]
    pub comments: Vec<Comment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_uid: Option<String>,
}

impl Board {
    /// Attaches a storage key to a stored record.
    pub fn from_record(id: impl Into<String>, record: BoardRecord) -> Self {
        Self {
            id: id.into(),
            title: record.title,
            content: record.content,
            time: record.time,
            comments: record.comments,
            author: record.author,
            university: record.university,
            user_uid: record.user_uid,
        }
    }

    /// The value written to the store. The `id` is dropped.
    pub fn to_record(&self) -> BoardRecord {
        BoardRecord {
            title: self.title.clone(),
            content: self.content.clone(),
            time: self.time.clone(),
            comments: self.comments.clone(),
            author: self.author.clone(),
            university: self.university.clone(),
            user_uid: self.user_uid.clone(),
        }
    }
}

/// Input for creating a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBoard {
    pub title: String,
    pub content: String,
    pub author: String,
    pub university: String,
    /// Identifier of the creating user; stored as `userUid`.
    pub id: String,
}

impl NewBoard {
    /// The record sent to the store: stamped now, no comments yet.
    pub fn into_record(self) -> BoardRecord {
        BoardRecord {
            title: Some(self.title),
            content: Some(self.content),
            time: Some(timestamp_now()),
            comments: Vec::new(),
            author: Some(self.author),
            university: Some(self.university),
            user_uid: Some(self.id),
        }
    }
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// The store may hand back `null`, an object (sparse arrays), or nothing at all.
// Inside an array, holes come back as `null`; they and any entry that is not
// a comment are dropped.
fn comments_or_empty<'de, D>(deserializer: D) -> Result<Vec<Comment>, D::Error>
where
    D: Deserializer<'de>,
{
    let serde_json::Value::Array(items) = serde_json::Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter(serde_json::Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
