//! rusty-board/crates/rb-core/src/lib.rs
//!
//! Domain models and port definitions for syncing boards with a remote
//! document store.

pub mod models;
pub mod traits;
pub mod error;

// Re-exporting for easier access in other crates
pub use models::*;
pub use traits::*;
pub use error::*;

/// Collection path of all boards in the document store.
pub const BOARDS_PATH: &str = "boards";

/// Path of a single board record.
pub fn board_path(board_id: &str) -> String {
    format!("{BOARDS_PATH}/{board_id}")
}
