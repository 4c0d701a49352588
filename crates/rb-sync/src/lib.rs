//! # rb-sync
//!
//! Keeps a local board cache in step with the remote document store.

pub mod cache;
pub mod client;
pub mod module;

pub use cache::BoardCache;
pub use client::BoardSyncClient;
pub use module::BoardModule;
