//! Composition of the board feature: state, getters and actions behind one handle.

use std::sync::Arc;

use rb_core::traits::DocumentStore;

use crate::cache::BoardCache;
use crate::client::BoardSyncClient;

pub struct BoardModule {
    state: Arc<BoardCache>,
    actions: BoardSyncClient,
}

impl BoardModule {
    /// Wires a fresh cache to a client that commits into it.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        let state = Arc::new(BoardCache::new());
        let actions = BoardSyncClient::new(store, state.clone());
        Self { state, actions }
    }

    /// Local state and its getters.
    pub fn state(&self) -> &BoardCache {
        &self.state
    }

    pub fn actions(&self) -> &BoardSyncClient {
        &self.actions
    }
}
