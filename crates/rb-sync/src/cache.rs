//! # Local board cache
//!
//! The client-held, ordered collection of boards a presentation layer renders
//! from. Backed by a `watch` channel so observers see every commit.

use rb_core::models::Board;
use rb_core::traits::BoardState;
use tokio::sync::watch;

pub struct BoardCache {
    tx: watch::Sender<Vec<Board>>,
}

impl Default for BoardCache {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardCache {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { tx }
    }

    /// Receiver notified after every commit that changed the collection.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Board>> {
        self.tx.subscribe()
    }

    pub fn boards(&self) -> Vec<Board> {
        self.tx.borrow().clone()
    }

    pub fn board(&self, board_id: &str) -> Option<Board> {
        self.tx.borrow().iter().find(|b| b.id == board_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Boards created by `user_uid`, in cache order.
    pub fn boards_by_user(&self, user_uid: &str) -> Vec<Board> {
        self.filtered(|b| b.user_uid.as_deref() == Some(user_uid))
    }

    pub fn boards_by_university(&self, university: &str) -> Vec<Board> {
        self.filtered(|b| b.university.as_deref() == Some(university))
    }

    fn filtered(&self, keep: impl Fn(&Board) -> bool) -> Vec<Board> {
        self.tx.borrow().iter().filter(|b| keep(b)).cloned().collect()
    }
}

impl BoardState for BoardCache {
    fn set_boards(&self, boards: Vec<Board>) {
        self.tx.send_replace(boards);
    }

    fn register_board(&self, board: Board) {
        self.tx.send_modify(|boards| boards.push(board));
    }

    fn delete_board(&self, board_id: &str) {
        self.tx.send_if_modified(|boards| {
            let before = boards.len();
            boards.retain(|b| b.id != board_id);
            boards.len() != before
        });
    }

    fn update_board(&self, board: Board) {
        self.tx.send_if_modified(|boards| match boards.iter_mut().find(|b| b.id == board.id) {
            Some(slot) => {
                *slot = board;
                true
            }
            None => false,
        });
    }
}
