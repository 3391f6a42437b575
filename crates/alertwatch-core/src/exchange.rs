//! Single-slot, overwrite-on-publish handoff.
//!
//! A [`Slot`] holds at most one value. Publishing replaces it atomically;
//! readers clone the current value out and never observe a partial update.
//! The value is not consumed by reading, so every evaluation cycle rereads
//! the same snapshot until the next publish.

use std::sync::Arc;
use tokio::sync::watch;

use crate::feed::{Item, Snapshot};

#[derive(Debug)]
pub struct Slot<T> {
    tx: Arc<watch::Sender<Option<T>>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T: Clone> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Slot<T> {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replace the current value.
    pub fn publish(&self, value: T) {
        self.tx.send_replace(Some(value));
    }

    /// Clear the slot.
    pub fn clear(&self) {
        self.tx.send_replace(None);
    }

    /// Current value without waiting.
    pub fn latest(&self) -> Option<T> {
        (*self.tx.borrow()).clone()
    }

    /// Wait until something has been published, then return it.
    pub async fn wait_for_first(&self) -> T {
        let mut rx = self.tx.subscribe();
        loop {
            let current = (*rx.borrow_and_update()).clone();
            if let Some(value) = current {
                return value;
            }
            // The sender lives in `self`, so the channel cannot close here.
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Latest feed snapshot, shared between the fetch loop, the evaluation loop
/// and the status query.
pub type SnapshotExchange = Slot<Arc<Snapshot>>;

/// The most recently selected "current" item. Last writer wins.
pub type SelectedItem = Slot<Item>;
