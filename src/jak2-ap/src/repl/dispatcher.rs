//! Ordered item delivery
//!
//! The session numbers every item it sends us. Items may arrive out of
//! order or more than once (the server resends everything on reconnect),
//! but the game must receive them in sequence, so delivery stops at the
//! first missing index.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;
use tracing::{debug, trace};

use crate::error::Result;
use crate::session::NetworkItem;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrainSummary {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct ItemDispatcher {
    inbox: BTreeMap<u64, NetworkItem>,
    inbox_index: u64,
}

impl ItemDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next index to deliver; everything below it has been handled.
    pub fn inbox_index(&self) -> u64 {
        self.inbox_index
    }

    /// Items waiting, including any stuck behind a gap.
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// The missing index holding delivery up, if any.
    pub fn blocked_at(&self) -> Option<u64> {
        match self.inbox.keys().next() {
            Some(&first) if first != self.inbox_index => Some(self.inbox_index),
            _ => None,
        }
    }

    /// Queue an item. Returns false if the index was already handled or
    /// is already queued.
    pub fn enqueue(&mut self, index: u64, item: NetworkItem) -> bool {
        if index < self.inbox_index {
            trace!(index, "item already delivered");
            return false;
        }
        if self.inbox.contains_key(&index) {
            trace!(index, "item already queued");
            return false;
        }
        self.inbox.insert(index, item);
        true
    }

    /// Deliver contiguous items starting at the cursor.
    ///
    /// `deliver` returns whether the game accepted the item. The cursor
    /// moves past every item handed to `deliver`, accepted or not; a
    /// transport error stops the drain after advancing.
    pub async fn drain<F, Fut>(&mut self, mut deliver: F) -> Result<DrainSummary>
    where
        F: FnMut(u64, NetworkItem) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        let mut summary = DrainSummary::default();

        while let Some(item) = self.inbox.remove(&self.inbox_index) {
            let index = self.inbox_index;
            self.inbox_index += 1;

            match deliver(index, item).await {
                Ok(true) => summary.delivered += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    debug!(index, "delivery interrupted: {}", e);
                    return Err(e);
                }
            }
        }

        if let Some(gap) = self.blocked_at() {
            debug!(gap, waiting = self.inbox.len(), "delivery waiting on missing item");
        }

        Ok(summary)
    }
}
