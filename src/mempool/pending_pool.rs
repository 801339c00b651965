use crate::constants::MAX_TRANSACTIONS_PER_BLOCK;
use crate::error::CoordinatorError;
use crate::primitives::{Transaction, TxId};
use log::debug;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PendingPoolError {
    #[error("queue for block {height} is full ({capacity} transactions)")]
    QueueFull { height: u32, capacity: usize },
    #[error("transaction {id} is already queued")]
    Duplicate { id: TxId },
}

impl From<PendingPoolError> for CoordinatorError {
    fn from(err: PendingPoolError) -> Self {
        match err {
            PendingPoolError::QueueFull { height, .. } => CoordinatorError::QueueFull { height },
            PendingPoolError::Duplicate { id } => CoordinatorError::AlreadyQueued(id),
        }
    }
}

/// Transactions waiting for a block, bucketed by the height they target.
/// Buckets are created on first insert and keep insertion order. An id is
/// queued at most once across all buckets
#[derive(Debug, Clone)]
pub struct PendingPool {
    queues: BTreeMap<u32, Vec<Transaction>>,
    ids: HashSet<TxId>,
    /// maximum transactions in a single bucket
    capacity: usize,
}

impl Default for PendingPool {
    fn default() -> Self {
        Self::new(MAX_TRANSACTIONS_PER_BLOCK)
    }
}

impl PendingPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: BTreeMap::new(),
            ids: HashSet::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn size_at(&self, height: u32) -> usize {
        self.queues.get(&height).map_or(0, Vec::len)
    }

    /// The bucket for a height, empty if nothing was ever queued there
    pub fn entry_at(&self, height: u32) -> &[Transaction] {
        self.queues
            .get(&height)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, id: &TxId) -> bool {
        self.ids.contains(id)
    }

    pub fn insert(&mut self, height: u32, tx: Transaction) -> Result<(), PendingPoolError> {
        if self.size_at(height) >= self.capacity {
            return Err(PendingPoolError::QueueFull {
                height,
                capacity: self.capacity,
            });
        }

        let id = tx.id();
        if !self.ids.insert(id) {
            return Err(PendingPoolError::Duplicate { id });
        }

        self.queues.entry(height).or_default().push(tx);
        Ok(())
    }

    /// Remove a whole bucket, returning what it held
    pub fn drop_entry(&mut self, height: u32) -> Vec<Transaction> {
        let dropped = self.queues.remove(&height).unwrap_or_default();
        for tx in &dropped {
            self.ids.remove(&tx.id());
        }
        dropped
    }

    /// Keep only the transactions at `height` that pass `keep`, in their original
    /// order. Returns how many were removed
    pub fn retain_matching<F>(&mut self, height: u32, mut keep: F) -> usize
    where
        F: FnMut(&Transaction) -> bool,
    {
        let Self { queues, ids, .. } = self;

        let queue = match queues.get_mut(&height) {
            Some(queue) => queue,
            None => return 0,
        };

        let before = queue.len();
        queue.retain(|tx| {
            let kept = keep(tx);
            if !kept {
                ids.remove(&tx.id());
            }
            kept
        });
        let removed = before - queue.len();

        if queue.is_empty() {
            queues.remove(&height);
        }

        if removed > 0 {
            debug!("Removed {} txs from queue for block {}.", removed, height);
        }

        removed
    }

    /// Heights that currently have a bucket
    pub fn heights(&self) -> impl Iterator<Item = u32> + '_ {
        self.queues.keys().copied()
    }

    /// Total transactions across all buckets
    pub fn len(&self) -> usize {
        self.queues.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.queues.is_empty()
    }
}
