//! Admission of pending transactions and acceptance of mined blocks.
//!
//! The chain and the pending pool live together in one [`NodeState`] behind a
//! single lock. Submissions take the write half so that every admission decision
//! sees the same tip the pool was built against, and a block is connected and
//! cleaned out of the pool in one step. Read paths share the read half.

mod acceptance;
mod admission;
#[cfg(test)]
mod tests;

pub use acceptance::AcceptedBlock;
pub use admission::AdmissionStatus;

use crate::blockchain::ChainEngine;
use crate::constants::MAX_TRANSACTIONS_PER_BLOCK;
use crate::error::{CoordinatorError, Missing};
use crate::mempool::PendingPool;
use crate::mining::MiningChallenge;
use crate::primitives::{Address, Block, Transaction};
use crate::stats::ChainStats;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// capacity of each pending queue
    pub max_transactions_per_block: usize,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            max_transactions_per_block: MAX_TRANSACTIONS_PER_BLOCK,
        }
    }
}

/// The chain and the transactions waiting for it, always locked as one
pub struct NodeState<E> {
    pub chain: E,
    pub pool: PendingPool,
}

impl<E: ChainEngine> NodeState<E> {
    /// Height of the block miners are currently working on
    pub fn next_height(&self) -> u32 {
        self.chain.block_count().saturating_add(1)
    }
}

pub struct Coordinator<E> {
    state: Arc<RwLock<NodeState<E>>>,
}

impl<E> Clone for Coordinator<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<E: ChainEngine> Coordinator<E> {
    pub fn new(chain: E, options: CoordinatorOptions) -> Self {
        Self {
            state: Arc::new(RwLock::new(NodeState {
                chain,
                pool: PendingPool::new(options.max_transactions_per_block),
            })),
        }
    }

    /// The transactions queued for the next block along with the tip it must build on
    pub fn next_challenge(&self) -> MiningChallenge {
        let state = self.state.read();
        let transactions = state.pool.entry_at(state.next_height()).to_vec();
        MiningChallenge::new(&state.chain, transactions)
    }

    pub fn get_block(&self, height: u32) -> Result<Block, CoordinatorError> {
        self.state
            .read()
            .chain
            .block_at(height)
            .cloned()
            .ok_or(CoordinatorError::NotFound(Missing::Block(height)))
    }

    pub fn get_ledger_balance(&self, address: &Address) -> Result<u64, CoordinatorError> {
        self.state
            .read()
            .chain
            .ledger_balance(address)
            .ok_or(CoordinatorError::NotFound(Missing::Wallet(*address)))
    }

    pub fn get_block_count(&self) -> u32 {
        self.state.read().chain.block_count()
    }

    pub fn get_stats(&self) -> Result<ChainStats, CoordinatorError> {
        let state = self.state.read();
        ChainStats::collect(&state.chain, &state.pool)
    }

    pub fn pending_transaction_count(&self, height: u32) -> usize {
        self.state.read().pool.size_at(height)
    }

    pub fn pending_transactions(&self, height: u32) -> Vec<Transaction> {
        self.state.read().pool.entry_at(height).to_vec()
    }
}
