use super::{Coordinator, NodeState};
use crate::blockchain::ChainEngine;
use crate::error::CoordinatorError;
use crate::primitives::{Block, BlockHash};
use crate::util::ms_since;
use log::{info, warn};
use std::time::Instant;

/// Outcome of a successful block submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptedBlock {
    pub height: u32,
    pub hash: BlockHash,
    /// transactions dropped with the queue for this height
    pub cleared: usize,
    /// transactions for the following height that no longer verify
    pub evicted: usize,
}

impl<E: ChainEngine> Coordinator<E> {
    /// Hand a mined block to the chain. On success the queue for its height is
    /// dropped and the queue for the next height is replayed against the new
    /// ledger, keeping the transactions that still fit in order. A rejected
    /// block leaves the pool untouched and is not retried.
    pub fn submit_block(&self, block: Block) -> Result<AcceptedBlock, CoordinatorError> {
        let start = Instant::now();
        let height = block.height();
        let hash = block.block_hash();

        let mut guard = self.state.write();
        let NodeState { chain, pool } = &mut *guard;

        if let Err(err) = chain.add_block(&block) {
            warn!("Rejected block {} at height {}: {}.", hash, height, err);
            return Err(err.into());
        }

        let cleared = pool.drop_entry(height).len();

        // the next queue was never verified as a whole, replay it in order
        let next = height.saturating_add(1);
        let mut verdicts = chain.verify_sequence(pool.entry_at(next)).into_iter();
        let evicted = pool.retain_matching(next, |_| matches!(verdicts.next(), Some(Ok(()))));

        info!(
            "Accepted block {} at height {} (cleared={}, evicted={}, time={}ms).",
            hash,
            height,
            cleared,
            evicted,
            ms_since(&start)
        );

        Ok(AcceptedBlock {
            height,
            hash,
            cleared,
            evicted,
        })
    }
}
