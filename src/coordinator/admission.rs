use super::Coordinator;
use crate::blockchain::ChainEngine;
use crate::constants::ADMISSION_HORIZON;
use crate::error::CoordinatorError;
use crate::primitives::Transaction;
use log::debug;
use std::iter;

/// How an admitted transaction was queued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionStatus {
    /// verified against the ledger and queued for the next block
    Success,
    /// queued for a later block without verification
    Queued,
}

impl AdmissionStatus {
    pub fn code(&self) -> &'static str {
        match self {
            AdmissionStatus::Success => "SUCCESS",
            AdmissionStatus::Queued => "IN_QUEUE",
        }
    }
}

impl<E: ChainEngine> Coordinator<E> {
    /// Queue a transaction for the block it targets.
    ///
    /// Transactions for the next block are verified on top of the ones already
    /// queued for it, so the queue stays minable as a whole. Later heights are
    /// checked against the ledger once their turn comes, see `submit_block`.
    pub fn submit_transaction(&self, tx: Transaction) -> Result<AdmissionStatus, CoordinatorError> {
        let mut state = self.state.write();

        let tip = state.chain.block_count();
        let next = state.next_height();
        let limit = next.saturating_add(ADMISSION_HORIZON);
        let height = tx.block_height;

        let status = if height == next {
            AdmissionStatus::Success
        } else if height > next && height < limit {
            AdmissionStatus::Queued
        } else if height >= limit {
            return Err(CoordinatorError::HeightTooFarInFuture { height, limit });
        } else {
            return Err(CoordinatorError::Expired { height, tip });
        };

        let id = tx.id();
        if state.pool.contains(&id) {
            debug!("Rejected tx {} for block {}: already queued.", id, height);
            return Err(CoordinatorError::AlreadyQueued(id));
        }

        if status == AdmissionStatus::Success {
            let queued = state.pool.entry_at(height);
            let verdict = state
                .chain
                .verify_sequence(queued.iter().chain(iter::once(&tx)))
                .pop();

            if let Some(Err(err)) = verdict {
                debug!("Rejected tx {} for block {}: {}.", id, height, err);
                return Err(err.into());
            }
        }

        state.pool.insert(height, tx)?;

        debug!(
            "Added {} to queue for block {} (status={}, queued={}).",
            id,
            height,
            status.code(),
            state.pool.size_at(height)
        );

        Ok(status)
    }
}
