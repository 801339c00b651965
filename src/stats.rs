use crate::blockchain::ChainEngine;
use crate::constants::PENDING_STATS_OFFSET;
use crate::error::CoordinatorError;
use crate::mempool::PendingPool;
use crate::primitives::Transaction;
use serde::Serialize;

/// Activity of the latest block measured against its predecessor, plus a
/// summary of the chain and the pending queues
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainStats {
    pub num_coins: u64,
    pub num_wallets: usize,
    /// transactions queued `PENDING_STATS_OFFSET` blocks past the tip
    pub pending_transactions: usize,
    /// transactions queued across every height
    pub pending_total: usize,
    pub transactions: Vec<Transaction>,
    pub transactions_per_second: f64,
    pub transaction_volume: u64,
    pub avg_transaction_size: u64,
    pub avg_transaction_fee: u64,
    pub difficulty: u8,
    pub current_block: u32,
    /// seconds between the latest block and its predecessor
    pub last_block_time: u64,
}

impl ChainStats {
    pub fn collect<E: ChainEngine>(chain: &E, pool: &PendingPool) -> Result<Self, CoordinatorError> {
        let count = chain.block_count();

        if count < 2 {
            return Err(CoordinatorError::InsufficientData);
        }

        let latest = chain
            .block_at(count)
            .ok_or(CoordinatorError::InsufficientData)?;
        let previous = chain
            .block_at(count - 1)
            .ok_or(CoordinatorError::InsufficientData)?;

        let elapsed = latest.timestamp().saturating_sub(previous.timestamp());
        let transactions = &latest.transactions;
        let tx_count = transactions.len();

        let volume = transactions
            .iter()
            .fold(0u64, |total, tx| total.saturating_add(tx.amount));
        let fees = transactions
            .iter()
            .fold(0u64, |total, tx| total.saturating_add(tx.fee));

        Ok(Self {
            num_coins: u64::from(count).saturating_mul(chain.block_reward()),
            num_wallets: chain.wallet_count(),
            pending_transactions: pool.size_at(count.saturating_add(PENDING_STATS_OFFSET)),
            pending_total: pool.len(),
            transactions: transactions.clone(),
            transactions_per_second: throughput(tx_count, elapsed),
            transaction_volume: volume,
            avg_transaction_size: average(volume, tx_count),
            avg_transaction_fee: average(fees, tx_count),
            difficulty: chain.difficulty(),
            current_block: count.saturating_add(1),
            last_block_time: elapsed,
        })
    }
}

/// Transactions per second, 0 when no time has passed
fn throughput(tx_count: usize, elapsed: u64) -> f64 {
    if elapsed == 0 {
        return 0.0;
    }
    tx_count as f64 / elapsed as f64
}

/// Integer average, 0 for an empty set
fn average(total: u64, count: usize) -> u64 {
    if count == 0 {
        return 0;
    }
    total / count as u64
}
