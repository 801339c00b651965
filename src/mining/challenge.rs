use crate::blockchain::ChainEngine;
use crate::primitives::{BlockHash, Transaction};
use serde::{Deserialize, Serialize};

/// Everything a miner needs to assemble and solve the next block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningChallenge {
    /// height of the block being mined
    pub height: u32,
    pub transactions: Vec<Transaction>,
    pub last_hash: BlockHash,
    /// leading zero bits required of the block hash
    pub challenge_size: u8,
    /// block reward, excluding fees
    pub reward: u64,
}

impl MiningChallenge {
    pub fn new<E: ChainEngine>(chain: &E, transactions: Vec<Transaction>) -> Self {
        Self {
            height: chain.block_count().saturating_add(1),
            transactions,
            last_hash: chain.tip_hash(),
            challenge_size: chain.difficulty(),
            reward: chain.block_reward(),
        }
    }
}
