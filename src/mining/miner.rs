use super::{BlockTemplate, MiningChallenge};
use crate::primitives::{Address, Block};
use crate::util::ms_since;
use log::debug;
use rayon::prelude::*;
use std::time::Instant;

pub struct Miner {
    address: Address,
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

impl Miner {
    /// A miner paying its rewards to a fresh random address
    pub fn new() -> Self {
        Self::with_address(Address::random())
    }

    pub fn with_address(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn create_block(&self, challenge: &MiningChallenge, time: u64) -> BlockTemplate {
        let template = BlockTemplate::new(challenge, self.address, time);
        debug!(
            "Created block template (height={}, txs={}, fees={}, miner address={}).",
            template.height,
            template.transactions.len(),
            template.fees(),
            template.address
        );
        template
    }

    /// Search nonces across the rayon pool until the header meets the difficulty
    pub fn mine_block(template: BlockTemplate) -> Option<Block> {
        let start = Instant::now();
        let transactions = template.block_transactions();
        let header = template.header(&transactions);

        let nonce = (0..u64::MAX).into_par_iter().find_any(|nonce| {
            let mut candidate = header.clone();
            candidate.nonce = *nonce;
            candidate.validate_pow()
        })?;

        let mut header = header;
        header.nonce = nonce;

        debug!(
            "Mined block at height {} (difficulty={}, nonce={}, time={}ms).",
            header.height,
            header.difficulty,
            nonce,
            ms_since(&start)
        );

        Some(Block {
            header,
            transactions,
        })
    }
}
