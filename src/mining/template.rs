use super::MiningChallenge;
use crate::primitives::{merkle_root, Address, BlockHash, BlockHeader, Transaction};

pub struct BlockTemplate {
    pub height: u32,
    pub address: Address,
    pub prev_blockhash: BlockHash,
    pub difficulty: u8,
    pub time: u64,
    pub reward: u64,
    fees: u64,
    pub transactions: Vec<Transaction>,
}

impl BlockTemplate {
    pub fn new(challenge: &MiningChallenge, address: Address, time: u64) -> Self {
        let fees = challenge
            .transactions
            .iter()
            .fold(0u64, |total, tx| total.saturating_add(tx.fee));

        Self {
            height: challenge.height,
            address,
            prev_blockhash: challenge.last_hash,
            difficulty: challenge.challenge_size,
            time,
            reward: challenge.reward,
            fees,
            transactions: challenge.transactions.clone(),
        }
    }

    pub fn fees(&self) -> u64 {
        self.fees
    }

    pub fn create_coinbase(&self) -> Transaction {
        Transaction {
            timestamp: self.time,
            ..Transaction::reward(
                self.address,
                self.reward.saturating_add(self.fees),
                self.height,
            )
        }
    }

    /// Coinbase followed by the challenge transactions
    pub fn block_transactions(&self) -> Vec<Transaction> {
        let mut transactions = Vec::with_capacity(self.transactions.len() + 1);
        transactions.push(self.create_coinbase());
        transactions.extend(self.transactions.iter().cloned());
        transactions
    }

    /// Header with nonce 0 committing to `transactions`
    pub fn header(&self, transactions: &[Transaction]) -> BlockHeader {
        BlockHeader {
            height: self.height,
            timestamp: self.time,
            difficulty: self.difficulty,
            prev_blockhash: self.prev_blockhash,
            merkle_root: merkle_root(transactions.iter().map(Transaction::id)),
            nonce: 0,
        }
    }
}
