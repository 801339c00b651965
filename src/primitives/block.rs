use super::{BlockHash, Hash256, Transaction, TxId};
use crate::codec::Encodable;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub height: u32,
    pub timestamp: u64,
    /// required leading zero bits of the block hash
    pub difficulty: u8,
    pub prev_blockhash: BlockHash,
    pub merkle_root: Hash256,
    pub nonce: u64,
}

impl BlockHeader {
    pub fn block_hash(&self) -> BlockHash {
        BlockHash::hash(&self.to_bytes())
    }

    pub fn validate_pow(&self) -> bool {
        self.block_hash().leading_zero_bits() >= u32::from(self.difficulty)
    }
}

impl Encodable for BlockHeader {
    fn encode(&self, buf: &mut BytesMut) {
        self.height.encode(buf);
        self.timestamp.encode(buf);
        self.difficulty.encode(buf);
        self.prev_blockhash.encode(buf);
        self.merkle_root.encode(buf);
        self.nonce.encode(buf);
    }

    fn encoded_len(&self) -> usize {
        4 + 8 + 1 + 32 + 32 + 8
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

impl Block {
    pub fn height(&self) -> u32 {
        self.header.height
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp
    }

    pub fn block_hash(&self) -> BlockHash {
        self.header.block_hash()
    }

    pub fn check_merkle_root(&self) -> bool {
        self.header.merkle_root == merkle_root(self.transactions.iter().map(Transaction::id))
    }

    /// Sum of the fees of every transaction that isn't a reward
    pub fn total_fees(&self) -> Option<u64> {
        self.transactions
            .iter()
            .filter(|tx| !tx.is_reward())
            .try_fold(0u64, |total, tx| total.checked_add(tx.fee))
    }
}

/// Root of a merkle tree over the given ids. Odd levels pair the last node with itself
pub fn merkle_root<I: IntoIterator<Item = TxId>>(ids: I) -> Hash256 {
    let mut level: Vec<Hash256> = ids.into_iter().collect();

    if level.is_empty() {
        return Hash256::ZERO;
    }

    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| Hash256::combine(&pair[0], pair.get(1).unwrap_or(&pair[0])))
            .collect();
    }

    level[0]
}
