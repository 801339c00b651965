use super::{Address, TxId};
use crate::codec::Encodable;
use crate::util::now;
use bytes::BytesMut;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A transfer between two wallets, or a mining reward when `from` is `None`.
/// A transaction names the height of the block it must be included in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub from: Option<Address>,
    pub to: Address,
    pub amount: u64,
    pub fee: u64,
    pub timestamp: u64,
    /// distinguishes otherwise identical transfers
    pub nonce: u64,
    pub block_height: u32,
}

impl Transaction {
    pub fn new(from: Address, to: Address, amount: u64, fee: u64, block_height: u32) -> Self {
        Self {
            from: Some(from),
            to,
            amount,
            fee,
            timestamp: now(),
            nonce: rand::thread_rng().gen(),
            block_height,
        }
    }

    /// The mining reward paid to `to` by the block at `block_height`
    pub fn reward(to: Address, amount: u64, block_height: u32) -> Self {
        Self {
            from: None,
            to,
            amount,
            fee: 0,
            timestamp: now(),
            nonce: 0,
            block_height,
        }
    }

    pub fn is_reward(&self) -> bool {
        self.from.is_none()
    }

    pub fn id(&self) -> TxId {
        TxId::hash(&self.to_bytes())
    }

    /// Amount plus fee, `None` on overflow
    pub fn total_cost(&self) -> Option<u64> {
        self.amount.checked_add(self.fee)
    }
}

impl Encodable for Transaction {
    fn encode(&self, buf: &mut BytesMut) {
        self.from.encode(buf);
        self.to.encode(buf);
        self.amount.encode(buf);
        self.fee.encode(buf);
        self.timestamp.encode(buf);
        self.nonce.encode(buf);
        self.block_height.encode(buf);
    }

    fn encoded_len(&self) -> usize {
        self.from.encoded_len() + self.to.encoded_len() + 8 * 4 + 4
    }
}
