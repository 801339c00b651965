mod block;
mod hash;
mod tx;

pub use block::{merkle_root, Block, BlockHeader};
pub use hash::{Address, BlockHash, Hash256, HexError, TxId};
pub use tx::Transaction;
