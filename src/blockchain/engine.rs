use crate::constants::BLOCK_REWARD;
use crate::error::{BlockVerificationError, TransactionVerificationError};
use crate::primitives::{Address, Block, BlockHash, Transaction};

/// The authoritative chain the coordinator drives.
///
/// Implementations own block validation, proof of work, difficulty and wallet
/// balances. The coordinator only ever calls them while holding its state lock,
/// so they need no synchronisation of their own.
pub trait ChainEngine: Send + Sync + 'static {
    /// Number of blocks in the chain, which is also the height of the tip
    fn block_count(&self) -> u32;

    /// Check a transaction against the current ledger without changing it
    fn verify_transaction(&self, tx: &Transaction) -> Result<(), TransactionVerificationError>;

    /// Check transactions in order, each on top of the debits of the ones
    /// accepted before it. A failing transaction is reported and left out, so
    /// the accepted ones are valid together in this order and each on its own
    fn verify_sequence<'a, I>(&self, txs: I) -> Vec<Result<(), TransactionVerificationError>>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        txs.into_iter()
            .map(|tx| self.verify_transaction(tx))
            .collect()
    }

    /// Validate a block and append it, or leave the chain untouched on error
    fn add_block(&mut self, block: &Block) -> Result<(), BlockVerificationError>;

    fn tip_hash(&self) -> BlockHash;

    /// Leading zero bits the next block hash must have
    fn difficulty(&self) -> u8;

    fn block_at(&self, height: u32) -> Option<&Block>;

    fn ledger_balance(&self, address: &Address) -> Option<u64>;

    fn wallet_count(&self) -> usize;

    /// Coins paid to a miner on top of the fees of the block
    fn block_reward(&self) -> u64 {
        BLOCK_REWARD
    }
}
