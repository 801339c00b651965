use crate::primitives::{Address, TxId};
use std::fmt;
use thiserror::Error;

/// Why the chain engine refused a transaction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionVerificationError {
    #[error("mining reward submitted as a transaction")]
    Coinbase,
    #[error("duplicate transaction")]
    Duplicate,
    #[error("sender does not exist")]
    SenderNotFound,
    #[error("amount plus fee out of range")]
    ValueOutOfRange,
    #[error("balance too low")]
    BalanceTooLow,
    #[error("transaction targets block {actual}, expected {expected}")]
    WrongBlockHeight { expected: u32, actual: u32 },
}

impl TransactionVerificationError {
    pub fn code(&self) -> &'static str {
        use TransactionVerificationError::*;
        match self {
            Coinbase => "EXTRA_MINING_FEE",
            Duplicate => "DUPLICATE_TRANSACTION",
            SenderNotFound => "SENDER_DOES_NOT_EXIST",
            ValueOutOfRange => "VALUE_OUT_OF_RANGE",
            BalanceTooLow => "BALANCE_TOO_LOW",
            WrongBlockHeight { .. } => "INVALID_BLOCK_ID",
        }
    }
}

/// Why the chain engine refused a block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlockVerificationError {
    #[error(transparent)]
    BadTransaction(#[from] TransactionVerificationError),
    #[error("block height {actual}, expected {expected}")]
    BadHeight { expected: u32, actual: u32 },
    #[error("previous block hash is not the tip")]
    BadPrevBlockHash,
    #[error("difficulty {actual}, expected {expected}")]
    BadDifficulty { expected: u8, actual: u8 },
    #[error("invalid proof of work")]
    InvalidPOW,
    #[error("timestamp older than the tip")]
    TimeTooOld,
    #[error("timestamp too far in the future")]
    TimeTooNew,
    #[error("bad merkle root")]
    BadMerkleRoot,
    #[error("too many transactions")]
    BadLength,
    #[error("missing mining reward")]
    NoCoinbase,
    #[error("multiple mining rewards")]
    MultipleCoinbase,
    #[error("mining reward {actual}, expected {expected}")]
    BadCoinbaseAmount { expected: u64, actual: u64 },
    #[error("transaction included twice")]
    DuplicateTransaction,
}

impl BlockVerificationError {
    pub fn code(&self) -> &'static str {
        use BlockVerificationError::*;
        match self {
            BadTransaction(err) => err.code(),
            BadHeight { .. } => "INVALID_BLOCK_ID",
            BadPrevBlockHash => "INVALID_LASTBLOCK_HASH",
            BadDifficulty { .. } => "INVALID_DIFFICULTY",
            InvalidPOW => "INVALID_PROOF_OF_WORK",
            TimeTooOld => "BLOCK_TIMESTAMP_TOO_OLD",
            TimeTooNew => "BLOCK_TIMESTAMP_IN_FUTURE",
            BadMerkleRoot => "INVALID_MERKLE_ROOT",
            BadLength => "TOO_MANY_TRANSACTIONS",
            NoCoinbase => "NO_MINING_FEE",
            MultipleCoinbase => "EXTRA_MINING_FEE",
            BadCoinbaseAmount { .. } => "INCORRECT_MINING_FEE",
            DuplicateTransaction => "DUPLICATE_TRANSACTION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Missing {
    Block(u32),
    Wallet(Address),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::Block(height) => write!(f, "block {}", height),
            Missing::Wallet(address) => write!(f, "wallet {}", address),
        }
    }
}

/// Everything the coordinator reports back to a caller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    #[error("transaction for block {height} expired (tip is {tip})")]
    Expired { height: u32, tip: u32 },
    #[error("block {height} is beyond the admission horizon (limit {limit})")]
    HeightTooFarInFuture { height: u32, limit: u32 },
    #[error("queue for block {height} is full")]
    QueueFull { height: u32 },
    #[error("transaction {0} is already queued")]
    AlreadyQueued(TxId),
    #[error("rejected by chain: {0}")]
    RejectedByEngine(#[from] TransactionVerificationError),
    #[error("block rejected: {0}")]
    BlockRejected(#[from] BlockVerificationError),
    #[error("{0} not found")]
    NotFound(Missing),
    #[error("need more data")]
    InsufficientData,
}

impl CoordinatorError {
    /// Stable code for a request layer that reports strings
    pub fn code(&self) -> &'static str {
        use CoordinatorError::*;
        match self {
            Expired { .. } => "EXPIRED_TRANSACTION",
            HeightTooFarInFuture { .. } => "BLOCK_ID_TOO_LARGE",
            QueueFull { .. } => "QUEUE_FULL",
            AlreadyQueued(_) => "DUPLICATE_TRANSACTION",
            RejectedByEngine(err) => err.code(),
            BlockRejected(err) => err.code(),
            NotFound(_) => "NOT_FOUND",
            InsufficientData => "INSUFFICIENT_DATA",
        }
    }
}
