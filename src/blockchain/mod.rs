mod chain;
mod engine;
mod ledger;

pub use chain::{Chain, ChainOptions};
pub use engine::ChainEngine;
pub use ledger::{Ledger, LedgerView};
