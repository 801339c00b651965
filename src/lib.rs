//! Pending transaction pool and block acceptance for a proof of work node

/// Chain engine interface and an in-memory implementation
pub mod blockchain;
pub mod codec;
pub mod constants;
/// Serialise submissions against the chain and the pending queues
pub mod coordinator;
pub mod error;
mod full_node;
/// Transactions queued for future blocks
pub mod mempool;
/// Turn a mining challenge into a solved block
pub mod mining;
pub mod primitives;
pub mod stats;
pub mod util;

pub use blockchain::{Chain, ChainEngine, ChainOptions};
pub use coordinator::{AcceptedBlock, AdmissionStatus, Coordinator, CoordinatorOptions};
pub use error::CoordinatorError;
pub use full_node::{Config, FullNode};
