use crate::{
    blockchain::{Chain, ChainOptions},
    coordinator::{Coordinator, CoordinatorOptions},
};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub chain: ChainOptions,
    pub coordinator: CoordinatorOptions,
}

impl Config {
    /// Trivial proof of work, with the pending queues sized like the chain's blocks
    pub fn regtest(genesis: Vec<(crate::primitives::Address, u64)>) -> Self {
        let chain = ChainOptions::regtest(genesis);
        let coordinator = CoordinatorOptions {
            max_transactions_per_block: chain.max_transactions_per_block,
        };
        Self { chain, coordinator }
    }
}

pub struct FullNode {
    pub coordinator: Coordinator<Chain>,
}

impl FullNode {
    pub fn new(config: Config) -> Self {
        let chain = Chain::new(config.chain);
        let coordinator = Coordinator::new(chain, config.coordinator);

        Self { coordinator }
    }
}
