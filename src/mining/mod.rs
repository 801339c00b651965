mod challenge;
mod miner;
mod template;

pub use challenge::MiningChallenge;
pub use miner::Miner;
pub use template::BlockTemplate;
