use anyhow::anyhow;
use chain_coordinator::{
    mining::Miner,
    primitives::{Address, Transaction},
    util::now,
    ChainEngine, Config, Coordinator, FullNode,
};
use log::{debug, info, LevelFilter};
use rand::{seq::SliceRandom, Rng};
use std::{env, time::Duration};

const WALLETS: usize = 8;
const GENESIS_BALANCE: u64 = 1_000;

/// Send random transfers between the genesis wallets until the miner is done
async fn send_transfers<E: ChainEngine>(coordinator: Coordinator<E>, wallets: Vec<Address>) {
    loop {
        let (from, to, amount, ahead) = {
            let mut rng = rand::thread_rng();
            let pair: Vec<_> = wallets.choose_multiple(&mut rng, 2).copied().collect();
            (pair[0], pair[1], rng.gen_range(1..50), rng.gen_range(1..4))
        };
        let height = coordinator.get_block_count() + ahead;
        let tx = Transaction::new(from, to, amount, 1, height);

        match coordinator.submit_transaction(tx) {
            Ok(status) => debug!("Transfer of {} for block {}: {}", amount, height, status.code()),
            Err(err) => debug!("Transfer of {} for block {}: {}", amount, height, err.code()),
        }

        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("chain_coordinator", LevelFilter::Debug)
        .filter_module("chain_coordinator::mining", LevelFilter::Info)
        .format_timestamp_millis()
        .init();

    let blocks: u32 = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 10,
    };

    let wallets: Vec<Address> = (0..WALLETS).map(|_| Address::random()).collect();
    let genesis = wallets.iter().map(|w| (*w, GENESIS_BALANCE)).collect();
    let mut config = Config::regtest(genesis);
    config.chain.difficulty = 12;

    let node = FullNode::new(config);
    let coordinator = node.coordinator;

    let sender = tokio::spawn(send_transfers(coordinator.clone(), wallets));

    let miner = Miner::new();
    info!("Mining {} blocks to {}", blocks, miner.address());

    for _ in 0..blocks {
        let challenge = coordinator.next_challenge();
        let template = miner.create_block(&challenge, now());
        let block = tokio::task::spawn_blocking(move || Miner::mine_block(template))
            .await?
            .ok_or_else(|| anyhow!("no nonce found for block {}", challenge.height))?;

        if let Err(err) = coordinator.submit_block(block) {
            info!("Block {} was rejected: {}", challenge.height, err);
        }
    }

    sender.abort();

    let stats = coordinator.get_stats()?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
