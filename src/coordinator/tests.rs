use super::*;
use crate::error::{BlockVerificationError, TransactionVerificationError};
use crate::primitives::{BlockHash, BlockHeader, Hash256, TxId};
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

/// Chain engine with scripted answers. A sender can spend once: after a block
/// containing a transfer from them is accepted, their other transfers fail.
#[derive(Default)]
struct FakeChain {
    blocks: Vec<Block>,
    balances: HashMap<Address, u64>,
    spent: HashSet<Address>,
    rejected: HashSet<TxId>,
    reject_next_block: Option<BlockVerificationError>,
    panic_on_verify: AtomicBool,
    verify_calls: AtomicUsize,
}

impl FakeChain {
    /// A chain of `count` blocks, `spacing` seconds apart
    fn with_blocks(count: u32, spacing: u64) -> Self {
        let mut chain = Self::default();
        for height in 1..=count {
            chain.blocks.push(block(height, u64::from(height) * spacing, vec![]));
        }
        chain
    }
}

fn block(height: u32, timestamp: u64, transactions: Vec<Transaction>) -> Block {
    Block {
        header: BlockHeader {
            height,
            timestamp,
            difficulty: 3,
            prev_blockhash: BlockHash::hash(&height.to_le_bytes()),
            merkle_root: Hash256::ZERO,
            nonce: 0,
        },
        transactions,
    }
}

impl ChainEngine for FakeChain {
    fn block_count(&self) -> u32 {
        self.blocks.len() as u32
    }

    fn verify_transaction(&self, tx: &Transaction) -> Result<(), TransactionVerificationError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.panic_on_verify.load(Ordering::SeqCst) {
            panic!("engine failure");
        }
        if self.rejected.contains(&tx.id()) {
            return Err(TransactionVerificationError::SenderNotFound);
        }
        match tx.from {
            Some(from) if self.spent.contains(&from) => {
                Err(TransactionVerificationError::BalanceTooLow)
            }
            _ => Ok(()),
        }
    }

    fn add_block(&mut self, block: &Block) -> Result<(), BlockVerificationError> {
        if let Some(err) = self.reject_next_block.take() {
            return Err(err);
        }
        let expected = self.block_count() + 1;
        if block.height() != expected {
            return Err(BlockVerificationError::BadHeight {
                expected,
                actual: block.height(),
            });
        }
        self.spent
            .extend(block.transactions.iter().filter_map(|tx| tx.from));
        self.blocks.push(block.clone());
        Ok(())
    }

    fn tip_hash(&self) -> BlockHash {
        self.blocks
            .last()
            .map(Block::block_hash)
            .unwrap_or(BlockHash::ZERO)
    }

    fn difficulty(&self) -> u8 {
        3
    }

    fn block_at(&self, height: u32) -> Option<&Block> {
        self.blocks.get(height.checked_sub(1)? as usize)
    }

    fn ledger_balance(&self, address: &Address) -> Option<u64> {
        self.balances.get(address).copied()
    }

    fn wallet_count(&self) -> usize {
        self.balances.len()
    }
}

fn coordinator(chain: FakeChain, capacity: usize) -> Coordinator<FakeChain> {
    Coordinator::new(
        chain,
        CoordinatorOptions {
            max_transactions_per_block: capacity,
        },
    )
}

fn transfer(height: u32) -> Transaction {
    Transaction::new(Address::random(), Address::random(), 10, 1, height)
}

fn verify_calls(coordinator: &Coordinator<FakeChain>) -> usize {
    coordinator
        .state
        .read()
        .chain
        .verify_calls
        .load(Ordering::SeqCst)
}

fn assert_unlocked(coordinator: &Coordinator<FakeChain>) {
    assert!(coordinator.state.try_write().is_some());
}

#[test]
fn test_admission_scenario() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);

    for _ in 0..100 {
        assert_eq!(
            coordinator.submit_transaction(transfer(11)),
            Ok(AdmissionStatus::Success)
        );
    }
    assert_eq!(
        coordinator.submit_transaction(transfer(11)),
        Err(CoordinatorError::QueueFull { height: 11 })
    );
    assert_eq!(
        coordinator.submit_transaction(transfer(15)),
        Err(CoordinatorError::HeightTooFarInFuture {
            height: 15,
            limit: 15
        })
    );
    assert_eq!(
        coordinator.submit_transaction(transfer(10)),
        Err(CoordinatorError::Expired {
            height: 10,
            tip: 10
        })
    );
    assert_eq!(
        coordinator.submit_transaction(transfer(14)),
        Ok(AdmissionStatus::Queued)
    );

    assert_eq!(coordinator.pending_transaction_count(11), 100);
    assert_eq!(coordinator.pending_transaction_count(14), 1);
}

#[test]
fn test_horizon_bound() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);

    for height in 0..30 {
        let result = coordinator.submit_transaction(transfer(height));
        assert_eq!(result.is_ok(), (11..15).contains(&height), "height {}", height);
    }

    let state = coordinator.state.read();
    assert_eq!(state.pool.heights().collect::<Vec<_>>(), vec![11, 12, 13, 14]);
}

#[test]
fn test_only_next_height_is_verified() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);

    coordinator.submit_transaction(transfer(12)).unwrap();
    coordinator.submit_transaction(transfer(14)).unwrap();
    let _ = coordinator.submit_transaction(transfer(15));
    let _ = coordinator.submit_transaction(transfer(3));
    assert_eq!(verify_calls(&coordinator), 0);

    coordinator.submit_transaction(transfer(11)).unwrap();
    assert_eq!(verify_calls(&coordinator), 1);
}

#[test]
fn test_engine_reason_is_reported() {
    let tx = transfer(11);
    let mut chain = FakeChain::with_blocks(10, 60);
    chain.rejected.insert(tx.id());
    let coordinator = coordinator(chain, 100);

    let err = coordinator.submit_transaction(tx).unwrap_err();
    assert_eq!(
        err,
        CoordinatorError::RejectedByEngine(TransactionVerificationError::SenderNotFound)
    );
    assert_eq!(err.code(), "SENDER_DOES_NOT_EXIST");
    assert_eq!(coordinator.pending_transaction_count(11), 0);
}

#[test]
fn test_queued_id_is_rejected() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);
    let next = transfer(11);
    let later = transfer(13);

    coordinator.submit_transaction(next.clone()).unwrap();
    coordinator.submit_transaction(later.clone()).unwrap();
    let calls = verify_calls(&coordinator);

    let err = coordinator.submit_transaction(next.clone()).unwrap_err();
    assert_eq!(err, CoordinatorError::AlreadyQueued(next.id()));
    assert_eq!(err.code(), "DUPLICATE_TRANSACTION");
    assert_eq!(
        coordinator.submit_transaction(later.clone()),
        Err(CoordinatorError::AlreadyQueued(later.id()))
    );

    // caught before the engine is asked
    assert_eq!(verify_calls(&coordinator), calls);
    assert_eq!(coordinator.pending_transaction_count(11), 1);
    assert_eq!(coordinator.pending_transaction_count(13), 1);
    assert_eq!(coordinator.next_challenge().transactions, vec![next]);
    assert_unlocked(&coordinator);
}

#[test]
fn test_no_lock_leak() {
    let rejected = transfer(11);
    let mut chain = FakeChain::with_blocks(10, 60);
    chain.rejected.insert(rejected.id());
    let coordinator = coordinator(chain, 1);

    // verification failure
    assert!(coordinator.submit_transaction(rejected).is_err());
    assert_unlocked(&coordinator);

    // success
    assert!(coordinator.submit_transaction(transfer(11)).is_ok());
    assert_unlocked(&coordinator);

    // queue full
    assert!(coordinator.submit_transaction(transfer(11)).is_err());
    assert_unlocked(&coordinator);

    // rejected block
    coordinator.state.write().chain.reject_next_block = Some(BlockVerificationError::InvalidPOW);
    assert!(coordinator.submit_block(block(11, 700, vec![])).is_err());
    assert_unlocked(&coordinator);

    // a follow up operation still goes through
    assert!(coordinator.submit_block(block(11, 700, vec![])).is_ok());
    assert_eq!(coordinator.get_block_count(), 11);
}

#[test]
fn test_lock_released_when_engine_panics() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 10);
    coordinator
        .state
        .read()
        .chain
        .panic_on_verify
        .store(true, Ordering::SeqCst);

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        coordinator.submit_transaction(transfer(11))
    }));
    assert!(result.is_err());
    assert_unlocked(&coordinator);

    coordinator
        .state
        .read()
        .chain
        .panic_on_verify
        .store(false, Ordering::SeqCst);
    assert_eq!(
        coordinator.submit_transaction(transfer(11)),
        Ok(AdmissionStatus::Success)
    );
}

#[test]
fn test_concurrent_admissions_respect_capacity() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let coordinator = coordinator.clone();
            thread::spawn(move || {
                (0..50)
                    .filter(|_| coordinator.submit_transaction(transfer(11)).is_ok())
                    .count()
            })
        })
        .collect();

    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    assert_eq!(admitted, 100);
    assert_eq!(coordinator.pending_transaction_count(11), 100);
}

#[test]
fn test_rejected_block_leaves_pool_untouched() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);
    coordinator.submit_transaction(transfer(11)).unwrap();
    coordinator.submit_transaction(transfer(12)).unwrap();

    coordinator.state.write().chain.reject_next_block = Some(BlockVerificationError::BadPrevBlockHash);
    let err = coordinator.submit_block(block(11, 700, vec![])).unwrap_err();

    assert_eq!(
        err,
        CoordinatorError::BlockRejected(BlockVerificationError::BadPrevBlockHash)
    );
    assert_eq!(err.code(), "INVALID_LASTBLOCK_HASH");
    assert_eq!(coordinator.get_block_count(), 10);
    assert_eq!(coordinator.pending_transaction_count(11), 1);
    assert_eq!(coordinator.pending_transaction_count(12), 1);
}

#[test]
fn test_acceptance_cleanup() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);
    let alice = Address::random();

    let confirmed = Transaction::new(alice, Address::random(), 50, 1, 11);
    coordinator.submit_transaction(confirmed.clone()).unwrap();
    coordinator.submit_transaction(transfer(11)).unwrap();

    // alice double spends at the boundaries and in a consecutive run
    let queued = vec![
        Transaction::new(alice, Address::random(), 50, 1, 12),
        transfer(12),
        Transaction::new(alice, Address::random(), 20, 1, 12),
        Transaction::new(alice, Address::random(), 10, 1, 12),
        transfer(12),
        transfer(12),
        Transaction::new(alice, Address::random(), 5, 1, 12),
    ];
    for tx in &queued {
        assert_eq!(
            coordinator.submit_transaction(tx.clone()),
            Ok(AdmissionStatus::Queued)
        );
    }
    coordinator.submit_transaction(transfer(13)).unwrap();

    let accepted = coordinator
        .submit_block(block(11, 700, vec![confirmed]))
        .unwrap();

    assert_eq!(accepted.height, 11);
    assert_eq!(accepted.cleared, 2);
    assert_eq!(accepted.evicted, 4);
    assert_eq!(coordinator.pending_transaction_count(11), 0);
    assert_eq!(
        coordinator.pending_transactions(12),
        vec![queued[1].clone(), queued[4].clone(), queued[5].clone()]
    );
    assert_eq!(coordinator.pending_transaction_count(13), 1);

    // survivors verify against the new state
    let state = coordinator.state.read();
    for tx in state.pool.entry_at(12) {
        assert!(state.chain.verify_transaction(tx).is_ok());
    }
}

#[test]
fn test_next_challenge() {
    let coordinator = coordinator(FakeChain::with_blocks(10, 60), 100);
    let tx = transfer(11);
    coordinator.submit_transaction(tx.clone()).unwrap();
    coordinator.submit_transaction(transfer(12)).unwrap();

    let challenge = coordinator.next_challenge();
    assert_eq!(challenge.height, 11);
    assert_eq!(challenge.transactions, vec![tx]);
    assert_eq!(challenge.last_hash, block(10, 600, vec![]).block_hash());
    assert_eq!(challenge.challenge_size, 3);

    // reading never creates a queue
    coordinator.submit_block(block(11, 700, vec![])).unwrap();
    coordinator.submit_block(block(12, 800, vec![])).unwrap();
    assert!(coordinator.next_challenge().transactions.is_empty());
    assert_eq!(coordinator.state.read().pool.heights().count(), 0);
}

#[test]
fn test_lookups() {
    let alice = Address::random();
    let mut chain = FakeChain::with_blocks(3, 60);
    chain.balances.insert(alice, 42);
    let coordinator = coordinator(chain, 100);

    assert_eq!(coordinator.get_block_count(), 3);
    assert_eq!(coordinator.get_block(2).unwrap().height(), 2);
    assert_eq!(
        coordinator.get_block(4),
        Err(CoordinatorError::NotFound(Missing::Block(4)))
    );
    assert!(coordinator.get_block(0).is_err());
    assert_eq!(coordinator.get_ledger_balance(&alice), Ok(42));

    let stranger = Address::random();
    assert_eq!(
        coordinator.get_ledger_balance(&stranger),
        Err(CoordinatorError::NotFound(Missing::Wallet(stranger)))
    );
}

#[test]
fn test_stats_need_two_blocks() {
    let coordinator = coordinator(FakeChain::with_blocks(1, 60), 100);
    assert_eq!(
        coordinator.get_stats(),
        Err(CoordinatorError::InsufficientData)
    );
}

#[test]
fn test_stats_same_timestamp() {
    let mut chain = FakeChain::with_blocks(2, 60);
    chain.blocks.push(block(3, 120, vec![transfer(3), transfer(3)]));
    let stats = coordinator(chain, 100).get_stats().unwrap();

    assert_eq!(stats.last_block_time, 0);
    assert_eq!(stats.transactions_per_second, 0.0);
    assert_eq!(stats.transaction_volume, 20);
}

#[test]
fn test_stats_empty_block() {
    let stats = coordinator(FakeChain::with_blocks(2, 60), 100)
        .get_stats()
        .unwrap();

    assert!(stats.transactions.is_empty());
    assert_eq!(stats.avg_transaction_size, 0);
    assert_eq!(stats.avg_transaction_fee, 0);
    assert_eq!(stats.transactions_per_second, 0.0);
    assert_eq!(stats.last_block_time, 60);
}

#[test]
fn test_stats() {
    let mut chain = FakeChain::with_blocks(4, 60);
    let transactions = vec![
        Transaction::new(Address::random(), Address::random(), 30, 3, 5),
        Transaction::new(Address::random(), Address::random(), 10, 1, 5),
    ];
    chain.blocks.push(block(5, 244, transactions.clone()));
    chain.balances.insert(Address::random(), 1);
    let coordinator = coordinator(chain, 100);

    coordinator.submit_transaction(transfer(6)).unwrap();
    coordinator.submit_transaction(transfer(7)).unwrap();
    coordinator.submit_transaction(transfer(7)).unwrap();
    coordinator.submit_transaction(transfer(8)).unwrap();

    let stats = coordinator.get_stats().unwrap();

    assert_eq!(stats.num_coins, 5 * crate::constants::BLOCK_REWARD);
    assert_eq!(stats.num_wallets, 1);
    assert_eq!(stats.pending_transactions, 2);
    assert_eq!(stats.pending_total, 4);
    assert_eq!(stats.transactions, transactions);
    assert_eq!(stats.last_block_time, 4);
    assert!((stats.transactions_per_second - 0.5).abs() < f64::EPSILON);
    assert_eq!(stats.transaction_volume, 40);
    assert_eq!(stats.avg_transaction_size, 20);
    assert_eq!(stats.avg_transaction_fee, 2);
    assert_eq!(stats.difficulty, 3);
    assert_eq!(stats.current_block, 6);
}
