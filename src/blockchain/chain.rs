use super::{ChainEngine, Ledger, LedgerView};
use crate::constants::{
    BLOCK_REWARD, DEFAULT_DIFFICULTY, MAX_FUTURE_BLOCK_TIME, MAX_TRANSACTIONS_PER_BLOCK,
    MIN_DIFFICULTY, RETARGET_INTERVAL, TARGET_BLOCK_TIME,
};
use crate::error::{BlockVerificationError, TransactionVerificationError};
use crate::primitives::{merkle_root, Address, Block, BlockHash, BlockHeader, Transaction, TxId};
use crate::util::now;
use log::{debug, info};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ChainOptions {
    /// wallets funded by the genesis block
    pub genesis: Vec<(Address, u64)>,
    pub genesis_timestamp: u64,
    pub difficulty: u8,
    pub min_difficulty: u8,
    /// 0 disables retargeting
    pub retarget_interval: u32,
    pub target_block_time: u64,
    pub block_reward: u64,
    pub max_transactions_per_block: usize,
}

impl Default for ChainOptions {
    fn default() -> Self {
        Self {
            genesis: vec![],
            genesis_timestamp: now(),
            difficulty: DEFAULT_DIFFICULTY,
            min_difficulty: MIN_DIFFICULTY,
            retarget_interval: RETARGET_INTERVAL,
            target_block_time: TARGET_BLOCK_TIME,
            block_reward: BLOCK_REWARD,
            max_transactions_per_block: MAX_TRANSACTIONS_PER_BLOCK,
        }
    }
}

impl ChainOptions {
    /// Trivial proof of work and no retargeting, for tests and local demos
    pub fn regtest(genesis: Vec<(Address, u64)>) -> Self {
        Self {
            genesis,
            difficulty: 1,
            retarget_interval: 0,
            ..Default::default()
        }
    }
}

/// In-memory chain with an account ledger. The genesis block is height 1
pub struct Chain {
    blocks: Vec<Block>,
    ledger: Ledger,
    /// ids of every transaction included in a block
    confirmed: HashSet<TxId>,
    difficulty: u8,
    pub options: ChainOptions,
}

impl Chain {
    pub fn new(options: ChainOptions) -> Self {
        let genesis = Self::genesis_block(&options);
        let ledger = Ledger::from_allocations(options.genesis.iter().copied());
        let confirmed = genesis.transactions.iter().map(Transaction::id).collect();

        debug!(
            "Created genesis block {} funding {} wallets.",
            genesis.block_hash(),
            ledger.len()
        );

        Self {
            blocks: vec![genesis],
            ledger,
            confirmed,
            difficulty: options.difficulty,
            options,
        }
    }

    fn genesis_block(options: &ChainOptions) -> Block {
        let transactions: Vec<Transaction> = options
            .genesis
            .iter()
            .map(|(address, amount)| Transaction {
                timestamp: options.genesis_timestamp,
                ..Transaction::reward(*address, *amount, 1)
            })
            .collect();

        Block {
            header: BlockHeader {
                height: 1,
                timestamp: options.genesis_timestamp,
                difficulty: options.difficulty,
                prev_blockhash: BlockHash::ZERO,
                merkle_root: merkle_root(transactions.iter().map(Transaction::id)),
                nonce: 0,
            },
            transactions,
        }
    }

    pub fn tip(&self) -> &Block {
        // never empty, genesis is created in new
        &self.blocks[self.blocks.len() - 1]
    }

    /// Context free checks: everything that doesn't need the ledger
    fn verify_header(&self, block: &Block) -> Result<(), BlockVerificationError> {
        use BlockVerificationError::*;

        let tip = self.tip();
        let header = &block.header;
        let expected = tip.height() + 1;

        if header.height != expected {
            return Err(BadHeight {
                expected,
                actual: header.height,
            });
        }

        if header.prev_blockhash != tip.block_hash() {
            return Err(BadPrevBlockHash);
        }

        if header.difficulty != self.difficulty {
            return Err(BadDifficulty {
                expected: self.difficulty,
                actual: header.difficulty,
            });
        }

        if header.timestamp < tip.timestamp() {
            return Err(TimeTooOld);
        }

        if header.timestamp > now() + MAX_FUTURE_BLOCK_TIME {
            return Err(TimeTooNew);
        }

        if block.transactions.len() > self.options.max_transactions_per_block + 1 {
            return Err(BadLength);
        }

        if !block.check_merkle_root() {
            return Err(BadMerkleRoot);
        }

        if !header.validate_pow() {
            return Err(InvalidPOW);
        }

        Ok(())
    }

    /// Replay the block against a staged view of the ledger
    fn verify_inputs<'a>(
        &'a self,
        block: &Block,
    ) -> Result<(LedgerView<'a>, Vec<TxId>), BlockVerificationError> {
        use BlockVerificationError::*;

        let height = block.height();
        let (reward, transfers) = match block.transactions.split_first() {
            Some((reward, transfers)) if reward.is_reward() => (reward, transfers),
            _ => return Err(NoCoinbase),
        };

        let mut view = LedgerView::new(&self.ledger);
        let mut seen = HashSet::with_capacity(block.transactions.len());

        for tx in transfers {
            if tx.is_reward() {
                return Err(MultipleCoinbase);
            }

            if tx.block_height != height {
                return Err(TransactionVerificationError::WrongBlockHeight {
                    expected: height,
                    actual: tx.block_height,
                }
                .into());
            }

            let id = tx.id();

            if self.confirmed.contains(&id) {
                return Err(TransactionVerificationError::Duplicate.into());
            }

            if !seen.insert(id) {
                return Err(DuplicateTransaction);
            }

            view.transfer(tx)?;
        }

        let fees = block
            .total_fees()
            .ok_or(TransactionVerificationError::ValueOutOfRange)?;
        let expected = self
            .options
            .block_reward
            .checked_add(fees)
            .ok_or(TransactionVerificationError::ValueOutOfRange)?;

        if reward.amount != expected || reward.fee != 0 {
            return Err(BadCoinbaseAmount {
                expected,
                actual: reward.amount,
            });
        }

        if reward.block_height != height {
            return Err(TransactionVerificationError::WrongBlockHeight {
                expected: height,
                actual: reward.block_height,
            }
            .into());
        }

        view.credit(reward.to, reward.amount)?;
        seen.insert(reward.id());

        Ok((view, seen.into_iter().collect()))
    }

    fn check_unconfirmed(&self, tx: &Transaction, id: &TxId) -> Result<(), TransactionVerificationError> {
        if tx.is_reward() {
            return Err(TransactionVerificationError::Coinbase);
        }

        if self.confirmed.contains(id) {
            return Err(TransactionVerificationError::Duplicate);
        }

        Ok(())
    }

    fn retarget(&mut self) {
        let interval = self.options.retarget_interval;
        let count = self.block_count();

        if interval == 0 || count <= interval || count % interval != 0 {
            return;
        }

        let last = self.tip().timestamp();
        let first = self.blocks[(count - interval) as usize - 1].timestamp();
        let actual_timespan = last.saturating_sub(first);
        let expected_timespan = self.options.target_block_time * u64::from(interval);

        let previous = self.difficulty;

        // move at most one bit per interval
        if actual_timespan < expected_timespan / 2 {
            self.difficulty = self.difficulty.saturating_add(1);
        } else if actual_timespan > expected_timespan * 2 {
            self.difficulty = self
                .difficulty
                .saturating_sub(1)
                .max(self.options.min_difficulty);
        }

        if previous != self.difficulty {
            info!(
                "Retargeted difficulty {} -> {} (timespan={}s, expected={}s).",
                previous, self.difficulty, actual_timespan, expected_timespan
            );
        }
    }
}

impl ChainEngine for Chain {
    fn block_count(&self) -> u32 {
        self.blocks.len() as u32
    }

    fn verify_transaction(&self, tx: &Transaction) -> Result<(), TransactionVerificationError> {
        self.check_unconfirmed(tx, &tx.id())?;
        LedgerView::new(&self.ledger).spend(tx)
    }

    fn verify_sequence<'a, I>(&self, txs: I) -> Vec<Result<(), TransactionVerificationError>>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut view = LedgerView::new(&self.ledger);
        let mut seen = HashSet::new();

        txs.into_iter()
            .map(|tx| {
                let id = tx.id();
                self.check_unconfirmed(tx, &id)?;
                if seen.contains(&id) {
                    return Err(TransactionVerificationError::Duplicate);
                }
                view.spend(tx)?;
                seen.insert(id);
                Ok(())
            })
            .collect()
    }

    fn add_block(&mut self, block: &Block) -> Result<(), BlockVerificationError> {
        self.verify_header(block)?;

        let (view, ids) = self.verify_inputs(block)?;
        let changes = view.into_changes();

        self.ledger.apply(changes);
        self.confirmed.extend(ids);
        self.blocks.push(block.clone());

        debug!(
            "Connected block {} at height {} ({} txs).",
            block.block_hash(),
            block.height(),
            block.transactions.len()
        );

        self.retarget();

        Ok(())
    }

    fn tip_hash(&self) -> BlockHash {
        self.tip().block_hash()
    }

    fn difficulty(&self) -> u8 {
        self.difficulty
    }

    fn block_at(&self, height: u32) -> Option<&Block> {
        let index = height.checked_sub(1)?;
        self.blocks.get(index as usize)
    }

    fn ledger_balance(&self, address: &Address) -> Option<u64> {
        self.ledger.balance(address)
    }

    fn wallet_count(&self) -> usize {
        self.ledger.len()
    }

    fn block_reward(&self) -> u64 {
        self.options.block_reward
    }
}
