use crate::error::TransactionVerificationError;
use crate::primitives::{Address, Transaction};
use std::collections::HashMap;

/// Wallet balances
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    balances: HashMap<Address, u64>,
}

impl Ledger {
    pub fn from_allocations<I: IntoIterator<Item = (Address, u64)>>(allocations: I) -> Self {
        let mut balances = HashMap::new();
        for (address, amount) in allocations {
            let balance = balances.entry(address).or_insert(0u64);
            *balance = balance.saturating_add(amount);
        }
        Self { balances }
    }

    pub fn balance(&self, address: &Address) -> Option<u64> {
        self.balances.get(address).copied()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Write the balances staged by a view
    pub fn apply(&mut self, changes: HashMap<Address, u64>) {
        self.balances.extend(changes);
    }
}

/// Balance changes staged on top of a ledger. Nothing reaches the ledger
/// until the view's changes are applied, so a block is all or nothing
#[derive(Debug)]
pub struct LedgerView<'a> {
    ledger: &'a Ledger,
    map: HashMap<Address, u64>,
}

impl<'a> LedgerView<'a> {
    pub fn new(ledger: &'a Ledger) -> Self {
        Self {
            ledger,
            map: HashMap::new(),
        }
    }

    pub fn balance(&self, address: &Address) -> Option<u64> {
        self.map
            .get(address)
            .copied()
            .or_else(|| self.ledger.balance(address))
    }

    /// Debit amount plus fee from the sender of a transfer
    pub fn spend(&mut self, tx: &Transaction) -> Result<(), TransactionVerificationError> {
        use TransactionVerificationError::*;

        let from = tx.from.ok_or(Coinbase)?;
        let balance = self.balance(&from).ok_or(SenderNotFound)?;
        let cost = tx.total_cost().ok_or(ValueOutOfRange)?;

        if balance < cost {
            return Err(BalanceTooLow);
        }

        self.map.insert(from, balance - cost);
        Ok(())
    }

    pub fn credit(&mut self, to: Address, amount: u64) -> Result<(), TransactionVerificationError> {
        let balance = self
            .balance(&to)
            .unwrap_or(0)
            .checked_add(amount)
            .ok_or(TransactionVerificationError::ValueOutOfRange)?;
        self.map.insert(to, balance);
        Ok(())
    }

    /// Move amount from sender to recipient and charge the fee. Either both
    /// sides are staged or neither is
    pub fn transfer(&mut self, tx: &Transaction) -> Result<(), TransactionVerificationError> {
        let from = tx.from.ok_or(TransactionVerificationError::Coinbase)?;
        let previous = self.map.get(&from).copied();

        self.spend(tx)?;

        if let Err(err) = self.credit(tx.to, tx.amount) {
            match previous {
                Some(balance) => self.map.insert(from, balance),
                None => self.map.remove(&from),
            };
            return Err(err);
        }

        Ok(())
    }

    pub fn into_changes(self) -> HashMap<Address, u64> {
        self.map
    }
}
