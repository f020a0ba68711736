//! The host side of the protocol: block clock, value transfers and the event log.
//!
//! `RandaoContract` never touches balances directly. Each operation hands the
//! ledger a batch of [`Transfer`]s through [`Ledger::settle`], and the ledger
//! either applies the whole batch or none of it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use web3::types::{Address, H256, U256};

/// Identity and attached value of a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub from: Address,
    pub value: U256,
}

impl Call {
    pub fn new(from: Address) -> Self {
        Self {
            from,
            value: U256::zero(),
        }
    }

    pub fn with_value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    CampaignCreated {
        id: u64,
        creator: Address,
        burn_block: u64,
        deposit: U256,
        commit_balkline: u16,
        commit_deadline: u16,
        bounty: U256,
    },
    Followed {
        id: u64,
        consumer: Address,
        bounty: U256,
    },
    Committed {
        id: u64,
        participant: Address,
        commitment: H256,
    },
    Revealed {
        id: u64,
        participant: Address,
        secret: U256,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub block: u64,
    pub event: Event,
}

pub trait Ledger {
    fn block_number(&self) -> u64;

    /// Applies every transfer or none of them.
    fn settle(&mut self, transfers: &[Transfer]) -> Result<()>;

    fn emit(&mut self, event: Event);
}

/// Single-process ledger used by the CLI and the tests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryChain {
    block_number: u64,
    balances: BTreeMap<Address, U256>,
    logs: Vec<Log>,
}

impl MemoryChain {
    pub fn new(block_number: u64) -> Self {
        Self {
            block_number,
            ..Default::default()
        }
    }

    pub fn mine(&mut self, blocks: u64) -> u64 {
        self.block_number = self.block_number.saturating_add(blocks);
        self.block_number
    }

    pub fn fund(&mut self, account: Address, amount: U256) -> Result<U256> {
        let balance = self.balances.entry(account).or_default();
        *balance = balance.checked_add(amount).ok_or(Error::Overflow)?;
        Ok(*balance)
    }

    pub fn balance(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or_default()
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }
}

impl Ledger for MemoryChain {
    fn block_number(&self) -> u64 {
        self.block_number
    }

    fn settle(&mut self, transfers: &[Transfer]) -> Result<()> {
        let mut staged: BTreeMap<Address, U256> = BTreeMap::new();
        for t in transfers {
            let available = staged
                .get(&t.from)
                .copied()
                .unwrap_or_else(|| self.balance(&t.from));
            let remaining = available
                .checked_sub(t.amount)
                .ok_or(Error::InsufficientFunds {
                    account: t.from,
                    needed: t.amount,
                    available,
                })?;
            staged.insert(t.from, remaining);

            let credited = staged
                .get(&t.to)
                .copied()
                .unwrap_or_else(|| self.balance(&t.to));
            staged.insert(t.to, credited.checked_add(t.amount).ok_or(Error::Overflow)?);
        }
        self.balances.extend(staged);
        Ok(())
    }

    fn emit(&mut self, event: Event) {
        self.logs.push(Log {
            block: self.block_number,
            event,
        });
    }
}
