use crate::error::{Error, Result};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use web3::types::{Address, H256, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum Phase {
    /// before the commit balkline
    #[display(fmt = "open")]
    Open,
    #[display(fmt = "commit")]
    Commit,
    #[display(fmt = "reveal")]
    Reveal,
    /// at or after the burn block
    #[display(fmt = "settled")]
    Settled,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    pub caddr: Address,
    pub bountypot: U256,
    pub refunded: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub secret: U256,
    pub commitment: H256,
    pub reward: U256,
    pub revealed: bool,
    pub rewarded: bool,
}

/// Window parameters of a campaign, as passed to `new_campaign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCampaignData {
    pub bnum: u64,
    pub deposit: U256,
    pub commit_balkline: u16,
    pub commit_deadline: u16,
}

impl NewCampaignData {
    pub fn validate(&self, block_number: u64) -> Result<()> {
        if block_number >= self.bnum {
            return Err(Error::InvalidParameters("burn block must be in the future"));
        }
        if self.commit_balkline == 0 || self.commit_deadline == 0 {
            return Err(Error::InvalidParameters("commit offsets must be positive"));
        }
        if self.commit_deadline > self.commit_balkline {
            return Err(Error::InvalidParameters("commit deadline exceeds balkline"));
        }
        match self.bnum.checked_sub(u64::from(self.commit_balkline)) {
            Some(start) if block_number <= start => {}
            _ => return Err(Error::InvalidParameters("commit balkline already passed")),
        }
        if self.deposit.is_zero() {
            return Err(Error::InvalidParameters("deposit must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub bnum: u64,
    pub deposit: U256,
    pub commit_balkline: u16,
    pub commit_deadline: u16,

    pub random: U256,
    pub bountypot: U256,
    pub commit_num: u32,
    pub reveals_num: u32,

    pub consumers: BTreeMap<Address, Consumer>,
    pub participants: BTreeMap<Address, Participant>,
    pub commitments: BTreeSet<H256>,
}

impl Campaign {
    /// Builds an empty campaign from already validated window parameters.
    pub fn new(data: &NewCampaignData) -> Self {
        Self {
            bnum: data.bnum,
            deposit: data.deposit,
            commit_balkline: data.commit_balkline,
            commit_deadline: data.commit_deadline,
            random: U256::zero(),
            bountypot: U256::zero(),
            commit_num: 0,
            reveals_num: 0,
            consumers: BTreeMap::new(),
            participants: BTreeMap::new(),
            commitments: BTreeSet::new(),
        }
    }

    /// First block of the commit window (inclusive).
    pub fn commit_start(&self) -> u64 {
        self.bnum.saturating_sub(u64::from(self.commit_balkline))
    }

    /// First block after the commit window, which is also the first reveal block.
    pub fn commit_end(&self) -> u64 {
        self.bnum.saturating_sub(u64::from(self.commit_deadline))
    }

    pub fn phase(&self, block_number: u64) -> Phase {
        if block_number >= self.bnum {
            Phase::Settled
        } else if block_number >= self.commit_end() {
            Phase::Reveal
        } else if block_number >= self.commit_start() {
            Phase::Commit
        } else {
            Phase::Open
        }
    }

    pub fn settled(&self, block_number: u64) -> bool {
        self.phase(block_number) == Phase::Settled
    }

    /// Every committer revealed, and there was at least one.
    pub fn succeeded(&self) -> bool {
        self.commit_num == self.reveals_num && self.commit_num != 0
    }

    /// Per-revealer share on top of the returned deposit.
    ///
    /// Forfeited deposits are split among revealers when someone defaulted,
    /// otherwise the bounty is. Returns `Ok(None)` when nobody revealed.
    pub fn share(&self) -> Result<Option<U256>> {
        if self.reveals_num == 0 {
            return Ok(None);
        }
        let reveals = U256::from(self.reveals_num);
        let share = if self.commit_num > self.reveals_num {
            let defaulted = U256::from(self.commit_num - self.reveals_num);
            defaulted.checked_mul(self.deposit).ok_or(Error::Overflow)? / reveals
        } else {
            self.bountypot / reveals
        };
        Ok(Some(share))
    }

    pub fn info(&self, block_number: u64) -> CampaignInfo {
        CampaignInfo {
            bnum: self.bnum,
            deposit: self.deposit,
            commit_balkline: self.commit_balkline,
            commit_deadline: self.commit_deadline,
            random: self.random,
            settled: self.settled(block_number),
            bountypot: self.bountypot,
            commit_num: self.commit_num,
            reveals_num: self.reveals_num,
        }
    }
}

/// The flat campaign summary a participant service polls for.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignInfo {
    pub bnum: u64,
    pub deposit: U256,
    pub commit_balkline: u16,
    pub commit_deadline: u16,
    pub random: U256,
    pub settled: bool,
    pub bountypot: U256,
    pub commit_num: u32,
    pub reveals_num: u32,
}
