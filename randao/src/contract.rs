//! The campaign registry.
//!
//! Every public method is one atomic operation: preconditions are checked
//! first, mutations are staged on a copy of the campaign, the ledger settles
//! the pending transfers, and only then is the staged copy written back and
//! the events emitted. A failure at any step leaves the registry, the
//! balances and the event log as they were.

use crate::{
    campaign::{Campaign, CampaignInfo, Consumer, NewCampaignData, Participant, Phase},
    chain::{Call, Event, Ledger, Transfer},
    error::{Error, Result},
    sha_commit,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use web3::types::{Address, H256, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitData {
    pub campaign_id: u64,
    pub hs: H256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealData {
    pub campaign_id: u64,
    pub s: U256,
}

/// Transfers and events collected while an operation runs.
#[derive(Debug, Default)]
struct Pending {
    transfers: Vec<Transfer>,
    events: Vec<Event>,
}

impl Pending {
    fn receive(&mut self, call: &Call, escrow: Address) {
        if !call.value.is_zero() {
            self.transfers.push(Transfer {
                from: call.from,
                to: escrow,
                amount: call.value,
            });
        }
    }

    fn pay(&mut self, escrow: Address, to: Address, amount: U256) {
        if !amount.is_zero() {
            self.transfers.push(Transfer {
                from: escrow,
                to,
                amount,
            });
        }
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    fn commit<L: Ledger>(self, ledger: &mut L) -> Result<()> {
        ledger.settle(&self.transfers)?;
        for event in self.events {
            ledger.emit(event);
        }
        Ok(())
    }
}

fn rejected<T>(op: &str, campaign_id: u64, call: &Call, res: Result<T>) -> Result<T> {
    if let Err(e) = &res {
        warn!("{} on campaign {} from {:?} rejected: {}", op, campaign_id, call.from, e);
    }
    res
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandaoContract {
    address: Address,
    founder: Address,
    campaigns: Vec<Campaign>,
}

impl RandaoContract {
    /// Creates the registry. `address` is the escrow account holding
    /// deposits and bounties; `founder` is recorded once and never changes.
    pub fn init(address: Address, founder: Address) -> Self {
        info!("randao registry {:?} initialised by {:?}", address, founder);
        Self {
            address,
            founder,
            campaigns: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn founder(&self) -> Address {
        self.founder
    }

    pub fn num_campaigns(&self) -> u64 {
        self.campaigns.len() as u64
    }

    pub fn campaign(&self, campaign_id: u64) -> Result<&Campaign> {
        campaign_id
            .checked_sub(1)
            .and_then(|idx| self.campaigns.get(idx as usize))
            .ok_or(Error::NotFound(campaign_id))
    }

    fn campaign_mut(&mut self, campaign_id: u64) -> Result<&mut Campaign> {
        campaign_id
            .checked_sub(1)
            .and_then(|idx| self.campaigns.get_mut(idx as usize))
            .ok_or(Error::NotFound(campaign_id))
    }

    pub fn get_campaign(&self, campaign_id: u64, block_number: u64) -> Result<CampaignInfo> {
        Ok(self.campaign(campaign_id)?.info(block_number))
    }

    pub fn phase(&self, campaign_id: u64, block_number: u64) -> Result<Phase> {
        Ok(self.campaign(campaign_id)?.phase(block_number))
    }

    /// Opens a new campaign. The caller becomes its first consumer and any
    /// attached value seeds the bounty pot.
    pub fn new_campaign<L: Ledger>(
        &mut self,
        ledger: &mut L,
        call: &Call,
        args: NewCampaignData,
    ) -> Result<u64> {
        let block_number = ledger.block_number();
        let res = self.apply_new_campaign(ledger, call, args);
        if let Err(e) = &res {
            warn!("new_campaign from {:?} rejected at block {}: {}", call.from, block_number, e);
        }
        res
    }

    fn apply_new_campaign<L: Ledger>(
        &mut self,
        ledger: &mut L,
        call: &Call,
        args: NewCampaignData,
    ) -> Result<u64> {
        args.validate(ledger.block_number())?;

        let campaign_id = self.num_campaigns() + 1;
        let mut campaign = Campaign::new(&args);
        campaign.bountypot = call.value;
        campaign.consumers.insert(
            call.from,
            Consumer {
                caddr: call.from,
                bountypot: call.value,
                refunded: false,
            },
        );

        let mut pending = Pending::default();
        pending.receive(call, self.address);
        pending.emit(Event::CampaignCreated {
            id: campaign_id,
            creator: call.from,
            burn_block: args.bnum,
            deposit: args.deposit,
            commit_balkline: args.commit_balkline,
            commit_deadline: args.commit_deadline,
            bounty: call.value,
        });
        pending.commit(ledger)?;

        self.campaigns.push(campaign);
        info!(
            "campaign {} created by {:?}, bnum {}, deposit {}, bounty {}",
            campaign_id, call.from, args.bnum, args.deposit, call.value
        );
        Ok(campaign_id)
    }

    /// Joins an existing campaign as an additional consumer.
    pub fn follow<L: Ledger>(&mut self, ledger: &mut L, call: &Call, campaign_id: u64) -> Result<()> {
        let res = self.apply_follow(ledger, call, campaign_id);
        rejected("follow", campaign_id, call, res)
    }

    fn apply_follow<L: Ledger>(&mut self, ledger: &mut L, call: &Call, campaign_id: u64) -> Result<()> {
        let block_number = ledger.block_number();
        let escrow = self.address;
        let slot = self.campaign_mut(campaign_id)?;
        if block_number > slot.commit_end() {
            return Err(Error::WindowClosed);
        }
        if slot.consumers.contains_key(&call.from) {
            return Err(Error::AlreadyJoined);
        }

        let mut staged = slot.clone();
        staged.bountypot = staged.bountypot.checked_add(call.value).ok_or(Error::Overflow)?;
        staged.consumers.insert(
            call.from,
            Consumer {
                caddr: call.from,
                bountypot: call.value,
                refunded: false,
            },
        );

        let mut pending = Pending::default();
        pending.receive(call, escrow);
        pending.emit(Event::Followed {
            id: campaign_id,
            consumer: call.from,
            bounty: call.value,
        });
        pending.commit(ledger)?;

        *slot = staged;
        info!("campaign {} followed by {:?} with {}", campaign_id, call.from, call.value);
        Ok(())
    }

    /// Stakes the deposit behind a commitment to a secret.
    pub fn commit<L: Ledger>(&mut self, ledger: &mut L, call: &Call, args: CommitData) -> Result<()> {
        let res = self.apply_commit(ledger, call, args);
        rejected("commit", args.campaign_id, call, res)
    }

    fn apply_commit<L: Ledger>(&mut self, ledger: &mut L, call: &Call, args: CommitData) -> Result<()> {
        let block_number = ledger.block_number();
        let escrow = self.address;
        let CommitData { campaign_id, hs } = args;
        let slot = self.campaign_mut(campaign_id)?;

        if block_number < slot.commit_start() {
            return Err(Error::WindowNotOpen);
        }
        if block_number >= slot.commit_end() {
            return Err(Error::WindowClosed);
        }
        if slot.participants.contains_key(&call.from) {
            return Err(Error::AlreadyCommitted);
        }
        if slot.commitments.contains(&hs) {
            return Err(Error::DuplicateCommitment);
        }
        if hs.is_zero() {
            return Err(Error::InvalidParameters("blank commitment"));
        }
        if call.value != slot.deposit {
            return Err(Error::DepositMismatch {
                expected: slot.deposit,
                got: call.value,
            });
        }

        let mut staged = slot.clone();
        staged.participants.insert(
            call.from,
            Participant {
                commitment: hs,
                ..Default::default()
            },
        );
        staged.commit_num += 1;
        staged.commitments.insert(hs);

        let mut pending = Pending::default();
        pending.receive(call, escrow);
        pending.emit(Event::Committed {
            id: campaign_id,
            participant: call.from,
            commitment: hs,
        });
        pending.commit(ledger)?;

        *slot = staged;
        info!("campaign {} commit from {:?}: {:?}", campaign_id, call.from, hs);
        Ok(())
    }

    /// Discloses the secret behind an earlier commitment and folds it into
    /// the campaign's random value.
    pub fn reveal<L: Ledger>(&mut self, ledger: &mut L, call: &Call, args: RevealData) -> Result<()> {
        let res = self.apply_reveal(ledger, call, args);
        rejected("reveal", args.campaign_id, call, res)
    }

    fn apply_reveal<L: Ledger>(&mut self, ledger: &mut L, call: &Call, args: RevealData) -> Result<()> {
        let block_number = ledger.block_number();
        if !call.value.is_zero() {
            return Err(Error::NotPayable);
        }
        let RevealData { campaign_id, s } = args;
        let slot = self.campaign_mut(campaign_id)?;

        match slot.phase(block_number) {
            Phase::Open | Phase::Commit => return Err(Error::WindowNotOpen),
            Phase::Settled => return Err(Error::WindowClosed),
            Phase::Reveal => {}
        }
        let participant = slot
            .participants
            .get(&call.from)
            .ok_or(Error::NotAParticipant)?;
        if participant.revealed {
            return Err(Error::AlreadyRevealed);
        }
        if sha_commit(s) != participant.commitment {
            return Err(Error::CommitmentMismatch);
        }

        let mut staged = slot.clone();
        if let Some(p) = staged.participants.get_mut(&call.from) {
            p.secret = s;
            p.revealed = true;
        }
        staged.reveals_num += 1;
        staged.random = staged.random ^ s;

        let mut pending = Pending::default();
        pending.emit(Event::Revealed {
            id: campaign_id,
            participant: call.from,
            secret: s,
        });
        pending.commit(ledger)?;

        *slot = staged;
        info!("campaign {} reveal from {:?}", campaign_id, call.from);
        Ok(())
    }

    /// The campaign's random value, available from the burn block on once
    /// every committer has revealed.
    pub fn get_random<L: Ledger>(&self, ledger: &L, campaign_id: u64) -> Result<U256> {
        let block_number = ledger.block_number();
        let campaign = self.campaign(campaign_id)?;
        if block_number < campaign.bnum {
            debug!("campaign {} random asked at block {}, burn block {}", campaign_id, block_number, campaign.bnum);
            return Err(Error::WindowNotOpen);
        }
        if campaign.reveals_num != campaign.commit_num {
            debug!(
                "campaign {} random withheld: {} of {} revealed",
                campaign_id, campaign.reveals_num, campaign.commit_num
            );
            return Err(Error::IncompleteReveal);
        }
        Ok(campaign.random)
    }

    /// Pays a participant back their deposit plus their share. Returns the
    /// amount transferred.
    pub fn get_my_bounty<L: Ledger>(&mut self, ledger: &mut L, call: &Call, campaign_id: u64) -> Result<U256> {
        let res = self.apply_get_my_bounty(ledger, call, campaign_id);
        rejected("get_my_bounty", campaign_id, call, res)
    }

    fn apply_get_my_bounty<L: Ledger>(&mut self, ledger: &mut L, call: &Call, campaign_id: u64) -> Result<U256> {
        let block_number = ledger.block_number();
        if !call.value.is_zero() {
            return Err(Error::NotPayable);
        }
        let escrow = self.address;
        let slot = self.campaign_mut(campaign_id)?;

        if block_number < slot.bnum {
            return Err(Error::WindowNotOpen);
        }
        let participant = slot
            .participants
            .get(&call.from)
            .ok_or(Error::NotAParticipant)?;
        if participant.rewarded {
            return Err(Error::AlreadyRewarded);
        }

        let share = match slot.share()? {
            Some(share) if participant.revealed => share,
            Some(_) => return Err(Error::DepositForfeited),
            // nobody revealed: every deposit goes back untouched
            None => U256::zero(),
        };
        let amount = share.checked_add(slot.deposit).ok_or(Error::Overflow)?;

        let mut staged = slot.clone();
        if let Some(p) = staged.participants.get_mut(&call.from) {
            p.reward = share;
            p.rewarded = true;
        }

        let mut pending = Pending::default();
        pending.pay(escrow, call.from, amount);
        pending.commit(ledger)?;

        *slot = staged;
        info!(
            "campaign {} bounty claimed by {:?}: share {}, total {}",
            campaign_id, call.from, share, amount
        );
        Ok(amount)
    }

    /// Returns a consumer's bounty contribution when the campaign did not
    /// produce a usable random value. Returns the amount transferred.
    pub fn refund_bounty<L: Ledger>(&mut self, ledger: &mut L, call: &Call, campaign_id: u64) -> Result<U256> {
        let res = self.apply_refund_bounty(ledger, call, campaign_id);
        rejected("refund_bounty", campaign_id, call, res)
    }

    fn apply_refund_bounty<L: Ledger>(&mut self, ledger: &mut L, call: &Call, campaign_id: u64) -> Result<U256> {
        let block_number = ledger.block_number();
        if !call.value.is_zero() {
            return Err(Error::NotPayable);
        }
        let escrow = self.address;
        let slot = self.campaign_mut(campaign_id)?;

        if block_number < slot.bnum {
            return Err(Error::WindowNotOpen);
        }
        if slot.succeeded() {
            return Err(Error::RefundNotAllowed);
        }
        let consumer = slot.consumers.get(&call.from).ok_or(Error::NotAConsumer)?;
        if consumer.refunded {
            return Err(Error::AlreadyRefunded);
        }
        let amount = consumer.bountypot;

        let mut staged = slot.clone();
        staged.bountypot = staged.bountypot.checked_sub(amount).ok_or(Error::Overflow)?;
        if let Some(c) = staged.consumers.get_mut(&call.from) {
            c.bountypot = U256::zero();
            c.refunded = true;
        }

        let mut pending = Pending::default();
        pending.pay(escrow, call.from, amount);
        pending.commit(ledger)?;

        *slot = staged;
        info!("campaign {} bounty {} refunded to {:?}", campaign_id, amount, call.from);
        Ok(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::MemoryChain;
    use proptest::prelude::*;

    const DEPOSIT: u64 = 10;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    fn registry() -> RandaoContract {
        RandaoContract::init(addr(0xa0), addr(1))
    }

    /// Chain at block 100 with a funded set of accounts.
    fn chain() -> MemoryChain {
        let mut chain = MemoryChain::new(100);
        for n in 1..=10 {
            chain.fund(addr(n), U256::from(1_000)).unwrap();
        }
        chain
    }

    fn args() -> NewCampaignData {
        NewCampaignData {
            bnum: 300,
            deposit: U256::from(DEPOSIT),
            commit_balkline: 100,
            commit_deadline: 50,
        }
    }

    fn deposit_call(n: u64) -> Call {
        Call::new(addr(n)).with_value(U256::from(DEPOSIT))
    }

    fn commit(c: &mut RandaoContract, chain: &mut MemoryChain, n: u64, id: u64, s: u64) -> Result<()> {
        c.commit(
            chain,
            &deposit_call(n),
            CommitData {
                campaign_id: id,
                hs: sha_commit(U256::from(s)),
            },
        )
    }

    fn reveal(c: &mut RandaoContract, chain: &mut MemoryChain, n: u64, id: u64, s: u64) -> Result<()> {
        c.reveal(
            chain,
            &Call::new(addr(n)),
            RevealData {
                campaign_id: id,
                s: U256::from(s),
            },
        )
    }

    #[test]
    fn new_campaign_escrows_bounty_and_logs() {
        let mut c = registry();
        let mut chain = chain();
        let call = Call::new(addr(1)).with_value(U256::from(90));
        let id = c.new_campaign(&mut chain, &call, args()).unwrap();
        assert_eq!(id, 1);
        assert_eq!(c.num_campaigns(), 1);
        assert_eq!(c.founder(), addr(1));
        assert_eq!(chain.balance(&c.address()), U256::from(90));
        assert_eq!(chain.balance(&addr(1)), U256::from(910));

        let campaign = c.campaign(1).unwrap();
        assert_eq!(campaign.bountypot, U256::from(90));
        assert_eq!(campaign.consumers[&addr(1)].bountypot, U256::from(90));
        assert!(matches!(
            chain.logs()[0].event,
            Event::CampaignCreated { id: 1, bounty, .. } if bounty == U256::from(90)
        ));

        let id = c.new_campaign(&mut chain, &Call::new(addr(2)), args()).unwrap();
        assert_eq!(id, 2);
    }

    #[test]
    fn failed_creation_changes_nothing() {
        let mut c = registry();
        let mut chain = chain();
        let broke = Call::new(addr(99)).with_value(U256::from(5));
        assert!(matches!(
            c.new_campaign(&mut chain, &broke, args()),
            Err(Error::InsufficientFunds { .. })
        ));
        assert_eq!(c.num_campaigns(), 0);
        assert!(chain.logs().is_empty());

        chain.mine(150);
        assert!(matches!(
            c.new_campaign(&mut chain, &Call::new(addr(1)), args()),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn unknown_campaign_is_not_found() {
        let mut c = registry();
        let mut chain = chain();
        assert!(matches!(c.follow(&mut chain, &Call::new(addr(2)), 0), Err(Error::NotFound(0))));
        assert!(matches!(c.get_random(&chain, 1), Err(Error::NotFound(1))));
    }

    #[test]
    fn follow_once_before_commit_deadline() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();

        let call = Call::new(addr(2)).with_value(U256::from(40));
        c.follow(&mut chain, &call, id).unwrap();
        assert_eq!(c.campaign(id).unwrap().bountypot, U256::from(40));
        assert!(matches!(c.follow(&mut chain, &call, id), Err(Error::AlreadyJoined)));
        assert!(matches!(
            c.follow(&mut chain, &Call::new(addr(1)), id),
            Err(Error::AlreadyJoined)
        ));

        chain.mine(150);
        c.follow(&mut chain, &Call::new(addr(3)), id).unwrap();
        chain.mine(1);
        assert!(matches!(
            c.follow(&mut chain, &Call::new(addr(4)), id),
            Err(Error::WindowClosed)
        ));
        assert_eq!(c.campaign(id).unwrap().consumers.len(), 3);
    }

    #[test]
    fn commit_window_is_half_open() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();

        chain.mine(99);
        assert!(matches!(commit(&mut c, &mut chain, 2, id, 7), Err(Error::WindowNotOpen)));
        chain.mine(1);
        commit(&mut c, &mut chain, 2, id, 7).unwrap();
        chain.mine(49);
        commit(&mut c, &mut chain, 3, id, 8).unwrap();
        chain.mine(1);
        assert!(matches!(commit(&mut c, &mut chain, 4, id, 9), Err(Error::WindowClosed)));

        let campaign = c.campaign(id).unwrap();
        assert_eq!(campaign.commit_num, 2);
        assert_eq!(chain.balance(&c.address()), U256::from(2 * DEPOSIT));
    }

    #[test]
    fn commit_guards() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
        chain.mine(100);

        commit(&mut c, &mut chain, 2, id, 7).unwrap();
        assert!(matches!(commit(&mut c, &mut chain, 2, id, 8), Err(Error::AlreadyCommitted)));
        assert!(matches!(commit(&mut c, &mut chain, 3, id, 7), Err(Error::DuplicateCommitment)));

        let short = Call::new(addr(3)).with_value(U256::from(DEPOSIT - 1));
        let hs = sha_commit(U256::from(8));
        assert!(matches!(
            c.commit(&mut chain, &short, CommitData { campaign_id: id, hs }),
            Err(Error::DepositMismatch { .. })
        ));
        let over = Call::new(addr(3)).with_value(U256::from(DEPOSIT + 1));
        assert!(matches!(
            c.commit(&mut chain, &over, CommitData { campaign_id: id, hs }),
            Err(Error::DepositMismatch { .. })
        ));
        assert!(matches!(
            c.commit(&mut chain, &deposit_call(3), CommitData { campaign_id: id, hs: H256::zero() }),
            Err(Error::InvalidParameters(_))
        ));
        assert_eq!(c.campaign(id).unwrap().commit_num, 1);
    }

    #[test]
    fn repeated_commit_wins_over_bad_value() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
        chain.mine(100);
        commit(&mut c, &mut chain, 2, id, 7).unwrap();

        let wrong = |n| Call::new(addr(n)).with_value(U256::from(DEPOSIT + 1));
        let fresh = CommitData {
            campaign_id: id,
            hs: sha_commit(U256::from(8)),
        };
        let reused = CommitData {
            campaign_id: id,
            hs: sha_commit(U256::from(7)),
        };
        assert!(matches!(c.commit(&mut chain, &wrong(2), fresh), Err(Error::AlreadyCommitted)));
        assert!(matches!(
            c.commit(&mut chain, &wrong(3), reused),
            Err(Error::DuplicateCommitment)
        ));
        assert!(matches!(
            c.commit(&mut chain, &Call::new(addr(3)), reused),
            Err(Error::DuplicateCommitment)
        ));
    }

    #[test]
    fn failed_commit_changes_nothing() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
        chain.mine(100);
        let logs = chain.logs().len();

        let broke = Call::new(addr(99)).with_value(U256::from(DEPOSIT));
        let hs = sha_commit(U256::from(7));
        assert!(matches!(
            c.commit(&mut chain, &broke, CommitData { campaign_id: id, hs }),
            Err(Error::InsufficientFunds { .. })
        ));
        let campaign = c.campaign(id).unwrap();
        assert_eq!(campaign.commit_num, 0);
        assert!(!campaign.participants.contains_key(&addr(99)));
        assert!(!campaign.commitments.contains(&hs));
        assert_eq!(chain.logs().len(), logs);
        assert!(!chain.logs().iter().any(|l| matches!(l.event, Event::Committed { .. })));
        assert_eq!(chain.balance(&c.address()), U256::zero());

        c.commit(&mut chain, &deposit_call(2), CommitData { campaign_id: id, hs }).unwrap();
        assert_eq!(c.campaign(id).unwrap().commit_num, 1);
    }

    #[test]
    fn reveal_checks_window_membership_and_preimage() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
        chain.mine(100);
        commit(&mut c, &mut chain, 2, id, 7).unwrap();

        assert!(matches!(reveal(&mut c, &mut chain, 2, id, 7), Err(Error::WindowNotOpen)));
        chain.mine(50);

        assert!(matches!(reveal(&mut c, &mut chain, 3, id, 7), Err(Error::NotAParticipant)));
        assert!(c.campaign(id).unwrap().participants.get(&addr(3)).is_none());
        assert!(matches!(reveal(&mut c, &mut chain, 2, id, 8), Err(Error::CommitmentMismatch)));

        let paid = Call::new(addr(2)).with_value(U256::one());
        assert!(matches!(
            c.reveal(&mut chain, &paid, RevealData { campaign_id: id, s: U256::from(7) }),
            Err(Error::NotPayable)
        ));

        reveal(&mut c, &mut chain, 2, id, 7).unwrap();
        assert!(matches!(reveal(&mut c, &mut chain, 2, id, 7), Err(Error::AlreadyRevealed)));

        let campaign = c.campaign(id).unwrap();
        assert_eq!(campaign.reveals_num, 1);
        assert_eq!(campaign.random, U256::from(7));
        assert!(campaign.participants[&addr(2)].revealed);
    }

    #[test]
    fn reveal_after_burn_block_is_rejected() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
        chain.mine(100);
        commit(&mut c, &mut chain, 2, id, 7).unwrap();
        chain.mine(100);
        assert!(matches!(reveal(&mut c, &mut chain, 2, id, 7), Err(Error::WindowClosed)));
    }

    #[test]
    fn get_random_needs_burn_block_and_full_reveal() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
        chain.mine(100);
        commit(&mut c, &mut chain, 2, id, 0b1100).unwrap();
        commit(&mut c, &mut chain, 3, id, 0b1010).unwrap();
        chain.mine(50);
        reveal(&mut c, &mut chain, 2, id, 0b1100).unwrap();
        assert!(matches!(c.get_random(&chain, id), Err(Error::WindowNotOpen)));
        reveal(&mut c, &mut chain, 3, id, 0b1010).unwrap();
        chain.mine(50);
        assert_eq!(c.get_random(&chain, id).unwrap(), U256::from(0b0110));
    }

    #[test]
    fn successful_campaign_splits_bounty() {
        let mut c = registry();
        let mut chain = chain();
        let id = c
            .new_campaign(&mut chain, &Call::new(addr(1)).with_value(U256::from(100)), args())
            .unwrap();
        c.follow(&mut chain, &Call::new(addr(5)).with_value(U256::from(1)), id).unwrap();
        chain.mine(100);
        commit(&mut c, &mut chain, 2, id, 11).unwrap();
        commit(&mut c, &mut chain, 3, id, 12).unwrap();
        chain.mine(50);
        reveal(&mut c, &mut chain, 2, id, 11).unwrap();
        reveal(&mut c, &mut chain, 3, id, 12).unwrap();

        let claim = Call::new(addr(2));
        assert!(matches!(c.get_my_bounty(&mut chain, &claim, id), Err(Error::WindowNotOpen)));
        chain.mine(50);

        // 101 / 2 = 50 each, 1 left in escrow
        assert_eq!(c.get_my_bounty(&mut chain, &claim, id).unwrap(), U256::from(60));
        assert!(matches!(c.get_my_bounty(&mut chain, &claim, id), Err(Error::AlreadyRewarded)));
        assert_eq!(
            c.get_my_bounty(&mut chain, &Call::new(addr(3)), id).unwrap(),
            U256::from(60)
        );
        assert!(matches!(
            c.get_my_bounty(&mut chain, &Call::new(addr(4)), id),
            Err(Error::NotAParticipant)
        ));
        assert_eq!(chain.balance(&addr(2)), U256::from(1_050));
        assert_eq!(chain.balance(&c.address()), U256::one());
        assert_eq!(c.campaign(id).unwrap().participants[&addr(2)].reward, U256::from(50));

        assert!(matches!(
            c.refund_bounty(&mut chain, &Call::new(addr(1)), id),
            Err(Error::RefundNotAllowed)
        ));
    }

    #[test]
    fn defaulters_forfeit_to_revealers_and_consumers_refund() {
        let mut c = registry();
        let mut chain = chain();
        let id = c
            .new_campaign(&mut chain, &Call::new(addr(1)).with_value(U256::from(100)), args())
            .unwrap();
        chain.mine(100);
        commit(&mut c, &mut chain, 2, id, 21).unwrap();
        commit(&mut c, &mut chain, 3, id, 22).unwrap();
        commit(&mut c, &mut chain, 4, id, 23).unwrap();
        chain.mine(50);
        reveal(&mut c, &mut chain, 2, id, 21).unwrap();
        chain.mine(50);

        assert!(matches!(c.get_random(&chain, id), Err(Error::IncompleteReveal)));
        // two forfeited deposits go to the single revealer
        assert_eq!(
            c.get_my_bounty(&mut chain, &Call::new(addr(2)), id).unwrap(),
            U256::from(3 * DEPOSIT)
        );
        assert!(matches!(
            c.get_my_bounty(&mut chain, &Call::new(addr(3)), id),
            Err(Error::DepositForfeited)
        ));
        assert!(!c.campaign(id).unwrap().participants[&addr(3)].rewarded);

        assert!(matches!(
            c.refund_bounty(&mut chain, &Call::new(addr(9)), id),
            Err(Error::NotAConsumer)
        ));
        assert_eq!(
            c.refund_bounty(&mut chain, &Call::new(addr(1)), id).unwrap(),
            U256::from(100)
        );
        assert!(matches!(
            c.refund_bounty(&mut chain, &Call::new(addr(1)), id),
            Err(Error::AlreadyRefunded)
        ));
        assert_eq!(chain.balance(&addr(1)), U256::from(1_000));
        assert_eq!(chain.balance(&c.address()), U256::zero());
        assert_eq!(c.campaign(id).unwrap().bountypot, U256::zero());
    }

    #[test]
    fn nobody_revealed_returns_every_deposit() {
        let mut c = registry();
        let mut chain = chain();
        let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
        chain.mine(100);
        commit(&mut c, &mut chain, 2, id, 31).unwrap();
        commit(&mut c, &mut chain, 3, id, 32).unwrap();
        chain.mine(100);

        for n in [2, 3] {
            let amount = c.get_my_bounty(&mut chain, &Call::new(addr(n)), id).unwrap();
            assert_eq!(amount, U256::from(DEPOSIT));
            assert_eq!(chain.balance(&addr(n)), U256::from(1_000));
        }
        assert_eq!(c.campaign(id).unwrap().participants[&addr(2)].reward, U256::zero());
    }

    #[test]
    fn empty_campaign_can_be_refunded() {
        let mut c = registry();
        let mut chain = chain();
        let id = c
            .new_campaign(&mut chain, &Call::new(addr(1)).with_value(U256::from(30)), args())
            .unwrap();
        assert!(matches!(
            c.refund_bounty(&mut chain, &Call::new(addr(1)), id),
            Err(Error::WindowNotOpen)
        ));
        chain.mine(200);
        assert_eq!(c.get_random(&chain, id).unwrap(), U256::zero());
        assert_eq!(c.refund_bounty(&mut chain, &Call::new(addr(1)), id).unwrap(), U256::from(30));
    }

    proptest! {
        #[test]
        fn random_is_independent_of_reveal_order(
            secrets in proptest::collection::btree_set(1u64..u64::MAX, 1..6),
            rotate in 0usize..6,
        ) {
            let secrets: Vec<u64> = secrets.into_iter().collect();
            let mut order: Vec<usize> = (0..secrets.len()).collect();
            order.rotate_left(rotate % secrets.len());
            order.reverse();

            let mut c = registry();
            let mut chain = chain();
            let id = c.new_campaign(&mut chain, &Call::new(addr(1)), args()).unwrap();
            chain.mine(100);
            for (i, s) in secrets.iter().enumerate() {
                commit(&mut c, &mut chain, i as u64 + 2, id, *s).unwrap();
            }
            chain.mine(50);
            for i in order {
                reveal(&mut c, &mut chain, i as u64 + 2, id, secrets[i]).unwrap();
                let campaign = c.campaign(id).unwrap();
                prop_assert!(campaign.reveals_num <= campaign.commit_num);
            }
            chain.mine(50);

            let expected = secrets.iter().fold(U256::zero(), |acc, s| acc ^ U256::from(*s));
            prop_assert_eq!(c.get_random(&chain, id).unwrap(), expected);
        }
    }
}
