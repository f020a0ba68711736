//! RANDAO: commit-reveal randomness campaigns.
//!
//! Consumers open or follow a campaign tied to a future burn block and fund
//! its bounty. Participants stake a deposit behind `sha_commit(secret)` in the
//! commit window, disclose the secret in the reveal window, and from the burn
//! block on the XOR of all secrets is the campaign's random value. Whoever
//! fails to reveal loses the deposit to those who did.

pub mod campaign;
pub mod chain;
pub mod config;
pub mod contract;
pub mod error;
pub mod utils;

pub use crate::{
    campaign::{Campaign, CampaignInfo, NewCampaignData, Phase},
    chain::{Call, Event, Ledger, MemoryChain},
    contract::{CommitData, RandaoContract, RevealData},
    error::{Error, Result},
};

use sha3::{Digest, Keccak256};
use web3::types::{H256, U256};

/// Commitment for a secret: keccak256 over its 32-byte big-endian encoding.
pub fn sha_commit(secret: U256) -> H256 {
    let mut bytes = [0u8; 32];
    secret.to_big_endian(&mut bytes);
    H256::from_slice(Keccak256::digest(bytes).as_slice())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn sha_commit_matches_solidity_encoding() {
        // keccak256(abi.encodePacked(uint256(0)))
        let zero = H256::from_str("290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563").unwrap();
        assert_eq!(sha_commit(U256::zero()), zero);
        assert_ne!(sha_commit(U256::one()), zero);
    }

    #[test]
    fn leading_zeros_are_kept() {
        // a one-byte encoding of 1 would hash differently
        assert_ne!(
            sha_commit(U256::one()),
            H256::from_slice(Keccak256::digest([1u8]).as_slice())
        );
    }
}
