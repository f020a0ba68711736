use derive_more::Display;
use randao::{
    error::{Error, Result},
    MemoryChain, RandaoContract,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything the CLI keeps between invocations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    pub chain: MemoryChain,
    pub contract: RandaoContract,
}

#[derive(Debug, Display)]
#[display(fmt = "{:?}", path)]
pub struct Db {
    path: PathBuf,
}

impl Db {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// load the persisted state
    pub fn load(&self) -> Result<State> {
        if !self.exists() {
            return Err(Error::Config(format!(
                "no state at {}, run `randao init` first",
                self.path.display()
            )));
        }
        let raw = std::fs::read(&self.path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// write the state, replacing the previous file in one rename
    pub fn save(&self, state: &State) -> Result<()> {
        let raw = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, raw)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use randao::{Call, Ledger, NewCampaignData};
    use web3::types::{Address, U256};

    #[test]
    fn state_survives_a_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = Db::new(dir.path().join("state.json"));
        assert!(matches!(db.load(), Err(Error::Config(_))));

        let creator = Address::from_low_u64_be(1);
        let mut chain = MemoryChain::new(10);
        chain.fund(creator, U256::from(50)).unwrap();
        let mut contract = RandaoContract::init(Address::from_low_u64_be(0xa0), creator);
        let args = NewCampaignData {
            bnum: 100,
            deposit: U256::from(5),
            commit_balkline: 20,
            commit_deadline: 10,
        };
        contract
            .new_campaign(&mut chain, &Call::new(creator).with_value(U256::from(7)), args)
            .unwrap();

        db.save(&State { chain, contract }).unwrap();
        let state = db.load().unwrap();
        assert_eq!(state.chain.block_number(), 10);
        assert_eq!(state.chain.balance(&creator), U256::from(43));
        assert_eq!(state.chain.logs().len(), 1);
        let campaign = state.contract.campaign(1).unwrap();
        assert_eq!(campaign.bountypot, U256::from(7));
        assert_eq!(campaign.consumers[&creator].caddr, creator);
    }
}
