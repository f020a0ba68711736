use crate::error::{Error, Result};
use derive_more::Display;
use serde::*;
use serde_json::from_str;
use std::path::Path;
use web3::types::{Address, U256};

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub chain: Chain,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, Display)]
#[display(fmt = "{} (chainId {})", name, chain_id)]
pub struct Chain {
    pub name: String,
    #[serde(rename = "chainId")]
    pub chain_id: String,

    /// escrow address of the registry
    pub registry: Address,
    pub founder: Address,
    pub opts: ChainOpts,
}

/// Limits a participant applies before joining a campaign.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChainOpts {
    #[serde(rename = "maxDeposit")]
    pub max_deposit: U256,

    #[serde(rename = "minRateOfReturn")]
    pub min_rate_of_return: f64,

    #[serde(rename = "minBalanceReserve")]
    pub min_balance_reserve: U256,

    #[serde(rename = "minRevealWindow")]
    pub min_reveal_window: u16,

    #[serde(rename = "maxRevealDelay")]
    pub max_reveal_delay: u16,

    #[serde(rename = "maxCampaigns")]
    pub max_campaigns: u32,
}

impl Default for ChainOpts {
    fn default() -> Self {
        Self {
            max_deposit: U256::from(1_000_000_000_000_000_000u64),
            min_rate_of_return: 0.0,
            min_balance_reserve: U256::zero(),
            min_reveal_window: 10,
            max_reveal_delay: 5,
            max_campaigns: 5,
        }
    }
}

impl Config {
    pub fn parse_from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let confstr = std::fs::read_to_string(file)?;
        let config: Self = from_str(&confstr)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let opts = &self.chain.opts;
        if opts.min_reveal_window <= opts.max_reveal_delay {
            return Err(Error::Config(format!(
                "minRevealWindow ({}) must exceed maxRevealDelay ({})",
                opts.min_reveal_window, opts.max_reveal_delay
            )));
        }
        if !(opts.min_rate_of_return >= 0.0) {
            return Err(Error::Config("minRateOfReturn must be non-negative".to_string()));
        }
        Ok(())
    }

    pub fn show() -> Result<String> {
        let de: Self = Default::default();
        Ok(serde_json::to_string_pretty(&de)?)
    }
}
