use crate::db::{Db, State};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::debug;
use randao::{
    config::Config, sha_commit, utils::check_campaign_info, utils::random_secret, Call, CommitData, Ledger,
    MemoryChain, NewCampaignData, RandaoContract, RevealData,
};
use std::path::PathBuf;
use web3::types::{Address, H256, U256};

const DEFAULT_REGISTRY: u64 = 0xa0;

fn parse_u256(s: &str) -> Result<U256, String> {
    match s.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(|e| format!("{:?}", e)),
        None => U256::from_dec_str(s).map_err(|e| format!("{:?}", e)),
    }
}

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let raw = hex::decode(s.strip_prefix("0x").unwrap_or(s)).map_err(|e| e.to_string())?;
    raw.try_into()
        .map_err(|raw: Vec<u8>| format!("expected {} bytes, got {}", N, raw.len()))
}

fn parse_address(s: &str) -> Result<Address, String> {
    parse_fixed::<20>(s).map(Address::from)
}

fn parse_h256(s: &str) -> Result<H256, String> {
    parse_fixed::<32>(s).map(H256::from)
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about=None)]
pub(crate) struct Cli {
    /// simulated chain and registry state
    #[clap(long, parse(from_os_str), value_name = "FILE", default_value = "randao-state.json")]
    pub(crate) state: PathBuf,

    /// config file
    #[clap(short = 'c', long = "config", parse(from_os_str))]
    pub(crate) config: Option<PathBuf>,

    #[clap(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a fresh chain with an empty registry
    Init {
        /// registry escrow address, overrides the config
        #[clap(long, parse(try_from_str = parse_address))]
        registry: Option<Address>,

        /// founder address, overrides the config
        #[clap(long, parse(try_from_str = parse_address))]
        founder: Option<Address>,

        /// starting block height
        #[clap(long, default_value_t = 0)]
        block: u64,

        /// overwrite an existing state file
        #[clap(long)]
        force: bool,
    },
    /// Credit an account
    Fund {
        #[clap(long, parse(try_from_str = parse_address))]
        account: Address,

        #[clap(long, parse(try_from_str = parse_u256))]
        amount: U256,
    },
    /// Advance the block height
    Mine {
        #[clap(long, default_value_t = 1)]
        blocks: u64,
    },
    /// Show an account balance
    Balance {
        #[clap(long, parse(try_from_str = parse_address))]
        account: Address,
    },
    /// Open a campaign
    NewCampaign {
        #[clap(long, parse(try_from_str = parse_address))]
        from: Address,

        /// bounty sent along
        #[clap(long, default_value = "0", parse(try_from_str = parse_u256))]
        value: U256,

        /// burn block
        #[clap(long)]
        bnum: u64,

        #[clap(long, parse(try_from_str = parse_u256))]
        deposit: U256,

        /// commit window start, blocks before bnum
        #[clap(long)]
        balkline: u16,

        /// commit window end, blocks before bnum
        #[clap(long)]
        deadline: u16,
    },
    /// Add bounty to a campaign
    Follow {
        #[clap(long, parse(try_from_str = parse_address))]
        from: Address,

        #[clap(long, default_value = "0", parse(try_from_str = parse_u256))]
        value: U256,

        #[clap(long)]
        campaign: u64,
    },
    /// Stake the deposit behind a commitment
    Commit {
        #[clap(long, parse(try_from_str = parse_address))]
        from: Address,

        #[clap(long)]
        campaign: u64,

        /// secret to commit to
        #[clap(long, parse(try_from_str = parse_u256), conflicts_with = "hash")]
        secret: Option<U256>,

        /// precomputed commitment
        #[clap(long, parse(try_from_str = parse_h256))]
        hash: Option<H256>,
    },
    /// Reveal a committed secret
    Reveal {
        #[clap(long, parse(try_from_str = parse_address))]
        from: Address,

        #[clap(long)]
        campaign: u64,

        #[clap(long, parse(try_from_str = parse_u256))]
        secret: U256,
    },
    /// Read the random value of a settled campaign
    Random {
        #[clap(long)]
        campaign: u64,
    },
    /// Claim deposit and share
    Bounty {
        #[clap(long, parse(try_from_str = parse_address))]
        from: Address,

        #[clap(long)]
        campaign: u64,
    },
    /// Take back bounty from a failed campaign
    Refund {
        #[clap(long, parse(try_from_str = parse_address))]
        from: Address,

        #[clap(long)]
        campaign: u64,
    },
    /// Show campaign information
    Info {
        #[clap(long)]
        campaign: u64,
    },
    /// Check a campaign against the participant limits of the config
    Check {
        #[clap(long)]
        campaign: u64,

        #[clap(long, parse(try_from_str = parse_address))]
        account: Address,

        /// campaigns the account already takes part in
        #[clap(long, default_value_t = 0)]
        ongoing: u32,
    },
    /// Compute the commitment for a secret
    ShaCommit {
        #[clap(long, parse(try_from_str = parse_u256))]
        secret: U256,
    },
    /// Draw a random secret
    Secret,
    /// Print the event log
    Logs,
    /// Print a default config
    ShowConfig,
}

impl Cli {
    pub(crate) fn parse_args() -> Self {
        Cli::parse()
    }

    fn load_config(&self) -> anyhow::Result<Option<Config>> {
        self.config
            .as_ref()
            .map(|path| Config::parse_from_file(path).with_context(|| format!("loading {}", path.display())))
            .transpose()
    }

    pub(crate) fn run(self) -> anyhow::Result<()> {
        let db = Db::new(&self.state);
        let config = self.load_config()?;

        match self.command {
            Commands::Init {
                registry,
                founder,
                block,
                force,
            } => {
                if db.exists() && !force {
                    bail!("state {} already exists, pass --force to replace it", db);
                }
                let chain_cfg = config.as_ref().map(|c| &c.chain);
                let registry = registry
                    .or_else(|| chain_cfg.map(|c| c.registry))
                    .unwrap_or_else(|| Address::from_low_u64_be(DEFAULT_REGISTRY));
                let founder = founder.or_else(|| chain_cfg.map(|c| c.founder)).unwrap_or_default();
                let state = State {
                    chain: MemoryChain::new(block),
                    contract: RandaoContract::init(registry, founder),
                };
                db.save(&state)?;
                if let Some(chain) = chain_cfg {
                    println!("chain {}", chain);
                }
                println!("registry {:?} at block {}", registry, block);
            }
            Commands::Secret => println!("{}", random_secret()),
            Commands::ShaCommit { secret } => println!("{:?}", sha_commit(secret)),
            Commands::ShowConfig => println!("{}", Config::show()?),
            command => {
                let mut state = db.load()?;
                Self::exec(&mut state, command, config.as_ref())?;
                db.save(&state)?;
            }
        }
        Ok(())
    }

    fn exec(state: &mut State, command: Commands, config: Option<&Config>) -> anyhow::Result<()> {
        let State { chain, contract } = state;
        match command {
            Commands::Fund { account, amount } => {
                let balance = chain.fund(account, amount)?;
                println!("{:?}: {}", account, balance);
            }
            Commands::Mine { blocks } => println!("block {}", chain.mine(blocks)),
            Commands::Balance { account } => println!("{:?}: {}", account, chain.balance(&account)),
            Commands::NewCampaign {
                from,
                value,
                bnum,
                deposit,
                balkline,
                deadline,
            } => {
                let args = NewCampaignData {
                    bnum,
                    deposit,
                    commit_balkline: balkline,
                    commit_deadline: deadline,
                };
                let id = contract.new_campaign(chain, &Call::new(from).with_value(value), args)?;
                println!("campaign {}", id);
            }
            Commands::Follow { from, value, campaign } => {
                contract.follow(chain, &Call::new(from).with_value(value), campaign)?;
                println!("following campaign {}", campaign);
            }
            Commands::Commit {
                from,
                campaign,
                secret,
                hash,
            } => {
                let hs = match (secret, hash) {
                    (Some(s), _) => sha_commit(s),
                    (None, Some(hs)) => hs,
                    (None, None) => bail!("either --secret or --hash is required"),
                };
                let deposit = contract.campaign(campaign)?.deposit;
                let call = Call::new(from).with_value(deposit);
                contract.commit(chain, &call, CommitData { campaign_id: campaign, hs })?;
                println!("committed {:?} with deposit {}", hs, deposit);
            }
            Commands::Reveal { from, campaign, secret } => {
                let args = RevealData {
                    campaign_id: campaign,
                    s: secret,
                };
                contract.reveal(chain, &Call::new(from), args)?;
                println!("revealed");
            }
            Commands::Random { campaign } => println!("{}", contract.get_random(&*chain, campaign)?),
            Commands::Bounty { from, campaign } => {
                let amount = contract.get_my_bounty(chain, &Call::new(from), campaign)?;
                println!("bounty {}", amount);
            }
            Commands::Refund { from, campaign } => {
                let amount = contract.refund_bounty(chain, &Call::new(from), campaign)?;
                println!("refunded {}", amount);
            }
            Commands::Info { campaign } => {
                let block = chain.block_number();
                let info = contract.get_campaign(campaign, block)?;
                println!("phase: {}", contract.phase(campaign, block)?);
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            Commands::Check {
                campaign,
                account,
                ongoing,
            } => {
                let config = config.context("check needs --config")?;
                debug!("checking campaign {} on {}", campaign, config.chain);
                let block = chain.block_number();
                let info = contract.get_campaign(campaign, block)?;
                let join = check_campaign_info(&info, block, chain.balance(&account), ongoing, config);
                println!("{}", if join { "join" } else { "skip" });
            }
            Commands::Logs => {
                for log in chain.logs() {
                    println!("{} {}", log.block, serde_json::to_string(&log.event)?);
                }
            }
            command @ (Commands::Init { .. } | Commands::Secret | Commands::ShaCommit { .. } | Commands::ShowConfig) => {
                bail!("{:?} does not run against saved state", command)
            }
        }
        Ok(())
    }
}
