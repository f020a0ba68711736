use crate::{campaign::CampaignInfo, config::Config};
use log::debug;
use rand::RngCore;
use web3::types::U256;

/// Lossy conversion used only for rate comparisons.
pub fn u256_to_f64(v: U256) -> f64 {
    v.0.iter()
        .rev()
        .fold(0f64, |acc, limb| acc * 18_446_744_073_709_551_616f64 + *limb as f64)
}

pub fn random_secret() -> U256 {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    U256::from_big_endian(&bytes)
}

/// Expected bounty per deposit unit if the caller joins as one more committer.
pub fn rate_of_return(info: &CampaignInfo) -> f64 {
    let deposit = u256_to_f64(info.deposit);
    if deposit == 0.0 {
        return 0.0;
    }
    u256_to_f64(info.bountypot) / deposit / (f64::from(info.commit_num) + 1.0)
}

/// Decides whether a participant with `balance` and `ongoing` active
/// campaigns should commit to the campaign described by `info`.
pub fn check_campaign_info(
    info: &CampaignInfo,
    block_number: u64,
    balance: U256,
    ongoing: u32,
    config: &Config,
) -> bool {
    let opts = &config.chain.opts;

    if info.deposit > opts.max_deposit {
        debug!("deposit {} above max {}", info.deposit, opts.max_deposit);
        return false;
    }
    let rate = rate_of_return(info);
    if rate < opts.min_rate_of_return {
        debug!("rate of return {} below min {}", rate, opts.min_rate_of_return);
        return false;
    }
    match info.deposit.checked_add(opts.min_balance_reserve) {
        Some(needed) if needed <= balance => {}
        _ => {
            debug!("balance {} cannot cover deposit plus reserve", balance);
            return false;
        }
    }
    let commit_end = info.bnum.saturating_sub(u64::from(info.commit_deadline));
    if info.settled || block_number >= commit_end {
        debug!("commit window closed at {}, now {}", commit_end, block_number);
        return false;
    }
    if info.commit_deadline <= opts.min_reveal_window {
        debug!("reveal window {} too short", info.commit_deadline);
        return false;
    }
    if opts.min_reveal_window <= opts.max_reveal_delay {
        return false;
    }
    if ongoing >= opts.max_campaigns {
        debug!("already in {} campaigns", ongoing);
        return false;
    }
    true
}
