//! Stake-weighted validator selection
//!
//! Selection is deterministic: the seed comes from the previous block's hash
//! and validators are walked in identifier order, so every node with the same
//! tip and stake ledger picks the same validator.

use crate::blockchain::{Block, StakeBlock, StakeLedger};
use crate::error::ChainError;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};

/// Domain-separation tag appended to the previous hash before seeding.
pub const SEED_DOMAIN_TAG: &str = "|pos";

pub fn selection_seed(previous_hash: &str) -> BigUint {
    let digest = Sha256::digest(format!("{}{}", previous_hash, SEED_DOMAIN_TAG).as_bytes());
    BigUint::from_bytes_be(&digest)
}

/// Picks the validator whose cumulative stake range contains `seed mod total`.
pub fn select_validator(previous_hash: &str, stakes: &StakeLedger) -> Result<String, ChainError> {
    let total = stakes.total_stake();
    if stakes.is_empty() || total == 0 {
        return Err(ChainError::NoEligibleValidator);
    }

    let reduced = selection_seed(previous_hash) % BigUint::from(total);
    // reduced < total <= u128::MAX, so the conversion cannot fail.
    let target = u128::try_from(&reduced).map_err(|_| ChainError::NoEligibleValidator)?;

    let mut cumulative: u128 = 0;
    for (validator, stake) in stakes.iter() {
        cumulative += u128::from(stake);
        if target < cumulative {
            return Ok(validator.to_string());
        }
    }

    // Unreachable while target < total.
    stakes
        .iter()
        .last()
        .map(|(validator, _)| validator.to_string())
        .ok_or(ChainError::NoEligibleValidator)
}

/// Builds a sealed successor of `previous` forged by the selected validator.
/// The caller still validates it against the live tip before appending.
pub fn forge_candidate(
    previous: &StakeBlock,
    stakes: &StakeLedger,
    payload: &str,
) -> Result<StakeBlock, ChainError> {
    let validator = select_validator(previous.hash(), stakes)?;
    Ok(StakeBlock::successor(previous, payload, &validator))
}
