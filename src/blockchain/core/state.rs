use crate::error::ChainError;
use serde::Serialize;
use std::collections::BTreeMap;

/// One validator's entry, as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatorStake {
    pub validator: String,
    pub stake: u64,
}

/// Validator stakes, iterated in lexicographic order of the identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StakeLedger {
    stakes: BTreeMap<String, u64>,
}

impl StakeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `amount` to the validator's stake and returns the new total.
    pub fn deposit(&mut self, validator: &str, amount: u64) -> Result<u64, ChainError> {
        let validator = validator.trim();
        if validator.is_empty() {
            return Err(ChainError::InvalidStake("validator is required".to_string()));
        }
        if amount == 0 {
            return Err(ChainError::InvalidStake("amount must be positive".to_string()));
        }

        let current = self.stakes.get(validator).copied().unwrap_or(0);
        let updated = current.checked_add(amount).ok_or_else(|| {
            ChainError::InvalidStake(format!("stake for {} would overflow", validator))
        })?;
        self.stakes.insert(validator.to_string(), updated);
        Ok(updated)
    }

    pub fn stake_of(&self, validator: &str) -> u64 {
        self.stakes.get(validator).copied().unwrap_or(0)
    }

    pub fn total_stake(&self) -> u128 {
        self.stakes.values().map(|&s| u128::from(s)).sum()
    }

    pub fn len(&self) -> usize {
        self.stakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.stakes.iter().map(|(v, s)| (v.as_str(), *s))
    }

    pub fn validators(&self) -> Vec<ValidatorStake> {
        self.iter()
            .map(|(validator, stake)| ValidatorStake {
                validator: validator.to_string(),
                stake,
            })
            .collect()
    }
}
