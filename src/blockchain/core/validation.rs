use crate::blockchain::core::block::Block;
use crate::error::ChainError;

/// Checks that `candidate` links onto `previous`, reporting the first rule it breaks.
pub fn validate_successor<B: Block>(candidate: &B, previous: &B) -> Result<(), ChainError> {
    match previous.height().checked_add(1) {
        Some(expected) if expected == candidate.height() => {}
        Some(expected) => {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid block height. Expected {}, but got {}.",
                expected,
                candidate.height()
            )));
        }
        None => {
            return Err(ChainError::InvalidBlock(format!(
                "Invalid block height. Block at height {} cannot have a successor.",
                previous.height()
            )));
        }
    }

    if candidate.previous_hash() != previous.hash() {
        return Err(ChainError::InvalidBlock(format!(
            "Invalid previous block hash. Expected {}, but got {}.",
            previous.hash(),
            candidate.previous_hash()
        )));
    }

    let computed = candidate.digest();
    if computed != candidate.hash() {
        return Err(ChainError::InvalidBlock(format!(
            "Block hash mismatch at height {}. Computed {}, but block carries {}.",
            candidate.height(),
            computed,
            candidate.hash()
        )));
    }

    Ok(())
}

pub fn is_block_valid<B: Block>(candidate: &B, previous: &B) -> bool {
    validate_successor(candidate, previous).is_ok()
}

/// Walks every adjacent pair. The genesis block itself is not re-hashed here;
/// see [`is_genesis_well_formed`] for that check.
pub fn validate_chain<B: Block>(chain: &[B]) -> Result<(), ChainError> {
    if chain.is_empty() {
        return Err(ChainError::InvalidChain("chain is empty".to_string()));
    }
    for pair in chain.windows(2) {
        validate_successor(&pair[1], &pair[0])?;
    }
    Ok(())
}

pub fn is_chain_valid<B: Block>(chain: &[B]) -> bool {
    validate_chain(chain).is_ok()
}

/// Height 0, no parent, and a hash that matches its own fields.
pub fn is_genesis_well_formed<B: Block>(genesis: &B) -> bool {
    genesis.height() == 0 && genesis.previous_hash().is_empty() && genesis.digest() == genesis.hash()
}
