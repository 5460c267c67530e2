use crate::blockchain::core::block::{format_timestamp, Block};
use crate::blockchain::core::validation::{is_genesis_well_formed, validate_chain, validate_successor};
use crate::error::ChainError;
use serde::{Deserialize, Serialize};

/// A block as shown to API clients and exchanged between peers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockView<B> {
    #[serde(flatten)]
    pub block: B,
    #[serde(default)]
    pub time: String,
}

impl<B: Block> BlockView<B> {
    pub fn new(block: B) -> Self {
        let time = format_timestamp(block.timestamp());
        Self { block, time }
    }

    pub fn into_block(self) -> B {
        self.block
    }
}

/// A block sequence that has passed full-chain validation.
///
/// The only way to build one is [`ValidatedChain::new`], so anything holding a
/// `ValidatedChain` may be swapped in without checking it again.
#[derive(Debug, Clone)]
pub struct ValidatedChain<B> {
    blocks: Vec<B>,
}

impl<B: Block> ValidatedChain<B> {
    pub fn new(blocks: Vec<B>) -> Result<Self, ChainError> {
        validate_chain(&blocks)?;
        if !is_genesis_well_formed(&blocks[0]) {
            return Err(ChainError::InvalidChain(
                "first block is not a well-formed genesis".to_string(),
            ));
        }
        Ok(Self { blocks })
    }

    pub fn from_views(views: Vec<BlockView<B>>) -> Result<Self, ChainError> {
        Self::new(views.into_iter().map(BlockView::into_block).collect())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[B] {
        &self.blocks
    }
}

/// Append-only ledger. Never empty: index 0 is always the genesis block.
#[derive(Debug, Clone)]
pub struct Blockchain<B: Block> {
    blocks: Vec<B>,
}

impl<B: Block> Blockchain<B> {
    pub fn new(genesis: B) -> Result<Self, ChainError> {
        if !is_genesis_well_formed(&genesis) {
            return Err(ChainError::InvalidBlock(
                "Genesis block must have height 0, no previous hash and a matching hash.".to_string(),
            ));
        }
        Ok(Self { blocks: vec![genesis] })
    }

    pub fn blocks(&self) -> &[B] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn genesis(&self) -> &B {
        &self.blocks[0]
    }

    pub fn tip(&self) -> &B {
        &self.blocks[self.blocks.len() - 1]
    }

    /// Validates `block` against the current tip and appends it.
    pub fn apply_block(&mut self, block: B) -> Result<(), ChainError> {
        validate_successor(&block, self.tip())?;
        self.blocks.push(block);
        Ok(())
    }

    /// Replaces the whole ledger when `candidate` is strictly longer.
    /// Equal-length chains never displace the incumbent.
    pub fn adopt_if_longer(&mut self, candidate: ValidatedChain<B>) -> bool {
        if candidate.len() > self.blocks.len() {
            self.blocks = candidate.blocks;
            true
        } else {
            false
        }
    }

    pub fn is_valid(&self) -> bool {
        validate_chain(&self.blocks).is_ok()
    }

    pub fn views(&self) -> Vec<BlockView<B>> {
        self.blocks.iter().cloned().map(BlockView::new).collect()
    }
}
