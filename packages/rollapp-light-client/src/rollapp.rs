//! Rollapp state as submitted by its sequencers and finalized on the hub

use serde::{Deserialize, Serialize};

/// A rollapp registered on the hub
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollapp {
    /// The rollapp chain id
    pub rollapp_id: String,
    /// Current revision, bumped by every hard fork
    pub revision_number: u64,
    /// The bound transfer channel, permanent once set
    pub channel_id: Option<String>,
}

impl Rollapp {
    /// A fresh rollapp without a bound channel
    #[must_use]
    pub fn new(rollapp_id: impl Into<String>) -> Self {
        Self {
            rollapp_id: rollapp_id.into(),
            revision_number: 0,
            channel_id: None,
        }
    }
}

/// Per height data asserted by a sequencer in a state update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    /// Rollapp block height
    pub height: u64,
    /// State root after the block
    pub state_root: Vec<u8>,
    /// Block time in unix nanoseconds
    pub timestamp: Option<u64>,
}

/// Finalization status of a state update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateStatus {
    /// Inside the dispute window
    Pending,
    /// Past the dispute window
    Finalized,
}

/// A batch of contiguous block descriptors `[start_height, start_height + num_blocks)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateInfo {
    /// The rollapp the batch belongs to
    pub rollapp_id: String,
    /// Sequential index of the batch
    pub index: u64,
    /// First height covered
    pub start_height: u64,
    /// Number of heights covered
    pub num_blocks: u64,
    /// Address of the sequencer that produced the batch
    pub sequencer: String,
    /// Finalization status
    pub status: StateStatus,
    /// One descriptor per covered height, ascending
    pub block_descriptors: Vec<BlockDescriptor>,
}

impl StateInfo {
    /// The last height covered by this batch
    #[must_use]
    pub const fn latest_height(&self) -> u64 {
        self.start_height.saturating_add(self.num_blocks).saturating_sub(1)
    }

    /// Whether `height` falls inside this batch
    #[must_use]
    pub const fn contains_height(&self, height: u64) -> bool {
        self.num_blocks > 0 && self.start_height <= height && height <= self.latest_height()
    }

    /// The block descriptor for `height`, if covered
    #[must_use]
    pub fn block_descriptor(&self, height: u64) -> Option<&BlockDescriptor> {
        if !self.contains_height(height) {
            return None;
        }
        let idx = usize::try_from(height - self.start_height).ok()?;
        self.block_descriptors
            .get(idx)
            .filter(|bd| bd.height == height)
    }

    /// The descriptor of the last height in the batch
    #[must_use]
    pub fn last_block_descriptor(&self) -> Option<&BlockDescriptor> {
        self.block_descriptors.last()
    }
}
