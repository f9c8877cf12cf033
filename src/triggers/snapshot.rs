//! Save/resume for trigger state.
//!
//! Card triggers are rebuilt from card text when a game is reloaded, so only
//! their mutable bits travel: suppression and the per-turn counter. Delayed
//! triggers exist nowhere else and are stored whole, as re-parseable
//! declarations.

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId, TriggerError};

use super::mode::TriggerMode;
use super::trigger::{Ability, TriggerId};

/// Mutable state of one card trigger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceState {
    pub id: TriggerId,
    pub suppressed: bool,
    pub activations: u32,
}

/// A delayed trigger, complete enough to rebuild.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedRecord {
    pub id: TriggerId,
    pub host: EntityId,
    pub controller: PlayerId,
    pub declaration: String,

    /// Pre-built ability, when the trigger had one instead of `Execute$`.
    pub ability: Option<Ability>,

    pub activations: u32,
    pub suppressed: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSnapshot {
    pub instances: Vec<InstanceState>,

    /// Live delayed triggers, in registration order.
    pub delayed: Vec<DelayedRecord>,

    /// Subset of `delayed` that expires at end of turn.
    pub this_turn: Vec<TriggerId>,

    /// Delayed triggers held for a player, stored in `delayed` as well.
    pub player_delayed: Vec<(PlayerId, Vec<TriggerId>)>,

    pub suppressed_modes: Vec<TriggerMode>,
    pub suppress_all: bool,
    pub next_id: u32,
}

impl TriggerSnapshot {
    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, TriggerError> {
        bincode::serialize(self).map_err(|e| TriggerError::Snapshot(e.to_string()))
    }

    /// Decode bytes produced by [`TriggerSnapshot::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TriggerError> {
        bincode::deserialize(bytes).map_err(|e| TriggerError::Snapshot(e.to_string()))
    }
}
