//! Entity identification.
//!
//! Every card-like game object (permanent, spell, token, emblem) carries an
//! `EntityId`. Players are identified separately by [`PlayerId`](super::PlayerId);
//! the two id spaces never overlap, so an event payload can carry either
//! without ambiguity.
//!
//! ```
//! use ccg_triggers::core::EntityId;
//!
//! let card = EntityId(10);
//! assert_eq!(card.raw(), 10);
//! assert_eq!(format!("{}", card), "Entity(10)");
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a card-like game entity.
///
/// Ordering is by raw value, which is allocation order. The trigger handler
/// relies on this when it scans cards to rebuild the active trigger set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}
