//! Card instances - runtime card state.
//!
//! `CardInstance` is what the trigger engine knows about a game object:
//! who owns and controls it, where it is, its card types, the SVars its
//! abilities reference, and the ids of the triggers it carries.

use std::collections::BTreeMap;
use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::config::ZoneId;
use crate::core::entity::EntityId;
use crate::core::error::TriggerError;
use crate::core::player::PlayerId;
use crate::triggers::TriggerId;

/// Card types used by filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Battle,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
}

impl CardType {
    /// Does an object of this type stay on the battlefield?
    #[must_use]
    pub fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

impl FromStr for CardType {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Artifact" => CardType::Artifact,
            "Battle" => CardType::Battle,
            "Creature" => CardType::Creature,
            "Enchantment" => CardType::Enchantment,
            "Instant" => CardType::Instant,
            "Land" => CardType::Land,
            "Planeswalker" => CardType::Planeswalker,
            "Sorcery" => CardType::Sorcery,
            _ => return Err(TriggerError::invalid("CardType", s)),
        })
    }
}

/// A card instance in a game.
///
/// The `state` field uses `FxHashMap<String, i64>` for game-defined values
/// (tapped, damage, counters). Booleans are stored as 0/1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub entity_id: EntityId,

    pub name: String,

    /// Owner (who started with this card).
    pub owner: PlayerId,

    /// Controller (who currently controls it).
    pub controller: PlayerId,

    /// Current zone.
    pub zone: ZoneId,

    pub types: SmallVec<[CardType; 2]>,

    pub token: bool,

    /// Named ability texts referenced by `Execute$` and `SubAbility$`.
    #[serde(default)]
    pub svars: BTreeMap<String, String>,

    /// Triggers this card carries, declared and granted, in creation order.
    #[serde(default)]
    pub triggers: Vec<TriggerId>,

    /// Mutable instance state (tapped, damage, etc.)
    #[serde(default)]
    pub state: FxHashMap<String, i64>,
}

impl CardInstance {
    /// Create a card instance controlled by its owner.
    #[must_use]
    pub fn new(entity_id: EntityId, name: impl Into<String>, owner: PlayerId, zone: ZoneId) -> Self {
        Self {
            entity_id,
            name: name.into(),
            owner,
            controller: owner,
            zone,
            types: SmallVec::new(),
            token: false,
            svars: BTreeMap::new(),
            triggers: Vec::new(),
            state: FxHashMap::default(),
        }
    }

    /// Add a card type (builder pattern).
    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        if !self.types.contains(&card_type) {
            self.types.push(card_type);
        }
        self
    }

    /// Add an SVar (builder pattern).
    #[must_use]
    pub fn with_svar(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.svars.insert(name.into(), text.into());
        self
    }

    /// Mark as a token (builder pattern).
    #[must_use]
    pub fn as_token(mut self) -> Self {
        self.token = true;
        self
    }

    #[must_use]
    pub fn is_type(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.types.iter().any(|t| t.is_permanent())
    }

    #[must_use]
    pub fn svar(&self, name: &str) -> Option<&str> {
        self.svars.get(name).map(String::as_str)
    }

    /// Get a state value with a default.
    #[must_use]
    pub fn get_state(&self, key: &str, default: i64) -> i64 {
        self.state.get(key).copied().unwrap_or(default)
    }

    /// Set a state value.
    pub fn set_state(&mut self, key: impl Into<String>, value: i64) {
        self.state.insert(key.into(), value);
    }

    /// Check if a state flag is set (non-zero).
    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        self.get_state(key, 0) != 0
    }

    /// Set a boolean flag (1 for true, 0 for false).
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.set_state(key, i64::from(value));
    }
}
