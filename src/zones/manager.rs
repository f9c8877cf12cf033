//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` tracks where cards are located and the order in which
//! they arrived in each zone. Arrival order is the zone's timestamp order:
//! presence checks and trigger rebuilds that walk a zone see cards in the
//! order they entered it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ZoneId;
use crate::core::entity::EntityId;

/// A completed move of one card between two zones.
///
/// Returned by [`ZoneManager::move_to_zone`] and carried by zone-change
/// events so triggers can look back at where the card came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneMove {
    pub entity: EntityId,
    pub origin: ZoneId,
    pub destination: ZoneId,
}

/// Manages card locations across zones.
///
/// ## Usage
///
/// ```
/// use ccg_triggers::zones::ZoneManager;
/// use ccg_triggers::core::{EntityId, ZoneId};
///
/// let hand = ZoneId::new(1);
/// let battlefield = ZoneId::new(2);
///
/// let mut manager = ZoneManager::new();
/// manager.add_to_zone(EntityId(10), hand);
///
/// let moved = manager.move_to_zone(EntityId(10), battlefield).unwrap();
/// assert_eq!(moved.origin, hand);
/// assert_eq!(manager.cards_in_zone(battlefield), &[EntityId(10)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// Card locations: entity_id -> zone_id
    locations: FxHashMap<EntityId, ZoneId>,

    /// Zone membership in arrival order.
    members: FxHashMap<ZoneId, Vec<EntityId>>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card to a zone.
    ///
    /// Panics if the entity is already tracked; entity ids are unique.
    pub fn add_to_zone(&mut self, entity: EntityId, zone: ZoneId) {
        if self.locations.contains_key(&entity) {
            panic!("Entity {:?} already exists in zone manager", entity);
        }

        self.locations.insert(entity, zone);
        self.members.entry(zone).or_default().push(entity);
    }

    /// Move a card from one zone to another.
    ///
    /// Returns `None` if the card isn't tracked. Moving a card to the zone
    /// it already occupies still counts as a move and refreshes its arrival
    /// position.
    pub fn move_to_zone(&mut self, entity: EntityId, destination: ZoneId) -> Option<ZoneMove> {
        let origin = self.locations.get(&entity).copied()?;

        if let Some(order) = self.members.get_mut(&origin) {
            order.retain(|&e| e != entity);
        }

        self.locations.insert(entity, destination);
        self.members.entry(destination).or_default().push(entity);

        Some(ZoneMove {
            entity,
            origin,
            destination,
        })
    }

    /// Remove a card from the manager entirely.
    ///
    /// Returns the zone it was in, or `None` if not found.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneId> {
        let zone = self.locations.remove(&entity)?;

        if let Some(order) = self.members.get_mut(&zone) {
            order.retain(|&e| e != entity);
        }

        Some(zone)
    }

    /// Get the zone a card is in.
    #[must_use]
    pub fn get_zone(&self, entity: EntityId) -> Option<ZoneId> {
        self.locations.get(&entity).copied()
    }

    /// Check if a card is in a specific zone.
    #[must_use]
    pub fn is_in_zone(&self, entity: EntityId, zone: ZoneId) -> bool {
        self.locations.get(&entity) == Some(&zone)
    }

    /// Cards in a zone, in arrival order.
    #[must_use]
    pub fn cards_in_zone(&self, zone: ZoneId) -> &[EntityId] {
        self.members.get(&zone).map_or(&[], |v| v.as_slice())
    }

    /// Get the number of cards in a zone.
    #[must_use]
    pub fn zone_size(&self, zone: ZoneId) -> usize {
        self.cards_in_zone(zone).len()
    }

    /// Get total number of cards tracked.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.locations.len()
    }

    /// Check if the manager contains an entity.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }
}
