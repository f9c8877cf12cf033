//! Game state read and written by the trigger engine.
//!
//! ## PublicState
//!
//! Observable turn information:
//! - Phase, turn number, active player
//! - Player state (life totals and other game-defined counters)
//!
//! ## GameState
//!
//! Complete state the engine consults while detecting triggers:
//! - Public state
//! - Zone manager (card locations)
//! - Card instances
//! - Resolution stack
//! - Global rule overrides
//!
//! Trigger detection only ever borrows `GameState` immutably. Mutation
//! happens through ability execution and the caller's own game logic.

use std::sync::Arc;

use im::OrdMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::config::{GameConfig, PhaseId, ZoneId};
use super::entity::EntityId;
use super::error::TriggerError;
use super::player::{PlayerId, PlayerMap};
use crate::cards::CardInstance;
use crate::rules::RuleOverrides;
use crate::stack::PriorityStack;
use crate::zones::{ZoneManager, ZoneMove};

/// Key under which life totals are stored in `player_state`.
pub const LIFE: &str = "life";

/// Public game state - observable by all players.
///
/// ## State Values (i64 only)
///
/// `player_state` and `turn_state` use `FxHashMap<String, i64>`. Games
/// define the keys; the engine reads only [`LIFE`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicState {
    // === Configuration ===
    player_count: usize,

    // === Game Progression ===
    /// Current phase.
    pub phase: PhaseId,

    /// Turn number (starts at 1).
    pub turn_number: u32,

    /// Active player (whose turn it is).
    pub active_player: PlayerId,

    // === Player State ===
    /// Per-player state (life, etc.) - games define keys.
    pub player_state: PlayerMap<FxHashMap<String, i64>>,

    /// Per-turn state (cleared on turn advance).
    pub turn_state: FxHashMap<String, i64>,
}

impl PublicState {
    /// Create a new public state.
    ///
    /// Player 0 is active, the phase is `PhaseId(0)` and the turn is 1.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            phase: PhaseId::default(),
            turn_number: 1,
            active_player: PlayerId::new(0),
            player_state: PlayerMap::with_default(player_count),
            turn_state: FxHashMap::default(),
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Iterate over all player IDs in seating order.
    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count)
    }

    /// Active player first, then the others in seating order.
    #[must_use]
    pub fn apnap_order(&self) -> Vec<PlayerId> {
        PlayerId::apnap(self.active_player, self.player_count).collect()
    }

    /// Is it `player`'s turn?
    #[must_use]
    pub fn is_player_turn(&self, player: PlayerId) -> bool {
        self.active_player == player
    }

    // === Player State ===

    /// Get a player state value with default.
    #[must_use]
    pub fn get_player_state(&self, player: PlayerId, key: &str, default: i64) -> i64 {
        self.player_state
            .get(player)
            .and_then(|s| s.get(key))
            .copied()
            .unwrap_or(default)
    }

    /// Set a player state value.
    pub fn set_player_state(&mut self, player: PlayerId, key: impl Into<String>, value: i64) {
        self.player_state[player].insert(key.into(), value);
    }

    /// Modify a player state value by delta.
    pub fn modify_player_state(&mut self, player: PlayerId, key: &str, delta: i64) {
        let current = self.get_player_state(player, key, 0);
        self.player_state[player].insert(key.to_string(), current + delta);
    }

    /// A player's life total.
    #[must_use]
    pub fn life(&self, player: PlayerId) -> i64 {
        self.get_player_state(player, LIFE, 0)
    }

    // === Turn State ===

    /// Get a turn state value with default.
    #[must_use]
    pub fn get_turn_state(&self, key: &str, default: i64) -> i64 {
        self.turn_state.get(key).copied().unwrap_or(default)
    }

    /// Set a turn state value.
    pub fn set_turn_state(&mut self, key: impl Into<String>, value: i64) {
        self.turn_state.insert(key.into(), value);
    }

    // === Turn Advancement ===

    /// Pass the turn to the next player in seating order, clearing turn_state.
    pub fn advance_turn(&mut self, first_phase: PhaseId) {
        self.turn_number += 1;
        self.active_player = self.active_player.next(self.player_count);
        self.phase = first_phase;
        self.turn_state.clear();
    }
}

/// Full game state.
#[derive(Clone, Debug)]
pub struct GameState {
    /// Public state (observable by all).
    pub public: PublicState,

    /// Zone manager for card locations.
    pub zones: ZoneManager,

    /// Resolution stack.
    pub stack: PriorityStack,

    /// Global rule overrides (disabled ETB triggers, trigger multipliers).
    pub rules: RuleOverrides,

    /// Card instances, ordered by entity ID.
    cards: OrdMap<EntityId, CardInstance>,

    config: Arc<GameConfig>,

    /// Next entity ID to allocate.
    next_entity_id: u32,
}

impl GameState {
    /// Create a new game state. Every player starts at the configured life.
    #[must_use]
    pub fn new(config: GameConfig) -> Self {
        let mut public = PublicState::new(config.player_count);
        if let Some(first) = config.phases.first() {
            public.phase = first.id;
        }
        for player in PlayerId::all(config.player_count) {
            public.set_player_state(player, LIFE, config.starting_life);
        }

        Self {
            public,
            zones: ZoneManager::new(),
            stack: PriorityStack::new(),
            rules: RuleOverrides::default(),
            cards: OrdMap::new(),
            config: Arc::new(config),
            next_entity_id: 1,
        }
    }

    /// The configuration this game was created with.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Shared handle to the configuration.
    #[must_use]
    pub fn config_arc(&self) -> Arc<GameConfig> {
        Arc::clone(&self.config)
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.public.player_count()
    }

    // === Turn Cursor ===

    #[must_use]
    pub fn current_phase(&self) -> PhaseId {
        self.public.phase
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.public.turn_number
    }

    #[must_use]
    pub fn is_player_turn(&self, player: PlayerId) -> bool {
        self.public.is_player_turn(player)
    }

    /// Set the current phase by name.
    pub fn set_phase_named(&mut self, name: &str) -> Result<PhaseId, TriggerError> {
        let phase = self
            .config
            .phase_named(name)
            .ok_or_else(|| TriggerError::invalid("Phase", name))?;
        self.public.phase = phase;
        Ok(phase)
    }

    // === Entity Management ===

    /// Allocate a new entity ID.
    pub fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Add a card instance, placing it in its zone.
    pub fn add_card(&mut self, card: CardInstance) {
        let entity_id = card.entity_id;
        let zone = card.zone;
        self.cards.insert(entity_id, card);
        self.zones.add_to_zone(entity_id, zone);
    }

    /// Allocate an entity and add a plain card for `owner` in `zone`.
    pub fn create_card(&mut self, name: impl Into<String>, owner: PlayerId, zone: ZoneId) -> EntityId {
        let id = self.alloc_entity();
        self.add_card(CardInstance::new(id, name, owner, zone));
        id
    }

    /// Get a card instance.
    #[must_use]
    pub fn card(&self, entity_id: EntityId) -> Option<&CardInstance> {
        self.cards.get(&entity_id)
    }

    /// Get a mutable card instance.
    pub fn card_mut(&mut self, entity_id: EntityId) -> Option<&mut CardInstance> {
        self.cards.get_mut(&entity_id)
    }

    /// All cards, in entity ID order.
    pub fn cards(&self) -> impl Iterator<Item = &CardInstance> {
        self.cards.values()
    }

    /// Remove a card from the game (tokens ceasing to exist).
    pub fn remove_card(&mut self, entity_id: EntityId) -> Option<CardInstance> {
        self.zones.remove(entity_id);
        self.cards.remove(&entity_id)
    }

    // === Zones ===

    #[must_use]
    pub fn zone_of(&self, entity_id: EntityId) -> Option<ZoneId> {
        self.zones.get_zone(entity_id)
    }

    #[must_use]
    pub fn controller_of(&self, entity_id: EntityId) -> Option<PlayerId> {
        self.card(entity_id).map(|c| c.controller)
    }

    /// Move a card, keeping the instance's zone in step with the manager.
    pub fn move_card(&mut self, entity_id: EntityId, destination: ZoneId) -> Result<ZoneMove, TriggerError> {
        let moved = self
            .zones
            .move_to_zone(entity_id, destination)
            .ok_or(TriggerError::UnknownEntity(entity_id))?;
        if let Some(card) = self.cards.get_mut(&entity_id) {
            card.zone = destination;
        }
        Ok(moved)
    }

    /// Cards in a zone, in arrival order.
    #[must_use]
    pub fn cards_in_zone(&self, zone: ZoneId) -> &[EntityId] {
        self.zones.cards_in_zone(zone)
    }

    // === Life ===

    #[must_use]
    pub fn life(&self, player: PlayerId) -> i64 {
        self.public.life(player)
    }

    pub fn set_life(&mut self, player: PlayerId, life: i64) {
        self.public.set_player_state(player, LIFE, life);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{phases, zones};

    fn state() -> GameState {
        GameState::new(GameConfig::standard(2))
    }

    #[test]
    fn test_public_state_new() {
        let state = PublicState::new(4);

        assert_eq!(state.player_count(), 4);
        assert_eq!(state.turn_number, 1);
        assert!(state.is_player_turn(PlayerId::new(0)));
    }

    #[test]
    fn test_player_state() {
        let mut state = PublicState::new(2);

        assert_eq!(state.get_player_state(PlayerId::new(0), LIFE, 20), 20);

        state.set_player_state(PlayerId::new(0), LIFE, 15);
        state.modify_player_state(PlayerId::new(0), LIFE, -3);
        assert_eq!(state.life(PlayerId::new(0)), 12);
    }

    #[test]
    fn test_advance_turn() {
        let mut state = PublicState::new(3);
        state.set_turn_state("lands_played", 1);
        state.active_player = PlayerId::new(2);

        state.advance_turn(phases::UNTAP);

        assert_eq!(state.turn_number, 2);
        assert_eq!(state.active_player, PlayerId::new(0));
        assert_eq!(state.get_turn_state("lands_played", 0), 0);
        assert_eq!(state.apnap_order(), vec![PlayerId::new(0), PlayerId::new(1), PlayerId::new(2)]);
    }

    #[test]
    fn test_game_state_starting_life() {
        let state = GameState::new(GameConfig::standard(2).with_starting_life(30));

        assert_eq!(state.life(PlayerId::new(0)), 30);
        assert_eq!(state.life(PlayerId::new(1)), 30);
        assert_eq!(state.current_phase(), phases::UNTAP);
    }

    #[test]
    fn test_cards_iterate_in_id_order() {
        let mut state = state();
        let a = state.create_card("A", PlayerId::new(1), zones::HAND);
        let b = state.create_card("B", PlayerId::new(0), zones::BATTLEFIELD);

        let ids: Vec<_> = state.cards().map(|c| c.entity_id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(state.controller_of(a), Some(PlayerId::new(1)));
    }

    #[test]
    fn test_move_card_updates_instance() {
        let mut state = state();
        let card = state.create_card("Bear", PlayerId::new(0), zones::BATTLEFIELD);

        let moved = state.move_card(card, zones::GRAVEYARD).unwrap();

        assert_eq!(moved.origin, zones::BATTLEFIELD);
        assert_eq!(state.zone_of(card), Some(zones::GRAVEYARD));
        assert_eq!(state.card(card).unwrap().zone, zones::GRAVEYARD);
        assert!(state.move_card(EntityId(999), zones::EXILE).is_err());
    }

    #[test]
    fn test_remove_card() {
        let mut state = state();
        let token = state.create_card("Token", PlayerId::new(0), zones::BATTLEFIELD);

        assert!(state.remove_card(token).is_some());
        assert!(state.card(token).is_none());
        assert_eq!(state.zone_of(token), None);
    }

    #[test]
    fn test_set_phase_named() {
        let mut state = state();
        assert_eq!(state.set_phase_named("Upkeep").unwrap(), phases::UPKEEP);
        assert!(state.set_phase_named("Teatime").is_err());
    }
}
