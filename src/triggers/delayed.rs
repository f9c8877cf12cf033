//! Delayed trigger pools.
//!
//! Delayed triggers have no host zone to keep them alive. They sit in a pool
//! until they fire once or a turn boundary clears them. Ids only; the
//! triggers themselves live in the handler's arena.

use rustc_hash::FxHashMap;

use crate::core::PlayerId;

use super::trigger::TriggerId;

#[derive(Clone, Debug, Default)]
pub struct DelayedPool {
    /// Live delayed triggers, in registration order.
    pool: Vec<TriggerId>,

    /// Subset of `pool` cleared at end of turn.
    this_turn: Vec<TriggerId>,

    /// Held for a player until released (e.g. "at the beginning of your next turn").
    per_player: FxHashMap<PlayerId, Vec<TriggerId>>,
}

impl DelayedPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: TriggerId) {
        if !self.pool.contains(&id) {
            self.pool.push(id);
        }
    }

    pub fn register_this_turn(&mut self, id: TriggerId) {
        self.register(id);
        if !self.this_turn.contains(&id) {
            self.this_turn.push(id);
        }
    }

    pub fn register_player(&mut self, player: PlayerId, id: TriggerId) {
        self.per_player.entry(player).or_default().push(id);
    }

    /// Move `player`'s held triggers into the live pool. Returns them.
    pub fn release_player(&mut self, player: PlayerId) -> Vec<TriggerId> {
        let released = self.per_player.remove(&player).unwrap_or_default();
        for &id in &released {
            self.register(id);
        }
        released
    }

    /// Remove from every pool. True if it was anywhere.
    pub fn remove(&mut self, id: TriggerId) -> bool {
        let before = self.len();
        self.pool.retain(|&t| t != id);
        self.this_turn.retain(|&t| t != id);
        for held in self.per_player.values_mut() {
            held.retain(|&t| t != id);
        }
        self.per_player.retain(|_, held| !held.is_empty());
        before != self.len()
    }

    /// Drop the this-turn subset. Returns the removed ids.
    pub fn clear_this_turn(&mut self) -> Vec<TriggerId> {
        let cleared = std::mem::take(&mut self.this_turn);
        self.pool.retain(|id| !cleared.contains(id));
        cleared
    }

    /// Live delayed triggers, in registration order.
    #[must_use]
    pub fn ids(&self) -> &[TriggerId] {
        &self.pool
    }

    #[must_use]
    pub fn this_turn_ids(&self) -> &[TriggerId] {
        &self.this_turn
    }

    /// Held triggers per player, players in seat order.
    #[must_use]
    pub fn held(&self) -> Vec<(PlayerId, Vec<TriggerId>)> {
        let mut held: Vec<_> = self
            .per_player
            .iter()
            .map(|(&p, ids)| (p, ids.clone()))
            .collect();
        held.sort_by_key(|(p, _)| *p);
        held
    }

    #[must_use]
    pub fn contains(&self, id: TriggerId) -> bool {
        self.pool.contains(&id)
    }

    /// Every id in any pool, live or held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len() + self.per_player.values().map(Vec::len).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.pool.clear();
        self.this_turn.clear();
        self.per_player.clear();
    }
}
