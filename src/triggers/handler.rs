//! The trigger handler.
//!
//! Owns every trigger instance and runs detection for raised events:
//!
//! 1. Static triggers that match execute immediately, in active-set order.
//! 2. For the active player, then each other player in turn order, that
//!    player's matching triggers (card triggers, then delayed ones) are
//!    bound and pushed onto the stack in the order the player picks.
//!
//! Events raised while the stack is frozen, or with `hold` set, wait in the
//! queue until [`TriggerHandler::drain_waiting`], so that a trigger counting
//! "how many entered this time" sees the whole batch.
//!
//! ## Key Components
//!
//! - [`TriggerHandler::raise`]: the one entry point for game events
//! - [`TriggerHandler::rebuild_active_set`]: recompute which card triggers are live
//! - the `register_*_delayed` family: one-shot triggers for "at the next X, do Y"
//! - [`TriggerHandler::suppress`]: switch a mode off without touching instances

use std::collections::BTreeSet;

use im::Vector;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace, warn};

use crate::core::{EntityId, GameConfig, GameState, PlayerId, TriggerError};
use crate::rules::Collaborators;

use super::delayed::DelayedPool;
use super::event::GameEvent;
use super::mode::TriggerMode;
use super::params::ParamMap;
use super::snapshot::{DelayedRecord, InstanceState, TriggerSnapshot};
use super::trigger::{Ability, BoundAbility, Trigger, TriggerAction, TriggerId};
use super::waiting::WaitingQueue;

#[derive(Debug)]
pub struct TriggerHandler {
    /// Every trigger instance, card-declared or delayed.
    triggers: FxHashMap<TriggerId, Trigger>,

    /// Next ordinal. Starts at 1 for each match.
    next_id: u32,

    /// Live card triggers, in detection order.
    active: Vector<TriggerId>,

    delayed: DelayedPool,
    waiting: WaitingQueue,

    suppressed_modes: BTreeSet<TriggerMode>,
    suppress_all: bool,

    next_event_seq: u64,
}

impl Default for TriggerHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl TriggerHandler {
    pub fn new() -> Self {
        Self {
            triggers: FxHashMap::default(),
            next_id: 1,
            active: Vector::new(),
            delayed: DelayedPool::new(),
            waiting: WaitingQueue::new(),
            suppressed_modes: BTreeSet::new(),
            suppress_all: false,
            next_event_seq: 1,
        }
    }

    /// Forget everything and restart ordinals at 1.
    pub fn reset_for_match(&mut self) {
        *self = Self::new();
    }

    fn alloc_id(&mut self) -> TriggerId {
        let id = TriggerId::new(self.next_id);
        self.next_id += 1;
        id
    }

    // === Creation ===

    /// Parse `declaration` and attach it to `host`.
    ///
    /// The trigger is not live until the next [`rebuild_active_set`](Self::rebuild_active_set).
    pub fn create_trigger(
        &mut self,
        state: &mut GameState,
        host: EntityId,
        declaration: &str,
    ) -> Result<TriggerId, TriggerError> {
        let params = ParamMap::parse(declaration)?;
        self.attach(state, host, params, None, |_| {})
    }

    /// Like [`create_trigger`](Self::create_trigger), with a pre-built
    /// ability in place of `Execute$`.
    pub fn create_trigger_with_action(
        &mut self,
        state: &mut GameState,
        host: EntityId,
        declaration: &str,
        ability: Ability,
    ) -> Result<TriggerId, TriggerError> {
        let params = ParamMap::parse(declaration)?;
        self.attach(state, host, params, Some(TriggerAction::Ability(ability)), |_| {})
    }

    /// Grant `host` a trigger it doesn't print. A temporary grant goes away
    /// with [`clear_temporary_grants`](Self::clear_temporary_grants).
    pub fn grant_trigger(
        &mut self,
        state: &mut GameState,
        host: EntityId,
        declaration: &str,
        temporary: bool,
    ) -> Result<TriggerId, TriggerError> {
        let params = ParamMap::parse(declaration)?;
        self.attach(state, host, params, None, |trigger| {
            trigger.intrinsic = false;
            trigger.temporary = temporary;
        })
    }

    fn attach(
        &mut self,
        state: &mut GameState,
        host: EntityId,
        params: ParamMap,
        action: Option<TriggerAction>,
        configure: impl FnOnce(&mut Trigger),
    ) -> Result<TriggerId, TriggerError> {
        if state.card(host).is_none() {
            return Err(TriggerError::UnknownEntity(host));
        }
        let id = TriggerId::new(self.next_id);
        let mut trigger = Trigger::from_params(id, params, host, state.config(), action)?;
        configure(&mut trigger);
        self.next_id += 1;

        let card = state.card_mut(host).ok_or(TriggerError::UnknownEntity(host))?;
        card.triggers.push(id);
        debug!(trigger = %id, host = %host, mode = %trigger.mode(), "trigger created");
        self.triggers.insert(id, trigger);
        Ok(id)
    }

    /// Copy `from`'s card-declared triggers onto `to`, as when a card
    /// becomes a copy of another. Returns the new ids.
    pub fn copy_triggers(
        &mut self,
        state: &mut GameState,
        from: EntityId,
        to: EntityId,
    ) -> Result<Vec<TriggerId>, TriggerError> {
        let source = state.card(from).ok_or(TriggerError::UnknownEntity(from))?;
        if state.card(to).is_none() {
            return Err(TriggerError::UnknownEntity(to));
        }
        let originals: Vec<TriggerId> = source
            .triggers
            .iter()
            .copied()
            .filter(|id| self.triggers.get(id).is_some_and(|t| t.intrinsic))
            .collect();

        let mut created = Vec::with_capacity(originals.len());
        for original in originals {
            let id = self.alloc_id();
            let Some(copy) = self.triggers.get(&original).map(|t| t.clone_for_host(id, to)) else {
                continue;
            };
            self.triggers.insert(id, copy);
            created.push(id);
        }
        if let Some(card) = state.card_mut(to) {
            card.triggers.extend(created.iter().copied());
        }
        Ok(created)
    }

    /// Remove one trigger from everywhere it is referenced.
    pub fn remove_trigger(&mut self, state: &mut GameState, id: TriggerId) -> Option<Trigger> {
        let trigger = self.triggers.remove(&id)?;
        if let Some(card) = state.card_mut(trigger.host) {
            card.triggers.retain(|t| *t != id);
        }
        self.active.retain(|t| *t != id);
        self.delayed.remove(id);
        Some(trigger)
    }

    /// Drop every temporary grant. Returns how many were removed.
    pub fn clear_temporary_grants(&mut self, state: &mut GameState) -> usize {
        let ids: Vec<TriggerId> = self
            .triggers
            .values()
            .filter(|t| t.temporary)
            .map(|t| t.id)
            .collect();
        for &id in &ids {
            self.remove_trigger(state, id);
        }
        ids.len()
    }

    /// Remove every trigger attached to `host`. Delayed triggers it created
    /// are kept; see [`clear_delayed_for_host`](Self::clear_delayed_for_host).
    pub fn remove_triggers_for_host(&mut self, state: &mut GameState, host: EntityId) -> usize {
        let ids = state
            .card(host)
            .map(|card| card.triggers.clone())
            .unwrap_or_default();
        for &id in &ids {
            self.remove_trigger(state, id);
        }
        ids.len()
    }

    // === Active set ===

    /// Recompute the live card triggers: cards in entity order, each card's
    /// triggers in attach order, kept when the host is in a trigger zone.
    ///
    /// # Panics
    ///
    /// If one trigger id is attached twice.
    pub fn rebuild_active_set(&mut self, state: &GameState) {
        let mut active = Vector::new();
        let mut seen = FxHashSet::default();
        for card in state.cards() {
            for &id in &card.triggers {
                let Some(trigger) = self.triggers.get(&id) else {
                    continue;
                };
                if !trigger.host_in_valid_zone(state) {
                    continue;
                }
                assert!(seen.insert(id), "{} is attached more than once", id);
                active.push_back(id);
            }
        }
        trace!(active = active.len(), "active trigger set rebuilt");
        self.active = active;
    }

    #[must_use]
    pub fn active_ids(&self) -> Vec<TriggerId> {
        self.active.iter().copied().collect()
    }

    /// Live card triggers, in detection order.
    pub fn active_triggers(&self) -> impl Iterator<Item = &Trigger> + '_ {
        self.active.iter().filter_map(move |id| self.triggers.get(id))
    }

    /// Id and reminder text of every live trigger.
    #[must_use]
    pub fn describe_active(&self) -> Vec<(TriggerId, String)> {
        self.active_triggers()
            .map(|t| (t.id, t.description()))
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: TriggerId) -> Option<&Trigger> {
        self.triggers.get(&id)
    }

    pub fn get_mut(&mut self, id: TriggerId) -> Option<&mut Trigger> {
        self.triggers.get_mut(&id)
    }

    /// Total instances, live or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    // === Suppression ===

    pub fn suppress(&mut self, mode: TriggerMode) {
        self.suppressed_modes.insert(mode);
    }

    pub fn clear_suppression(&mut self, mode: TriggerMode) {
        self.suppressed_modes.remove(&mode);
    }

    pub fn suppress_all(&mut self, suppressed: bool) {
        self.suppress_all = suppressed;
    }

    #[must_use]
    pub fn is_suppressed(&self, mode: TriggerMode) -> bool {
        self.suppress_all || self.suppressed_modes.contains(&mode)
    }

    /// Suppress one instance. Returns `false` for an unknown id.
    pub fn set_instance_suppressed(&mut self, id: TriggerId, suppressed: bool) -> bool {
        match self.triggers.get_mut(&id) {
            Some(trigger) => {
                trigger.set_suppressed(suppressed);
                true
            }
            None => false,
        }
    }

    /// Start-of-turn reset of every per-turn counter.
    pub fn reset_turn_activation_counters(&mut self) {
        for trigger in self.triggers.values_mut() {
            trigger.reset_turn_state();
        }
    }

    // === Delayed triggers ===

    /// Build a delayed trigger for `host`, fixed to `controller`.
    ///
    /// Delayed triggers fire wherever their host is unless the declaration
    /// names `TriggerZones$`. Register the result with one of the
    /// `register_*_delayed` calls.
    pub fn delayed_trigger(
        &mut self,
        config: &GameConfig,
        host: EntityId,
        controller: PlayerId,
        declaration: &str,
        ability: Option<Ability>,
    ) -> Result<Trigger, TriggerError> {
        let params = ParamMap::parse(declaration)?;
        let id = TriggerId::new(self.next_id);
        let trigger = build_delayed(id, params, host, controller, config, ability)?;
        self.next_id += 1;
        Ok(trigger)
    }

    /// Fires once, at the next match, then is gone.
    pub fn register_delayed(&mut self, trigger: Trigger) -> TriggerId {
        let id = trigger.id;
        self.triggers.insert(id, trigger);
        self.delayed.register(id);
        id
    }

    /// Like [`register_delayed`](Self::register_delayed), but also dropped
    /// by [`clear_this_turn_delayed`](Self::clear_this_turn_delayed).
    pub fn register_this_turn_delayed(&mut self, trigger: Trigger) -> TriggerId {
        let id = trigger.id;
        self.triggers.insert(id, trigger);
        self.delayed.register_this_turn(id);
        id
    }

    /// Hold a delayed trigger until `player`'s pool is released.
    pub fn register_player_delayed(&mut self, player: PlayerId, trigger: Trigger) -> TriggerId {
        let id = trigger.id;
        self.triggers.insert(id, trigger);
        self.delayed.register_player(player, id);
        id
    }

    /// Make `player`'s held delayed triggers live. Returns how many.
    pub fn release_player_delayed(&mut self, player: PlayerId) -> usize {
        self.delayed.release_player(player).len()
    }

    /// End-of-turn cleanup of this-turn delayed triggers. Returns how many.
    pub fn clear_this_turn_delayed(&mut self) -> usize {
        let ids = self.delayed.clear_this_turn();
        for id in &ids {
            self.triggers.remove(id);
        }
        ids.len()
    }

    /// Drop every delayed trigger (live or held) created by `host`.
    pub fn clear_delayed_for_host(&mut self, host: EntityId) -> usize {
        let mut ids: Vec<TriggerId> = self.delayed.ids().to_vec();
        ids.extend(self.delayed.held().into_iter().flat_map(|(_, held)| held));
        let mut removed = 0;
        for id in ids {
            if self.triggers.get(&id).is_some_and(|t| t.host == host) {
                self.delayed.remove(id);
                self.triggers.remove(&id);
                removed += 1;
            }
        }
        removed
    }

    #[must_use]
    pub fn delayed(&self) -> &DelayedPool {
        &self.delayed
    }

    // === Raising ===

    /// Raise an event.
    ///
    /// An event whose mode is suppressed is dropped on the spot, unless its
    /// batched mode is still live; then only the aggregate is dispatched.
    /// The state-based mode is always dispatched at once. Anything else
    /// waits in the queue when the stack is frozen or `hold` is set, and is
    /// dispatched now otherwise, followed by its single-event aggregate.
    ///
    /// Returns whether static abilities should be rechecked.
    pub fn raise(
        &mut self,
        state: &mut GameState,
        collab: &mut Collaborators<'_>,
        mut event: GameEvent,
        hold: bool,
    ) -> bool {
        let own_suppressed = self.is_suppressed(event.mode);
        let batch = event.mode.batch_mode().filter(|&mode| !self.is_suppressed(mode));
        if own_suppressed && batch.is_none() {
            trace!(mode = %event.mode, "event dropped, mode suppressed");
            return false;
        }
        event.seq = self.next_event_seq;
        self.next_event_seq += 1;

        if event.mode.is_state() {
            return self.dispatch(state, collab, &event);
        }
        if hold || state.stack.is_frozen() {
            trace!(mode = %event.mode, seq = event.seq, "event queued");
            self.waiting.enqueue(event);
            return false;
        }

        let mut check_statics = false;
        if !own_suppressed {
            check_statics |= self.dispatch(state, collab, &event);
        }
        if let Some(batch) = batch {
            let aggregate = GameEvent::aggregate(batch, vec![event]);
            check_statics |= self.dispatch(state, collab, &aggregate);
        }
        check_statics
    }

    /// Dispatch every waiting event, oldest first, then one aggregate per
    /// batched mode covering all of them.
    pub fn drain_waiting(&mut self, state: &mut GameState, collab: &mut Collaborators<'_>) -> bool {
        if self.waiting.is_empty() {
            return false;
        }
        let active = self.active_ids();
        self.waiting.resolve_candidates(&active);

        let mut check_statics = false;
        let mut batches: Vec<(TriggerMode, Vec<GameEvent>)> = Vec::new();
        for waiting in self.waiting.drain_all() {
            if !self.is_suppressed(waiting.event.mode) {
                let candidates = waiting.triggers.unwrap_or_else(|| active.clone());
                check_statics |= self.dispatch_candidates(state, collab, &waiting.event, &candidates);
            }

            if let Some(mode) = waiting.event.mode.batch_mode() {
                match batches.iter_mut().find(|(m, _)| *m == mode) {
                    Some((_, members)) => members.push(waiting.event),
                    None => batches.push((mode, vec![waiting.event])),
                }
            }
        }

        for (mode, members) in batches {
            if self.is_suppressed(mode) {
                continue;
            }
            let aggregate = GameEvent::aggregate(mode, members);
            check_statics |= self.dispatch_candidates(state, collab, &aggregate, &active);
        }
        check_statics
    }

    /// Release one freeze of the stack and drain once it is fully thawed.
    pub fn unfreeze_stack(&mut self, state: &mut GameState, collab: &mut Collaborators<'_>) -> bool {
        if state.stack.unfreeze() {
            self.drain_waiting(state, collab)
        } else {
            false
        }
    }

    #[must_use]
    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    /// Discard waiting events without firing them.
    pub fn clear_waiting(&mut self) -> usize {
        self.waiting.clear()
    }

    // === Dispatch ===

    /// Run detection for `event` against the active set.
    pub fn dispatch(&mut self, state: &mut GameState, collab: &mut Collaborators<'_>, event: &GameEvent) -> bool {
        let active = self.active_ids();
        self.dispatch_candidates(state, collab, event, &active)
    }

    fn dispatch_candidates(
        &mut self,
        state: &mut GameState,
        collab: &mut Collaborators<'_>,
        event: &GameEvent,
        listed: &[TriggerId],
    ) -> bool {
        let candidates = self.with_look_back(state, event, listed);
        let mut fired = Vec::new();

        // Static pass
        for &id in &candidates {
            let Some(trigger) = self.triggers.get(&id) else {
                continue;
            };
            if !trigger.is_static || self.is_suppressed(trigger.mode()) || !trigger.eligible(state, event) {
                continue;
            }
            let bound = match trigger.bind(state, event) {
                Ok(bound) => bound,
                Err(err) => {
                    warn!(trigger = %id, error = %err, "static trigger firing aborted");
                    continue;
                }
            };
            if bound.optional {
                let decider = bound.decider.unwrap_or(bound.activator);
                if !collab.decider.confirm_optional(state, decider, &bound) {
                    continue;
                }
            }
            if let Some(trigger) = self.triggers.get_mut(&id) {
                trigger.record_firing(event, &bound);
            }
            debug!(trigger = %id, mode = %bound.mode, "static trigger fired");
            if let Err(err) = collab.executor.execute(state, &bound) {
                warn!(trigger = %id, error = %err, "static trigger failed");
            }
            fired.push(id);
        }

        // APNAP pass. The order is fixed for the whole pass.
        let order = state.public.apnap_order();
        for player in order {
            let mut batch = Vec::new();

            for &id in &candidates {
                let Some(trigger) = self.triggers.get(&id) else {
                    continue;
                };
                if trigger.is_static || trigger.controller(state) != Some(player) {
                    continue;
                }
                if self.is_suppressed(trigger.mode()) {
                    continue;
                }
                if trigger.mode().is_state() && state.stack.has_pending_state_trigger(id) {
                    continue;
                }
                if !trigger.eligible(state, event) {
                    continue;
                }
                let copies = 1 + state.rules.extra_firings(state, player, trigger.mode(), event);
                let bound = self.fire(state, id, event, copies);
                if !bound.is_empty() {
                    fired.push(id);
                }
                batch.extend(bound);
            }

            for id in self.delayed.ids().to_vec() {
                let Some(trigger) = self.triggers.get(&id) else {
                    continue;
                };
                if trigger.controller(state) != Some(player)
                    || self.is_suppressed(trigger.mode())
                    || !trigger.eligible(state, event)
                {
                    continue;
                }
                let bound = self.fire(state, id, event, 1);
                if !bound.is_empty() {
                    fired.push(id);
                }
                batch.extend(bound);
                self.delayed.remove(id);
                self.triggers.remove(&id);
                debug!(trigger = %id, "delayed trigger used up");
            }

            if batch.is_empty() {
                continue;
            }
            if batch.len() > 1 {
                batch = order_batch(state, collab, player, batch);
            }
            for bound in batch {
                trace!(trigger = %bound.trigger_id, player = %player, "pushed to stack");
                state.stack.push(bound);
            }
        }

        for id in &fired {
            if self.triggers.get(id).is_some_and(|t| t.one_off) {
                self.remove_trigger(state, *id);
            }
        }

        !fired.is_empty() || event.enters_zone(state.config().trigger_zone)
    }

    /// Listed triggers plus those of cards the event moved, so a card that
    /// just left a trigger zone can still see its own departure.
    fn with_look_back(&self, state: &GameState, event: &GameEvent, listed: &[TriggerId]) -> Vec<TriggerId> {
        let mut candidates = listed.to_vec();
        for entity in event.moved_cards() {
            let Some(card) = state.card(entity) else {
                continue;
            };
            for &id in &card.triggers {
                if !candidates.contains(&id) {
                    candidates.push(id);
                }
            }
        }
        candidates
    }

    /// Bind up to `copies` firings of one trigger, stopping at its ceiling.
    fn fire(&mut self, state: &GameState, id: TriggerId, event: &GameEvent, copies: u32) -> Vec<BoundAbility> {
        let mut out = Vec::new();
        let Some(trigger) = self.triggers.get_mut(&id) else {
            return out;
        };
        for _ in 0..copies {
            if !trigger.under_ceiling() {
                break;
            }
            match trigger.bind(state, event) {
                Ok(bound) => {
                    trigger.record_firing(event, &bound);
                    debug!(trigger = %id, mode = %bound.mode, activator = %bound.activator, "trigger fired");
                    out.push(bound);
                }
                Err(err) => {
                    warn!(trigger = %id, error = %err, "trigger firing aborted");
                    break;
                }
            }
        }
        out
    }

    // === Persistence ===

    #[must_use]
    pub fn snapshot(&self) -> TriggerSnapshot {
        let mut delayed_ids: Vec<TriggerId> = self.delayed.ids().to_vec();
        let held = self.delayed.held();
        delayed_ids.extend(held.iter().flat_map(|(_, ids)| ids.iter().copied()));
        let delayed_set: FxHashSet<TriggerId> = delayed_ids.iter().copied().collect();

        let mut instances: Vec<InstanceState> = self
            .triggers
            .values()
            .filter(|t| !delayed_set.contains(&t.id))
            .map(|t| InstanceState {
                id: t.id,
                suppressed: t.is_suppressed(),
                activations: t.activations_this_turn(),
            })
            .collect();
        instances.sort_by_key(|s| s.id);

        let delayed = delayed_ids
            .iter()
            .filter_map(|id| self.triggers.get(id))
            .filter_map(|t| {
                Some(DelayedRecord {
                    id: t.id,
                    host: t.host,
                    controller: t.controller_override?,
                    declaration: t.params.to_declaration(),
                    ability: match t.action() {
                        TriggerAction::Ability(ability) => Some(ability.clone()),
                        TriggerAction::Execute(_) => None,
                    },
                    activations: t.activations_this_turn(),
                    suppressed: t.is_suppressed(),
                })
            })
            .collect();

        TriggerSnapshot {
            instances,
            delayed,
            this_turn: self.delayed.this_turn_ids().to_vec(),
            player_delayed: held,
            suppressed_modes: self.suppressed_modes.iter().copied().collect(),
            suppress_all: self.suppress_all,
            next_id: self.next_id,
        }
    }

    /// Apply a snapshot.
    ///
    /// Card triggers must already have been re-created from card text, in
    /// the same order as the saved game, so their ids line up. Delayed
    /// triggers and the waiting queue are replaced.
    pub fn restore(&mut self, config: &GameConfig, snapshot: &TriggerSnapshot) -> Result<(), TriggerError> {
        for id in self.delayed.ids().to_vec() {
            self.triggers.remove(&id);
        }
        for (_, held) in self.delayed.held() {
            for id in held {
                self.triggers.remove(&id);
            }
        }
        self.delayed.clear();
        self.waiting.clear();

        for saved in &snapshot.instances {
            if let Some(trigger) = self.triggers.get_mut(&saved.id) {
                trigger.set_suppressed(saved.suppressed);
                trigger.set_activations_this_turn(saved.activations);
            } else {
                warn!(trigger = %saved.id, "snapshot names a trigger that was not re-created");
            }
        }

        let held: FxHashMap<TriggerId, PlayerId> = snapshot
            .player_delayed
            .iter()
            .flat_map(|(player, ids)| ids.iter().map(move |id| (*id, *player)))
            .collect();
        for record in &snapshot.delayed {
            let params = ParamMap::parse(&record.declaration)?;
            let mut trigger = build_delayed(
                record.id,
                params,
                record.host,
                record.controller,
                config,
                record.ability.clone(),
            )?;
            trigger.set_activations_this_turn(record.activations);
            trigger.set_suppressed(record.suppressed);

            if let Some(player) = held.get(&record.id) {
                self.register_player_delayed(*player, trigger);
            } else if snapshot.this_turn.contains(&record.id) {
                self.register_this_turn_delayed(trigger);
            } else {
                self.register_delayed(trigger);
            }
        }

        self.suppressed_modes = snapshot.suppressed_modes.iter().copied().collect();
        self.suppress_all = snapshot.suppress_all;
        self.next_id = self.next_id.max(snapshot.next_id);
        Ok(())
    }
}

fn build_delayed(
    id: TriggerId,
    params: ParamMap,
    host: EntityId,
    controller: PlayerId,
    config: &GameConfig,
    ability: Option<Ability>,
) -> Result<Trigger, TriggerError> {
    // Delayed triggers always use the stack.
    if params.is_true("Static") {
        return Err(TriggerError::invalid("Static", params.get("Static").unwrap_or_default()));
    }
    let zoned = params.contains("TriggerZones");
    let mut trigger = Trigger::from_params(id, params, host, config, ability.map(TriggerAction::Ability))?;
    trigger.controller_override = Some(controller);
    trigger.intrinsic = false;
    if !zoned {
        trigger.valid_zones.clear();
    }
    Ok(trigger)
}

/// Ask `player` to order their simultaneous triggers. A reply that isn't a
/// permutation keeps the default order.
fn order_batch(
    state: &GameState,
    collab: &mut Collaborators<'_>,
    player: PlayerId,
    batch: Vec<BoundAbility>,
) -> Vec<BoundAbility> {
    let order = collab.decider.order_simultaneous(state, player, &batch);
    let mut seen = vec![false; batch.len()];
    let valid = order.len() == batch.len()
        && order
            .iter()
            .all(|&i| i < seen.len() && !std::mem::replace(&mut seen[i], true));
    if !valid {
        warn!(player = %player, ?order, "ignoring invalid trigger order");
        return batch;
    }
    let mut slots: Vec<Option<BoundAbility>> = batch.into_iter().map(Some).collect();
    order.into_iter().filter_map(|i| slots[i].take()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardInstance, CardType};
    use crate::core::{phases, zones};
    use crate::rules::{AcceptAll, DeclineAll, RecordingExecutor};
    use crate::zones::ZoneMove;

    fn setup() -> (GameState, TriggerHandler) {
        (GameState::new(GameConfig::standard(2)), TriggerHandler::new())
    }

    fn creature(state: &mut GameState, name: &str, owner: u8, zone: crate::core::ZoneId) -> EntityId {
        let id = state.alloc_entity();
        state.add_card(
            CardInstance::new(id, name, PlayerId::new(owner), zone)
                .with_type(CardType::Creature)
                .with_svar("TrigDraw", "DB$ Draw | NumCards$ 1")
                .with_svar("TrigGain", "DB$ GainLife | LifeAmount$ 1"),
        );
        id
    }

    fn raise(handler: &mut TriggerHandler, state: &mut GameState, event: GameEvent) -> RecordingExecutor {
        let mut executor = RecordingExecutor::new();
        let mut decider = AcceptAll;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        handler.raise(state, &mut collab, event, false);
        executor
    }

    fn move_event(state: &mut GameState, card: EntityId, to: crate::core::ZoneId) -> GameEvent {
        let moved = state.move_card(card, to).unwrap();
        GameEvent::zone_change(moved)
    }

    #[test]
    fn test_ids_start_at_one() {
        let (mut state, mut handler) = setup();
        let host = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let a = handler.create_trigger(&mut state, host, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        let b = handler.create_trigger(&mut state, host, "Mode$ Taps | ValidCard$ Card.Self | Execute$ TrigGain").unwrap();

        assert_eq!(a, TriggerId::new(1));
        assert_eq!(b, TriggerId::new(2));
        assert_eq!(state.card(host).unwrap().triggers, vec![a, b]);

        handler.reset_for_match();
        assert!(handler.is_empty());
        let c = handler.create_trigger(&mut state, host, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        assert_eq!(c, TriggerId::new(1));
    }

    #[test]
    fn test_authoring_error_consumes_no_id() {
        let (mut state, mut handler) = setup();
        let host = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);

        assert_eq!(
            handler.create_trigger(&mut state, host, "Execute$ TrigGain"),
            Err(TriggerError::MissingMode)
        );
        assert!(matches!(
            handler.create_trigger(&mut state, EntityId(99), "Mode$ Drawn | Execute$ X"),
            Err(TriggerError::UnknownEntity(_))
        ));
        let id = handler.create_trigger(&mut state, host, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        assert_eq!(id, TriggerId::new(1));
    }

    #[test]
    fn test_rebuild_follows_zones() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let held = creature(&mut state, "Held", 0, zones::HAND);
        let a = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler.create_trigger(&mut state, held, "Mode$ Drawn | Execute$ TrigGain").unwrap();

        handler.rebuild_active_set(&state);
        assert_eq!(handler.active_ids(), vec![a]);

        state.move_card(held, zones::BATTLEFIELD).unwrap();
        state.move_card(bear, zones::GRAVEYARD).unwrap();
        handler.rebuild_active_set(&state);
        assert_eq!(handler.active_ids(), vec![TriggerId::new(2)]);
    }

    #[test]
    #[should_panic(expected = "attached more than once")]
    fn test_duplicate_attachment_panics() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let id = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        state.card_mut(bear).unwrap().triggers.push(id);
        handler.rebuild_active_set(&state);
    }

    #[test]
    fn test_apnap_order_on_stack() {
        let (mut state, mut handler) = setup();
        let mine = creature(&mut state, "Mine", 0, zones::BATTLEFIELD);
        let theirs = creature(&mut state, "Theirs", 1, zones::BATTLEFIELD);
        // Registered non-active player first.
        let t_theirs = handler.create_trigger(&mut state, theirs, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        let t_mine = handler.create_trigger(&mut state, mine, "Mode$ Drawn | Execute$ TrigDraw").unwrap();
        handler.rebuild_active_set(&state);

        raise(&mut handler, &mut state, GameEvent::drawn(mine, PlayerId::new(0), 1));

        let stacked: Vec<TriggerId> = state.stack.entries().iter().map(|e| e.ability.trigger_id).collect();
        assert_eq!(stacked, vec![t_mine, t_theirs]);
    }

    #[test]
    fn test_static_executes_before_stack() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigDraw").unwrap();
        let stat = handler
            .create_trigger(&mut state, bear, "Mode$ Drawn | Static$ True | Execute$ TrigGain")
            .unwrap();
        handler.rebuild_active_set(&state);

        let mut stack_len_at_static = None;
        let mut executor = |s: &mut GameState, b: &BoundAbility| -> Result<(), TriggerError> {
            assert_eq!(b.trigger_id, stat);
            stack_len_at_static = Some(s.stack.len());
            Ok(())
        };
        let mut decider = AcceptAll;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        handler.raise(&mut state, &mut collab, GameEvent::drawn(bear, PlayerId::new(0), 1), false);
        drop(collab);

        assert_eq!(stack_len_at_static, Some(0));
        assert_eq!(state.stack.len(), 1);
    }

    #[test]
    fn test_declined_static_does_not_count() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let id = handler
            .create_trigger(
                &mut state,
                bear,
                "Mode$ Drawn | Static$ True | OptionalDecider$ You | Execute$ TrigGain",
            )
            .unwrap();
        handler.rebuild_active_set(&state);

        let mut executor = RecordingExecutor::new();
        let mut decider = DeclineAll;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        handler.raise(&mut state, &mut collab, GameEvent::drawn(bear, PlayerId::new(0), 1), false);

        assert!(executor.log.is_empty());
        assert_eq!(handler.get(id).unwrap().activations_this_turn(), 0);
    }

    #[test]
    fn test_state_trigger_not_duplicated_while_pending() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        handler.create_trigger(&mut state, bear, "Mode$ Always | Execute$ TrigGain").unwrap();
        handler.rebuild_active_set(&state);

        state.stack.freeze();
        raise(&mut handler, &mut state, GameEvent::state_check());
        raise(&mut handler, &mut state, GameEvent::state_check());

        assert_eq!(state.stack.len(), 1);
        assert_eq!(handler.waiting_len(), 0);
    }

    #[test]
    fn test_frozen_stack_queues() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler.rebuild_active_set(&state);

        state.stack.freeze();
        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(0), 1));
        assert!(state.stack.is_empty());
        assert_eq!(handler.waiting_len(), 1);

        let mut executor = RecordingExecutor::new();
        let mut decider = AcceptAll;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        handler.unfreeze_stack(&mut state, &mut collab);

        assert_eq!(state.stack.len(), 1);
        assert_eq!(handler.waiting_len(), 0);
    }

    #[test]
    fn test_clear_waiting_discards() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler.rebuild_active_set(&state);

        let mut executor = RecordingExecutor::new();
        let mut decider = AcceptAll;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        handler.raise(&mut state, &mut collab, GameEvent::drawn(bear, PlayerId::new(0), 1), true);
        assert_eq!(handler.clear_waiting(), 1);
        assert!(!handler.drain_waiting(&mut state, &mut collab));
        assert!(state.stack.is_empty());
    }

    #[test]
    fn test_look_back_leaves_battlefield() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let dies = handler
            .create_trigger(
                &mut state,
                bear,
                "Mode$ ChangesZone | Origin$ Battlefield | Destination$ Graveyard | ValidCard$ Card.Self | Execute$ TrigDraw",
            )
            .unwrap();
        handler.rebuild_active_set(&state);

        let event = move_event(&mut state, bear, zones::GRAVEYARD);
        handler.rebuild_active_set(&state);
        assert!(handler.active_ids().is_empty());

        raise(&mut handler, &mut state, event);
        assert_eq!(state.stack.len(), 1);
        assert_eq!(state.stack.peek_top().unwrap().ability.trigger_id, dies);
    }

    #[test]
    fn test_one_off_removed_after_firing() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let id = handler
            .create_trigger(&mut state, bear, "Mode$ Drawn | OneOff$ True | Execute$ TrigGain")
            .unwrap();
        handler.rebuild_active_set(&state);

        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(0), 1));
        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(0), 1));

        assert_eq!(state.stack.len(), 1);
        assert!(handler.get(id).is_none());
        assert!(state.card(bear).unwrap().triggers.is_empty());
    }

    #[test]
    fn test_missing_svar_is_contained() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ Nowhere").unwrap();
        let good = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler.rebuild_active_set(&state);

        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(0), 1));

        assert_eq!(state.stack.len(), 1);
        assert_eq!(state.stack.peek_top().unwrap().ability.trigger_id, good);
    }

    #[test]
    fn test_multiplier_extra_firing() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::HAND);
        let harmonicon = state.create_card("Harmonicon", PlayerId::new(0), zones::BATTLEFIELD);
        state.rules.multipliers.push(crate::rules::TriggerMultiplier::new(
            harmonicon,
            vec![TriggerMode::ChangesZone],
            1,
        ));
        let watcher = creature(&mut state, "Watcher", 0, zones::BATTLEFIELD);
        handler
            .create_trigger(
                &mut state,
                watcher,
                "Mode$ ChangesZone | Destination$ Battlefield | ValidCard$ Creature.Other | Execute$ TrigGain",
            )
            .unwrap();
        handler.rebuild_active_set(&state);

        let event = move_event(&mut state, bear, zones::BATTLEFIELD);
        raise(&mut handler, &mut state, event);
        assert_eq!(state.stack.len(), 2);
    }

    #[test]
    fn test_multiplier_respects_ceiling() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::HAND);
        let harmonicon = state.create_card("Harmonicon", PlayerId::new(0), zones::BATTLEFIELD);
        state.rules.multipliers.push(crate::rules::TriggerMultiplier::new(
            harmonicon,
            vec![TriggerMode::ChangesZone],
            2,
        ));
        let watcher = creature(&mut state, "Watcher", 0, zones::BATTLEFIELD);
        handler
            .create_trigger(
                &mut state,
                watcher,
                "Mode$ ChangesZone | Destination$ Battlefield | ActivationLimit$ 2 | Execute$ TrigGain",
            )
            .unwrap();
        handler.rebuild_active_set(&state);

        let event = move_event(&mut state, bear, zones::BATTLEFIELD);
        raise(&mut handler, &mut state, event);
        assert_eq!(state.stack.len(), 2);
    }

    #[test]
    fn test_disabled_creature_etb() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::HAND);
        handler
            .create_trigger(
                &mut state,
                bear,
                "Mode$ ChangesZone | Destination$ Battlefield | ValidCard$ Card.Self | Execute$ TrigGain",
            )
            .unwrap();
        state.rules.creature_etb_triggers_disabled = true;

        let event = move_event(&mut state, bear, zones::BATTLEFIELD);
        handler.rebuild_active_set(&state);
        let check = {
            let mut executor = RecordingExecutor::new();
            let mut decider = AcceptAll;
            let mut collab = Collaborators::new(&mut executor, &mut decider);
            handler.raise(&mut state, &mut collab, event, false)
        };

        assert!(state.stack.is_empty());
        // Something still entered the battlefield.
        assert!(check);
    }

    #[test]
    fn test_order_simultaneous() {
        struct Reverse;
        impl crate::rules::DecisionMaker for Reverse {
            fn confirm_optional(&mut self, _: &GameState, _: PlayerId, _: &BoundAbility) -> bool {
                true
            }
            fn order_simultaneous(&mut self, _: &GameState, _: PlayerId, a: &[BoundAbility]) -> Vec<usize> {
                (0..a.len()).rev().collect()
            }
        }

        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let first = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        let second = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigDraw").unwrap();
        handler.rebuild_active_set(&state);

        let mut executor = RecordingExecutor::new();
        let mut decider = Reverse;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        handler.raise(&mut state, &mut collab, GameEvent::drawn(bear, PlayerId::new(0), 1), false);

        let stacked: Vec<TriggerId> = state.stack.entries().iter().map(|e| e.ability.trigger_id).collect();
        assert_eq!(stacked, vec![second, first]);
    }

    #[test]
    fn test_invalid_order_falls_back() {
        struct Repeat;
        impl crate::rules::DecisionMaker for Repeat {
            fn confirm_optional(&mut self, _: &GameState, _: PlayerId, _: &BoundAbility) -> bool {
                true
            }
            fn order_simultaneous(&mut self, _: &GameState, _: PlayerId, a: &[BoundAbility]) -> Vec<usize> {
                vec![0; a.len()]
            }
        }

        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let first = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        let second = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigDraw").unwrap();
        handler.rebuild_active_set(&state);

        let mut executor = RecordingExecutor::new();
        let mut decider = Repeat;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        handler.raise(&mut state, &mut collab, GameEvent::drawn(bear, PlayerId::new(0), 1), false);

        let stacked: Vec<TriggerId> = state.stack.entries().iter().map(|e| e.ability.trigger_id).collect();
        assert_eq!(stacked, vec![first, second]);
    }

    #[test]
    fn test_phase_gate_and_player_turn() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 1, zones::BATTLEFIELD);
        handler
            .create_trigger(
                &mut state,
                bear,
                "Mode$ Drawn | Phase$ Main1 | PlayerTurn$ True | Execute$ TrigGain",
            )
            .unwrap();
        handler.rebuild_active_set(&state);

        state.public.phase = phases::MAIN1;
        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(1), 1));
        assert!(state.stack.is_empty(), "not player 1's turn");

        state.public.active_player = PlayerId::new(1);
        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(1), 1));
        assert_eq!(state.stack.len(), 1);
    }

    #[test]
    fn test_grants() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let printed = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        let until_eot = handler
            .grant_trigger(&mut state, bear, "Mode$ Taps | ValidCard$ Card.Self | Execute$ TrigDraw", true)
            .unwrap();
        let lasting = handler
            .grant_trigger(&mut state, bear, "Mode$ Untaps | ValidCard$ Card.Self | Execute$ TrigDraw", false)
            .unwrap();
        assert!(!handler.get(until_eot).unwrap().intrinsic);

        assert_eq!(handler.clear_temporary_grants(&mut state), 1);
        assert_eq!(state.card(bear).unwrap().triggers, vec![printed, lasting]);
    }

    #[test]
    fn test_copy_triggers() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let clone = creature(&mut state, "Clone", 1, zones::BATTLEFIELD);
        handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler
            .grant_trigger(&mut state, bear, "Mode$ Taps | ValidCard$ Card.Self | Execute$ TrigDraw", false)
            .unwrap();

        let copied = handler.copy_triggers(&mut state, bear, clone).unwrap();
        assert_eq!(copied.len(), 1);
        let copy = handler.get(copied[0]).unwrap();
        assert_eq!(copy.host, clone);
        assert_eq!(copy.mode(), TriggerMode::Drawn);
        assert_eq!(state.card(clone).unwrap().triggers, copied);
    }

    #[test]
    fn test_delayed_fires_once() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let ability = Ability::parse("DB$ Sacrifice | Defined$ Self", bear).unwrap();
        let trigger = handler
            .delayed_trigger(state.config(), bear, PlayerId::new(0), "Mode$ Phase | Phase$ EndOfTurn", Some(ability))
            .unwrap();
        let id = handler.register_delayed(trigger);

        state.move_card(bear, zones::EXILE).unwrap();
        raise(&mut handler, &mut state, GameEvent::phase(phases::END_OF_TURN, PlayerId::new(0)));
        raise(&mut handler, &mut state, GameEvent::phase(phases::END_OF_TURN, PlayerId::new(0)));

        assert_eq!(state.stack.len(), 1);
        assert_eq!(state.stack.peek_top().unwrap().ability.trigger_id, id);
        assert!(!handler.delayed().contains(id));
        assert!(handler.get(id).is_none());
    }

    #[test]
    fn test_static_delayed_rejected() {
        let (state, mut handler) = setup();
        let result = handler.delayed_trigger(
            state.config(),
            EntityId(7),
            PlayerId::new(0),
            "Mode$ TurnBegin | Static$ True | Execute$ TrigGain",
            None,
        );

        assert!(matches!(result, Err(TriggerError::InvalidParam { ref param, .. }) if param == "Static"));
        let next = handler
            .delayed_trigger(state.config(), EntityId(7), PlayerId::new(0), "Mode$ TurnBegin | Execute$ TrigGain", None)
            .unwrap();
        assert_eq!(next.id, TriggerId::new(1));
    }

    #[test]
    fn test_delayed_scopes() {
        let (state, mut handler) = setup();
        let host = EntityId(7);
        let decl = "Mode$ TurnBegin | Execute$ TrigGain";
        let config = state.config().clone();

        let t = handler.delayed_trigger(&config, host, PlayerId::new(0), decl, None).unwrap();
        let this_turn = handler.register_this_turn_delayed(t);
        let t = handler.delayed_trigger(&config, host, PlayerId::new(1), decl, None).unwrap();
        let held = handler.register_player_delayed(PlayerId::new(1), t);
        let t = handler.delayed_trigger(&config, EntityId(8), PlayerId::new(0), decl, None).unwrap();
        let other = handler.register_delayed(t);

        assert_eq!(handler.clear_this_turn_delayed(), 1);
        assert!(handler.get(this_turn).is_none());

        assert_eq!(handler.release_player_delayed(PlayerId::new(1)), 1);
        assert!(handler.delayed().contains(held));

        assert_eq!(handler.clear_delayed_for_host(host), 1);
        assert_eq!(handler.delayed().ids(), &[other]);
    }

    #[test]
    fn test_suppress_all() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler.rebuild_active_set(&state);

        handler.suppress_all(true);
        assert!(handler.is_suppressed(TriggerMode::Always));
        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(0), 1));
        assert!(state.stack.is_empty());

        handler.suppress_all(false);
        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(0), 1));
        assert_eq!(state.stack.len(), 1);
    }

    #[test]
    fn test_instance_suppression() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let id = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler.rebuild_active_set(&state);

        assert!(handler.set_instance_suppressed(id, true));
        assert!(!handler.set_instance_suppressed(TriggerId::new(42), true));
        raise(&mut handler, &mut state, GameEvent::drawn(bear, PlayerId::new(0), 1));
        assert!(state.stack.is_empty());
    }

    #[test]
    fn test_describe_active() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let id = handler
            .create_trigger(
                &mut state,
                bear,
                "Mode$ Drawn | Execute$ TrigGain | TriggerDescription$ Whenever you draw, gain 1 life.",
            )
            .unwrap();
        handler.rebuild_active_set(&state);

        assert_eq!(
            handler.describe_active(),
            vec![(id, "Whenever you draw, gain 1 life.".to_string())]
        );
    }

    #[test]
    fn test_snapshot_restore() {
        let (mut state, mut handler) = setup();
        let bear = creature(&mut state, "Bear", 0, zones::BATTLEFIELD);
        let card_trigger = handler.create_trigger(&mut state, bear, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        handler.set_instance_suppressed(card_trigger, true);
        handler.get_mut(card_trigger).unwrap().set_activations_this_turn(3);

        let ability = Ability::parse("DB$ Draw", bear).unwrap();
        let t = handler
            .delayed_trigger(state.config(), bear, PlayerId::new(1), "Mode$ TurnBegin", Some(ability))
            .unwrap();
        let delayed = handler.register_this_turn_delayed(t);
        handler.suppress(TriggerMode::ChangesZone);

        let bytes = handler.snapshot().to_bytes().unwrap();

        // A reloaded game re-creates card triggers first.
        let mut state2 = GameState::new(GameConfig::standard(2));
        let bear2 = creature(&mut state2, "Bear", 0, zones::BATTLEFIELD);
        let mut restored = TriggerHandler::new();
        restored.create_trigger(&mut state2, bear2, "Mode$ Drawn | Execute$ TrigGain").unwrap();
        restored
            .restore(state2.config(), &TriggerSnapshot::from_bytes(&bytes).unwrap())
            .unwrap();

        let t = restored.get(card_trigger).unwrap();
        assert!(t.is_suppressed());
        assert_eq!(t.activations_this_turn(), 3);
        assert_eq!(restored.delayed().this_turn_ids(), &[delayed]);
        assert_eq!(restored.get(delayed).unwrap().controller_override, Some(PlayerId::new(1)));
        assert!(restored.is_suppressed(TriggerMode::ChangesZone));
        assert_eq!(restored.snapshot(), handler.snapshot());
    }

    #[test]
    fn test_hold_collects_batch() {
        let (mut state, mut handler) = setup();
        let a = creature(&mut state, "A", 0, zones::BATTLEFIELD);
        let b = creature(&mut state, "B", 0, zones::BATTLEFIELD);
        let watcher = state.create_card("Watcher", PlayerId::new(0), zones::BATTLEFIELD);
        state
            .card_mut(watcher)
            .unwrap()
            .svars
            .insert("TrigCount".into(), "DB$ Draw".into());
        handler
            .create_trigger(
                &mut state,
                watcher,
                "Mode$ ChangesZoneAll | Origin$ Battlefield | Destination$ Graveyard | ValidCards$ Creature | Execute$ TrigCount",
            )
            .unwrap();
        handler.rebuild_active_set(&state);

        let mut executor = RecordingExecutor::new();
        let mut decider = AcceptAll;
        let mut collab = Collaborators::new(&mut executor, &mut decider);
        for card in [a, b] {
            let moved: ZoneMove = state.move_card(card, zones::GRAVEYARD).unwrap();
            handler.raise(&mut state, &mut collab, GameEvent::zone_change(moved), true);
        }
        assert!(state.stack.is_empty());
        handler.drain_waiting(&mut state, &mut collab);

        assert_eq!(state.stack.len(), 1);
        let objects = &state.stack.peek_top().unwrap().ability.triggered_objects;
        assert_eq!(
            objects.get(&crate::triggers::RunParam::Cards),
            Some(&crate::triggers::EventValue::Entities(vec![a, b]))
        );
    }
}
