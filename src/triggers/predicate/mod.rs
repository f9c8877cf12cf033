//! Condition predicates.
//!
//! One predicate per trigger mode family. A predicate is built from the
//! declaration's parameters when the trigger is constructed (bad parameters
//! fail there) and afterwards answers two questions about raised events:
//! does this event match, and which objects does the fired ability bind.
//!
//! Predicates only read game state. Their own bookkeeping, such as the
//! causes already seen by `OncePerEffect$`, is updated through
//! [`ConditionPredicate::note_fired`] after the handler decides to fire.
//!
//! ## Key Components
//!
//! - [`ConditionPredicate`]: the per-mode trait
//! - [`PredicateContext`]: host, controller and state for one evaluation
//! - [`OncePerEffect`]: shared de-duplication keyed by [`RunParam::Cause`]

use std::fmt;

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::trace;

use crate::cards::{CardFilter, CardInstance, PlayerFilter};
use crate::core::{EntityId, GameConfig, GameState, PhaseId, PlayerId, TriggerError, ZoneId};

use super::event::{GameEvent, RunParam, TriggeredObjects};
use super::params::ParamMap;

pub mod cards;
pub mod cast;
pub mod combat;
pub mod counters;
pub mod damage;
pub mod life;
pub mod permanent;
pub mod phase;
pub mod state;
pub mod zone_change;

/// What a predicate may look at while evaluating one event.
#[derive(Clone, Copy)]
pub struct PredicateContext<'a> {
    pub state: &'a GameState,
    /// Card carrying the trigger.
    pub host: EntityId,
    /// Player the trigger fires for.
    pub controller: PlayerId,
}

impl<'a> PredicateContext<'a> {
    pub fn new(state: &'a GameState, host: EntityId, controller: PlayerId) -> Self {
        Self {
            state,
            host,
            controller,
        }
    }

    #[must_use]
    pub fn card(&self, entity: EntityId) -> Option<&'a CardInstance> {
        self.state.card(entity)
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.state.public.active_player
    }

    /// Does the card under `key` pass `filter`? No filter always passes;
    /// a filter with no card to look at does not.
    #[must_use]
    pub fn card_passes(&self, filter: Option<&CardFilter>, entity: Option<EntityId>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        let Some(card) = entity.and_then(|e| self.card(e)) else {
            trace!(host = %self.host, "filter has no card to check");
            return false;
        };
        filter.matches(card, self.host, self.controller)
    }

    /// Does `player` pass `filter`? No filter always passes.
    #[must_use]
    pub fn player_passes(&self, filter: Option<PlayerFilter>, player: Option<PlayerId>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        player.is_some_and(|p| filter.matches(p, self.controller, self.active_player()))
    }
}

/// Per-mode matching logic.
pub trait ConditionPredicate: fmt::Debug + Send + Sync {
    /// Does `event` satisfy this predicate's declared filters?
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool;

    /// Objects bound into the fired ability. Defaults to the whole payload.
    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        event.params.clone()
    }

    /// Reminder-text style description, e.g. "When this dies".
    fn description(&self) -> String;

    /// Called once per firing, after the handler commits to it.
    fn note_fired(&mut self, _event: &GameEvent) {}

    /// Clear per-turn de-duplication state.
    fn reset_turn_state(&mut self) {}

    /// Whether a host that just left one of the trigger's zones should still
    /// be evaluated for the event that moved it.
    fn uses_look_back(&self) -> bool {
        false
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate>;
}

impl Clone for Box<dyn ConditionPredicate> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// `OncePerEffect$ True`: fire at most once per causing effect.
///
/// Events without a [`RunParam::Cause`] are never de-duplicated.
#[derive(Clone, Debug, Default)]
pub struct OncePerEffect {
    enabled: bool,
    seen: FxHashSet<i64>,
}

impl OncePerEffect {
    #[must_use]
    pub fn from_params(params: &ParamMap) -> Self {
        Self {
            enabled: params.is_true("OncePerEffect"),
            seen: FxHashSet::default(),
        }
    }

    #[must_use]
    pub fn allows(&self, event: &GameEvent) -> bool {
        if !self.enabled {
            return true;
        }
        event
            .int(RunParam::Cause)
            .is_none_or(|cause| !self.seen.contains(&cause))
    }

    pub fn record(&mut self, event: &GameEvent) {
        if self.enabled {
            if let Some(cause) = event.int(RunParam::Cause) {
                self.seen.insert(cause);
            }
        }
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }
}

// === Parameter helpers ===

/// Comma-separated zone names. `Any` (or absence) means unrestricted.
pub fn parse_zones(
    params: &ParamMap,
    key: &str,
    config: &GameConfig,
) -> Result<Option<SmallVec<[ZoneId; 2]>>, TriggerError> {
    let Some(raw) = params.get(key) else {
        return Ok(None);
    };
    if raw.eq_ignore_ascii_case("Any") {
        return Ok(None);
    }
    let mut zones = SmallVec::new();
    for name in raw.split(',') {
        let zone = config
            .zone_named(name.trim())
            .ok_or_else(|| TriggerError::invalid(key, raw))?;
        zones.push(zone);
    }
    Ok(Some(zones))
}

/// Comma-separated phase names; an item may be a `First->Last` range.
pub fn parse_phases(raw: &str, config: &GameConfig) -> Result<Vec<PhaseId>, TriggerError> {
    let mut phases = Vec::new();
    for item in raw.split(',') {
        let item = item.trim();
        if let Some((first, last)) = item.split_once("->") {
            let first = config
                .phase_named(first.trim())
                .ok_or_else(|| TriggerError::invalid("Phase", raw))?;
            let last = config
                .phase_named(last.trim())
                .ok_or_else(|| TriggerError::invalid("Phase", raw))?;
            let range = config
                .phase_range(first, last)
                .ok_or_else(|| TriggerError::invalid("Phase", raw))?;
            phases.extend(range);
        } else {
            let phase = config
                .phase_named(item)
                .ok_or_else(|| TriggerError::invalid("Phase", raw))?;
            phases.push(phase);
        }
    }
    Ok(phases)
}

/// Copy the listed payload keys that are present.
#[must_use]
pub fn pick(event: &GameEvent, keys: &[RunParam]) -> TriggeredObjects {
    keys.iter()
        .filter_map(|&k| event.get(k).map(|v| (k, v.clone())))
        .collect()
}

/// Player subject for descriptions.
pub(crate) fn player_phrase(filter: Option<PlayerFilter>) -> &'static str {
    match filter {
        Some(PlayerFilter::You) => "you",
        Some(PlayerFilter::Opponent) => "an opponent",
        Some(PlayerFilter::Active) => "the active player",
        Some(PlayerFilter::NonActive) => "a nonactive player",
        Some(PlayerFilter::Any) | None => "a player",
    }
}

/// "a card"/"this" style subject for descriptions.
pub(crate) fn subject(filter: Option<&CardFilter>) -> String {
    match filter {
        Some(f) if f.is_self_only() => "this".to_string(),
        Some(f) => format!("a {}", f),
        None => "a card".to_string(),
    }
}
