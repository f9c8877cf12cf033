//! Global rule overrides consulted during trigger detection.
//!
//! ## Trigger multipliers
//!
//! A [`TriggerMultiplier`] makes matching triggers fire extra times for the
//! same event ("an artifact or creature entering the battlefield causes a
//! triggered ability of a permanent you control to trigger an additional
//! time"). A multiplier only counts while its source permanent is in the
//! trigger zone.

use serde::{Deserialize, Serialize};

use crate::cards::CardFilter;
use crate::core::{EntityId, GameState, PlayerId};
use crate::triggers::{GameEvent, RunParam, TriggerMode};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerMultiplier {
    /// Permanent granting the effect.
    pub source: EntityId,

    /// Player whose triggers are multiplied. `None` means the source's controller.
    pub controller: Option<PlayerId>,

    /// Trigger modes affected.
    pub modes: Vec<TriggerMode>,

    /// Card the event must be about, seen from the source.
    pub event_card: Option<CardFilter>,

    /// Additional firings granted.
    pub extra: u32,
}

impl TriggerMultiplier {
    pub fn new(source: EntityId, modes: Vec<TriggerMode>, extra: u32) -> Self {
        Self {
            source,
            controller: None,
            modes,
            event_card: None,
            extra,
        }
    }

    /// Restrict to events about cards passing `filter` (builder pattern).
    #[must_use]
    pub fn with_event_card(mut self, filter: CardFilter) -> Self {
        self.event_card = Some(filter);
        self
    }

    /// Fix the affected player (builder pattern).
    #[must_use]
    pub fn with_controller(mut self, player: PlayerId) -> Self {
        self.controller = Some(player);
        self
    }

    fn applies(&self, state: &GameState, controller: PlayerId, mode: TriggerMode, event: &GameEvent) -> bool {
        if !self.modes.contains(&mode) {
            return false;
        }
        if state.zone_of(self.source) != Some(state.config().trigger_zone) {
            return false;
        }
        let Some(owner) = self.controller.or_else(|| state.controller_of(self.source)) else {
            return false;
        };
        if owner != controller {
            return false;
        }
        let Some(filter) = &self.event_card else {
            return true;
        };
        let mut cards = event.entities(RunParam::Card);
        cards.extend(event.entities(RunParam::Cards));
        cards
            .into_iter()
            .filter_map(|e| state.card(e))
            .any(|card| filter.matches(card, self.source, owner))
    }
}

/// Rule changes in effect for the whole game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOverrides {
    /// Creatures entering the trigger zone don't cause abilities to trigger.
    pub creature_etb_triggers_disabled: bool,

    pub multipliers: Vec<TriggerMultiplier>,
}

impl RuleOverrides {
    /// Extra firings for a `mode` trigger controlled by `controller`.
    #[must_use]
    pub fn extra_firings(&self, state: &GameState, controller: PlayerId, mode: TriggerMode, event: &GameEvent) -> u32 {
        self.multipliers
            .iter()
            .filter(|m| m.applies(state, controller, mode, event))
            .map(|m| m.extra)
            .sum()
    }

    /// Drop every multiplier granted by `source`.
    pub fn remove_multipliers_from(&mut self, source: EntityId) {
        self.multipliers.retain(|m| m.source != source);
    }
}
