//! Trigger modes and the predicate constructor table.
//!
//! Every event kind the engine understands is a [`TriggerMode`]. Each mode
//! maps to exactly one constructor that turns a declaration's parameters
//! into a boxed [`ConditionPredicate`]. The table is a `match`, so adding a
//! mode without a predicate is a compile error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::config::GameConfig;
use crate::core::error::TriggerError;

use super::params::ParamMap;
use super::predicate::{
    cards, cast, combat, counters, damage, life, permanent, phase, state, zone_change,
    ConditionPredicate,
};

/// Builds the predicate for one mode from a declaration's parameters.
pub type PredicateCtor =
    fn(TriggerMode, &ParamMap, &GameConfig) -> Result<Box<dyn ConditionPredicate>, TriggerError>;

/// Kind of event a trigger listens for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TriggerMode {
    // === State ===
    Always,

    // === Zones ===
    ChangesZone,
    ChangesZoneAll,

    // === Damage ===
    DamageDone,
    DamageDoneOnce,

    // === Casting ===
    SpellCast,
    AbilityCast,
    SpellAbilityCast,

    // === Counters ===
    CounterAdded,
    CounterRemoved,
    CounterAddedOnce,

    // === Card movement by action ===
    Drawn,
    Discarded,
    Milled,

    // === Combat ===
    Attacks,
    Blocks,
    AttackersDeclared,

    // === Life ===
    LifeGained,
    LifeLost,

    // === Turn structure ===
    Phase,
    TurnBegin,

    // === Permanents ===
    Taps,
    Untaps,
    Sacrificed,
    Destroyed,
    BecomesTarget,
}

impl TriggerMode {
    pub const ALL: [TriggerMode; 26] = [
        TriggerMode::Always,
        TriggerMode::ChangesZone,
        TriggerMode::ChangesZoneAll,
        TriggerMode::DamageDone,
        TriggerMode::DamageDoneOnce,
        TriggerMode::SpellCast,
        TriggerMode::AbilityCast,
        TriggerMode::SpellAbilityCast,
        TriggerMode::CounterAdded,
        TriggerMode::CounterRemoved,
        TriggerMode::CounterAddedOnce,
        TriggerMode::Drawn,
        TriggerMode::Discarded,
        TriggerMode::Milled,
        TriggerMode::Attacks,
        TriggerMode::Blocks,
        TriggerMode::AttackersDeclared,
        TriggerMode::LifeGained,
        TriggerMode::LifeLost,
        TriggerMode::Phase,
        TriggerMode::TurnBegin,
        TriggerMode::Taps,
        TriggerMode::Untaps,
        TriggerMode::Sacrificed,
        TriggerMode::Destroyed,
        TriggerMode::BecomesTarget,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            TriggerMode::Always => "Always",
            TriggerMode::ChangesZone => "ChangesZone",
            TriggerMode::ChangesZoneAll => "ChangesZoneAll",
            TriggerMode::DamageDone => "DamageDone",
            TriggerMode::DamageDoneOnce => "DamageDoneOnce",
            TriggerMode::SpellCast => "SpellCast",
            TriggerMode::AbilityCast => "AbilityCast",
            TriggerMode::SpellAbilityCast => "SpellAbilityCast",
            TriggerMode::CounterAdded => "CounterAdded",
            TriggerMode::CounterRemoved => "CounterRemoved",
            TriggerMode::CounterAddedOnce => "CounterAddedOnce",
            TriggerMode::Drawn => "Drawn",
            TriggerMode::Discarded => "Discarded",
            TriggerMode::Milled => "Milled",
            TriggerMode::Attacks => "Attacks",
            TriggerMode::Blocks => "Blocks",
            TriggerMode::AttackersDeclared => "AttackersDeclared",
            TriggerMode::LifeGained => "LifeGained",
            TriggerMode::LifeLost => "LifeLost",
            TriggerMode::Phase => "Phase",
            TriggerMode::TurnBegin => "TurnBegin",
            TriggerMode::Taps => "Taps",
            TriggerMode::Untaps => "Untaps",
            TriggerMode::Sacrificed => "Sacrificed",
            TriggerMode::Destroyed => "Destroyed",
            TriggerMode::BecomesTarget => "BecomesTarget",
        }
    }

    /// The state-based mode. Evaluated synchronously, never queued.
    #[must_use]
    pub const fn is_state(self) -> bool {
        matches!(self, TriggerMode::Always)
    }

    /// The aggregated mode fed by events of this mode, if any.
    ///
    /// Events of a batched source mode are folded into one event of the
    /// returned mode per dispatch or drain.
    #[must_use]
    pub const fn batch_mode(self) -> Option<TriggerMode> {
        match self {
            TriggerMode::ChangesZone => Some(TriggerMode::ChangesZoneAll),
            TriggerMode::DamageDone => Some(TriggerMode::DamageDoneOnce),
            TriggerMode::CounterAdded => Some(TriggerMode::CounterAddedOnce),
            _ => None,
        }
    }

    /// Does a trigger of this mode see events raised with `event_mode`?
    #[must_use]
    pub fn listens_to(self, event_mode: TriggerMode) -> bool {
        match self {
            TriggerMode::SpellAbilityCast => matches!(
                event_mode,
                TriggerMode::SpellCast | TriggerMode::AbilityCast | TriggerMode::SpellAbilityCast
            ),
            _ => self == event_mode,
        }
    }

    /// Predicate constructor for this mode.
    #[must_use]
    pub fn constructor(self) -> PredicateCtor {
        match self {
            TriggerMode::Always => state::parse,
            TriggerMode::ChangesZone => zone_change::parse_changes_zone,
            TriggerMode::ChangesZoneAll => zone_change::parse_changes_zone_all,
            TriggerMode::DamageDone => damage::parse_damage_done,
            TriggerMode::DamageDoneOnce => damage::parse_damage_done_once,
            TriggerMode::SpellCast | TriggerMode::AbilityCast | TriggerMode::SpellAbilityCast => {
                cast::parse
            }
            TriggerMode::CounterAdded | TriggerMode::CounterRemoved => counters::parse_counter_changed,
            TriggerMode::CounterAddedOnce => counters::parse_counter_added_once,
            TriggerMode::Drawn | TriggerMode::Discarded | TriggerMode::Milled => cards::parse,
            TriggerMode::Attacks => combat::parse_attacks,
            TriggerMode::Blocks => combat::parse_blocks,
            TriggerMode::AttackersDeclared => combat::parse_attackers_declared,
            TriggerMode::LifeGained | TriggerMode::LifeLost => life::parse,
            TriggerMode::Phase => phase::parse_phase,
            TriggerMode::TurnBegin => phase::parse_turn_begin,
            TriggerMode::Taps
            | TriggerMode::Untaps
            | TriggerMode::Sacrificed
            | TriggerMode::Destroyed => permanent::parse_action,
            TriggerMode::BecomesTarget => permanent::parse_becomes_target,
        }
    }

    /// Build this mode's predicate.
    pub fn build_predicate(
        self,
        params: &ParamMap,
        config: &GameConfig,
    ) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
        (self.constructor())(self, params, config)
    }
}

impl FromStr for TriggerMode {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        TriggerMode::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| TriggerError::UnknownMode(s.to_string()))
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
