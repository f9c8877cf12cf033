//! Turn structure predicates.
//!
//! `Phase` requires `Phase$` (names, or `First->Last` ranges) and takes
//! `ValidPlayer$` for whose turn it must be. `TurnBegin` takes
//! `ValidPlayer$` only.

use crate::cards::PlayerFilter;
use crate::core::{GameConfig, PhaseId, TriggerError};
use crate::triggers::event::{GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{parse_phases, pick, player_phrase, ConditionPredicate, PredicateContext};

#[derive(Clone, Debug)]
pub struct PhaseBegins {
    phases: Vec<PhaseId>,
    valid_player: Option<PlayerFilter>,
    description: String,
}

pub fn parse_phase(
    mode: TriggerMode,
    params: &ParamMap,
    config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    let raw = params.require(mode, "Phase")?;
    let phases = parse_phases(raw, config)?;
    let valid_player: Option<PlayerFilter> = params.parse_value("ValidPlayer")?;
    let names: Vec<&str> = phases
        .iter()
        .filter_map(|&p| config.phase_name(p))
        .collect();
    let description = match valid_player {
        Some(_) => format!(
            "At the beginning of {} during the turn of {}",
            names.join(" or "),
            player_phrase(valid_player)
        ),
        None => format!("At the beginning of each {}", names.join(" or ")),
    };
    Ok(Box::new(PhaseBegins {
        phases,
        valid_player,
        description,
    }))
}

impl ConditionPredicate for PhaseBegins {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        event.phase_id().is_some_and(|p| self.phases.contains(&p))
            && ctx.player_passes(self.valid_player, event.player(RunParam::Player))
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Phase, RunParam::Player])
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}

#[derive(Clone, Debug)]
pub struct TurnBegins {
    valid_player: Option<PlayerFilter>,
}

pub fn parse_turn_begin(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(TurnBegins {
        valid_player: params.parse_value("ValidPlayer")?,
    }))
}

impl ConditionPredicate for TurnBegins {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        ctx.player_passes(self.valid_player, event.player(RunParam::Player))
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Player])
    }

    fn description(&self) -> String {
        format!("At the beginning of the turn of {}", player_phrase(self.valid_player))
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
