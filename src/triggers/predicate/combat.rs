//! Combat predicates.

use crate::cards::{CardFilter, PlayerFilter};
use crate::core::{EntityId, GameConfig, TriggerError};
use crate::triggers::event::{EventValue, GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{pick, player_phrase, subject, ConditionPredicate, PredicateContext};

/// `Attacks`: `ValidCard$` (the attacker), `Attacked$` (the defending player).
#[derive(Clone, Debug)]
pub struct Attacks {
    valid_card: Option<CardFilter>,
    attacked: Option<PlayerFilter>,
}

pub fn parse_attacks(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(Attacks {
        valid_card: params.parse_value("ValidCard")?,
        attacked: params.parse_value("Attacked")?,
    }))
}

impl ConditionPredicate for Attacks {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        ctx.card_passes(self.valid_card.as_ref(), event.entity(RunParam::Card))
            && ctx.player_passes(self.attacked, event.player(RunParam::Player))
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Card, RunParam::Player])
    }

    fn description(&self) -> String {
        format!("Whenever {} attacks", subject(self.valid_card.as_ref()))
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}

/// `Blocks`: `ValidCard$` (the blocker), `ValidBlocked$` (the attacker).
#[derive(Clone, Debug)]
pub struct Blocks {
    valid_card: Option<CardFilter>,
    valid_blocked: Option<CardFilter>,
}

pub fn parse_blocks(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(Blocks {
        valid_card: params.parse_value("ValidCard")?,
        valid_blocked: params.parse_value("ValidBlocked")?,
    }))
}

impl ConditionPredicate for Blocks {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        ctx.card_passes(self.valid_card.as_ref(), event.entity(RunParam::Card))
            && ctx.card_passes(self.valid_blocked.as_ref(), event.entity(RunParam::Target))
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Card, RunParam::Target])
    }

    fn description(&self) -> String {
        format!("Whenever {} blocks", subject(self.valid_card.as_ref()))
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}

/// `AttackersDeclared`: `AttackingPlayer$`, `ValidAttackers$`. Fires once
/// per declaration when at least one attacker passes the filter.
#[derive(Clone, Debug)]
pub struct AttackersDeclared {
    attacking_player: Option<PlayerFilter>,
    valid_attackers: Option<CardFilter>,
}

pub fn parse_attackers_declared(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(AttackersDeclared {
        attacking_player: params.parse_value("AttackingPlayer")?,
        valid_attackers: params.parse_value("ValidAttackers")?,
    }))
}

impl AttackersDeclared {
    fn passing(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> Vec<EntityId> {
        event
            .entities(RunParam::Attackers)
            .into_iter()
            .filter(|&a| ctx.card_passes(self.valid_attackers.as_ref(), Some(a)))
            .collect()
    }
}

impl ConditionPredicate for AttackersDeclared {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        ctx.player_passes(self.attacking_player, event.player(RunParam::Player))
            && !self.passing(event, ctx).is_empty()
    }

    fn triggered_objects(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> TriggeredObjects {
        let mut objects = pick(event, &[RunParam::Attackers, RunParam::Player]);
        objects.insert(RunParam::Cards, EventValue::Entities(self.passing(event, ctx)));
        objects
    }

    fn description(&self) -> String {
        format!("Whenever {} attacks", player_phrase(self.attacking_player))
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
