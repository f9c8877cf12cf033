//! Damage predicates: `DamageDone` and the batched `DamageDoneOnce`.
//!
//! Parameters: `ValidSource$` (card filter), `ValidTarget$` (player and/or
//! card alternatives, e.g. `Opponent,Creature.OppCtrl`), `CombatDamage$`
//! (`True` or `False`), `DamageAmount$` (comparison, `DamageDone` only),
//! `OncePerEffect$`.

use crate::cards::{CardFilter, Comparison, PlayerFilter};
use crate::core::{GameConfig, TriggerError};
use crate::triggers::event::{EventValue, GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{pick, subject, ConditionPredicate, OncePerEffect, PredicateContext};

/// `ValidTarget$`: player alternatives and card alternatives.
#[derive(Clone, Debug, Default)]
struct DamageTarget {
    players: Vec<PlayerFilter>,
    cards: Option<CardFilter>,
}

impl DamageTarget {
    fn parse(params: &ParamMap) -> Result<Option<Self>, TriggerError> {
        let Some(raw) = params.get("ValidTarget") else {
            return Ok(None);
        };
        let mut target = DamageTarget::default();
        let mut card_parts = Vec::new();
        for part in raw.split(',') {
            match part.parse::<PlayerFilter>() {
                Ok(p) => target.players.push(p),
                Err(_) => card_parts.push(part.trim()),
            }
        }
        if !card_parts.is_empty() {
            let filter = card_parts
                .join(",")
                .parse()
                .map_err(|_| TriggerError::invalid("ValidTarget", raw))?;
            target.cards = Some(filter);
        }
        Ok(Some(target))
    }

    fn accepts(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        if let Some(player) = event.player(RunParam::Player) {
            return self
                .players
                .iter()
                .any(|f| f.matches(player, ctx.controller, ctx.active_player()));
        }
        match (&self.cards, event.entity(RunParam::Target)) {
            (Some(filter), target @ Some(_)) => ctx.card_passes(Some(filter), target),
            _ => false,
        }
    }
}

#[derive(Clone, Debug)]
struct DamageFilters {
    valid_source: Option<CardFilter>,
    valid_target: Option<DamageTarget>,
    combat: Option<bool>,
}

impl DamageFilters {
    fn parse(params: &ParamMap) -> Result<Self, TriggerError> {
        Ok(Self {
            valid_source: params.parse_value("ValidSource")?,
            valid_target: DamageTarget::parse(params)?,
            combat: params.parse_value("CombatDamage")?,
        })
    }

    fn accepts(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        if event.int(RunParam::Amount).unwrap_or(0) <= 0 {
            return false;
        }
        if self.combat.is_some_and(|c| c != event.flag(RunParam::IsCombat)) {
            return false;
        }
        ctx.card_passes(self.valid_source.as_ref(), event.entity(RunParam::Source))
            && self.valid_target.as_ref().is_none_or(|t| t.accepts(event, ctx))
    }

    fn describe(&self, once: bool) -> String {
        let verb = if once { "deals damage one or more times" } else { "deals damage" };
        let kind = match self.combat {
            Some(true) => " (combat)",
            Some(false) => " (noncombat)",
            None => "",
        };
        format!("When {} {}{}", subject(self.valid_source.as_ref()), verb, kind)
    }
}

/// One source dealt damage to one recipient.
#[derive(Clone, Debug)]
pub struct DamageDone {
    filters: DamageFilters,
    amount: Option<Comparison>,
    once: OncePerEffect,
}

pub fn parse_damage_done(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(DamageDone {
        filters: DamageFilters::parse(params)?,
        amount: params.parse_value("DamageAmount")?,
        once: OncePerEffect::from_params(params),
    }))
}

impl ConditionPredicate for DamageDone {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        let amount = event.int(RunParam::Amount).unwrap_or(0);
        self.filters.accepts(event, ctx)
            && self.amount.is_none_or(|cmp| cmp.holds(amount))
            && self.once.allows(event)
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(
            event,
            &[
                RunParam::Source,
                RunParam::Target,
                RunParam::Player,
                RunParam::Amount,
                RunParam::IsCombat,
                RunParam::Cause,
            ],
        )
    }

    fn description(&self) -> String {
        self.filters.describe(false)
    }

    fn note_fired(&mut self, event: &GameEvent) {
        self.once.record(event);
    }

    fn reset_turn_state(&mut self) {
        self.once.reset();
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}

/// Damage dealt simultaneously, seen once for the whole batch.
#[derive(Clone, Debug)]
pub struct DamageDoneOnce {
    filters: DamageFilters,
}

pub fn parse_damage_done_once(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(DamageDoneOnce {
        filters: DamageFilters::parse(params)?,
    }))
}

impl ConditionPredicate for DamageDoneOnce {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        event.batch().iter().any(|m| self.filters.accepts(m, ctx))
    }

    fn triggered_objects(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> TriggeredObjects {
        let mut objects = TriggeredObjects::new();
        let mut targets = Vec::new();
        let mut total = 0;
        for member in event.batch().iter().filter(|m| self.filters.accepts(m, ctx)) {
            if !objects.contains_key(&RunParam::Source) {
                if let Some(source) = member.entity(RunParam::Source) {
                    objects.insert(RunParam::Source, EventValue::Entity(source));
                }
            }
            if let Some(target) = member.entity(RunParam::Target) {
                if !targets.contains(&target) {
                    targets.push(target);
                }
            }
            total += member.int(RunParam::Amount).unwrap_or(0);
        }
        objects.insert(RunParam::Cards, EventValue::Entities(targets));
        objects.insert(RunParam::Amount, EventValue::Int(total));
        objects
    }

    fn description(&self) -> String {
        self.filters.describe(true)
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
