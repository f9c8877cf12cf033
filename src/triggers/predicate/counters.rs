//! Counter predicates.
//!
//! `CounterAdded` / `CounterRemoved` take `ValidCard$`, `CounterType$`,
//! `CounterAmount$` (comparison) and `OncePerEffect$`. The batched
//! `CounterAddedOnce` sees every counter placed by one action at once and
//! binds the total.

use crate::cards::{CardFilter, Comparison};
use crate::core::{GameConfig, TriggerError};
use crate::triggers::event::{EventValue, GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{pick, subject, ConditionPredicate, OncePerEffect, PredicateContext};

#[derive(Clone, Debug)]
struct CounterFilters {
    valid_card: Option<CardFilter>,
    counter_type: Option<String>,
}

impl CounterFilters {
    fn parse(params: &ParamMap, card_key: &str) -> Result<Self, TriggerError> {
        Ok(Self {
            valid_card: params.parse_value(card_key)?,
            counter_type: params.get("CounterType").map(str::to_string),
        })
    }

    fn accepts(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        let type_ok = self
            .counter_type
            .as_deref()
            .is_none_or(|t| event.text(RunParam::CounterType) == Some(t));
        type_ok && ctx.card_passes(self.valid_card.as_ref(), event.entity(RunParam::Card))
    }

    fn counters(&self) -> String {
        self.counter_type
            .as_deref()
            .map_or_else(|| "a counter".to_string(), |t| format!("a {} counter", t))
    }
}

#[derive(Clone, Debug)]
pub struct CounterChanged {
    mode: TriggerMode,
    filters: CounterFilters,
    amount: Option<Comparison>,
    once: OncePerEffect,
}

pub fn parse_counter_changed(
    mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(CounterChanged {
        mode,
        filters: CounterFilters::parse(params, "ValidCard")?,
        amount: params.parse_value("CounterAmount")?,
        once: OncePerEffect::from_params(params),
    }))
}

impl ConditionPredicate for CounterChanged {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        let Some(amount) = event.int(RunParam::Amount) else {
            return false;
        };
        amount > 0
            && self.filters.accepts(event, ctx)
            && self.amount.is_none_or(|cmp| cmp.holds(amount))
            && self.once.allows(event)
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(
            event,
            &[RunParam::Card, RunParam::CounterType, RunParam::Amount, RunParam::Cause],
        )
    }

    fn description(&self) -> String {
        let verb = if self.mode == TriggerMode::CounterRemoved {
            "is removed from"
        } else {
            "is put on"
        };
        format!(
            "When {} {} {}",
            self.filters.counters(),
            verb,
            subject(self.filters.valid_card.as_ref())
        )
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

#[derive(Clone, Debug)]
pub struct CounterAddedOnce {
    filters: CounterFilters,
}

pub fn parse_counter_added_once(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(CounterAddedOnce {
        filters: CounterFilters::parse(params, "ValidCards")?,
    }))
}

impl ConditionPredicate for CounterAddedOnce {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        event.batch().iter().any(|m| self.filters.accepts(m, ctx))
    }

    fn triggered_objects(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> TriggeredObjects {
        let mut cards = Vec::new();
        let mut total = 0;
        for member in event.batch().iter().filter(|m| self.filters.accepts(m, ctx)) {
            if let Some(card) = member.entity(RunParam::Card) {
                if !cards.contains(&card) {
                    cards.push(card);
                }
            }
            total += member.int(RunParam::Amount).unwrap_or(0);
        }
        let mut objects = TriggeredObjects::new();
        objects.insert(RunParam::Cards, EventValue::Entities(cards));
        objects.insert(RunParam::Amount, EventValue::Int(total));
        objects
    }

    fn description(&self) -> String {
        format!("When one or more counters are put on cards ({})", self.filters.counters())
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
