//! Single-permanent actions: `Taps`, `Untaps`, `Sacrificed`, `Destroyed`,
//! and `BecomesTarget`.

use crate::cards::CardFilter;
use crate::core::{GameConfig, TriggerError};
use crate::triggers::event::{GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{pick, subject, ConditionPredicate, PredicateContext};

/// `ValidCard$` against the affected permanent.
#[derive(Clone, Debug)]
pub struct PermanentAction {
    mode: TriggerMode,
    valid_card: Option<CardFilter>,
}

pub fn parse_action(
    mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(PermanentAction {
        mode,
        valid_card: params.parse_value("ValidCard")?,
    }))
}

impl ConditionPredicate for PermanentAction {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        let card = event.entity(RunParam::Card);
        card.is_some() && ctx.card_passes(self.valid_card.as_ref(), card)
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Card, RunParam::Player, RunParam::Cause])
    }

    fn description(&self) -> String {
        let verb = match self.mode {
            TriggerMode::Untaps => "becomes untapped",
            TriggerMode::Sacrificed => "is sacrificed",
            TriggerMode::Destroyed => "is destroyed",
            _ => "becomes tapped",
        };
        format!("Whenever {} {}", subject(self.valid_card.as_ref()), verb)
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}

/// `ValidTarget$` (the targeted card), `ValidSource$` (the targeting object).
#[derive(Clone, Debug)]
pub struct BecomesTarget {
    valid_target: Option<CardFilter>,
    valid_source: Option<CardFilter>,
}

pub fn parse_becomes_target(
    _mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(BecomesTarget {
        valid_target: params.parse_value("ValidTarget")?,
        valid_source: params.parse_value("ValidSource")?,
    }))
}

impl ConditionPredicate for BecomesTarget {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        let target = event.entity(RunParam::Target);
        target.is_some()
            && ctx.card_passes(self.valid_target.as_ref(), target)
            && ctx.card_passes(self.valid_source.as_ref(), event.entity(RunParam::Source))
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Target, RunParam::Source])
    }

    fn description(&self) -> String {
        format!(
            "Whenever {} becomes the target of a spell or ability",
            subject(self.valid_target.as_ref())
        )
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
