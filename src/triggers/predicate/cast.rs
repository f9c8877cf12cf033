//! `SpellCast`, `AbilityCast` and `SpellAbilityCast`.
//!
//! Parameters: `ValidCard$` (the spell, or the source of the ability),
//! `ValidActivatingPlayer$`.

use crate::cards::{CardFilter, PlayerFilter};
use crate::core::{GameConfig, TriggerError};
use crate::triggers::event::{GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{pick, player_phrase, subject, ConditionPredicate, PredicateContext};

#[derive(Clone, Debug)]
pub struct Cast {
    mode: TriggerMode,
    valid_card: Option<CardFilter>,
    valid_activator: Option<PlayerFilter>,
}

pub fn parse(
    mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(Cast {
        mode,
        valid_card: params.parse_value("ValidCard")?,
        valid_activator: params.parse_value("ValidActivatingPlayer")?,
    }))
}

impl ConditionPredicate for Cast {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        ctx.card_passes(self.valid_card.as_ref(), event.entity(RunParam::Card))
            && ctx.player_passes(self.valid_activator, event.player(RunParam::Activator))
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Card, RunParam::Activator, RunParam::Cause])
    }

    fn description(&self) -> String {
        let what = match self.mode {
            TriggerMode::AbilityCast => "an ability",
            TriggerMode::SpellAbilityCast => "a spell or ability",
            _ => "a spell",
        };
        format!(
            "Whenever {} casts {} ({})",
            player_phrase(self.valid_activator),
            what,
            subject(self.valid_card.as_ref())
        )
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
