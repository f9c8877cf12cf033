//! `Drawn`, `Discarded` and `Milled`.
//!
//! Parameters: `ValidCard$`, `ValidPlayer$` (whose card it was),
//! `Number$` (`Drawn` only: the ordinal of the draw this turn, so
//! `Number$ 2` is "your second card each turn"), `OncePerEffect$`.

use crate::cards::{CardFilter, PlayerFilter};
use crate::core::{GameConfig, TriggerError};
use crate::triggers::event::{GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{pick, subject, ConditionPredicate, OncePerEffect, PredicateContext};

#[derive(Clone, Debug)]
pub struct CardAction {
    mode: TriggerMode,
    valid_card: Option<CardFilter>,
    valid_player: Option<PlayerFilter>,
    number: Option<i64>,
    once: OncePerEffect,
}

pub fn parse(
    mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    let number = if mode == TriggerMode::Drawn {
        params.parse_value("Number")?
    } else {
        None
    };
    Ok(Box::new(CardAction {
        mode,
        valid_card: params.parse_value("ValidCard")?,
        valid_player: params.parse_value("ValidPlayer")?,
        number,
        once: OncePerEffect::from_params(params),
    }))
}

impl ConditionPredicate for CardAction {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        if let Some(n) = self.number {
            if event.int(RunParam::Number) != Some(n) {
                return false;
            }
        }
        ctx.card_passes(self.valid_card.as_ref(), event.entity(RunParam::Card))
            && ctx.player_passes(self.valid_player, event.player(RunParam::Player))
            && self.once.allows(event)
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(
            event,
            &[RunParam::Card, RunParam::Player, RunParam::Number, RunParam::Cause],
        )
    }

    fn description(&self) -> String {
        let verb = match self.mode {
            TriggerMode::Discarded => "is discarded",
            TriggerMode::Milled => "is milled",
            _ => "is drawn",
        };
        format!("When {} {}", subject(self.valid_card.as_ref()), verb)
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
