//! `LifeGained` / `LifeLost`: `ValidPlayer$`, `Amount$` (comparison).

use crate::cards::{Comparison, PlayerFilter};
use crate::core::{GameConfig, TriggerError};
use crate::triggers::event::{GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{pick, player_phrase, ConditionPredicate, PredicateContext};

#[derive(Clone, Debug)]
pub struct LifeChanged {
    mode: TriggerMode,
    valid_player: Option<PlayerFilter>,
    amount: Option<Comparison>,
}

pub fn parse(
    mode: TriggerMode,
    params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(LifeChanged {
        mode,
        valid_player: params.parse_value("ValidPlayer")?,
        amount: params.parse_value("Amount")?,
    }))
}

impl ConditionPredicate for LifeChanged {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        let Some(amount) = event.int(RunParam::Amount) else {
            return false;
        };
        amount > 0
            && ctx.player_passes(self.valid_player, event.player(RunParam::Player))
            && self.amount.is_none_or(|cmp| cmp.holds(amount))
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(event, &[RunParam::Player, RunParam::Amount, RunParam::Cause])
    }

    fn description(&self) -> String {
        let verb = if self.mode == TriggerMode::LifeLost { "lost" } else { "gained" };
        format!("Whenever life is {} by {}", verb, player_phrase(self.valid_player))
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
