//! `Always`: state triggers.
//!
//! The predicate itself never filters. What keeps a state trigger from
//! firing over and over is the trigger's requirements (checked against the
//! current state each pass) and the handler's rule that a state trigger
//! already waiting on the stack is not put there again.

use crate::core::{GameConfig, TriggerError};
use crate::triggers::event::{GameEvent, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{ConditionPredicate, PredicateContext};

#[derive(Clone, Debug)]
pub struct StateCheck;

pub fn parse(
    _mode: TriggerMode,
    _params: &ParamMap,
    _config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    Ok(Box::new(StateCheck))
}

impl ConditionPredicate for StateCheck {
    fn matches(&self, _event: &GameEvent, _ctx: &PredicateContext<'_>) -> bool {
        true
    }

    fn triggered_objects(&self, _event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        TriggeredObjects::new()
    }

    fn description(&self) -> String {
        "When the game state allows".to_string()
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
