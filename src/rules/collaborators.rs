//! Collaborator traits the trigger engine calls out to.
//!
//! The engine decides what fires and in which order. What an ability does,
//! and the choices players make about it, belong to the caller:
//!
//! - [`AbilityExecutor`] resolves a [`BoundAbility`] against the game state
//! - [`DecisionMaker`] answers "may" prompts and orders simultaneous triggers
//!
//! Both are handed to the engine per call through [`Collaborators`].

use crate::core::{GameState, PlayerId, TriggerError};
use crate::triggers::BoundAbility;

/// Resolves bound abilities.
pub trait AbilityExecutor {
    /// Carry out `ability`. An error aborts this one resolution only.
    fn execute(&mut self, state: &mut GameState, ability: &BoundAbility) -> Result<(), TriggerError>;
}

impl<F> AbilityExecutor for F
where
    F: FnMut(&mut GameState, &BoundAbility) -> Result<(), TriggerError>,
{
    fn execute(&mut self, state: &mut GameState, ability: &BoundAbility) -> Result<(), TriggerError> {
        self(state, ability)
    }
}

/// Player decisions the engine needs answered synchronously.
pub trait DecisionMaker {
    /// Should `player` go ahead with optional `ability`?
    fn confirm_optional(&mut self, state: &GameState, player: PlayerId, ability: &BoundAbility) -> bool;

    /// Order `player`'s simultaneous triggers. Returns a permutation of
    /// indices into `abilities`; the first index is put on the stack first.
    ///
    /// Default: keep the engine's order.
    fn order_simultaneous(
        &mut self,
        _state: &GameState,
        _player: PlayerId,
        abilities: &[BoundAbility],
    ) -> Vec<usize> {
        (0..abilities.len()).collect()
    }
}

/// Per-call bundle of collaborators.
pub struct Collaborators<'a> {
    pub executor: &'a mut dyn AbilityExecutor,
    pub decider: &'a mut dyn DecisionMaker,
}

impl<'a> Collaborators<'a> {
    pub fn new(executor: &'a mut dyn AbilityExecutor, decider: &'a mut dyn DecisionMaker) -> Self {
        Self { executor, decider }
    }
}

/// Says yes to every optional trigger and keeps the default order.
#[derive(Clone, Copy, Debug, Default)]
pub struct AcceptAll;

impl DecisionMaker for AcceptAll {
    fn confirm_optional(&mut self, _state: &GameState, _player: PlayerId, _ability: &BoundAbility) -> bool {
        true
    }
}

/// Says no to every optional trigger.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeclineAll;

impl DecisionMaker for DeclineAll {
    fn confirm_optional(&mut self, _state: &GameState, _player: PlayerId, _ability: &BoundAbility) -> bool {
        false
    }
}

/// Executor that only records what it was asked to run.
#[derive(Clone, Debug, Default)]
pub struct RecordingExecutor {
    pub log: Vec<BoundAbility>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// APIs executed so far, in order.
    #[must_use]
    pub fn apis(&self) -> Vec<&str> {
        self.log.iter().map(|b| b.ability.api.as_str()).collect()
    }
}

impl AbilityExecutor for RecordingExecutor {
    fn execute(&mut self, _state: &mut GameState, ability: &BoundAbility) -> Result<(), TriggerError> {
        self.log.push(ability.clone());
        Ok(())
    }
}
