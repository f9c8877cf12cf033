//! Stack and resolution.
//!
//! Triggered abilities fired by the handler wait on a [`PriorityStack`] and
//! resolve top first. Resolution hands each ability to the caller's
//! [`AbilityExecutor`](crate::rules::AbilityExecutor); an optional ability
//! is first offered to its deciding player, who may decline it.
//!
//! ## Example Usage
//!
//! ```
//! use ccg_triggers::core::{zones, GameConfig, GameState, PlayerId};
//! use ccg_triggers::rules::{AcceptAll, Collaborators, RecordingExecutor};
//! use ccg_triggers::stack::{resolve_all, ResolutionStatus};
//! use ccg_triggers::triggers::{GameEvent, TriggerHandler};
//!
//! let mut state = GameState::new(GameConfig::standard(2));
//! let host = state.create_card("Sage", PlayerId::new(0), zones::BATTLEFIELD);
//! state.card_mut(host).unwrap().svars.insert("TrigGain".into(), "DB$ GainLife | LifeAmount$ 1".into());
//!
//! let mut handler = TriggerHandler::new();
//! handler
//!     .create_trigger(&mut state, host, "Mode$ Drawn | ValidPlayer$ You | Execute$ TrigGain")
//!     .unwrap();
//! handler.rebuild_active_set(&state);
//!
//! let mut executor = RecordingExecutor::new();
//! let mut decider = AcceptAll;
//! let mut collab = Collaborators::new(&mut executor, &mut decider);
//! handler.raise(&mut state, &mut collab, GameEvent::drawn(host, PlayerId::new(0), 1), false);
//! assert_eq!(state.stack.len(), 1);
//!
//! let statuses = resolve_all(&mut state, &mut collab);
//! assert!(matches!(statuses[0], ResolutionStatus::Resolved(_)));
//! assert_eq!(executor.apis(), vec!["GainLife"]);
//! ```

mod priority;

pub use priority::{PriorityStack, StackEntry, StackEntryId};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::GameState;
use crate::rules::Collaborators;

/// Outcome of resolving the top of the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionStatus {
    /// Nothing to resolve.
    Empty,

    /// The ability was executed.
    Resolved(StackEntryId),

    /// An optional ability its decider declined.
    Declined(StackEntryId),

    /// The executor reported an error. The entry is gone either way.
    Failed(StackEntryId),
}

/// Resolve the top entry of the stack.
pub fn resolve_top(state: &mut GameState, collab: &mut Collaborators<'_>) -> ResolutionStatus {
    let Some(entry) = state.stack.pop() else {
        return ResolutionStatus::Empty;
    };
    let ability = &entry.ability;

    if ability.optional {
        let decider = ability.decider.unwrap_or(entry.controller);
        if !collab.decider.confirm_optional(state, decider, ability) {
            debug!(entry = %entry.id, trigger = %ability.trigger_id, "optional trigger declined");
            return ResolutionStatus::Declined(entry.id);
        }
    }

    match collab.executor.execute(state, ability) {
        Ok(()) => ResolutionStatus::Resolved(entry.id),
        Err(err) => {
            warn!(entry = %entry.id, trigger = %ability.trigger_id, error = %err, "ability failed to resolve");
            ResolutionStatus::Failed(entry.id)
        }
    }
}

/// Resolve until the stack is empty, including anything pushed on the way.
pub fn resolve_all(state: &mut GameState, collab: &mut Collaborators<'_>) -> Vec<ResolutionStatus> {
    let mut statuses = Vec::new();
    loop {
        match resolve_top(state, collab) {
            ResolutionStatus::Empty => return statuses,
            status => statuses.push(status),
        }
    }
}
