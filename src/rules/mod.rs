//! Rules-side collaborators.
//!
//! The trigger engine never resolves abilities or makes choices itself.
//! Games plug in an [`AbilityExecutor`] and a [`DecisionMaker`], and state
//! global rule changes through [`RuleOverrides`].

pub mod collaborators;
pub mod overrides;

pub use collaborators::{
    AbilityExecutor, AcceptAll, Collaborators, DecisionMaker, DeclineAll, RecordingExecutor,
};
pub use overrides::{RuleOverrides, TriggerMultiplier};
