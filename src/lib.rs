//! # ccg-triggers
//!
//! The rules-trigger engine of a stack-based trading card game simulator.
//!
//! ## Design Principles
//!
//! 1. **Declarative triggers**: Cards describe triggers as parameter text.
//!    Declarations are parsed and validated once, when the trigger is
//!    created; a bad one is an error right there.
//!
//! 2. **N-Player First**: Simultaneous triggers are ordered active player
//!    first, then every other player in turn order.
//!
//! 3. **Configuration Over Convention**: Zones and phases come from
//!    `GameConfig`; trigger declarations refer to them by name.
//!
//! ## Architecture
//!
//! - **Detection only**: The engine decides what fires and in what order.
//!   What an ability does, and the choices players make, are supplied by
//!   the caller through `rules::Collaborators`.
//!
//! - **Persistent Data Structures**: Card storage and the active trigger set
//!   use `im-rs`, so game states clone cheaply.
//!
//! ## Modules
//!
//! - `core`: Entity IDs, players, configuration, state, errors
//! - `zones`: Zone membership (game-configured, not hardcoded)
//! - `cards`: Card instances and the filter vocabulary
//! - `triggers`: Modes, predicates, trigger instances and the handler
//! - `stack`: The resolution stack
//! - `rules`: Executor/decision traits and global rule overrides

pub mod core;
pub mod zones;
pub mod cards;
pub mod rules;
pub mod triggers;
pub mod stack;

// Re-export commonly used types
pub use crate::core::{
    EntityId, PlayerId, PlayerMap,
    ZoneId, ZoneConfig, PhaseId, PhaseConfig, GameConfig,
    PublicState, GameState, TriggerError,
};

pub use crate::zones::{ZoneManager, ZoneMove};

pub use crate::cards::{CardInstance, CardType, CardFilter, PlayerFilter, Comparison};

pub use crate::rules::{
    AbilityExecutor, DecisionMaker, Collaborators,
    RuleOverrides, TriggerMultiplier,
};

pub use crate::triggers::{
    GameEvent, RunParam, EventValue, TriggerMode, ParamMap,
    Trigger, TriggerId, Ability, BoundAbility, TriggerAction,
    TriggerHandler, TriggerSnapshot,
};

pub use crate::stack::{PriorityStack, StackEntry, StackEntryId, ResolutionStatus};
