//! Trigger system for event-driven abilities.
//!
//! Cards declare triggers as `Key$ Value` text ("Whenever a creature you
//! control dies, draw a card"). The handler turns each declaration into a
//! [`Trigger`], keeps track of which ones are live, and when the game raises
//! an event decides which of them fire and in what order.
//!
//! ## Key Components
//!
//! - [`TriggerMode`]: event kinds, each with one predicate constructor
//! - [`GameEvent`]: a raised event and its payload
//! - [`ConditionPredicate`]: per-mode matching and object binding
//! - [`Trigger`]: one declaration bound to a host card
//! - [`TriggerHandler`]: the active set, delayed pools, suppression and dispatch
//! - [`WaitingQueue`]: events held until a batch of actions completes
//!
//! ## Example Usage
//!
//! ```
//! use ccg_triggers::cards::{CardInstance, CardType};
//! use ccg_triggers::core::{zones, GameConfig, GameState, PlayerId};
//! use ccg_triggers::rules::{AcceptAll, Collaborators, RecordingExecutor};
//! use ccg_triggers::triggers::{GameEvent, TriggerHandler};
//!
//! let mut state = GameState::new(GameConfig::standard(2));
//! let bear = state.alloc_entity();
//! state.add_card(CardInstance::new(bear, "Bear", PlayerId::new(0), zones::BATTLEFIELD).with_type(CardType::Creature));
//! let scribe = state.alloc_entity();
//! state.add_card(
//!     CardInstance::new(scribe, "Scribe", PlayerId::new(0), zones::BATTLEFIELD)
//!         .with_svar("TrigDraw", "DB$ Draw | Defined$ You | NumCards$ 1"),
//! );
//!
//! // "Whenever a creature you control dies, draw a card."
//! let mut handler = TriggerHandler::new();
//! handler
//!     .create_trigger(
//!         &mut state,
//!         scribe,
//!         "Mode$ ChangesZone | Origin$ Battlefield | Destination$ Graveyard | ValidCard$ Creature.YouCtrl | Execute$ TrigDraw",
//!     )
//!     .unwrap();
//! handler.rebuild_active_set(&state);
//!
//! let moved = state.move_card(bear, zones::GRAVEYARD).unwrap();
//! let mut executor = RecordingExecutor::new();
//! let mut decider = AcceptAll;
//! let mut collab = Collaborators::new(&mut executor, &mut decider);
//! handler.raise(&mut state, &mut collab, GameEvent::zone_change(moved), false);
//!
//! assert_eq!(state.stack.len(), 1);
//! assert_eq!(state.stack.peek_top().unwrap().ability.ability.api, "Draw");
//! ```

mod delayed;
mod event;
mod handler;
mod mode;
mod params;
pub mod predicate;
mod requirements;
mod snapshot;
mod trigger;
mod waiting;

pub use delayed::DelayedPool;
pub use event::{EventValue, GameEvent, RunParam, TriggeredObjects};
pub use handler::TriggerHandler;
pub use mode::{PredicateCtor, TriggerMode};
pub use params::ParamMap;
pub use predicate::{ConditionPredicate, OncePerEffect, PredicateContext};
pub use requirements::Requirements;
pub use snapshot::{DelayedRecord, InstanceState, TriggerSnapshot};
pub use trigger::{Ability, BoundAbility, ControllerRule, Trigger, TriggerAction, TriggerId};
pub use waiting::{WaitingEvent, WaitingQueue};
