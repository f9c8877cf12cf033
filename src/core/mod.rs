//! Core engine types: entities, players, configuration, state, errors.
//!
//! Games configure zones and phases via `GameConfig` rather than modifying
//! the core.

pub mod config;
pub mod entity;
pub mod error;
pub mod player;
pub mod state;

pub use config::{phases, zones, GameConfig, PhaseConfig, PhaseId, ZoneConfig, ZoneId};
pub use entity::EntityId;
pub use error::TriggerError;
pub use player::{PlayerId, PlayerMap};
pub use state::{GameState, PublicState, LIFE};
