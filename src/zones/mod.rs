//! Zone system for card locations.
//!
//! Zones are **game-configured**, not hardcoded. Games define their zones
//! via `ZoneConfig` at startup; trigger declarations name them.
//!
//! ## Key Types
//!
//! - `ZoneId`: Opaque zone identifier (from `core::config`)
//! - `ZoneManager`: Card location tracking and movement
//! - `ZoneMove`: A completed move, carried by zone-change events

pub mod manager;

pub use manager::{ZoneManager, ZoneMove};

// Re-export zone types from core for convenience
pub use crate::core::config::{ZoneConfig, ZoneId};
