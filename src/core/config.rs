//! Game configuration types.
//!
//! The engine never hardcodes zone or phase names. Games describe them at
//! startup through `GameConfig`, and trigger declarations refer to them by
//! name (`Origin$ Graveyard`, `Phase$ Upkeep`). Names are resolved once, when
//! a trigger is constructed, so an unknown name is an authoring error rather
//! than a silent miss at match time.
//!
//! [`GameConfig::standard`] provides the stock zones and turn structure; the
//! constants in [`zones`] and [`phases`] name its ids.

use serde::{Deserialize, Serialize};

use super::error::TriggerError;

/// Zone identifier. Games define what zones exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub u16);

impl ZoneId {
    /// Create a new zone ID.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Zone({})", self.0)
    }
}

/// Opaque phase identifier. Position in `GameConfig::phases` gives turn order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhaseId(pub u32);

impl PhaseId {
    /// Create a new phase ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Phase({})", self.0)
    }
}

/// Zone ids used by [`GameConfig::standard`].
pub mod zones {
    use super::ZoneId;

    pub const LIBRARY: ZoneId = ZoneId::new(0);
    pub const HAND: ZoneId = ZoneId::new(1);
    pub const BATTLEFIELD: ZoneId = ZoneId::new(2);
    pub const GRAVEYARD: ZoneId = ZoneId::new(3);
    pub const EXILE: ZoneId = ZoneId::new(4);
    pub const STACK: ZoneId = ZoneId::new(5);
    pub const COMMAND: ZoneId = ZoneId::new(6);
}

/// Phase ids used by [`GameConfig::standard`], in turn order.
pub mod phases {
    use super::PhaseId;

    pub const UNTAP: PhaseId = PhaseId::new(0);
    pub const UPKEEP: PhaseId = PhaseId::new(1);
    pub const DRAW: PhaseId = PhaseId::new(2);
    pub const MAIN1: PhaseId = PhaseId::new(3);
    pub const BEGIN_COMBAT: PhaseId = PhaseId::new(4);
    pub const DECLARE_ATTACKERS: PhaseId = PhaseId::new(5);
    pub const DECLARE_BLOCKERS: PhaseId = PhaseId::new(6);
    pub const COMBAT_DAMAGE: PhaseId = PhaseId::new(7);
    pub const END_COMBAT: PhaseId = PhaseId::new(8);
    pub const MAIN2: PhaseId = PhaseId::new(9);
    pub const END_OF_TURN: PhaseId = PhaseId::new(10);
    pub const CLEANUP: PhaseId = PhaseId::new(11);
}

/// Configuration for a single zone.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Unique identifier for this zone.
    pub id: ZoneId,

    /// Name used by trigger declarations.
    pub name: String,
}

impl ZoneConfig {
    /// Create a new zone configuration.
    pub fn new(id: ZoneId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

/// Configuration for a single phase or step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Unique identifier for this phase.
    pub id: PhaseId,

    /// Name used by trigger declarations.
    pub name: String,
}

impl PhaseConfig {
    /// Create a new phase configuration.
    pub fn new(id: PhaseId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

fn default_life() -> i64 {
    20
}

/// Complete engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Zone configurations.
    pub zones: Vec<ZoneConfig>,

    /// Phase configurations, in turn order.
    pub phases: Vec<PhaseConfig>,

    /// Zone where declared triggers are live when `TriggerZones$` is absent.
    pub trigger_zone: ZoneId,

    /// Life total each player starts with.
    #[serde(default = "default_life")]
    pub starting_life: i64,
}

impl GameConfig {
    /// Create an empty configuration. Zones and phases must be added.
    pub fn new(player_count: usize, trigger_zone: ZoneId) -> Self {
        assert!(player_count > 0, "Must have at least 1 player");
        assert!(player_count <= 255, "At most 255 players supported");

        Self {
            player_count,
            zones: Vec::new(),
            phases: Vec::new(),
            trigger_zone,
            starting_life: default_life(),
        }
    }

    /// Stock zones and turn structure.
    pub fn standard(player_count: usize) -> Self {
        let zone_names = [
            (zones::LIBRARY, "Library"),
            (zones::HAND, "Hand"),
            (zones::BATTLEFIELD, "Battlefield"),
            (zones::GRAVEYARD, "Graveyard"),
            (zones::EXILE, "Exile"),
            (zones::STACK, "Stack"),
            (zones::COMMAND, "Command"),
        ];
        let phase_names = [
            (phases::UNTAP, "Untap"),
            (phases::UPKEEP, "Upkeep"),
            (phases::DRAW, "Draw"),
            (phases::MAIN1, "Main1"),
            (phases::BEGIN_COMBAT, "BeginCombat"),
            (phases::DECLARE_ATTACKERS, "DeclareAttackers"),
            (phases::DECLARE_BLOCKERS, "DeclareBlockers"),
            (phases::COMBAT_DAMAGE, "CombatDamage"),
            (phases::END_COMBAT, "EndCombat"),
            (phases::MAIN2, "Main2"),
            (phases::END_OF_TURN, "EndOfTurn"),
            (phases::CLEANUP, "Cleanup"),
        ];

        let mut config = Self::new(player_count, zones::BATTLEFIELD);
        for (id, name) in zone_names {
            config = config.with_zone(ZoneConfig::new(id, name));
        }
        for (id, name) in phase_names {
            config = config.with_phase(PhaseConfig::new(id, name));
        }
        config
    }

    /// Load and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, TriggerError> {
        let config: GameConfig =
            serde_json::from_str(json).map_err(|e| TriggerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the structural rules `new` asserts plus name uniqueness.
    pub fn validate(&self) -> Result<(), TriggerError> {
        if self.player_count == 0 || self.player_count > 255 {
            return Err(TriggerError::Config(format!(
                "player_count must be 1..=255, got {}",
                self.player_count
            )));
        }
        if self.zone_name(self.trigger_zone).is_none() {
            return Err(TriggerError::Config(format!(
                "trigger_zone {} is not a configured zone",
                self.trigger_zone
            )));
        }
        for (i, zone) in self.zones.iter().enumerate() {
            if self.zones[..i].iter().any(|z| z.name.eq_ignore_ascii_case(&zone.name)) {
                return Err(TriggerError::Config(format!("duplicate zone name `{}`", zone.name)));
            }
        }
        for (i, phase) in self.phases.iter().enumerate() {
            if self.phases[..i].iter().any(|p| p.name.eq_ignore_ascii_case(&phase.name)) {
                return Err(TriggerError::Config(format!("duplicate phase name `{}`", phase.name)));
            }
        }
        Ok(())
    }

    /// Add a zone configuration.
    #[must_use]
    pub fn with_zone(mut self, zone: ZoneConfig) -> Self {
        self.zones.push(zone);
        self
    }

    /// Add a phase configuration (appended to the end of the turn).
    #[must_use]
    pub fn with_phase(mut self, phase: PhaseConfig) -> Self {
        self.phases.push(phase);
        self
    }

    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i64) -> Self {
        self.starting_life = life;
        self
    }

    /// Look up a zone by name (ASCII case-insensitive).
    #[must_use]
    pub fn zone_named(&self, name: &str) -> Option<ZoneId> {
        self.zones
            .iter()
            .find(|z| z.name.eq_ignore_ascii_case(name))
            .map(|z| z.id)
    }

    /// Look up a phase by name (ASCII case-insensitive).
    #[must_use]
    pub fn phase_named(&self, name: &str) -> Option<PhaseId> {
        self.phases
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .map(|p| p.id)
    }

    /// Name of a zone, if configured.
    #[must_use]
    pub fn zone_name(&self, id: ZoneId) -> Option<&str> {
        self.zones.iter().find(|z| z.id == id).map(|z| z.name.as_str())
    }

    /// Name of a phase, if configured.
    #[must_use]
    pub fn phase_name(&self, id: PhaseId) -> Option<&str> {
        self.phases.iter().find(|p| p.id == id).map(|p| p.name.as_str())
    }

    /// Phases from `first` to `last` inclusive, in turn order.
    ///
    /// Returns `None` when either end is unknown or `last` precedes `first`.
    #[must_use]
    pub fn phase_range(&self, first: PhaseId, last: PhaseId) -> Option<Vec<PhaseId>> {
        let start = self.phases.iter().position(|p| p.id == first)?;
        let end = self.phases.iter().position(|p| p.id == last)?;
        if end < start {
            return None;
        }
        Some(self.phases[start..=end].iter().map(|p| p.id).collect())
    }
}
