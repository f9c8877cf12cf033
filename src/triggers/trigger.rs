//! Trigger instances.
//!
//! A [`Trigger`] binds one declaration to a host card: the mode and its
//! predicate, where and when it is live, how often it may fire, and what it
//! does when it fires. Whether it is live is always re-derived from the game
//! state; nothing here caches it.
//!
//! ## Key Components
//!
//! - [`TriggerId`]: ordinal assigned by the handler
//! - [`Ability`]: parsed ability text (`DB$ Draw | NumCards$ 1`) and its sub-ability chain
//! - [`TriggerAction`]: a pre-built ability, or an `Execute$` SVar resolved at fire time
//! - [`BoundAbility`]: what a firing hands to the stack or the executor
//!
//! ## Declaration keys read here
//!
//! `Mode`, `Execute`, `TriggerZones`, `Phase`, `PlayerTurn`, `OpponentTurn`,
//! `ActivationLimit`, `OptionalDecider`, `TriggerController`, `Static`,
//! `OneOff`, `RememberTriggeringCard`, `TriggerDescription`, plus the
//! requirement keys in [`super::requirements`]. Everything else belongs to
//! the mode's predicate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use tracing::trace;

use crate::cards::{CardInstance, CardType, PlayerFilter};
use crate::core::{EntityId, GameConfig, GameState, PhaseId, PlayerId, TriggerError, ZoneId};

use super::event::{EventValue, GameEvent, RunParam, TriggeredObjects};
use super::mode::TriggerMode;
use super::params::ParamMap;
use super::predicate::{parse_phases, parse_zones, ConditionPredicate, PredicateContext};
use super::requirements::Requirements;

/// Longest `SubAbility$` chain followed before giving up.
const MAX_SUB_ABILITY_DEPTH: usize = 16;

/// Unique identifier for a trigger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriggerId(pub u32);

impl TriggerId {
    /// Create a new trigger ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TriggerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Trigger({})", self.0)
    }
}

// === Abilities ===

/// A parsed ability: `DB$ Draw | Defined$ You | NumCards$ 1`.
///
/// The API comes from the `AB$`, `SP$` or `DB$` key. Resolving it is the
/// executor's business; the engine only carries it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub api: String,
    pub params: ParamMap,
    pub host: EntityId,
    pub sub: Option<Box<Ability>>,
}

impl Ability {
    /// Parse ability text without following `SubAbility$`.
    pub fn parse(text: &str, host: EntityId) -> Result<Self, TriggerError> {
        let mut params = ParamMap::parse(text)?;
        let api = ["DB", "AB", "SP"]
            .iter()
            .find_map(|key| params.remove(key))
            .ok_or_else(|| TriggerError::MalformedDeclaration(text.to_string()))?;
        Ok(Self {
            api,
            params,
            host,
            sub: None,
        })
    }

    /// Resolve the SVar `name` on `card`, following its `SubAbility$` chain.
    pub fn from_svar(card: &CardInstance, name: &str) -> Result<Self, TriggerError> {
        Self::resolve(card, name, 0)
    }

    fn resolve(card: &CardInstance, name: &str, depth: usize) -> Result<Self, TriggerError> {
        if depth >= MAX_SUB_ABILITY_DEPTH {
            return Err(TriggerError::Execution(format!(
                "SubAbility chain on {} exceeds {} links",
                card.entity_id, MAX_SUB_ABILITY_DEPTH
            )));
        }
        let text = card.svar(name).ok_or_else(|| TriggerError::MissingSVar {
            host: card.entity_id,
            name: name.to_string(),
        })?;
        let mut ability = Self::parse(text, card.entity_id)?;
        if let Some(sub) = ability.params.remove("SubAbility") {
            ability.sub = Some(Box::new(Self::resolve(card, &sub, depth + 1)?));
        }
        Ok(ability)
    }

    /// Attach a sub-ability (builder pattern).
    #[must_use]
    pub fn with_sub(mut self, sub: Ability) -> Self {
        self.sub = Some(Box::new(sub));
        self
    }

    /// Point this ability and its whole chain at `host`.
    pub fn rehost(&mut self, host: EntityId) {
        self.host = host;
        if let Some(sub) = &mut self.sub {
            sub.rehost(host);
        }
    }

    /// Number of abilities in the chain, this one included.
    #[must_use]
    pub fn chain_len(&self) -> usize {
        1 + self.sub.as_ref().map_or(0, |s| s.chain_len())
    }
}

/// What a trigger does when it fires.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerAction {
    /// Built by the code that created the trigger (typically a delayed trigger).
    Ability(Ability),
    /// Name of an SVar on the host, parsed when the trigger fires.
    Execute(String),
}

/// Who the fired ability belongs to when `TriggerController$` is present.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerRule {
    /// The player in the event payload.
    TriggeredPlayer,
    /// The controller of the card in the event payload.
    TriggeredCardController,
    /// The player who cast or activated.
    TriggeredActivator,
}

impl FromStr for ControllerRule {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "TriggeredPlayer" => Ok(Self::TriggeredPlayer),
            "TriggeredCardController" => Ok(Self::TriggeredCardController),
            "TriggeredActivator" => Ok(Self::TriggeredActivator),
            other => Err(TriggerError::invalid("TriggerController", other)),
        }
    }
}

/// The concrete ability produced by one firing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundAbility {
    pub trigger_id: TriggerId,
    pub mode: TriggerMode,
    pub host: EntityId,

    /// Player the ability belongs to.
    pub activator: PlayerId,

    pub ability: Ability,

    pub triggered_objects: TriggeredObjects,

    /// "You may" trigger: `decider` confirms or declines at resolution.
    pub optional: bool,
    pub decider: Option<PlayerId>,

    pub is_static: bool,
    pub is_state_trigger: bool,

    pub description: String,
}

// === Trigger ===

/// A trigger instance.
#[derive(Clone, Debug)]
pub struct Trigger {
    pub id: TriggerId,

    /// Fixed at construction.
    mode: TriggerMode,

    /// Raw declaration parameters.
    pub params: ParamMap,

    pub host: EntityId,

    /// Fixed controller for delayed triggers. Otherwise the host's controller.
    pub controller_override: Option<PlayerId>,

    /// Declared by card text rather than granted by an effect.
    pub intrinsic: bool,

    /// Fires synchronously ahead of the APNAP pass.
    pub is_static: bool,

    /// Granted for a limited window ("until end of turn").
    pub temporary: bool,

    /// Removed after its first firing.
    pub one_off: bool,

    /// Zones the host must be in. Empty means anywhere.
    pub valid_zones: SmallVec<[ZoneId; 2]>,

    valid_phases: Option<Vec<PhaseId>>,
    player_turn: bool,
    opponent_turn: bool,

    activation_limit: Option<u32>,
    activations_this_turn: u32,
    suppressed: bool,

    optional_decider: Option<PlayerFilter>,
    controller_rule: Option<ControllerRule>,
    requirements: Requirements,
    remember_triggering: bool,

    action: TriggerAction,
    predicate: Box<dyn ConditionPredicate>,

    // Volatile state from the most recent firing.
    run_params: Option<GameEvent>,
    triggered_objects: TriggeredObjects,
    remembered: Vec<EntityId>,
    last_event_seq: Option<u64>,
}

impl Trigger {
    /// Parse a declaration. `Execute$` is required.
    pub fn parse(id: TriggerId, text: &str, host: EntityId, config: &GameConfig) -> Result<Self, TriggerError> {
        Self::from_params(id, ParamMap::parse(text)?, host, config, None)
    }

    /// Build from parsed parameters. With `action` given, `Execute$` is
    /// optional and ignored.
    pub fn from_params(
        id: TriggerId,
        params: ParamMap,
        host: EntityId,
        config: &GameConfig,
        action: Option<TriggerAction>,
    ) -> Result<Self, TriggerError> {
        let mode: TriggerMode = params.get("Mode").ok_or(TriggerError::MissingMode)?.parse()?;
        let predicate = mode.build_predicate(&params, config)?;

        let action = match action {
            Some(action) => action,
            None => TriggerAction::Execute(params.require(mode, "Execute")?.to_string()),
        };

        let valid_zones = match params.get("TriggerZones") {
            None => smallvec![config.trigger_zone],
            Some(_) => parse_zones(&params, "TriggerZones", config)?.unwrap_or_default(),
        };

        // A Phase-mode trigger's Phase$ names the phases it listens for.
        let valid_phases = match params.get("Phase") {
            Some(raw) if mode != TriggerMode::Phase => Some(parse_phases(raw, config)?),
            _ => None,
        };

        let requirements = Requirements::parse(mode, &params, config)?;

        Ok(Self {
            id,
            mode,
            host,
            controller_override: None,
            intrinsic: true,
            is_static: params.is_true("Static"),
            temporary: false,
            one_off: params.is_true("OneOff"),
            valid_zones,
            valid_phases,
            player_turn: params.is_true("PlayerTurn"),
            opponent_turn: params.is_true("OpponentTurn"),
            activation_limit: params.parse_value("ActivationLimit")?,
            activations_this_turn: 0,
            suppressed: false,
            optional_decider: params.parse_value("OptionalDecider")?,
            controller_rule: params.parse_value("TriggerController")?,
            requirements,
            remember_triggering: params.is_true("RememberTriggeringCard"),
            action,
            predicate,
            run_params: None,
            triggered_objects: TriggeredObjects::new(),
            remembered: Vec::new(),
            last_event_seq: None,
            params,
        })
    }

    // === Accessors ===

    #[must_use]
    pub fn mode(&self) -> TriggerMode {
        self.mode
    }

    #[must_use]
    pub fn action(&self) -> &TriggerAction {
        &self.action
    }

    #[must_use]
    pub fn activation_limit(&self) -> Option<u32> {
        self.activation_limit
    }

    #[must_use]
    pub fn activations_this_turn(&self) -> u32 {
        self.activations_this_turn
    }

    pub fn set_activations_this_turn(&mut self, n: u32) {
        self.activations_this_turn = n;
    }

    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn set_suppressed(&mut self, suppressed: bool) {
        self.suppressed = suppressed;
    }

    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional_decider.is_some()
    }

    /// The event the trigger last fired for.
    #[must_use]
    pub fn run_params(&self) -> Option<&GameEvent> {
        self.run_params.as_ref()
    }

    #[must_use]
    pub fn triggered_objects(&self) -> &TriggeredObjects {
        &self.triggered_objects
    }

    /// Cards remembered across firings for the current event.
    #[must_use]
    pub fn remembered(&self) -> &[EntityId] {
        &self.remembered
    }

    /// `TriggerDescription$`, or the predicate's reminder text.
    #[must_use]
    pub fn description(&self) -> String {
        match self.params.get("TriggerDescription") {
            Some(text) => text.to_string(),
            None => self.predicate.description(),
        }
    }

    /// Player the trigger fires for: the override, else the host's controller.
    #[must_use]
    pub fn controller(&self, state: &GameState) -> Option<PlayerId> {
        self.controller_override
            .or_else(|| state.controller_of(self.host))
    }

    /// Can fire again this turn?
    #[must_use]
    pub fn under_ceiling(&self) -> bool {
        self.activation_limit
            .is_none_or(|limit| self.activations_this_turn < limit)
    }

    // === Gates ===

    /// Phase and whose-turn gating. Independent of the event.
    #[must_use]
    pub fn phases_ok(&self, state: &GameState) -> bool {
        if let Some(phases) = &self.valid_phases {
            if !phases.contains(&state.current_phase()) {
                return false;
            }
        }
        if self.player_turn || self.opponent_turn {
            let Some(controller) = self.controller(state) else {
                return false;
            };
            let mine = state.is_player_turn(controller);
            if (self.player_turn && !mine) || (self.opponent_turn && mine) {
                return false;
            }
        }
        true
    }

    /// Is the host somewhere the trigger is live?
    ///
    /// A leaves-zone trigger also counts as live for the event that moved its
    /// host out of a valid zone.
    #[must_use]
    pub fn zone_ok(&self, state: &GameState, event: &GameEvent) -> bool {
        if self.valid_zones.is_empty() {
            return true;
        }
        if state
            .zone_of(self.host)
            .is_some_and(|z| self.valid_zones.contains(&z))
        {
            return true;
        }
        self.predicate.uses_look_back()
            && event
                .moved_from(self.host)
                .is_some_and(|z| self.valid_zones.contains(&z))
    }

    /// Host in a valid zone right now, ignoring look-back.
    #[must_use]
    pub fn host_in_valid_zone(&self, state: &GameState) -> bool {
        self.valid_zones.is_empty()
            || state
                .zone_of(self.host)
                .is_some_and(|z| self.valid_zones.contains(&z))
    }

    /// Global-state preconditions.
    #[must_use]
    pub fn requirements_ok(&self, state: &GameState) -> bool {
        if self.requirements.is_empty() {
            return true;
        }
        self.controller(state)
            .is_some_and(|c| self.requirements.hold(state, self.host, c))
    }

    /// Predicate match plus the generic gates: mode, suppression, the
    /// per-turn ceiling and the disabled creature ETB rule.
    #[must_use]
    pub fn matches(&self, state: &GameState, event: &GameEvent) -> bool {
        if !self.mode.listens_to(event.mode) || self.suppressed || !self.under_ceiling() {
            return false;
        }
        if state.rules.creature_etb_triggers_disabled && creature_entry(state, event) {
            trace!(trigger = %self.id, "creature ETB triggers are disabled");
            return false;
        }
        let Some(controller) = self.controller(state) else {
            return false;
        };
        let ctx = PredicateContext::new(state, self.host, controller);
        self.predicate.matches(event, &ctx)
    }

    /// Every check at once.
    #[must_use]
    pub fn eligible(&self, state: &GameState, event: &GameEvent) -> bool {
        self.zone_ok(state, event)
            && self.phases_ok(state)
            && self.matches(state, event)
            && self.requirements_ok(state)
    }

    // === Firing ===

    /// Build the ability for one firing. An `Execute$` reference is resolved
    /// against the host's SVars here.
    pub fn bind(&self, state: &GameState, event: &GameEvent) -> Result<BoundAbility, TriggerError> {
        let controller = self
            .controller(state)
            .ok_or(TriggerError::UnknownEntity(self.host))?;
        let ctx = PredicateContext::new(state, self.host, controller);
        let mut objects = self.predicate.triggered_objects(event, &ctx);

        if self.remember_triggering {
            let mut remembered = if self.last_event_seq == Some(event.seq) {
                self.remembered.clone()
            } else {
                Vec::new()
            };
            let current = event
                .entities(RunParam::Card)
                .into_iter()
                .chain(event.entities(RunParam::Cards));
            for card in current {
                if !remembered.contains(&card) {
                    remembered.push(card);
                }
            }
            objects.insert(RunParam::Remembered, EventValue::Entities(remembered));
        }

        let activator = self
            .controller_rule
            .and_then(|rule| match rule {
                ControllerRule::TriggeredPlayer => objects
                    .get(&RunParam::Player)
                    .and_then(player_value),
                ControllerRule::TriggeredActivator => objects
                    .get(&RunParam::Activator)
                    .and_then(player_value),
                ControllerRule::TriggeredCardController => match objects.get(&RunParam::Card) {
                    Some(EventValue::Entity(card)) => state.controller_of(*card),
                    _ => None,
                },
            })
            .unwrap_or(controller);

        let ability = match &self.action {
            TriggerAction::Ability(ability) => ability.clone(),
            TriggerAction::Execute(name) => {
                let card = state
                    .card(self.host)
                    .ok_or(TriggerError::UnknownEntity(self.host))?;
                Ability::from_svar(card, name)?
            }
        };

        let active = state.public.active_player;
        let decider = self.optional_decider.and_then(|filter| {
            state
                .public
                .apnap_order()
                .into_iter()
                .find(|&p| filter.matches(p, controller, active))
        });

        Ok(BoundAbility {
            trigger_id: self.id,
            mode: self.mode,
            host: self.host,
            activator,
            ability,
            triggered_objects: objects,
            optional: self.optional_decider.is_some(),
            decider,
            is_static: self.is_static,
            is_state_trigger: self.mode.is_state(),
            description: self.description(),
        })
    }

    /// Commit one firing: count it against the ceiling and keep its bindings.
    pub fn record_firing(&mut self, event: &GameEvent, bound: &BoundAbility) {
        self.activations_this_turn += 1;
        self.predicate.note_fired(event);
        self.run_params = Some(event.clone());
        self.triggered_objects = bound.triggered_objects.clone();
        if let Some(EventValue::Entities(cards)) = bound.triggered_objects.get(&RunParam::Remembered) {
            self.remembered = cards.clone();
        }
        self.last_event_seq = Some(event.seq);
    }

    /// Clear the per-turn counter and the predicate's per-turn state.
    pub fn reset_turn_state(&mut self) {
        self.activations_this_turn = 0;
        self.predicate.reset_turn_state();
    }

    /// Copy for a new host, e.g. when the card itself is copied. Counters and
    /// volatile state start fresh; a pre-built ability follows the new host.
    #[must_use]
    pub fn clone_for_host(&self, id: TriggerId, host: EntityId) -> Self {
        let mut copy = self.clone();
        copy.id = id;
        copy.activations_this_turn = 0;
        copy.suppressed = false;
        copy.run_params = None;
        copy.triggered_objects.clear();
        copy.remembered.clear();
        copy.last_event_seq = None;
        if copy.host != host {
            copy.host = host;
            if let TriggerAction::Ability(ability) = &mut copy.action {
                ability.rehost(host);
            }
        }
        copy
    }
}

fn player_value(value: &EventValue) -> Option<PlayerId> {
    match value {
        EventValue::Player(p) => Some(*p),
        _ => None,
    }
}

/// Does `event` put only creatures onto the battlefield-like trigger zone?
fn creature_entry(state: &GameState, event: &GameEvent) -> bool {
    let zone = state.config().trigger_zone;
    let entering: Vec<EntityId> = if event.mode == TriggerMode::ChangesZone {
        if event.zone(RunParam::Destination) != Some(zone) {
            return false;
        }
        event.entity(RunParam::Card).into_iter().collect()
    } else {
        event
            .batch()
            .iter()
            .filter(|m| m.zone(RunParam::Destination) == Some(zone))
            .filter_map(|m| m.entity(RunParam::Card))
            .collect()
    };
    !entering.is_empty()
        && entering
            .iter()
            .all(|&e| state.card(e).is_some_and(|c| c.is_type(CardType::Creature)))
}
