//! Raised game events.
//!
//! An event is a [`TriggerMode`] tag plus an open payload keyed by
//! [`RunParam`]. Game code raises events through the handler after it has
//! already mutated the state; predicates read the payload and the state but
//! never change either.
//!
//! Constructors cover the shapes the built-in predicates read. Anything else
//! can be attached with [`GameEvent::with`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PhaseId, PlayerId, ZoneId};
use crate::zones::ZoneMove;

use super::mode::TriggerMode;

/// Payload keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RunParam {
    Activator,
    Amount,
    Attackers,
    /// Member events of an aggregated event.
    Batch,
    Card,
    Cards,
    /// Identity of the effect or cost that caused the event.
    Cause,
    CounterType,
    Destination,
    IsCombat,
    /// Ordinal of this event for its player this turn (e.g. second card drawn).
    Number,
    Origin,
    Phase,
    Player,
    /// Objects remembered across repeated firings for one event.
    Remembered,
    Source,
    Target,
}

/// A payload value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventValue {
    Entity(EntityId),
    Entities(Vec<EntityId>),
    Player(PlayerId),
    Zone(ZoneId),
    Phase(PhaseId),
    Int(i64),
    Bool(bool),
    Text(String),
    Batch(Vec<GameEvent>),
}

impl From<EntityId> for EventValue {
    fn from(e: EntityId) -> Self {
        EventValue::Entity(e)
    }
}

impl From<Vec<EntityId>> for EventValue {
    fn from(es: Vec<EntityId>) -> Self {
        EventValue::Entities(es)
    }
}

impl From<PlayerId> for EventValue {
    fn from(p: PlayerId) -> Self {
        EventValue::Player(p)
    }
}

impl From<ZoneId> for EventValue {
    fn from(z: ZoneId) -> Self {
        EventValue::Zone(z)
    }
}

impl From<PhaseId> for EventValue {
    fn from(p: PhaseId) -> Self {
        EventValue::Phase(p)
    }
}

impl From<i64> for EventValue {
    fn from(n: i64) -> Self {
        EventValue::Int(n)
    }
}

impl From<bool> for EventValue {
    fn from(b: bool) -> Self {
        EventValue::Bool(b)
    }
}

impl From<&str> for EventValue {
    fn from(s: &str) -> Self {
        EventValue::Text(s.to_string())
    }
}

/// Bindings installed into a fired ability.
pub type TriggeredObjects = BTreeMap<RunParam, EventValue>;

/// A raised event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub mode: TriggerMode,

    /// Stamped by the handler when raised. Repeated firings for the same
    /// event share it.
    pub seq: u64,

    pub params: BTreeMap<RunParam, EventValue>,
}

impl GameEvent {
    /// Create a new event with an empty payload.
    pub fn new(mode: TriggerMode) -> Self {
        Self {
            mode,
            seq: 0,
            params: BTreeMap::new(),
        }
    }

    /// Attach a payload value (builder pattern).
    #[must_use]
    pub fn with(mut self, key: RunParam, value: impl Into<EventValue>) -> Self {
        self.params.insert(key, value.into());
        self
    }

    /// Attach the causing effect's identity (builder pattern).
    #[must_use]
    pub fn with_cause(self, cause: i64) -> Self {
        self.with(RunParam::Cause, cause)
    }

    // === Constructors ===

    /// State-based check.
    pub fn state_check() -> Self {
        Self::new(TriggerMode::Always)
    }

    pub fn zone_change(moved: ZoneMove) -> Self {
        Self::new(TriggerMode::ChangesZone)
            .with(RunParam::Card, moved.entity)
            .with(RunParam::Origin, moved.origin)
            .with(RunParam::Destination, moved.destination)
    }

    pub fn damage_to_card(source: EntityId, target: EntityId, amount: i64, combat: bool) -> Self {
        Self::new(TriggerMode::DamageDone)
            .with(RunParam::Source, source)
            .with(RunParam::Target, target)
            .with(RunParam::Amount, amount)
            .with(RunParam::IsCombat, combat)
    }

    pub fn damage_to_player(source: EntityId, player: PlayerId, amount: i64, combat: bool) -> Self {
        Self::new(TriggerMode::DamageDone)
            .with(RunParam::Source, source)
            .with(RunParam::Player, player)
            .with(RunParam::Amount, amount)
            .with(RunParam::IsCombat, combat)
    }

    pub fn spell_cast(card: EntityId, activator: PlayerId) -> Self {
        Self::new(TriggerMode::SpellCast)
            .with(RunParam::Card, card)
            .with(RunParam::Activator, activator)
    }

    pub fn ability_cast(source: EntityId, activator: PlayerId) -> Self {
        Self::new(TriggerMode::AbilityCast)
            .with(RunParam::Card, source)
            .with(RunParam::Activator, activator)
    }

    pub fn counter_added(card: EntityId, counter: &str, amount: i64) -> Self {
        Self::new(TriggerMode::CounterAdded)
            .with(RunParam::Card, card)
            .with(RunParam::CounterType, counter)
            .with(RunParam::Amount, amount)
    }

    pub fn counter_removed(card: EntityId, counter: &str, amount: i64) -> Self {
        Self::new(TriggerMode::CounterRemoved)
            .with(RunParam::Card, card)
            .with(RunParam::CounterType, counter)
            .with(RunParam::Amount, amount)
    }

    /// `number` is the ordinal of this draw for `player` this turn.
    pub fn drawn(card: EntityId, player: PlayerId, number: i64) -> Self {
        Self::new(TriggerMode::Drawn)
            .with(RunParam::Card, card)
            .with(RunParam::Player, player)
            .with(RunParam::Number, number)
    }

    pub fn discarded(card: EntityId, player: PlayerId) -> Self {
        Self::new(TriggerMode::Discarded)
            .with(RunParam::Card, card)
            .with(RunParam::Player, player)
    }

    pub fn milled(card: EntityId, player: PlayerId) -> Self {
        Self::new(TriggerMode::Milled)
            .with(RunParam::Card, card)
            .with(RunParam::Player, player)
    }

    pub fn attacks(attacker: EntityId, defender: PlayerId) -> Self {
        Self::new(TriggerMode::Attacks)
            .with(RunParam::Card, attacker)
            .with(RunParam::Player, defender)
    }

    pub fn blocks(blocker: EntityId, attacker: EntityId) -> Self {
        Self::new(TriggerMode::Blocks)
            .with(RunParam::Card, blocker)
            .with(RunParam::Target, attacker)
    }

    pub fn attackers_declared(attackers: Vec<EntityId>, attacking_player: PlayerId) -> Self {
        Self::new(TriggerMode::AttackersDeclared)
            .with(RunParam::Attackers, attackers)
            .with(RunParam::Player, attacking_player)
    }

    pub fn life_gained(player: PlayerId, amount: i64) -> Self {
        Self::new(TriggerMode::LifeGained)
            .with(RunParam::Player, player)
            .with(RunParam::Amount, amount)
    }

    pub fn life_lost(player: PlayerId, amount: i64) -> Self {
        Self::new(TriggerMode::LifeLost)
            .with(RunParam::Player, player)
            .with(RunParam::Amount, amount)
    }

    /// A phase or step began during `player`'s turn.
    pub fn phase(phase: PhaseId, player: PlayerId) -> Self {
        Self::new(TriggerMode::Phase)
            .with(RunParam::Phase, phase)
            .with(RunParam::Player, player)
    }

    pub fn turn_begin(player: PlayerId) -> Self {
        Self::new(TriggerMode::TurnBegin).with(RunParam::Player, player)
    }

    pub fn taps(card: EntityId) -> Self {
        Self::new(TriggerMode::Taps).with(RunParam::Card, card)
    }

    pub fn untaps(card: EntityId) -> Self {
        Self::new(TriggerMode::Untaps).with(RunParam::Card, card)
    }

    pub fn sacrificed(card: EntityId, player: PlayerId) -> Self {
        Self::new(TriggerMode::Sacrificed)
            .with(RunParam::Card, card)
            .with(RunParam::Player, player)
    }

    pub fn destroyed(card: EntityId) -> Self {
        Self::new(TriggerMode::Destroyed).with(RunParam::Card, card)
    }

    pub fn becomes_target(target: EntityId, source: EntityId) -> Self {
        Self::new(TriggerMode::BecomesTarget)
            .with(RunParam::Target, target)
            .with(RunParam::Source, source)
    }

    /// Fold member events into one event of the batched `mode`.
    ///
    /// The aggregate carries the members under [`RunParam::Batch`], every
    /// distinct member card under [`RunParam::Cards`] and the summed
    /// [`RunParam::Amount`].
    pub fn aggregate(mode: TriggerMode, members: Vec<GameEvent>) -> Self {
        let mut cards = Vec::new();
        let mut amount = 0;
        for member in &members {
            for key in [RunParam::Card, RunParam::Target] {
                if let Some(card) = member.entity(key) {
                    if !cards.contains(&card) {
                        cards.push(card);
                    }
                }
            }
            amount += member.int(RunParam::Amount).unwrap_or(0);
        }
        let seq = members.first().map_or(0, |m| m.seq);

        let mut event = Self::new(mode)
            .with(RunParam::Cards, cards)
            .with(RunParam::Amount, amount)
            .with(RunParam::Batch, EventValue::Batch(members));
        event.seq = seq;
        event
    }

    // === Accessors ===

    #[must_use]
    pub fn get(&self, key: RunParam) -> Option<&EventValue> {
        self.params.get(&key)
    }

    #[must_use]
    pub fn entity(&self, key: RunParam) -> Option<EntityId> {
        match self.params.get(&key)? {
            EventValue::Entity(e) => Some(*e),
            _ => None,
        }
    }

    /// Entities under `key`, whether stored as one or many.
    #[must_use]
    pub fn entities(&self, key: RunParam) -> Vec<EntityId> {
        match self.params.get(&key) {
            Some(EventValue::Entity(e)) => vec![*e],
            Some(EventValue::Entities(es)) => es.clone(),
            _ => Vec::new(),
        }
    }

    #[must_use]
    pub fn player(&self, key: RunParam) -> Option<PlayerId> {
        match self.params.get(&key)? {
            EventValue::Player(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn zone(&self, key: RunParam) -> Option<ZoneId> {
        match self.params.get(&key)? {
            EventValue::Zone(z) => Some(*z),
            _ => None,
        }
    }

    #[must_use]
    pub fn phase_id(&self) -> Option<PhaseId> {
        match self.params.get(&RunParam::Phase)? {
            EventValue::Phase(p) => Some(*p),
            _ => None,
        }
    }

    #[must_use]
    pub fn int(&self, key: RunParam) -> Option<i64> {
        match self.params.get(&key)? {
            EventValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean payload value; absent counts as false.
    #[must_use]
    pub fn flag(&self, key: RunParam) -> bool {
        matches!(self.params.get(&key), Some(EventValue::Bool(true)))
    }

    #[must_use]
    pub fn text(&self, key: RunParam) -> Option<&str> {
        match self.params.get(&key)? {
            EventValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Member events of an aggregate; empty for plain events.
    #[must_use]
    pub fn batch(&self) -> &[GameEvent] {
        match self.params.get(&RunParam::Batch) {
            Some(EventValue::Batch(members)) => members,
            _ => &[],
        }
    }

    /// The zone `entity` left, if this event (or one of its members) moved it.
    #[must_use]
    pub fn moved_from(&self, entity: EntityId) -> Option<ZoneId> {
        if self.mode == TriggerMode::ChangesZone && self.entity(RunParam::Card) == Some(entity) {
            return self.zone(RunParam::Origin);
        }
        self.batch().iter().find_map(|m| m.moved_from(entity))
    }

    /// Cards this event moved, in order.
    #[must_use]
    pub fn moved_cards(&self) -> Vec<EntityId> {
        if self.mode == TriggerMode::ChangesZone {
            return self.entity(RunParam::Card).into_iter().collect();
        }
        self.batch().iter().flat_map(GameEvent::moved_cards).collect()
    }

    /// Did this event (or one of its members) put a card into `zone`?
    #[must_use]
    pub fn enters_zone(&self, zone: ZoneId) -> bool {
        if self.mode == TriggerMode::ChangesZone {
            return self.zone(RunParam::Destination) == Some(zone);
        }
        self.batch().iter().any(|m| m.enters_zone(zone))
    }
}
