//! Zone change predicates: `ChangesZone` and the batched `ChangesZoneAll`.
//!
//! Parameters: `Origin$`, `Destination$` (zone lists or `Any`; at least one
//! is required), `ExcludedDestinations$`, `ValidCard$` / `ValidCards$`,
//! `OncePerEffect$`.
//!
//! A declared origin makes the trigger a leaves-zone trigger: its host is
//! evaluated for the event that moved it out of the trigger zone.

use smallvec::SmallVec;

use crate::cards::CardFilter;
use crate::core::{GameConfig, TriggerError, ZoneId};
use crate::triggers::event::{EventValue, GameEvent, RunParam, TriggeredObjects};
use crate::triggers::mode::TriggerMode;
use crate::triggers::params::ParamMap;

use super::{parse_zones, pick, subject, ConditionPredicate, OncePerEffect, PredicateContext};

type ZoneList = SmallVec<[ZoneId; 2]>;

#[derive(Clone, Debug)]
struct ZoneSpec {
    origin: Option<ZoneList>,
    destination: Option<ZoneList>,
    excluded: Option<ZoneList>,
}

impl ZoneSpec {
    fn parse(mode: TriggerMode, params: &ParamMap, config: &GameConfig) -> Result<Self, TriggerError> {
        if !params.contains("Origin") && !params.contains("Destination") {
            return Err(TriggerError::MissingParam {
                mode: mode.to_string(),
                param: "Destination",
            });
        }
        Ok(Self {
            origin: parse_zones(params, "Origin", config)?,
            destination: parse_zones(params, "Destination", config)?,
            excluded: parse_zones(params, "ExcludedDestinations", config)?,
        })
    }

    fn accepts(&self, event: &GameEvent) -> bool {
        let (Some(origin), Some(destination)) =
            (event.zone(RunParam::Origin), event.zone(RunParam::Destination))
        else {
            return false;
        };
        self.origin.as_ref().is_none_or(|zs| zs.contains(&origin))
            && self.destination.as_ref().is_none_or(|zs| zs.contains(&destination))
            && !self.excluded.as_ref().is_some_and(|zs| zs.contains(&destination))
    }

    fn describe(&self, config: &GameConfig) -> String {
        let names = |zones: &Option<ZoneList>| match zones {
            None => "anywhere".to_string(),
            Some(zs) => zs
                .iter()
                .map(|&z| config.zone_name(z).unwrap_or("?"))
                .collect::<Vec<_>>()
                .join(" or "),
        };
        format!("from {} to {}", names(&self.origin), names(&self.destination))
    }
}

/// One card changed zones.
#[derive(Clone, Debug)]
pub struct ChangesZone {
    zones: ZoneSpec,
    valid_card: Option<CardFilter>,
    once: OncePerEffect,
    description: String,
}

pub fn parse_changes_zone(
    mode: TriggerMode,
    params: &ParamMap,
    config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    let zones = ZoneSpec::parse(mode, params, config)?;
    let valid_card: Option<CardFilter> = params.parse_value("ValidCard")?;
    let description = format!(
        "When {} moves {}",
        subject(valid_card.as_ref()),
        zones.describe(config)
    );
    Ok(Box::new(ChangesZone {
        zones,
        valid_card,
        once: OncePerEffect::from_params(params),
        description,
    }))
}

impl ConditionPredicate for ChangesZone {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        let card = event.entity(RunParam::Card);
        card.is_some()
            && self.zones.accepts(event)
            && ctx.card_passes(self.valid_card.as_ref(), card)
            && self.once.allows(event)
    }

    fn triggered_objects(&self, event: &GameEvent, _ctx: &PredicateContext<'_>) -> TriggeredObjects {
        pick(
            event,
            &[RunParam::Card, RunParam::Origin, RunParam::Destination, RunParam::Cause],
        )
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn note_fired(&mut self, event: &GameEvent) {
        self.once.record(event);
    }

    fn reset_turn_state(&mut self) {
        self.once.reset();
    }

    fn uses_look_back(&self) -> bool {
        self.zones.origin.is_some()
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}

/// One or more cards changed zones at once.
#[derive(Clone, Debug)]
pub struct ChangesZoneAll {
    zones: ZoneSpec,
    valid_cards: Option<CardFilter>,
    description: String,
}

pub fn parse_changes_zone_all(
    mode: TriggerMode,
    params: &ParamMap,
    config: &GameConfig,
) -> Result<Box<dyn ConditionPredicate>, TriggerError> {
    let zones = ZoneSpec::parse(mode, params, config)?;
    let valid_cards: Option<CardFilter> = params.parse_value("ValidCards")?;
    let description = format!(
        "When one or more cards ({}) move {}",
        valid_cards.as_ref().map_or_else(|| "Card".to_string(), |f| f.to_string()),
        zones.describe(config)
    );
    Ok(Box::new(ChangesZoneAll {
        zones,
        valid_cards,
        description,
    }))
}

impl ChangesZoneAll {
    fn matching<'e>(&self, event: &'e GameEvent, ctx: &PredicateContext<'_>) -> Vec<&'e GameEvent> {
        event
            .batch()
            .iter()
            .filter(|m| {
                self.zones.accepts(m)
                    && ctx.card_passes(self.valid_cards.as_ref(), m.entity(RunParam::Card))
            })
            .collect()
    }
}

impl ConditionPredicate for ChangesZoneAll {
    fn matches(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> bool {
        !self.matching(event, ctx).is_empty()
    }

    fn triggered_objects(&self, event: &GameEvent, ctx: &PredicateContext<'_>) -> TriggeredObjects {
        let mut cards = Vec::new();
        for member in self.matching(event, ctx) {
            if let Some(card) = member.entity(RunParam::Card) {
                if !cards.contains(&card) {
                    cards.push(card);
                }
            }
        }
        let mut objects = TriggeredObjects::new();
        objects.insert(RunParam::Amount, EventValue::Int(cards.len() as i64));
        objects.insert(RunParam::Cards, EventValue::Entities(cards));
        objects
    }

    fn description(&self) -> String {
        self.description.clone()
    }

    fn uses_look_back(&self) -> bool {
        self.zones.origin.is_some()
    }

    fn clone_box(&self) -> Box<dyn ConditionPredicate> {
        Box::new(self.clone())
    }
}
