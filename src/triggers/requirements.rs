//! Trigger requirements.
//!
//! Preconditions on the game state as a whole, checked independently of the
//! event being dispatched:
//!
//! - `LifeTotal$ You|Opponent` with `LifeAmount$ LE5`: some player of that
//!   kind has a life total passing the comparison
//! - `MostLife$ True`: the controller has strictly more life than everyone else
//! - `IsPresent$ <filter>` with optional `PresentZone$` (defaults to the
//!   trigger zone) and `PresentCompare$` (defaults to `GE1`)

use crate::cards::{CardFilter, CmpOp, Comparison, PlayerFilter};
use crate::core::{EntityId, GameConfig, GameState, PlayerId, TriggerError, ZoneId};

use super::mode::TriggerMode;
use super::params::ParamMap;

#[derive(Clone, Debug, PartialEq, Eq)]
struct LifeTotal {
    who: PlayerFilter,
    amount: Comparison,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Presence {
    filter: CardFilter,
    zone: ZoneId,
    count: Comparison,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Requirements {
    life_total: Option<LifeTotal>,
    most_life: bool,
    present: Option<Presence>,
}

impl Requirements {
    pub fn parse(mode: TriggerMode, params: &ParamMap, config: &GameConfig) -> Result<Self, TriggerError> {
        let life_total = match params.parse_value::<PlayerFilter>("LifeTotal")? {
            None => None,
            Some(who) => {
                let raw = params.require(mode, "LifeAmount")?;
                let amount = raw
                    .parse()
                    .map_err(|_| TriggerError::invalid("LifeAmount", raw))?;
                Some(LifeTotal { who, amount })
            }
        };

        let present = match params.parse_value::<CardFilter>("IsPresent")? {
            None => None,
            Some(filter) => {
                let zone = match params.get("PresentZone") {
                    None => config.trigger_zone,
                    Some(name) => config
                        .zone_named(name)
                        .ok_or_else(|| TriggerError::invalid("PresentZone", name))?,
                };
                let count = params
                    .parse_value("PresentCompare")?
                    .unwrap_or(Comparison::new(CmpOp::Ge, 1));
                Some(Presence { filter, zone, count })
            }
        };

        Ok(Self {
            life_total,
            most_life: params.is_true("MostLife"),
            present,
        })
    }

    /// No requirement declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.life_total.is_none() && !self.most_life && self.present.is_none()
    }

    /// Do all declared requirements hold for a trigger on `host` controlled
    /// by `controller`?
    #[must_use]
    pub fn hold(&self, state: &GameState, host: EntityId, controller: PlayerId) -> bool {
        let active = state.public.active_player;

        if let Some(req) = &self.life_total {
            let any = state
                .public
                .player_ids()
                .filter(|&p| req.who.matches(p, controller, active))
                .any(|p| req.amount.holds(state.life(p)));
            if !any {
                return false;
            }
        }

        if self.most_life {
            let mine = state.life(controller);
            let beaten = state
                .public
                .player_ids()
                .filter(|&p| p != controller)
                .all(|p| state.life(p) < mine);
            if !beaten {
                return false;
            }
        }

        if let Some(req) = &self.present {
            let count = state
                .cards_in_zone(req.zone)
                .iter()
                .filter_map(|&e| state.card(e))
                .filter(|card| req.filter.matches(card, host, controller))
                .count();
            if !req.count.holds(count as i64) {
                return false;
            }
        }

        true
    }
}
