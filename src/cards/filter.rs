//! Filters used by trigger declarations.
//!
//! ## CardFilter
//!
//! `Type.Prop+Prop,Type.Prop` syntax. Comma separates alternatives, the first
//! dot-segment picks a card type (`Card` matches anything, `Permanent` any
//! permanent type, `nonLand` anything that is not a land) and `+` joins
//! properties that must all hold:
//!
//! ```
//! use ccg_triggers::cards::CardFilter;
//!
//! let filter: CardFilter = "Creature.YouCtrl+Other,Artifact.OppCtrl".parse().unwrap();
//! assert_eq!(filter.to_string(), "Creature.YouCtrl+Other,Artifact.OppCtrl");
//! ```
//!
//! ## PlayerFilter
//!
//! `You`, `Opponent`, `Player`, `ActivePlayer`, `NonActivePlayer`.
//!
//! ## Comparison
//!
//! Two-letter operator plus an integer: `GE3`, `LT1`, `EQ0`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::instance::{CardInstance, CardType};
use crate::core::entity::EntityId;
use crate::core::error::TriggerError;
use crate::core::player::PlayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum TypeSelector {
    Any,
    Permanent,
    Is(CardType),
    Not(CardType),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
enum CardProp {
    /// The filter's host itself.
    Itself,
    /// Anything but the host.
    Other,
    YouCtrl,
    OppCtrl,
    YouOwn,
    OppOwn,
    Token,
    NonToken,
    Tapped,
    Untapped,
    NonType(CardType),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
struct FilterClause {
    selector: TypeSelector,
    props: SmallVec<[CardProp; 2]>,
}

/// A parsed card filter. Keeps its source text for display and re-parsing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFilter {
    text: String,
    clauses: Vec<FilterClause>,
}

impl CardFilter {
    /// Filter that accepts every card.
    #[must_use]
    pub fn any() -> Self {
        Self {
            text: "Card".to_string(),
            clauses: vec![FilterClause {
                selector: TypeSelector::Any,
                props: SmallVec::new(),
            }],
        }
    }

    /// Does `card` pass this filter, from the point of view of `host`
    /// controlled by `you`?
    #[must_use]
    pub fn matches(&self, card: &CardInstance, host: EntityId, you: PlayerId) -> bool {
        self.clauses.iter().any(|clause| {
            let type_ok = match clause.selector {
                TypeSelector::Any => true,
                TypeSelector::Permanent => card.is_permanent(),
                TypeSelector::Is(t) => card.is_type(t),
                TypeSelector::Not(t) => !card.is_type(t),
            };
            type_ok && clause.props.iter().all(|&prop| prop_holds(prop, card, host, you))
        })
    }

    /// Does the filter name the host itself and nothing else (`Card.Self`)?
    #[must_use]
    pub fn is_self_only(&self) -> bool {
        self.clauses
            .iter()
            .all(|c| c.props.contains(&CardProp::Itself))
    }
}

fn prop_holds(prop: CardProp, card: &CardInstance, host: EntityId, you: PlayerId) -> bool {
    match prop {
        CardProp::Itself => card.entity_id == host,
        CardProp::Other => card.entity_id != host,
        CardProp::YouCtrl => card.controller == you,
        CardProp::OppCtrl => card.controller != you,
        CardProp::YouOwn => card.owner == you,
        CardProp::OppOwn => card.owner != you,
        CardProp::Token => card.token,
        CardProp::NonToken => !card.token,
        CardProp::Tapped => card.has_flag("tapped"),
        CardProp::Untapped => !card.has_flag("tapped"),
        CardProp::NonType(t) => !card.is_type(t),
    }
}

fn parse_selector(s: &str, full: &str) -> Result<TypeSelector, TriggerError> {
    match s {
        "Card" => Ok(TypeSelector::Any),
        "Permanent" => Ok(TypeSelector::Permanent),
        _ => {
            if let Some(rest) = s.strip_prefix("non") {
                return rest
                    .parse()
                    .map(TypeSelector::Not)
                    .map_err(|_| TriggerError::invalid("filter", full));
            }
            s.parse()
                .map(TypeSelector::Is)
                .map_err(|_| TriggerError::invalid("filter", full))
        }
    }
}

fn parse_prop(s: &str, full: &str) -> Result<CardProp, TriggerError> {
    Ok(match s {
        "Self" => CardProp::Itself,
        "Other" => CardProp::Other,
        "YouCtrl" => CardProp::YouCtrl,
        "OppCtrl" => CardProp::OppCtrl,
        "YouOwn" => CardProp::YouOwn,
        "OppOwn" => CardProp::OppOwn,
        "token" | "Token" => CardProp::Token,
        "nonToken" => CardProp::NonToken,
        "tapped" | "Tapped" => CardProp::Tapped,
        "untapped" | "Untapped" => CardProp::Untapped,
        _ => {
            let t = s
                .strip_prefix("non")
                .and_then(|rest| rest.parse().ok())
                .ok_or_else(|| TriggerError::invalid("filter", full))?;
            CardProp::NonType(t)
        }
    })
}

impl FromStr for CardFilter {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Err(TriggerError::invalid("filter", s));
        }

        let mut clauses = Vec::new();
        for alternative in text.split(',') {
            let alternative = alternative.trim();
            let (selector, props) = match alternative.split_once('.') {
                Some((head, tail)) => (head, Some(tail)),
                None => (alternative, None),
            };

            let selector = parse_selector(selector, text)?;
            let mut parsed = SmallVec::new();
            if let Some(props) = props {
                for prop in props.split('+') {
                    parsed.push(parse_prop(prop.trim(), text)?);
                }
            }
            clauses.push(FilterClause {
                selector,
                props: parsed,
            });
        }

        Ok(Self {
            text: text.to_string(),
            clauses,
        })
    }
}

impl fmt::Display for CardFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Which players a declaration refers to, relative to the trigger's controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerFilter {
    You,
    Opponent,
    Any,
    Active,
    NonActive,
}

impl PlayerFilter {
    #[must_use]
    pub fn matches(self, player: PlayerId, you: PlayerId, active: PlayerId) -> bool {
        match self {
            PlayerFilter::You => player == you,
            PlayerFilter::Opponent => player != you,
            PlayerFilter::Any => true,
            PlayerFilter::Active => player == active,
            PlayerFilter::NonActive => player != active,
        }
    }
}

impl FromStr for PlayerFilter {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "You" => PlayerFilter::You,
            "Opponent" => PlayerFilter::Opponent,
            "Player" | "Any" => PlayerFilter::Any,
            "ActivePlayer" => PlayerFilter::Active,
            "NonActivePlayer" => PlayerFilter::NonActive,
            other => return Err(TriggerError::invalid("player filter", other)),
        })
    }
}

impl fmt::Display for PlayerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PlayerFilter::You => "You",
            PlayerFilter::Opponent => "Opponent",
            PlayerFilter::Any => "Player",
            PlayerFilter::Active => "ActivePlayer",
            PlayerFilter::NonActive => "NonActivePlayer",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CmpOp {
    Lt,
    Le,
    Eq,
    Ne,
    Gt,
    Ge,
}

/// An integer comparison such as `GE3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub op: CmpOp,
    pub rhs: i64,
}

impl Comparison {
    #[must_use]
    pub const fn new(op: CmpOp, rhs: i64) -> Self {
        Self { op, rhs }
    }

    #[must_use]
    pub fn holds(self, lhs: i64) -> bool {
        match self.op {
            CmpOp::Lt => lhs < self.rhs,
            CmpOp::Le => lhs <= self.rhs,
            CmpOp::Eq => lhs == self.rhs,
            CmpOp::Ne => lhs != self.rhs,
            CmpOp::Gt => lhs > self.rhs,
            CmpOp::Ge => lhs >= self.rhs,
        }
    }
}

impl FromStr for Comparison {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || TriggerError::invalid("comparison", s);
        if s.len() < 3 || !s.is_char_boundary(2) {
            return Err(err());
        }
        let (op, rhs) = s.split_at(2);
        let op = match op {
            "LT" => CmpOp::Lt,
            "LE" => CmpOp::Le,
            "EQ" => CmpOp::Eq,
            "NE" => CmpOp::Ne,
            "GT" => CmpOp::Gt,
            "GE" => CmpOp::Ge,
            _ => return Err(err()),
        };
        let rhs = rhs.parse().map_err(|_| err())?;
        Ok(Self { op, rhs })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.op {
            CmpOp::Lt => "LT",
            CmpOp::Le => "LE",
            CmpOp::Eq => "EQ",
            CmpOp::Ne => "NE",
            CmpOp::Gt => "GT",
            CmpOp::Ge => "GE",
        };
        write!(f, "{}{}", op, self.rhs)
    }
}
