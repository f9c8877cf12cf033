//! Trigger declaration parameters.
//!
//! Declarations are written as `Key$ Value | Key$ Value`. The map is kept
//! raw: each predicate parses the keys it owns when it is constructed, and
//! the raw form is what snapshots store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::error::TriggerError;

use super::mode::TriggerMode;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamMap(BTreeMap<String, String>);

impl ParamMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `Key$ Value | Key$ Value`. Empty segments are ignored; a segment
    /// without `$`, with an empty key, or repeating a key is an error.
    pub fn parse(text: &str) -> Result<Self, TriggerError> {
        let mut map = BTreeMap::new();
        for segment in text.split('|') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) = segment
                .split_once('$')
                .ok_or_else(|| TriggerError::MalformedDeclaration(segment.to_string()))?;
            let key = key.trim();
            if key.is_empty() || map.contains_key(key) {
                return Err(TriggerError::MalformedDeclaration(segment.to_string()));
            }
            map.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self(map))
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Add a parameter (builder pattern).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Is `key` present with value `True` (any case)?
    #[must_use]
    pub fn is_true(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Value of a parameter `mode` cannot work without.
    pub fn require(&self, mode: TriggerMode, key: &'static str) -> Result<&str, TriggerError> {
        self.get(key).ok_or_else(|| TriggerError::MissingParam {
            mode: mode.to_string(),
            param: key,
        })
    }

    /// Parse an optional value. A present but unparsable value is an
    /// `InvalidParam` naming this key.
    pub fn parse_value<T: FromStr>(&self, key: &str) -> Result<Option<T>, TriggerError> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| TriggerError::invalid(key, raw)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render back to declaration text, `Mode` first.
    #[must_use]
    pub fn to_declaration(&self) -> String {
        let mut parts = Vec::with_capacity(self.0.len());
        if let Some(mode) = self.get("Mode") {
            parts.push(format!("Mode$ {}", mode));
        }
        for (key, value) in self.iter().filter(|(k, _)| *k != "Mode") {
            parts.push(format!("{}$ {}", key, value));
        }
        parts.join(" | ")
    }
}

impl FromStr for ParamMap {
    type Err = TriggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ParamMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_declaration())
    }
}
