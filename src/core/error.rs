//! Engine error type.
//!
//! Authoring errors (bad declarations, unknown names) surface at trigger
//! construction. Execution errors are produced while resolving a firing and
//! are absorbed per trigger by the handler. Evaluation misses are not errors
//! at all: predicates answer "no match".

use thiserror::Error;

use super::entity::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("trigger declaration has no Mode$ parameter")]
    MissingMode,

    #[error("unknown trigger mode `{0}`")]
    UnknownMode(String),

    #[error("{mode} trigger requires parameter `{param}`")]
    MissingParam { mode: String, param: &'static str },

    #[error("invalid value `{value}` for parameter `{param}`")]
    InvalidParam { param: String, value: String },

    #[error("malformed declaration segment `{0}`")]
    MalformedDeclaration(String),

    #[error("{host} has no SVar `{name}`")]
    MissingSVar { host: EntityId, name: String },

    #[error("unknown entity {0}")]
    UnknownEntity(EntityId),

    #[error("ability execution failed: {0}")]
    Execution(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl TriggerError {
    /// Shorthand for an `InvalidParam` error.
    pub fn invalid(param: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidParam {
            param: param.into(),
            value: value.into(),
        }
    }

    /// True for errors that indicate bad rules data rather than a failed firing.
    #[must_use]
    pub fn is_authoring(&self) -> bool {
        matches!(
            self,
            Self::MissingMode
                | Self::UnknownMode(_)
                | Self::MissingParam { .. }
                | Self::InvalidParam { .. }
                | Self::MalformedDeclaration(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = TriggerError::MissingParam {
            mode: "ChangesZone".to_string(),
            param: "Destination",
        };
        assert_eq!(err.to_string(), "ChangesZone trigger requires parameter `Destination`");

        let err = TriggerError::MissingSVar {
            host: EntityId(4),
            name: "TrigDraw".to_string(),
        };
        assert_eq!(err.to_string(), "Entity(4) has no SVar `TrigDraw`");
    }

    #[test]
    fn test_authoring_classification() {
        assert!(TriggerError::MissingMode.is_authoring());
        assert!(TriggerError::invalid("Phase", "Lunch").is_authoring());
        assert!(!TriggerError::Execution("boom".to_string()).is_authoring());
    }
}
