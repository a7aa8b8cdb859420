//! Error types for the handoff-core crate.

use std::fmt;

/// Top-level error type for handoff-core operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CoreError {
    /// A participant identity was empty or contained whitespace.
    InvalidParticipantId(String),
    /// A performative name was not one of the four protocol performatives.
    UnknownPerformative(String),
    /// A message was built without any receiver.
    NoReceivers,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::InvalidParticipantId(id) => write!(f, "invalid participant id: {:?}", id),
            CoreError::UnknownPerformative(name) => write!(f, "unknown performative: {}", name),
            CoreError::NoReceivers => write!(f, "message has no receivers"),
        }
    }
}

impl std::error::Error for CoreError {}
