//! Participant identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Address of a protocol participant.
///
/// Identities are owned by the transport and directory layers; the protocol
/// only uses them as message receivers and as map keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create an identity from a local name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The local name of the participant.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ParticipantId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidParticipantId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_participant_id() {
        let id: ParticipantId = "ledger".parse().unwrap();
        assert_eq!(id.as_str(), "ledger");
        assert_eq!(id, ParticipantId::new("ledger"));
        assert_eq!(format!("{}", id), "ledger");
    }

    #[test]
    fn test_parse_rejects_blank_names() {
        assert!(matches!(
            "".parse::<ParticipantId>(),
            Err(CoreError::InvalidParticipantId(_))
        ));
        assert!("agent a".parse::<ParticipantId>().is_err());
    }
}
