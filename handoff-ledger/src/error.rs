//! Ledger service error types.

use handoff_bus::BusError;
use handoff_core::ParticipantId;
use thiserror::Error;

/// Errors raised while starting or running the ledger service.
///
/// Protocol outcomes such as a refused redemption are not errors; see
/// [`crate::RedeemOutcome`].
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The ledger could not attach to the bus.
    #[error("Failed to attach ledger {participant} to the bus")]
    Attach {
        participant: ParticipantId,
        #[source]
        source: BusError,
    },

    /// The ledger could not advertise itself in the directory.
    #[error("Failed to register ledger {participant} as {role}")]
    Registration {
        participant: ParticipantId,
        role: String,
        #[source]
        source: BusError,
    },
}

/// Result type for ledger service operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn test_error_display_leaves_cause_to_source() {
        let err = LedgerError::Registration {
            participant: ParticipantId::new("ledger"),
            role: "ledger".to_string(),
            source: BusError::DirectoryUnavailable("poisoned".to_string()),
        };

        assert_eq!(err.to_string(), "Failed to register ledger ledger as ledger");
        let source = err.source().map(|s| s.to_string()).unwrap_or_default();
        assert!(source.contains("poisoned"));

        let err = LedgerError::Attach {
            participant: ParticipantId::new("ledger"),
            source: BusError::AlreadyRegistered(ParticipantId::new("ledger")),
        };
        assert_eq!(err.to_string(), "Failed to attach ledger ledger to the bus");
        assert!(err.source().is_some());
    }
}
