//! Bus and directory error types.

use handoff_core::{CoreError, ParticipantId};
use thiserror::Error;

/// Transport and directory errors.
#[derive(Debug, Error)]
pub enum BusError {
    /// A message was addressed to a participant without a mailbox.
    #[error("Unknown receiver: {0}")]
    UnknownReceiver(ParticipantId),

    /// The receiver's mailbox has been dropped.
    #[error("Mailbox closed for {0}")]
    MailboxClosed(ParticipantId),

    /// A participant tried to register twice.
    #[error("Participant already registered: {0}")]
    AlreadyRegistered(ParticipantId),

    /// Message content exceeds the configured limit.
    #[error("Content too large: {size} bytes (max: {max})")]
    ContentTooLarge { size: usize, max: usize },

    /// Message addresses more receivers than allowed.
    #[error("Too many receivers: {count} (max: {max})")]
    TooManyReceivers { count: usize, max: usize },

    /// A message could not be built.
    #[error("Invalid message: {0}")]
    InvalidMessage(#[from] CoreError),

    /// The directory or mailbox registry could not be accessed.
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// The participant is already registered under this role.
    #[error("Duplicate service registration: {role} for {participant}")]
    DuplicateService { role: String, participant: ParticipantId },
}

/// Result type for bus operations.
pub type BusResult<T> = Result<T, BusError>;
