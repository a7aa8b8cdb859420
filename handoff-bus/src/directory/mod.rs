//! Participant directory.
//!
//! This module provides:
//! - The [`Directory`] contract: role name to participant addresses
//! - An in-memory directory shared by all participants of a process
//! - [`find_participant`], the lookup every participant uses, which turns
//!   directory failures into "not found"

mod memory;

use handoff_core::ParticipantId;

use crate::error::BusResult;

pub use memory::InMemoryDirectory;

/// A service a participant offers under a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    /// Role name used for lookup (e.g. `"ledger"`).
    pub role: String,
    /// Human-readable service name.
    pub name: String,
}

impl ServiceDescription {
    /// Describe a service.
    pub fn new(role: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: name.into(),
        }
    }
}

/// Maps role names to reachable participants.
pub trait Directory: Send + Sync {
    /// Advertise a service offered by a participant.
    fn register(&self, participant: ParticipantId, service: ServiceDescription) -> BusResult<()>;

    /// Withdraw every service offered by a participant. Returns how many were removed.
    fn deregister(&self, participant: &ParticipantId) -> BusResult<usize>;

    /// All participants offering `role`, in registration order. Empty means not found.
    fn search(&self, role: &str) -> BusResult<Vec<ParticipantId>>;
}

/// Look up the first participant offering `role`.
///
/// Directory errors are logged and reported as `None`; callers branch on the
/// result and never see the error.
pub fn find_participant(directory: &dyn Directory, role: &str) -> Option<ParticipantId> {
    match directory.search(role) {
        Ok(found) => {
            let first = found.into_iter().next();
            match &first {
                Some(id) => tracing::debug!(role, participant = %id, "Participant found"),
                None => tracing::debug!(role, "No participant offers role"),
            }
            first
        }
        Err(e) => {
            tracing::warn!(role, error = %e, "Directory lookup failed");
            None
        }
    }
}
