//! In-memory directory.

use std::sync::RwLock;

use handoff_core::ParticipantId;

use super::{Directory, ServiceDescription};
use crate::error::{BusError, BusResult};

/// Thread-safe directory kept in process memory.
pub struct InMemoryDirectory {
    entries: RwLock<Vec<(ParticipantId, ServiceDescription)>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Number of advertised services.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if nothing is advertised.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

fn unavailable<T>(_: T) -> BusError {
    BusError::DirectoryUnavailable("directory lock poisoned".to_string())
}

impl Directory for InMemoryDirectory {
    fn register(&self, participant: ParticipantId, service: ServiceDescription) -> BusResult<()> {
        let mut entries = self.entries.write().map_err(unavailable)?;
        if entries
            .iter()
            .any(|(id, s)| id == &participant && s.role == service.role)
        {
            return Err(BusError::DuplicateService {
                role: service.role,
                participant,
            });
        }

        tracing::debug!(
            participant = %participant,
            role = %service.role,
            name = %service.name,
            "Service registered"
        );
        entries.push((participant, service));
        Ok(())
    }

    fn deregister(&self, participant: &ParticipantId) -> BusResult<usize> {
        let mut entries = self.entries.write().map_err(unavailable)?;
        let before = entries.len();
        entries.retain(|(id, _)| id != participant);
        Ok(before - entries.len())
    }

    fn search(&self, role: &str) -> BusResult<Vec<ParticipantId>> {
        let entries = self.entries.read().map_err(unavailable)?;
        Ok(entries
            .iter()
            .filter(|(_, s)| s.role == role)
            .map(|(id, _)| id.clone())
            .collect())
    }
}
