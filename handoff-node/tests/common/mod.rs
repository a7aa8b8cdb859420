//! Shared test helpers for handoff-node integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use handoff_bus::{BusConfig, Directory, Endpoint, InMemoryDirectory, MessageBus};
use handoff_core::{Message, ParticipantId};
use handoff_ledger::{LedgerConfig, LedgerService};
use handoff_node::RunningProtocol;

/// Upper bound for any single protocol round in tests.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(5);

/// A bus and directory with nothing attached.
pub struct TestNetwork {
    pub bus: MessageBus,
    pub directory: Arc<InMemoryDirectory>,
}

impl TestNetwork {
    pub fn new() -> Self {
        Self {
            bus: MessageBus::new(BusConfig::default()),
            directory: Arc::new(InMemoryDirectory::new()),
        }
    }

    pub fn directory(&self) -> Arc<dyn Directory> {
        self.directory.clone()
    }

    /// Attach a bare endpoint the test drives by hand.
    pub fn endpoint(&self, name: &str) -> Endpoint {
        self.bus.endpoint(ParticipantId::new(name)).unwrap()
    }

    /// Attach and register a ledger service, ready to spawn.
    pub fn ledger(&self, name: &str, config: LedgerConfig) -> LedgerService {
        let mut service =
            LedgerService::attach(&self.bus, self.directory(), ParticipantId::new(name), config)
                .unwrap();
        service.register().unwrap();
        service
    }
}

/// Wait for the protocol to settle, failing the test on timeout.
pub async fn settle(running: &mut RunningProtocol) -> handoff_node::ProtocolOutcome {
    timeout(SETTLE_TIMEOUT, running.wait_settled())
        .await
        .expect("protocol did not settle in time")
}

/// Receive on a hand-driven endpoint, failing the test on timeout.
pub async fn recv(endpoint: &mut Endpoint) -> Message {
    timeout(SETTLE_TIMEOUT, endpoint.recv())
        .await
        .expect("timed out waiting for message")
        .expect("mailbox closed")
}
