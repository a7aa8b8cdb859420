//! Node orchestrator.
//!
//! Wires the bus and the directory together, starts the ledger, relay and
//! initiator as separate tasks, and reports how the protocol ended.

use std::fmt;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use handoff_bus::{Directory, InMemoryDirectory, MessageBus};
use handoff_ledger::{Ledger, LedgerService};

use crate::config::NodeConfig;
use crate::initiator::{Initiator, InitiatorState};
use crate::relay::{Relay, RelayState};
use crate::shutdown::wait_for_shutdown_signal;

/// Snapshot of where the protocol stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolOutcome {
    /// Initiator state.
    pub initiator: InitiatorState,
    /// Relay state.
    pub relay: RelayState,
}

impl ProtocolOutcome {
    /// Check if nothing further will happen without outside input.
    pub fn is_settled(&self) -> bool {
        self.initiator == InitiatorState::DiscoveryFailed || self.relay.is_terminal()
    }
}

impl fmt::Display for ProtocolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "initiator={}, relay={}", self.initiator, self.relay)
    }
}

/// Final report after every participant has stopped.
#[derive(Debug)]
pub struct ProtocolReport {
    /// How the protocol ended.
    pub outcome: ProtocolOutcome,
    /// The ledger, if one was started.
    pub ledger: Option<Ledger>,
}

/// Handles to the participant tasks of a running protocol.
pub struct RunningProtocol {
    initiator_state: watch::Receiver<InitiatorState>,
    relay_state: watch::Receiver<RelayState>,
    shutdown_handles: Vec<mpsc::Sender<()>>,
    ledger_task: Option<JoinHandle<Ledger>>,
    relay_task: JoinHandle<RelayState>,
    initiator_task: JoinHandle<InitiatorState>,
}

impl RunningProtocol {
    /// Current states of the initiator and relay.
    pub fn outcome(&self) -> ProtocolOutcome {
        ProtocolOutcome {
            initiator: self.initiator_state.borrow().clone(),
            relay: self.relay_state.borrow().clone(),
        }
    }

    /// Wait until the initiator fails discovery or the relay reaches a verdict.
    ///
    /// There is no timeout: a reply that never arrives keeps this pending.
    pub async fn wait_settled(&mut self) -> ProtocolOutcome {
        let mut initiator = self.initiator_state.clone();
        let mut relay = self.relay_state.clone();

        tokio::select! {
            _ = initiator.wait_for(|s| *s == InitiatorState::DiscoveryFailed) => {}
            _ = relay.wait_for(|s| s.is_terminal()) => {}
        }

        self.outcome()
    }

    /// Stop every participant and collect their final state.
    pub async fn shutdown(self) -> anyhow::Result<ProtocolReport> {
        for handle in &self.shutdown_handles {
            let _ = handle.send(()).await;
        }

        let initiator = self.initiator_task.await.context("initiator task failed")?;
        let relay = self.relay_task.await.context("relay task failed")?;
        let ledger = match self.ledger_task {
            Some(task) => Some(task.await.context("ledger task failed")?),
            None => None,
        };

        Ok(ProtocolReport {
            outcome: ProtocolOutcome { initiator, relay },
            ledger,
        })
    }
}

/// The main node structure.
pub struct Node {
    config: NodeConfig,
    bus: MessageBus,
    directory: Arc<InMemoryDirectory>,
}

impl Node {
    /// Create a node with a fresh bus and directory.
    pub fn new(config: NodeConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let bus = MessageBus::new(config.bus.clone());

        Ok(Self {
            config,
            bus,
            directory: Arc::new(InMemoryDirectory::new()),
        })
    }

    /// The node's message bus.
    pub fn bus(&self) -> &MessageBus {
        &self.bus
    }

    /// The node's directory.
    pub fn directory(&self) -> Arc<InMemoryDirectory> {
        self.directory.clone()
    }

    /// Start all participants.
    ///
    /// The ledger is registered in the directory before any task is spawned,
    /// and the relay is attached before the initiator starts, so the
    /// initiator never races either of them. A failed ledger registration is
    /// logged and the ledger still serves its mailbox.
    pub fn start(&self) -> anyhow::Result<RunningProtocol> {
        let directory: Arc<dyn Directory> = self.directory.clone();
        let mut shutdown_handles = Vec::new();

        let ledger_task = if self.config.start_ledger {
            let mut service = LedgerService::attach(
                &self.bus,
                directory.clone(),
                self.config.ledger_id.clone(),
                self.config.ledger.clone(),
            )?;
            if let Err(e) = service.register() {
                tracing::warn!(error = ?e, "Ledger registration failed, continuing unlisted");
            }
            shutdown_handles.push(service.shutdown_handle());
            Some(tokio::spawn(service.run()))
        } else {
            tracing::info!("Ledger disabled");
            None
        };

        let relay_endpoint = self
            .bus
            .endpoint(self.config.relay_id.clone())
            .context("failed to attach relay")?;
        let relay = Relay::new(relay_endpoint, directory.clone(), self.config.ledger_role());
        let relay_state = relay.subscribe();
        shutdown_handles.push(relay.shutdown_handle());
        let relay_task = tokio::spawn(relay.run());

        let initiator_endpoint = self
            .bus
            .endpoint(self.config.initiator_id.clone())
            .context("failed to attach initiator")?;
        let initiator = Initiator::new(
            initiator_endpoint,
            directory,
            self.config.ledger_role(),
            self.config.relay_id.clone(),
        );
        let initiator_state = initiator.subscribe();
        shutdown_handles.push(initiator.shutdown_handle());
        let initiator_task = tokio::spawn(initiator.run());

        Ok(RunningProtocol {
            initiator_state,
            relay_state,
            shutdown_handles,
            ledger_task,
            relay_task,
            initiator_task,
        })
    }

    /// Run the node until the protocol settles (with `exit_on_outcome`) or a
    /// shutdown signal arrives.
    pub async fn run(&self) -> anyhow::Result<ProtocolReport> {
        tracing::info!("Starting handoff node...");
        tracing::info!(
            "  Ledger: {} (role {}, policy {})",
            self.config.ledger_id,
            self.config.ledger_role(),
            self.config.ledger.redeem_policy
        );
        tracing::info!("  Initiator: {}", self.config.initiator_id);
        tracing::info!("  Relay: {}", self.config.relay_id);
        tracing::info!("  Ledger enabled: {}", self.config.start_ledger);

        let mut running = self.start()?;

        if self.config.exit_on_outcome {
            tokio::select! {
                outcome = running.wait_settled() => {
                    tracing::info!(%outcome, "Protocol settled");
                }
                result = wait_for_shutdown_signal() => {
                    result.context("failed to wait for shutdown signal")?;
                }
            }
        } else {
            wait_for_shutdown_signal()
                .await
                .context("failed to wait for shutdown signal")?;
        }

        tracing::info!("Shutting down node...");
        let report = running.shutdown().await?;

        tracing::info!(outcome = %report.outcome, "Node shutdown complete");
        if let Some(ledger) = &report.ledger {
            tracing::info!(live_tokens = ledger.live_tokens(), "Ledger final state");
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handoff_core::ParticipantId;

    #[test]
    fn test_outcome_settled() {
        let outcome = ProtocolOutcome {
            initiator: InitiatorState::AwaitingToken,
            relay: RelayState::Idle,
        };
        assert!(!outcome.is_settled());

        let outcome = ProtocolOutcome {
            initiator: InitiatorState::DiscoveryFailed,
            relay: RelayState::Idle,
        };
        assert!(outcome.is_settled());
        assert_eq!(outcome.to_string(), "initiator=discovery_failed, relay=idle");
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = NodeConfig {
            initiator_id: ParticipantId::new("ledger"),
            ..NodeConfig::default()
        };
        assert!(Node::new(config).is_err());
    }
}
