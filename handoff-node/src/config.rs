//! Node configuration.

use std::collections::HashSet;

use anyhow::ensure;

use handoff_bus::BusConfig;
use handoff_core::ParticipantId;
use handoff_ledger::{LedgerConfig, RedeemPolicy};

use crate::cli::Cli;

/// Complete node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Ledger participant name.
    pub ledger_id: ParticipantId,

    /// Initiator participant name.
    pub initiator_id: ParticipantId,

    /// Relay participant name.
    pub relay_id: ParticipantId,

    /// Ledger settings (role, service name, redeem policy).
    pub ledger: LedgerConfig,

    /// Bus limits.
    pub bus: BusConfig,

    /// Whether to start the ledger at all.
    pub start_ledger: bool,

    /// Stop once the protocol settles.
    pub exit_on_outcome: bool,

    /// Log level.
    pub log_level: String,
}

impl NodeConfig {
    /// Create a node configuration from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        let policy = if cli.issuer_only {
            RedeemPolicy::IssuerOnly
        } else {
            RedeemPolicy::AnyHolder
        };

        Self {
            ledger_id: cli.ledger_name.clone(),
            initiator_id: cli.initiator_name.clone(),
            relay_id: cli.relay_name.clone(),
            ledger: LedgerConfig::default()
                .with_role(cli.ledger_role.clone())
                .with_redeem_policy(policy),
            bus: BusConfig::default().with_max_content_len(cli.max_content_len),
            start_ledger: !cli.no_ledger,
            exit_on_outcome: cli.exit_on_outcome,
            log_level: cli.log_level.clone(),
        }
    }

    /// Role the initiator and relay look the ledger up by.
    pub fn ledger_role(&self) -> &str {
        &self.ledger.role
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> anyhow::Result<()> {
        let names: HashSet<_> = [&self.ledger_id, &self.initiator_id, &self.relay_id]
            .into_iter()
            .collect();
        ensure!(names.len() == 3, "participant names must be distinct");
        ensure!(!self.ledger.role.is_empty(), "ledger role must not be empty");
        Ok(())
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            ledger_id: ParticipantId::new("ledger"),
            initiator_id: ParticipantId::new("A"),
            relay_id: ParticipantId::new("B"),
            ledger: LedgerConfig::default(),
            bus: BusConfig::default(),
            start_ledger: true,
            exit_on_outcome: false,
            log_level: "info".to_string(),
        }
    }
}
