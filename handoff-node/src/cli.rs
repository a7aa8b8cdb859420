//! Command-line argument parsing.

use clap::Parser;

use handoff_core::ParticipantId;

/// Token handoff protocol node.
#[derive(Parser, Debug, Clone)]
#[command(name = "handoff-node")]
#[command(about = "Runs one initiator/relay/ledger token handoff")]
#[command(version)]
pub struct Cli {
    /// Participant name of the ledger.
    #[arg(long, default_value = "ledger")]
    pub ledger_name: ParticipantId,

    /// Participant name of the initiator.
    #[arg(long, default_value = "A")]
    pub initiator_name: ParticipantId,

    /// Participant name of the relay.
    #[arg(long, default_value = "B")]
    pub relay_name: ParticipantId,

    /// Directory role the ledger is advertised under.
    #[arg(long, default_value = "ledger")]
    pub ledger_role: String,

    /// Only let the participant a token was issued to redeem it.
    #[arg(long)]
    pub issuer_only: bool,

    /// Do not start the ledger (the initiator will fail discovery).
    #[arg(long)]
    pub no_ledger: bool,

    /// Exit once the protocol settles instead of waiting for Ctrl+C.
    #[arg(long)]
    pub exit_on_outcome: bool,

    /// Maximum message content length in bytes.
    #[arg(long, default_value_t = handoff_bus::DEFAULT_MAX_CONTENT_LEN)]
    pub max_content_len: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let cli = Cli::parse_from(["handoff-node"]);
        assert_eq!(cli.ledger_name, ParticipantId::new("ledger"));
        assert_eq!(cli.initiator_name, ParticipantId::new("A"));
        assert_eq!(cli.relay_name, ParticipantId::new("B"));
        assert_eq!(cli.ledger_role, "ledger");
        assert!(!cli.issuer_only);
        assert!(!cli.no_ledger);
        assert!(!cli.exit_on_outcome);
        assert_eq!(cli.log_level, "info");
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "handoff-node",
            "--relay-name",
            "relay",
            "--issuer-only",
            "--no-ledger",
            "--exit-on-outcome",
        ]);
        assert_eq!(cli.relay_name, ParticipantId::new("relay"));
        assert!(cli.issuer_only);
        assert!(cli.no_ledger);
        assert!(cli.exit_on_outcome);
    }

    #[test]
    fn test_rejects_blank_name() {
        assert!(Cli::try_parse_from(["handoff-node", "--ledger-name", ""]).is_err());
    }
}
