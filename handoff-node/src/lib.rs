//! Token handoff node library.
//!
//! This library provides the initiator and relay participants and the
//! orchestration that runs them next to a ledger. It is used by the
//! `handoff-node` binary and by the acceptance tests.

pub mod cli;
pub mod config;
pub mod initiator;
pub mod node;
pub mod relay;
pub mod shutdown;

pub use initiator::{Initiator, InitiatorState};
pub use node::{Node, ProtocolOutcome, ProtocolReport, RunningProtocol};
pub use relay::{Relay, RelayState};
