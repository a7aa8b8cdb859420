//! Message transport and participant directory for the handoff protocol.
//!
//! This crate provides the two collaborators every participant relies on:
//!
//! - An in-process message bus with one unbounded mailbox per participant
//! - A directory mapping role names to participant addresses
//!
//! # Architecture
//!
//! Each participant owns an [`Endpoint`]: its identity, its [`Mailbox`] and a
//! clone of the shared [`MessageBus`]. Sending is fire-and-forget; receiving
//! suspends the participant's task until a message arrives. Messages from one
//! sender to one receiver are delivered in the order they were sent.
//!
//! ```text
//! Initiator Task ──┐                 ┌── Mailbox (ledger)
//! Relay Task ──────┼── MessageBus ───┼── Mailbox (A)
//! Ledger Task ─────┘                 └── Mailbox (B)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use handoff_bus::{BusConfig, MessageBus};
//! use handoff_core::{Message, ParticipantId, Performative};
//!
//! let bus = MessageBus::new(BusConfig::default());
//! let mut ledger = bus.endpoint(ParticipantId::new("ledger"))?;
//! let a = bus.endpoint(ParticipantId::new("A"))?;
//!
//! a.send(Message::builder(Performative::Request, a.id().clone())
//!     .to(ledger.id().clone())
//!     .content("false")
//!     .build()?)?;
//! let msg = ledger.recv().await;
//! ```

pub mod bus;
pub mod config;
pub mod directory;
pub mod endpoint;
pub mod error;

// Re-export main types
pub use bus::{Mailbox, MessageBus};
pub use config::{BusConfig, DEFAULT_MAX_CONTENT_LEN, DEFAULT_MAX_RECEIVERS};
pub use directory::{find_participant, Directory, InMemoryDirectory, ServiceDescription};
pub use endpoint::Endpoint;
pub use error::{BusError, BusResult};
