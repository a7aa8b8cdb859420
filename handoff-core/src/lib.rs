//! # Handoff Core
//!
//! Core types for the token handoff protocol.
//!
//! This crate provides the vocabulary shared by every participant:
//! - Single-use transaction tokens and participant identities
//! - The closed set of message performatives
//! - The immutable message envelope exchanged over the bus
//! - Classification of request content into issue or redeem requests

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod message;
pub mod types;

// Re-export commonly used types at crate root
pub use error::CoreError;
pub use message::{Message, MessageBuilder, Performative, RequestContent, ISSUE_SENTINEL};
pub use types::{ParticipantId, Token, TOKEN_PREFIX};
