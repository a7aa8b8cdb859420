//! Core protocol data types.
//!
//! - [`Token`]: opaque single-use transaction token
//! - [`ParticipantId`]: address of a protocol participant

mod participant;
mod token;

pub use participant::ParticipantId;
pub use token::{Token, TOKEN_PREFIX};
