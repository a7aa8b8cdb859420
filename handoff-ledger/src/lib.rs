//! Token ledger for the handoff protocol.
//!
//! This crate implements:
//! - The token store, mapping live tokens to their issuer of record
//! - Issue and redeem operations with at-most-once redemption
//! - An optional issuer check on redemption
//! - The ledger service: a single receive loop that owns the store and
//!   answers `Request` messages from the bus
//!
//! # Example
//!
//! ```ignore
//! use handoff_ledger::{Ledger, RedeemOutcome};
//!
//! let mut ledger = Ledger::default();
//! let token = ledger.issue_token(&requester);
//! assert!(matches!(ledger.redeem_token(&token, &relay), RedeemOutcome::Confirmed(_)));
//! ```

mod config;
mod error;
mod ledger;
mod service;
mod store;

pub use config::{LedgerConfig, DEFAULT_LEDGER_ROLE, REASON_NOT_AVAILABLE, REASON_NOT_ISSUER};
pub use error::{LedgerError, LedgerResult};
pub use ledger::{Ledger, RedeemOutcome, RedeemPolicy};
pub use service::LedgerService;
pub use store::TokenStore;
