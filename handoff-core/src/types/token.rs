//! Single-use transaction tokens.
//!
//! A token is an opaque string. Only the ledger creates tokens; every other
//! participant treats the value as an uninterpreted payload, which is why a
//! [`Token`] can be built from arbitrary content without validation.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix carried by every token the ledger generates.
pub const TOKEN_PREFIX: &str = "TXN-";

/// Opaque transaction token.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    /// Generate a fresh random token (`TXN-<uuid v4>`).
    pub fn generate() -> Self {
        Self(format!("{}{}", TOKEN_PREFIX, Uuid::new_v4()))
    }

    /// Wrap a raw content value as a token.
    ///
    /// The value is not checked: a corrupted handback still has to reach the
    /// ledger so it can be refused there.
    pub fn from_content(content: impl Into<String>) -> Self {
        Self(content.into())
    }

    /// The token value as carried in message content.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check whether the value has the shape of a ledger-generated token.
    pub fn is_well_formed(&self) -> bool {
        self.0
            .strip_prefix(TOKEN_PREFIX)
            .map(|rest| Uuid::parse_str(rest).is_ok())
            .unwrap_or(false)
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
