//! Token store.

use std::collections::HashMap;

use handoff_core::{ParticipantId, Token};

/// Live tokens and the participant each was issued to.
#[derive(Debug, Default)]
pub struct TokenStore {
    tokens: HashMap<Token, ParticipantId>,
}

impl TokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly issued token. Returns `false` and leaves the store
    /// untouched if the token is already live.
    pub fn insert(&mut self, token: Token, issuer: ParticipantId) -> bool {
        if self.tokens.contains_key(&token) {
            return false;
        }
        self.tokens.insert(token, issuer);
        true
    }

    /// Remove a token, returning its issuer of record.
    pub fn remove(&mut self, token: &str) -> Option<ParticipantId> {
        self.tokens.remove(token)
    }

    /// Check if a token is live.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains_key(token)
    }

    /// Issuer of record for a live token.
    pub fn issuer_of(&self, token: &str) -> Option<&ParticipantId> {
        self.tokens.get(token)
    }

    /// Number of live tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if no token is live.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
