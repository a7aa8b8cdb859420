//! Token issuance and redemption.
//!
//! The [`Ledger`] is the only thing allowed to mutate a [`TokenStore`]. It is
//! a plain value with `&mut self` operations; the service loop that owns it
//! processes one request at a time, so issue and redeem never interleave.

use std::fmt;

use handoff_core::{ParticipantId, Performative, Token, ISSUE_SENTINEL};

use crate::config::{REASON_NOT_AVAILABLE, REASON_NOT_ISSUER};
use crate::store::TokenStore;

/// Who may redeem a live token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RedeemPolicy {
    /// Any participant holding the token value may redeem it.
    #[default]
    AnyHolder,
    /// Only the participant the token was issued to may redeem it.
    IssuerOnly,
}

impl fmt::Display for RedeemPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedeemPolicy::AnyHolder => write!(f, "any-holder"),
            RedeemPolicy::IssuerOnly => write!(f, "issuer-only"),
        }
    }
}

/// Result of a redeem request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RedeemOutcome {
    /// The token was live and has been consumed.
    Confirmed(Token),
    /// The token was not redeemed.
    Refused {
        /// Human-readable reason sent back to the requester.
        reason: String,
    },
}

impl RedeemOutcome {
    /// Check if the redemption succeeded.
    pub fn is_confirmed(&self) -> bool {
        matches!(self, RedeemOutcome::Confirmed(_))
    }

    /// Performative of the reply carrying this outcome.
    pub fn performative(&self) -> Performative {
        match self {
            RedeemOutcome::Confirmed(_) => Performative::Confirm,
            RedeemOutcome::Refused { .. } => Performative::Refuse,
        }
    }

    /// Content of the reply carrying this outcome.
    pub fn content(&self) -> &str {
        match self {
            RedeemOutcome::Confirmed(token) => token.as_str(),
            RedeemOutcome::Refused { reason } => reason,
        }
    }

    fn refused(reason: &str) -> Self {
        RedeemOutcome::Refused {
            reason: reason.to_string(),
        }
    }
}

/// Issues and redeems single-use tokens.
#[derive(Debug, Default)]
pub struct Ledger {
    store: TokenStore,
    policy: RedeemPolicy,
    issued: u64,
    confirmed: u64,
    refused: u64,
}

impl Ledger {
    /// Create a ledger with an empty store.
    pub fn new(policy: RedeemPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Issue a fresh token to `requester`.
    ///
    /// The returned token is distinct from every live token and from the
    /// issue sentinel.
    pub fn issue_token(&mut self, requester: &ParticipantId) -> Token {
        let token = loop {
            let candidate = Token::generate();
            if candidate.as_str() == ISSUE_SENTINEL || self.store.contains(candidate.as_str()) {
                continue;
            }
            break candidate;
        };

        self.store.insert(token.clone(), requester.clone());
        self.issued += 1;
        tracing::debug!(
            token = %token,
            requester = %requester,
            live = self.store.len(),
            "Token issued"
        );
        token
    }

    /// Redeem `token` on behalf of `requester`.
    ///
    /// A live token is removed and confirmed; anything else is refused and
    /// leaves the store unchanged.
    pub fn redeem_token(&mut self, token: &Token, requester: &ParticipantId) -> RedeemOutcome {
        let issuer = self.store.issuer_of(token.as_str()).cloned();
        let outcome = match issuer {
            None => RedeemOutcome::refused(REASON_NOT_AVAILABLE),
            Some(issuer) if self.policy == RedeemPolicy::IssuerOnly && &issuer != requester => {
                RedeemOutcome::refused(REASON_NOT_ISSUER)
            }
            Some(_) => {
                self.store.remove(token.as_str());
                RedeemOutcome::Confirmed(token.clone())
            }
        };

        match &outcome {
            RedeemOutcome::Confirmed(_) => {
                self.confirmed += 1;
                tracing::debug!(token = %token, requester = %requester, "Token redeemed");
            }
            RedeemOutcome::Refused { reason } => {
                self.refused += 1;
                tracing::debug!(
                    token = %token,
                    requester = %requester,
                    reason = %reason,
                    "Redemption refused"
                );
            }
        }

        outcome
    }

    /// The token store (read-only).
    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// The redeem policy in force.
    pub fn policy(&self) -> RedeemPolicy {
        self.policy
    }

    /// Number of live tokens.
    pub fn live_tokens(&self) -> usize {
        self.store.len()
    }

    /// Total tokens issued.
    pub fn issued_count(&self) -> u64 {
        self.issued
    }

    /// Total successful redemptions.
    pub fn confirmed_count(&self) -> u64 {
        self.confirmed
    }

    /// Total refused redemptions.
    pub fn refused_count(&self) -> u64 {
        self.refused
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn a() -> ParticipantId {
        ParticipantId::new("A")
    }

    fn b() -> ParticipantId {
        ParticipantId::new("B")
    }

    #[test]
    fn test_issued_tokens_are_unique() {
        let mut ledger = Ledger::default();
        let tokens: HashSet<Token> = (0..1000).map(|_| ledger.issue_token(&a())).collect();

        assert_eq!(tokens.len(), 1000);
        assert_eq!(ledger.live_tokens(), 1000);
        assert!(tokens.iter().all(|t| ledger.store().contains(t.as_str())));
        assert!(tokens.iter().all(|t| t.as_str() != ISSUE_SENTINEL));
    }

    #[test]
    fn test_issue_records_issuer() {
        let mut ledger = Ledger::default();
        let token = ledger.issue_token(&a());
        assert_eq!(ledger.store().issuer_of(token.as_str()), Some(&a()));
    }

    #[test]
    fn test_round_trip() {
        let mut ledger = Ledger::default();
        let token = ledger.issue_token(&a());

        let outcome = ledger.redeem_token(&token, &a());
        assert_eq!(outcome, RedeemOutcome::Confirmed(token.clone()));
        assert!(!ledger.store().contains(token.as_str()));
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn test_redeem_at_most_once() {
        let mut ledger = Ledger::default();
        let token = ledger.issue_token(&a());

        assert!(ledger.redeem_token(&token, &b()).is_confirmed());
        for _ in 0..3 {
            let outcome = ledger.redeem_token(&token, &b());
            assert_eq!(
                outcome,
                RedeemOutcome::Refused {
                    reason: REASON_NOT_AVAILABLE.to_string()
                }
            );
        }
        assert_eq!(ledger.confirmed_count(), 1);
        assert_eq!(ledger.refused_count(), 3);
    }

    #[test]
    fn test_unknown_token_refused() {
        let mut ledger = Ledger::default();
        let live = ledger.issue_token(&a());

        let outcome = ledger.redeem_token(&Token::from_content("not-a-real-token"), &a());
        match outcome {
            RedeemOutcome::Refused { reason } => assert!(!reason.is_empty()),
            other => panic!("expected refusal, got {:?}", other),
        }
        assert_eq!(ledger.live_tokens(), 1);
        assert!(ledger.store().contains(live.as_str()));
    }

    #[test]
    fn test_any_holder_can_redeem_by_default() {
        let mut ledger = Ledger::default();
        let token = ledger.issue_token(&a());
        assert!(ledger.redeem_token(&token, &b()).is_confirmed());
    }

    #[test]
    fn test_issuer_only_policy() {
        let mut ledger = Ledger::new(RedeemPolicy::IssuerOnly);
        let token = ledger.issue_token(&a());

        let outcome = ledger.redeem_token(&token, &b());
        assert_eq!(outcome.content(), REASON_NOT_ISSUER);
        assert!(ledger.store().contains(token.as_str()));

        assert!(ledger.redeem_token(&token, &a()).is_confirmed());
        assert!(ledger.store().is_empty());
    }

    #[test]
    fn test_outcome_reply_shape() {
        let token = Token::from_content("TXN-1");
        let confirmed = RedeemOutcome::Confirmed(token);
        assert_eq!(confirmed.performative(), Performative::Confirm);
        assert_eq!(confirmed.content(), "TXN-1");

        let refused = RedeemOutcome::refused(REASON_NOT_AVAILABLE);
        assert_eq!(refused.performative(), Performative::Refuse);
        assert_eq!(refused.content(), "token not available");
    }
}
