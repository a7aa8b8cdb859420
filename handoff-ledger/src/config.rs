//! Ledger configuration.

use crate::ledger::RedeemPolicy;

/// Role the ledger advertises in the directory.
pub const DEFAULT_LEDGER_ROLE: &str = "ledger";

/// Refusal reason for a token that is unknown or already redeemed.
pub const REASON_NOT_AVAILABLE: &str = "token not available";

/// Refusal reason for a redemption by someone other than the issuer of record.
pub const REASON_NOT_ISSUER: &str = "token not issued to requester";

/// Configuration for a ledger participant.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Role advertised in the directory.
    pub role: String,

    /// Service name advertised alongside the role. Derived from the
    /// participant name when unset.
    pub service_name: Option<String>,

    /// Who may redeem a token.
    pub redeem_policy: RedeemPolicy,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            role: DEFAULT_LEDGER_ROLE.to_string(),
            service_name: None,
            redeem_policy: RedeemPolicy::default(),
        }
    }
}

impl LedgerConfig {
    /// Set the advertised role.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = role.into();
        self
    }

    /// Set the advertised service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = Some(name.into());
        self
    }

    /// Set the redeem policy.
    pub fn with_redeem_policy(mut self, policy: RedeemPolicy) -> Self {
        self.redeem_policy = policy;
        self
    }

    /// Service name for a ledger running as `participant`.
    pub fn service_name_for(&self, participant: &str) -> String {
        self.service_name
            .clone()
            .unwrap_or_else(|| format!("{}-{}", participant, self.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.role, "ledger");
        assert_eq!(config.redeem_policy, RedeemPolicy::AnyHolder);
        assert_eq!(config.service_name_for("test"), "test-ledger");
    }

    #[test]
    fn test_config_builder() {
        let config = LedgerConfig::default()
            .with_role("bank")
            .with_service_name("central")
            .with_redeem_policy(RedeemPolicy::IssuerOnly);

        assert_eq!(config.role, "bank");
        assert_eq!(config.service_name_for("test"), "central");
        assert_eq!(config.redeem_policy, RedeemPolicy::IssuerOnly);
    }
}
