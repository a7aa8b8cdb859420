//! Bus configuration.

/// Default maximum content length in bytes (64 KB).
pub const DEFAULT_MAX_CONTENT_LEN: usize = 64 * 1024;

/// Default maximum number of receivers on one message.
pub const DEFAULT_MAX_RECEIVERS: usize = 16;

/// Configuration for the message bus.
#[derive(Debug, Clone)]
pub struct BusConfig {
    /// Largest content payload the bus will carry.
    pub max_content_len: usize,

    /// Largest receiver set on a single message.
    pub max_receivers: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_content_len: DEFAULT_MAX_CONTENT_LEN,
            max_receivers: DEFAULT_MAX_RECEIVERS,
        }
    }
}

impl BusConfig {
    /// Create a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum content length.
    pub fn with_max_content_len(mut self, len: usize) -> Self {
        self.max_content_len = len;
        self
    }

    /// Set the maximum number of receivers.
    pub fn with_max_receivers(mut self, count: usize) -> Self {
        self.max_receivers = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BusConfig::default();
        assert_eq!(config.max_content_len, DEFAULT_MAX_CONTENT_LEN);
        assert_eq!(config.max_receivers, DEFAULT_MAX_RECEIVERS);
    }

    #[test]
    fn test_config_builder() {
        let config = BusConfig::new().with_max_content_len(128).with_max_receivers(2);
        assert_eq!(config.max_content_len, 128);
        assert_eq!(config.max_receivers, 2);
    }
}
