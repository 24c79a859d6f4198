//! Wizard configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use willforge_client::{MAX_ATTEMPTS, POLL_INTERVAL};

/// Tunable knobs of the wizard core. Defaults match production
/// behavior; tests shrink the timings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// How many recent messages accompany each conversation request
    pub history_limit: usize,
    /// Delay between payment status checks
    pub poll_interval: Duration,
    /// Status checks before the payment counts as still processing
    pub poll_attempts: u32,
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            history_limit: 20,
            poll_interval: POLL_INTERVAL,
            poll_attempts: MAX_ATTEMPTS,
        }
    }
}

impl WizardConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = attempts;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_polling_constants() {
        let config = WizardConfig::default();
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.poll_interval, Duration::from_millis(3000));
        assert_eq!(config.poll_attempts, 10);
    }

    #[test]
    fn builders_override_fields() {
        let config = WizardConfig::new()
            .with_history_limit(5)
            .with_poll_interval(Duration::from_millis(10))
            .with_poll_attempts(2);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.poll_attempts, 2);
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = WizardConfig::new().with_history_limit(7);
        let json = serde_json::to_string(&config).unwrap();
        let back: WizardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.history_limit, 7);
    }
}
