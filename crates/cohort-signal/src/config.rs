use std::{path::PathBuf, time::Duration};

use crate::SignalError;

/// Signal directory used when nothing else is configured.
pub const DEFAULT_SIGNAL_DIR: &str = "/tmp/cohort-signals";
/// Wait poll interval used when nothing else is configured.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

pub const ENV_SIGNAL_DIR: &str = "COHORT_SIGNAL_DIR";
pub const ENV_POLL_INTERVAL_MS: &str = "COHORT_SIGNAL_POLL_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalStoreConfig {
    /// Directory holding one marker file per raised signal.
    pub root: PathBuf,
    /// How often waiters re-check their marker.
    pub poll_interval: Duration,
}

impl Default for SignalStoreConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(DEFAULT_SIGNAL_DIR),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}

impl SignalStoreConfig {
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Defaults overridden by `COHORT_SIGNAL_DIR` and `COHORT_SIGNAL_POLL_MS`.
    pub fn from_env() -> Result<Self, SignalError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SignalError> {
        let mut cfg = Self::default();

        if let Some(root) = lookup(ENV_SIGNAL_DIR).filter(|s| !s.trim().is_empty()) {
            cfg.root = PathBuf::from(root);
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                SignalError::Config(format!("{ENV_POLL_INTERVAL_MS}={raw:?} is not a number"))
            })?;
            if ms == 0 {
                return Err(SignalError::Config(format!(
                    "{ENV_POLL_INTERVAL_MS} must be greater than zero"
                )));
            }
            cfg.poll_interval = Duration::from_millis(ms);
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_env_is_empty() {
        let cfg = SignalStoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(cfg, SignalStoreConfig::default());
        assert_eq!(cfg.poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn env_overrides_root_and_interval() {
        let cfg = SignalStoreConfig::from_lookup(|key| match key {
            ENV_SIGNAL_DIR => Some("/var/run/signals".into()),
            ENV_POLL_INTERVAL_MS => Some("25".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(cfg.root, PathBuf::from("/var/run/signals"));
        assert_eq!(cfg.poll_interval, Duration::from_millis(25));
    }

    #[test]
    fn rejects_bad_interval() {
        let bad = SignalStoreConfig::from_lookup(|key| {
            (key == ENV_POLL_INTERVAL_MS).then(|| "fast".to_string())
        });
        assert!(matches!(bad, Err(SignalError::Config(_))));

        let zero = SignalStoreConfig::from_lookup(|key| {
            (key == ENV_POLL_INTERVAL_MS).then(|| "0".to_string())
        });
        assert!(matches!(zero, Err(SignalError::Config(_))));
    }
}
