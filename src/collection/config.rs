//! Collection configuration

use serde::{Deserialize, Serialize};

/// Per-collection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionConfig {
    /// Initial capacity of the item store (default: 0)
    #[serde(default)]
    pub capacity: usize,

    /// Count mutations and queries in the collection's registry (default: true)
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,

    /// Emit lifecycle events through the logger (default: true)
    #[serde(default = "default_true")]
    pub log_events: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CollectionConfig {
    fn default() -> Self {
        Self {
            capacity: 0,
            metrics_enabled: default_true(),
            log_events: default_true(),
        }
    }
}

impl CollectionConfig {
    /// No metrics, no events
    pub fn quiet() -> Self {
        Self {
            metrics_enabled: false,
            log_events: false,
            ..Default::default()
        }
    }

    /// Same settings with a preallocated item store
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CollectionConfig::default();
        assert_eq!(config.capacity, 0);
        assert!(config.metrics_enabled);
        assert!(config.log_events);
    }

    #[test]
    fn test_quiet_with_capacity() {
        let config = CollectionConfig::quiet().with_capacity(64);
        assert_eq!(config.capacity, 64);
        assert!(!config.metrics_enabled);
        assert!(!config.log_events);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: CollectionConfig = serde_json::from_str(r#"{"capacity": 8}"#).unwrap();
        assert_eq!(config, CollectionConfig::default().with_capacity(8));

        let round: CollectionConfig =
            serde_json::from_str(&serde_json::to_string(&CollectionConfig::quiet()).unwrap()).unwrap();
        assert_eq!(round, CollectionConfig::quiet());
    }
}
