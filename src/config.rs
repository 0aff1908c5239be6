//! Navigator configuration.

use serde::{Deserialize, Serialize};

/// Tunables for [`crate::StandardNavigator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Initial capacity of the history stack.
    pub history_capacity: usize,
    /// Call `on_first_pre_initialize` when adopting an already-loaded unit.
    pub pre_initialize_adopted: bool,
    /// Default filter directive used by [`crate::diagnostics::init_tracing`].
    pub log_filter: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            history_capacity: 8,
            pre_initialize_adopted: false,
            log_filter: "scene_navigator=info".into(),
        }
    }
}

impl NavigatorConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            history_capacity: env_usize("SCENE_NAV_HISTORY_CAPACITY", defaults.history_capacity),
            pre_initialize_adopted: env_bool(
                "SCENE_NAV_PRE_INITIALIZE",
                defaults.pre_initialize_adopted,
            ),
            log_filter: std::env::var("SCENE_NAV_LOG").unwrap_or(defaults.log_filter),
        }
    }

    /// Parse YAML; missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn with_pre_initialize_adopted(mut self, enabled: bool) -> Self {
        self.pre_initialize_adopted = enabled;
        self
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"),
        Err(_) => default,
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NavigatorConfig::default();
        assert_eq!(config.history_capacity, 8);
        assert!(!config.pre_initialize_adopted);
    }

    #[test]
    fn test_yaml_partial() {
        let config = NavigatorConfig::from_yaml_str("pre_initialize_adopted: true\n").unwrap();
        assert!(config.pre_initialize_adopted);
        assert_eq!(config.history_capacity, 8);
        assert_eq!(config.log_filter, "scene_navigator=info");
    }

    #[test]
    fn test_yaml_rejects_garbage() {
        assert!(NavigatorConfig::from_yaml_str("history_capacity: lots").is_err());
    }

    #[test]
    fn test_env_helpers_fall_back() {
        assert!(env_bool("SCENE_NAV_TEST_UNSET_BOOL", true));
        assert_eq!(env_usize("SCENE_NAV_TEST_UNSET_USIZE", 3), 3);
    }
}
