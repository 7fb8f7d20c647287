//! Controller configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the signal controller and its supervisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Start with diagnostic verbosity enabled.
    /// Can be toggled at runtime with `D,1` / `D,0`.
    #[serde(default)]
    pub diagnostics: bool,

    /// Pause before restarting after an unrecoverable error (milliseconds).
    #[serde(default = "default_restart_delay")]
    pub restart_delay_ms: u64,

    /// Give up after this many restarts (0 = unlimited).
    #[serde(default)]
    pub max_restarts: u32,
}

fn default_restart_delay() -> u64 {
    1000 // 1 second
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            diagnostics: false,
            restart_delay_ms: default_restart_delay(),
            max_restarts: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert!(!config.diagnostics);
        assert_eq!(config.restart_delay_ms, 1000);
        assert_eq!(config.max_restarts, 0);
    }

    #[test]
    fn test_deserialize_minimal() {
        let toml = r#"
            diagnostics = true
        "#;
        let config: ControllerConfig = toml::from_str(toml).unwrap();
        assert!(config.diagnostics);
        assert_eq!(config.restart_delay_ms, 1000);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            diagnostics = false
            restart_delay_ms = 250
            max_restarts = 5
        "#;
        let config: ControllerConfig = toml::from_str(toml).unwrap();
        assert!(!config.diagnostics);
        assert_eq!(config.restart_delay_ms, 250);
        assert_eq!(config.max_restarts, 5);
    }
}
