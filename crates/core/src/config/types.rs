use serde::{Deserialize, Serialize};

use crate::controller::ControllerConfig;
use crate::line::DEFAULT_MAX_LINE_LEN;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub line: LineConfig,
}

/// Input line framing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineConfig {
    /// Longest line accepted before it is cut, in bytes
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            max_line_len: default_max_line_len(),
        }
    }
}

fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}
