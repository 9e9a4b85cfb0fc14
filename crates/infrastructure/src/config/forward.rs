//! Record forwarding configuration.

use serde::{Deserialize, Serialize};

/// Where normalized webhook records are delivered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardConfig {
    /// Workflow engine endpoint receiving records as JSON (unset = log only)
    #[serde(default)]
    pub url: Option<String>,

    /// Forward request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Buffered records between the webhook and the forwarder
    #[serde(default = "default_capacity")]
    pub channel_capacity: usize,
}

const fn default_timeout() -> u64 {
    10
}

const fn default_capacity() -> usize {
    1024
}

impl Default for ForwardConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout(),
            channel_capacity: default_capacity(),
        }
    }
}
