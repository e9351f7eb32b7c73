//! Hall engine tunables.

use crate::db::config::parse_env_or;
use std::time::Duration;

/// Runtime configuration for live sessions.
#[derive(Debug, Clone)]
pub struct HallConfig {
    /// Cadence of auto-play draws when no interval is given.
    pub auto_play_interval: Duration,
    /// How many candidate numbers a preview shuffle shows.
    pub preview_sample: usize,
    /// Mailbox depth per session actor.
    pub mailbox_capacity: usize,
}

impl Default for HallConfig {
    fn default() -> Self {
        Self {
            auto_play_interval: Duration::from_secs(5),
            preview_sample: 5,
            mailbox_capacity: 64,
        }
    }
}

impl HallConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            auto_play_interval: Duration::from_millis(parse_env_or(
                "HALL_AUTO_PLAY_INTERVAL_MS",
                5000,
            )),
            preview_sample: parse_env_or("HALL_PREVIEW_SAMPLE", 5),
            mailbox_capacity: parse_env_or("HALL_MAILBOX_CAPACITY", 64),
        }
    }
}
