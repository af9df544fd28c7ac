//! Limits applied to every client of the landing chat.

use std::time::Duration;

use crate::config::RateLimitingConfig;

/// Default number of messages accepted per window.
pub const DEFAULT_MESSAGE_LIMIT: u32 = 5;
/// Default number of characters accepted per window.
pub const DEFAULT_CHARACTER_LIMIT: u64 = 2000;
/// Default counting window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Default cooldown once a limit is tripped.
pub const DEFAULT_BLOCK_DURATION: Duration = Duration::from_secs(30 * 60);
/// Default interval between sweeps of stale entries.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Configuration for the per-client limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitPolicy {
    /// Maximum messages accepted in one window
    pub message_limit: u32,
    /// Maximum cumulative message length accepted in one window
    pub character_limit: u64,
    /// Length of the counting window
    pub window: Duration,
    /// Cooldown imposed once a limit is tripped
    pub block_duration: Duration,
    /// How often idle entries are swept
    pub cleanup_interval: Duration,
}

impl Default for LimitPolicy {
    fn default() -> Self {
        Self {
            message_limit: DEFAULT_MESSAGE_LIMIT,
            character_limit: DEFAULT_CHARACTER_LIMIT,
            window: DEFAULT_WINDOW,
            block_duration: DEFAULT_BLOCK_DURATION,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl From<&RateLimitingConfig> for LimitPolicy {
    fn from(config: &RateLimitingConfig) -> Self {
        Self {
            message_limit: config.message_limit,
            character_limit: config.character_limit,
            window: Duration::from_secs(config.window_secs),
            block_duration: Duration::from_secs(config.block_duration_secs),
            cleanup_interval: Duration::from_secs(config.cleanup_interval_secs),
        }
    }
}
