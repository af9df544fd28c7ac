//! Outcomes reported by the rate limiter.

use serde::Serialize;
use std::fmt;

/// Why a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenyReason {
    /// The client is serving a block from an earlier violation
    IpBlocked,
    /// Too many messages in the current window
    MessageLimitExceeded,
    /// Too many characters in the current window
    CharacterLimitExceeded,
}

impl DenyReason {
    /// Machine-readable code handed to HTTP callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::IpBlocked => "IP_BLOCKED",
            DenyReason::MessageLimitExceeded => "MESSAGE_LIMIT_EXCEEDED",
            DenyReason::CharacterLimitExceeded => "CHARACTER_LIMIT_EXCEEDED",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a limit check or status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    pub allowed: bool,
    /// Messages still accepted in the current window
    pub remaining: u32,
    /// Epoch millis after which the caller may retry
    pub reset_time_ms: u64,
    pub is_blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_until_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenyReason>,
}

impl RateLimitResult {
    pub(crate) fn allowed(remaining: u32, reset_time_ms: u64) -> Self {
        Self {
            allowed: true,
            remaining,
            reset_time_ms,
            is_blocked: false,
            block_until_ms: None,
            reason: None,
        }
    }

    /// Rejection of a client already under a block. Retry is possible once
    /// the block lifts.
    pub(crate) fn blocked(reason: DenyReason, block_until_ms: u64) -> Self {
        Self::tripped(reason, block_until_ms, block_until_ms)
    }

    /// Rejection that has just imposed a block. `reset_time_ms` still names
    /// the end of the counting window; the block deadline travels separately.
    pub(crate) fn tripped(reason: DenyReason, window_end_ms: u64, block_until_ms: u64) -> Self {
        Self {
            allowed: false,
            remaining: 0,
            reset_time_ms: window_end_ms,
            is_blocked: true,
            block_until_ms: Some(block_until_ms),
            reason: Some(reason),
        }
    }
}

/// Snapshot of the limiter's in-memory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimiterStats {
    /// Entries currently held in memory
    pub total_entries: usize,
    /// Entries whose window has not yet expired
    pub active_entries: usize,
    /// Clients with a block in force
    pub blocked_clients: usize,
    pub timestamp_ms: u64,
}
