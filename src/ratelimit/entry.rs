//! Per-client counting state.

/// Messages and characters accepted from one client in the current window,
/// plus its block state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    /// Requests accepted in the current window
    pub message_count: u32,
    /// Sum of accepted message lengths in the current window
    pub character_count: u64,
    /// Epoch millis at which the current window started
    pub window_start_ms: u64,
    /// Set once the client tripped a limit
    pub is_blocked: bool,
    /// While `now < block_until_ms` every request is rejected
    pub block_until_ms: Option<u64>,
}

impl RateLimitEntry {
    /// Create an empty entry whose window starts at `now_ms`.
    pub fn new(now_ms: u64) -> Self {
        Self {
            message_count: 0,
            character_count: 0,
            window_start_ms: now_ms,
            is_blocked: false,
            block_until_ms: None,
        }
    }

    /// Whether a block is in force at `now_ms`.
    pub fn is_blocked_at(&self, now_ms: u64) -> bool {
        self.is_blocked && self.block_until_ms.is_some_and(|until| now_ms < until)
    }

    /// Whether the counting window has run out at `now_ms`.
    pub fn window_expired(&self, now_ms: u64, window_ms: u64) -> bool {
        now_ms.saturating_sub(self.window_start_ms) > window_ms
    }

    /// Epoch millis at which the current window ends.
    pub fn window_end(&self, window_ms: u64) -> u64 {
        self.window_start_ms.saturating_add(window_ms)
    }

    /// Start a fresh window at `now_ms`, clearing counts and block flags.
    pub fn reset(&mut self, now_ms: u64) {
        *self = Self::new(now_ms);
    }

    /// Block the client for `block_ms` from `now_ms`. Returns the deadline.
    pub fn block(&mut self, now_ms: u64, block_ms: u64) -> u64 {
        let until = now_ms.saturating_add(block_ms);
        self.is_blocked = true;
        self.block_until_ms = Some(until);
        until
    }

    /// Record an accepted message.
    pub fn record(&mut self, message_length: u64) {
        self.message_count = self.message_count.saturating_add(1);
        self.character_count = self.character_count.saturating_add(message_length);
    }

    /// Whether the sweep may drop this entry: the window has expired and no
    /// block is pending.
    pub fn is_stale(&self, now_ms: u64, window_ms: u64) -> bool {
        let block_expired = !self.is_blocked
            || self.block_until_ms.map_or(true, |until| now_ms > until);
        self.window_expired(now_ms, window_ms) && block_expired
    }
}
