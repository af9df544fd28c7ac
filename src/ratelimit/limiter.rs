//! Core rate limiter implementation.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, trace, warn};

use super::decision::{DenyReason, LimiterStats, RateLimitResult};
use super::entry::RateLimitEntry;
use super::policy::LimitPolicy;
use super::UNKNOWN_CLIENT;
use crate::clock::{duration_millis, format_millis, Clock, SystemClock};

/// Per-client message and character limiter for the landing chat.
///
/// Entries live in a `DashMap`; the shard lock is held for the whole
/// read-modify-write of one client, so concurrent checks for the same client
/// never interleave. The struct is meant to be created once at startup and
/// shared behind an `Arc`.
#[derive(Debug)]
pub struct RateLimiter {
    /// Counting state indexed by client identifier
    entries: DashMap<String, RateLimitEntry>,
    policy: LimitPolicy,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter with default limits.
    pub fn new() -> Self {
        Self::with_policy(LimitPolicy::default())
    }

    /// Create a rate limiter with explicit limits.
    pub fn with_policy(policy: LimitPolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the time source.
    pub fn with_clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The limits this limiter enforces.
    pub fn policy(&self) -> &LimitPolicy {
        &self.policy
    }

    /// Check whether a message of `message_length` characters from
    /// `client_id` may be accepted, consuming quota when it is.
    ///
    /// Tripping either limit blocks the client for the configured block
    /// duration. An empty `client_id` is counted against the shared
    /// `"unknown"` bucket.
    pub fn check_limit(&self, client_id: &str, message_length: usize) -> RateLimitResult {
        let key = client_key(client_id);
        let now = self.clock.now_millis();
        let window_ms = duration_millis(self.policy.window);
        let message_length = message_length as u64;

        trace!(client_id = %key, message_length, "Checking rate limit");

        let mut guard = self.entries.entry(key.to_string()).or_insert_with(|| {
            debug!(client_id = %key, "Creating new rate limit entry");
            RateLimitEntry::new(now)
        });
        let entry = &mut *guard;

        if entry.is_blocked_at(now) {
            let until = entry.block_until_ms.unwrap_or(now);
            debug!(client_id = %key, block_until = %format_millis(until), "Rejecting blocked client");
            return RateLimitResult::blocked(DenyReason::IpBlocked, until);
        }

        if entry.window_expired(now, window_ms) {
            entry.reset(now);
        }

        let violation = if entry.message_count >= self.policy.message_limit {
            Some(DenyReason::MessageLimitExceeded)
        } else if entry.character_count.saturating_add(message_length)
            > self.policy.character_limit
        {
            Some(DenyReason::CharacterLimitExceeded)
        } else {
            None
        };

        if let Some(reason) = violation {
            let until = entry.block(now, duration_millis(self.policy.block_duration));
            warn!(
                client_id = %key,
                reason = %reason,
                message_count = entry.message_count,
                character_count = entry.character_count,
                block_until = %format_millis(until),
                "Client blocked for spam"
            );
            return RateLimitResult::tripped(reason, entry.window_end(window_ms), until);
        }

        entry.record(message_length);

        RateLimitResult::allowed(
            self.policy.message_limit.saturating_sub(entry.message_count),
            entry.window_end(window_ms),
        )
    }

    /// Report the current quota for `client_id` without consuming it.
    ///
    /// Never creates or modifies an entry.
    pub fn get_status(&self, client_id: &str) -> RateLimitResult {
        let key = client_key(client_id);
        let now = self.clock.now_millis();
        let window_ms = duration_millis(self.policy.window);
        let limit = self.policy.message_limit;

        let Some(entry) = self.entries.get(key) else {
            return RateLimitResult::allowed(limit, now.saturating_add(window_ms));
        };

        if entry.is_blocked_at(now) {
            return RateLimitResult::blocked(
                DenyReason::IpBlocked,
                entry.block_until_ms.unwrap_or(now),
            );
        }

        if entry.window_expired(now, window_ms) {
            return RateLimitResult::allowed(limit, now.saturating_add(window_ms));
        }

        let mut status = RateLimitResult::allowed(
            limit.saturating_sub(entry.message_count),
            entry.window_end(window_ms),
        );
        if entry.message_count >= limit {
            status.allowed = false;
            status.reason = Some(DenyReason::MessageLimitExceeded);
        }
        status
    }

    /// Drop entries whose window and block have both expired.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let window_ms = duration_millis(self.policy.window);
        let before = self.entries.len();

        self.entries.retain(|_, entry| !entry.is_stale(now, window_ms));

        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            info!(removed, remaining = self.entries.len(), "Cleaned up expired rate limit entries");
        }
        removed
    }

    /// Count entries by state, for monitoring.
    pub fn stats(&self) -> LimiterStats {
        let now = self.clock.now_millis();
        let window_ms = duration_millis(self.policy.window);
        let mut active_entries = 0;
        let mut blocked_clients = 0;

        for entry in self.entries.iter() {
            if !entry.window_expired(now, window_ms) {
                active_entries += 1;
            }
            if entry.is_blocked_at(now) {
                blocked_clients += 1;
            }
        }

        LimiterStats {
            total_entries: self.entries.len(),
            active_entries,
            blocked_clients,
            timestamp_ms: now,
        }
    }

    /// Snapshot of the entry held for `client_id`.
    ///
    /// Returns `None` if the client has not been seen.
    pub fn entry(&self, client_id: &str) -> Option<RateLimitEntry> {
        self.entries
            .get(client_key(client_id))
            .map(|entry| entry.clone())
    }

    /// Clear all entries.
    ///
    /// This is primarily useful for testing.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of tracked clients.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

fn client_key(client_id: &str) -> &str {
    let trimmed = client_id.trim();
    if trimmed.is_empty() {
        UNKNOWN_CLIENT
    } else {
        trimmed
    }
}
