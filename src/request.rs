//! Helpers for turning an inbound chat request into limiter input.

use serde_json::{json, Value};
use tonic::metadata::{AsciiMetadataValue, MetadataMap};
use tracing::trace;

use crate::ratelimit::{RateLimitResult, UNKNOWN_CLIENT};

/// Hard cap on the length of a forwarded chat message, in characters.
pub const DEFAULT_MAX_MESSAGE_CHARS: usize = 1000;

/// Headers consulted for the client address, most trusted first.
const CLIENT_IP_HEADERS: [&str; 3] = ["x-forwarded-for", "x-real-ip", "cf-connecting-ip"];

pub const HEADER_LIMIT: &str = "x-ratelimit-limit";
pub const HEADER_REMAINING: &str = "x-ratelimit-remaining";
pub const HEADER_RESET: &str = "x-ratelimit-reset";
pub const HEADER_BLOCK_UNTIL: &str = "x-ratelimit-block-until";

/// Extract the client address from forwarding headers.
///
/// `x-forwarded-for` may carry a proxy chain; only its first entry is used.
/// Falls back to the shared `"unknown"` bucket when no header is usable.
pub fn client_ip(metadata: &MetadataMap) -> String {
    for header in CLIENT_IP_HEADERS {
        let Some(value) = metadata.get(header).and_then(|v| v.to_str().ok()) else {
            continue;
        };

        let candidate = if header == "x-forwarded-for" {
            value.split(',').next().unwrap_or_default().trim()
        } else {
            value.trim()
        };

        if !candidate.is_empty() {
            trace!(header, client_ip = candidate, "Resolved client address");
            return candidate.to_string();
        }
    }

    UNKNOWN_CLIENT.to_string()
}

/// Strip control characters (keeping tab, newline and carriage return),
/// trim, and truncate to `max_chars` characters.
///
/// Characters are Unicode scalar values, not UTF-16 code units: an emoji
/// outside the BMP counts once here and toward the character limit.
pub fn sanitize_message(input: &str, max_chars: usize) -> String {
    input
        .chars()
        .filter(|c| !is_stripped_control(*c))
        .collect::<String>()
        .trim()
        .chars()
        .take(max_chars)
        .collect()
}

fn is_stripped_control(c: char) -> bool {
    matches!(c, '\u{0}'..='\u{8}' | '\u{b}' | '\u{c}' | '\u{e}'..='\u{1f}' | '\u{7f}')
}

/// Attach the `x-ratelimit-*` headers describing `result`.
pub fn apply_rate_limit_headers(metadata: &mut MetadataMap, limit: u32, result: &RateLimitResult) {
    insert_number(metadata, HEADER_LIMIT, u64::from(limit));
    insert_number(metadata, HEADER_REMAINING, u64::from(result.remaining));
    insert_number(metadata, HEADER_RESET, result.reset_time_ms);
    if let (true, Some(until)) = (result.is_blocked, result.block_until_ms) {
        insert_number(metadata, HEADER_BLOCK_UNTIL, until);
    }
}

fn insert_number(metadata: &mut MetadataMap, key: &'static str, value: u64) {
    metadata.insert(key, AsciiMetadataValue::from(value));
}

/// JSON body for an HTTP 429 answer to a rejected chat message.
pub fn rejection_body(result: &RateLimitResult) -> Value {
    json!({
        "error": "Rate limit exceeded",
        "code": result.reason.map(|r| r.as_str()),
        "retryAfter": result.reset_time_ms,
        "blockUntil": result.block_until_ms,
    })
}
