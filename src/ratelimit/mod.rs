//! Landing chat rate limiting and state management.

mod decision;
mod entry;
mod limiter;
mod policy;
mod sweeper;

pub use decision::{DenyReason, LimiterStats, RateLimitResult};
pub use entry::RateLimitEntry;
pub use limiter::RateLimiter;
pub use policy::LimitPolicy;
pub use sweeper::{spawn_sweeper, SweeperHandle};

/// Shared bucket for callers whose address could not be determined.
pub const UNKNOWN_CLIENT: &str = "unknown";
