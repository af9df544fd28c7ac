//! jlpt-edge - Request Guard Service for the JLPT4YOU site
//!
//! This crate guards the public landing chat with a per-client message and
//! character rate limiter, and resolves the language-aware URLs the site
//! serves (language prefixes, auth pages, hreflang alternates). Both are
//! exposed over gRPC to the web frontend.

pub mod clock;
pub mod config;
pub mod error;
pub mod grpc;
pub mod i18n;
pub mod ratelimit;
pub mod request;
