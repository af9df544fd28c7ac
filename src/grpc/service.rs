//! Chat guard service implementation.

use std::sync::Arc;
use tonic::{Request, Response, Status};
use tracing::{debug, info, instrument, warn};

use super::proto::jlpt4you::edge::v1::{
    chat_guard_server::ChatGuard, CheckMessageRequest, DenyReason as ProtoDenyReason,
    GetStatsRequest, GetStatusRequest, LimiterStats as ProtoLimiterStats, RateLimitStatus,
};

use crate::clock::to_timestamp;
use crate::ratelimit::{DenyReason, RateLimitResult, RateLimiter};
use crate::request::{apply_rate_limit_headers, client_ip, rejection_body, sanitize_message};

/// Implementation of the `ChatGuard` gRPC interface.
pub struct ChatGuardServiceImpl {
    /// The rate limiter instance
    rate_limiter: Arc<RateLimiter>,
    /// Inbound messages are truncated to this many characters
    max_message_chars: usize,
}

impl ChatGuardServiceImpl {
    /// Create a new service around a shared rate limiter.
    pub fn new(rate_limiter: Arc<RateLimiter>, max_message_chars: usize) -> Self {
        Self {
            rate_limiter,
            max_message_chars,
        }
    }

    fn respond(
        &self,
        client_id: String,
        sanitized: String,
        result: RateLimitResult,
    ) -> Response<RateLimitStatus> {
        let mut response = Response::new(RateLimitStatus {
            allowed: result.allowed,
            remaining: result.remaining,
            reset_time: Some(to_timestamp(result.reset_time_ms)),
            blocked: result.is_blocked,
            block_until: result.block_until_ms.map(to_timestamp),
            reason: result
                .reason
                .map_or(ProtoDenyReason::Unspecified, ProtoDenyReason::from)
                .into(),
            code: result.reason.map(|r| r.as_str().to_string()).unwrap_or_default(),
            sanitized_message: sanitized,
            client_id,
            rejection_body: if result.allowed {
                String::new()
            } else {
                rejection_body(&result).to_string()
            },
        });
        apply_rate_limit_headers(
            response.metadata_mut(),
            self.rate_limiter.policy().message_limit,
            &result,
        );
        response
    }
}

/// Use the explicit client id, or derive one from forwarding headers.
fn resolve_client_id<T>(request: &Request<T>, explicit: &str) -> String {
    if explicit.trim().is_empty() {
        client_ip(request.metadata())
    } else {
        explicit.trim().to_string()
    }
}

impl From<DenyReason> for ProtoDenyReason {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::IpBlocked => ProtoDenyReason::IpBlocked,
            DenyReason::MessageLimitExceeded => ProtoDenyReason::MessageLimitExceeded,
            DenyReason::CharacterLimitExceeded => ProtoDenyReason::CharacterLimitExceeded,
        }
    }
}

#[tonic::async_trait]
impl ChatGuard for ChatGuardServiceImpl {
    /// Sanitize a landing chat message and decide whether it may be sent on
    /// to the tutor backend.
    ///
    /// Denials are returned as a normal response with `allowed = false`;
    /// the caller maps them to HTTP 429.
    #[instrument(
        skip(self, request),
        fields(message_len = request.get_ref().message.len())
    )]
    async fn check_message(
        &self,
        request: Request<CheckMessageRequest>,
    ) -> Result<Response<RateLimitStatus>, Status> {
        let client_id = resolve_client_id(&request, &request.get_ref().client_id);
        let req = request.into_inner();

        if req.message.is_empty() {
            warn!(client_id = %client_id, "Received chat message without content");
            return Err(Status::invalid_argument("message content is required"));
        }

        let sanitized = sanitize_message(&req.message, self.max_message_chars);
        let result = self
            .rate_limiter
            .check_limit(&client_id, sanitized.chars().count());

        if result.allowed {
            debug!(client_id = %client_id, remaining = result.remaining, "Chat message accepted");
        } else {
            warn!(client_id = %client_id, reason = ?result.reason, "Rate limit exceeded");
        }

        Ok(self.respond(client_id, sanitized, result))
    }

    #[instrument(skip(self, request))]
    async fn get_status(
        &self,
        request: Request<GetStatusRequest>,
    ) -> Result<Response<RateLimitStatus>, Status> {
        let client_id = resolve_client_id(&request, &request.get_ref().client_id);
        let result = self.rate_limiter.get_status(&client_id);
        Ok(self.respond(client_id, String::new(), result))
    }

    #[instrument(skip(self, _request))]
    async fn get_stats(
        &self,
        _request: Request<GetStatsRequest>,
    ) -> Result<Response<ProtoLimiterStats>, Status> {
        let stats = self.rate_limiter.stats();

        info!(
            total = stats.total_entries,
            active = stats.active_entries,
            blocked = stats.blocked_clients,
            "Rate limiter stats requested"
        );

        Ok(Response::new(ProtoLimiterStats {
            total_entries: stats.total_entries as u64,
            active_entries: stats.active_entries as u64,
            blocked_clients: stats.blocked_clients as u64,
            timestamp: Some(to_timestamp(stats.timestamp_ms)),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::request::{HEADER_BLOCK_UNTIL, HEADER_REMAINING, HEADER_RESET};
    use tonic::metadata::AsciiMetadataValue;

    fn service() -> ChatGuardServiceImpl {
        let limiter = RateLimiter::new().with_clock(ManualClock::new(1_700_000_000_000));
        ChatGuardServiceImpl::new(Arc::new(limiter), 1000)
    }

    fn message(client_id: &str, text: &str) -> Request<CheckMessageRequest> {
        Request::new(CheckMessageRequest {
            client_id: client_id.to_string(),
            message: text.to_string(),
        })
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let result = service().check_message(message("203.0.113.5", "")).await;
        assert!(result.is_err());
        assert_eq!(result.unwrap_err().code(), tonic::Code::InvalidArgument);
    }

    #[tokio::test]
    async fn test_allowed_message_sets_headers() {
        let response = service()
            .check_message(message("203.0.113.5", "  こんにちは\u{0}  "))
            .await
            .unwrap();

        assert_eq!(response.metadata().get(HEADER_REMAINING).unwrap(), "4");
        let status = response.into_inner();
        assert!(status.allowed);
        assert_eq!(status.remaining, 4);
        assert_eq!(status.sanitized_message, "こんにちは");
        assert_eq!(status.reason(), ProtoDenyReason::Unspecified);
        assert!(status.code.is_empty());
        assert!(status.rejection_body.is_empty());
    }

    #[tokio::test]
    async fn test_sixth_message_denied() {
        let service = service();
        for _ in 0..5 {
            let status = service.check_message(message("203.0.113.5", "a")).await.unwrap();
            assert!(status.get_ref().allowed);
        }

        let response = service.check_message(message("203.0.113.5", "a")).await.unwrap();
        assert_eq!(response.metadata().get(HEADER_RESET).unwrap(), "1700000060000");
        assert_eq!(
            response.metadata().get(HEADER_BLOCK_UNTIL).unwrap(),
            "1700001800000"
        );
        let status = response.into_inner();
        assert!(!status.allowed);
        assert!(status.blocked);
        assert_eq!(status.reason(), ProtoDenyReason::MessageLimitExceeded);
        assert_eq!(status.code, "MESSAGE_LIMIT_EXCEEDED");

        let body: serde_json::Value = serde_json::from_str(&status.rejection_body).unwrap();
        assert_eq!(body["code"], "MESSAGE_LIMIT_EXCEEDED");
        assert_eq!(body["retryAfter"], 1_700_000_060_000u64);
        assert_eq!(body["blockUntil"], 1_700_000_000_000u64 + 30 * 60 * 1000);
    }

    #[tokio::test]
    async fn test_client_id_from_metadata() {
        let service = service();
        let mut request = message("", "hello");
        request.metadata_mut().insert(
            "x-forwarded-for",
            AsciiMetadataValue::from_static("198.51.100.9, 10.0.0.1"),
        );

        let status = service.check_message(request).await.unwrap().into_inner();
        assert_eq!(status.client_id, "198.51.100.9");
        assert!(service.rate_limiter.entry("198.51.100.9").is_some());
    }

    #[tokio::test]
    async fn test_missing_headers_use_unknown_bucket() {
        let status = service().check_message(message("", "hello")).await.unwrap().into_inner();
        assert_eq!(status.client_id, "unknown");
    }

    #[tokio::test]
    async fn test_status_and_stats_do_not_consume() {
        let service = service();
        service.check_message(message("203.0.113.5", "hi")).await.unwrap();

        let request = Request::new(GetStatusRequest {
            client_id: "203.0.113.5".to_string(),
        });
        let status = service.get_status(request).await.unwrap().into_inner();
        assert_eq!(status.remaining, 4);

        let stats = service
            .get_stats(Request::new(GetStatsRequest {}))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.active_entries, 1);
        assert_eq!(stats.blocked_clients, 0);
    }
}
