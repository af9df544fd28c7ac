//! gRPC server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tonic::transport::Server;
use tracing::{error, info};

use super::localization::LocalizationServiceImpl;
use super::proto::jlpt4you::edge::v1::{
    chat_guard_server::ChatGuardServer, localization_server::LocalizationServer,
};
use super::service::ChatGuardServiceImpl;
use crate::config::LocalizationConfig;
use crate::error::{EdgeError, Result};
use crate::ratelimit::RateLimiter;
use crate::request::DEFAULT_MAX_MESSAGE_CHARS;

/// gRPC server hosting the chat guard and localization services.
pub struct GrpcServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The rate limiter instance
    rate_limiter: Arc<RateLimiter>,
    max_message_chars: usize,
    localization: LocalizationConfig,
}

impl GrpcServer {
    /// Create a new gRPC server with default message truncation and
    /// localization settings.
    pub fn new(addr: SocketAddr, rate_limiter: Arc<RateLimiter>) -> Self {
        Self {
            addr,
            rate_limiter,
            max_message_chars: DEFAULT_MAX_MESSAGE_CHARS,
            localization: LocalizationConfig::default(),
        }
    }

    pub fn with_max_message_chars(mut self, max_message_chars: usize) -> Self {
        self.max_message_chars = max_message_chars;
        self
    }

    pub fn with_localization(mut self, localization: LocalizationConfig) -> Self {
        self.localization = localization;
        self
    }

    /// Start the gRPC server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send,
    {
        let chat_guard = ChatGuardServiceImpl::new(self.rate_limiter, self.max_message_chars);
        let localization = LocalizationServiceImpl::new(self.localization);

        info!(
            addr = %self.addr,
            "Starting gRPC server for ChatGuard and Localization"
        );

        Server::builder()
            .add_service(ChatGuardServer::new(chat_guard))
            .add_service(LocalizationServer::new(localization))
            .serve_with_shutdown(self.addr, signal)
            .await
            .map_err(|e| {
                error!(error = %e, "gRPC server failed");
                EdgeError::Grpc(e)
            })
    }
}
