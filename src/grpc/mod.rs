//! gRPC surface for the chat guard and localization services.

mod localization;
mod server;
mod service;

pub use localization::LocalizationServiceImpl;
pub use server::GrpcServer;
pub use service::ChatGuardServiceImpl;

// Include the generated protobuf code
pub mod proto {
    pub mod jlpt4you {
        pub mod edge {
            pub mod v1 {
                tonic::include_proto!("jlpt4you.edge.v1");
            }
        }
    }
}

// Re-export commonly used types
pub use proto::jlpt4you::edge::v1::{
    chat_guard_server::ChatGuardServer, localization_server::LocalizationServer,
    CheckMessageRequest, RateLimitStatus,
};
