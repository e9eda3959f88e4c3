//! # a2a-bridge — multi-transport toolkit for the Agent-to-Agent (A2A) Protocol v0.3
//!
//! This crate bridges one protocol-neutral domain model of the
//! [A2A protocol](https://a2a-protocol.org/latest/specification/) over three
//! wire bindings: JSON-RPC 2.0 over HTTP, REST/JSON, and gRPC. Each binding
//! gets a pure codec, a client adapter, and a server dispatcher; errors,
//! streaming, and cancellation behave identically regardless of the wire.
//!
//! ## Overview
//!
//! - **Domain model** ([`types`]) — `Task`, `Message`, `Part`, `Artifact`,
//!   stream events, push-notification configs, and `AgentCard`, with a
//!   camelCase JSON wire form shared by the two text bindings
//! - **Error taxonomy** ([`error`]) — one `A2AError` enum carrying the
//!   canonical JSON-RPC/A2A codes, mapped losslessly onto HTTP statuses and
//!   gRPC status codes by the codecs
//! - **Codecs** ([`codec`]) — pure, I/O-free conversions per binding,
//!   including hierarchical resource names (`tasks/{id}/...`) for gRPC/REST
//! - **Clients** ([`client`]) — [`client::ClientTransport`] with one method
//!   per operation, implemented by [`client::JsonRpcClient`],
//!   [`client::RestClient`], and [`client::GrpcClient`]; unified
//!   [`handler::EventStream`] streaming and `CancellationToken` support
//! - **Servers** ([`server`]) — axum routers for the HTTP bindings and a
//!   tonic-shaped [`server::GrpcDispatcher`], all over one
//!   [`handler::RequestHandler`] trait
//! - **Interceptors** ([`interceptor`]) — a transport-independent
//!   before/after pipeline around the handler, including per-item hooks on
//!   streams
//!
//! ## Feature flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `client` | yes     | HTTP client adapters (reqwest + SSE) |
//! | `server` | yes     | axum routers for the HTTP bindings |
//! | `full`   | no      | Enable all features |
//!
//! The gRPC pieces ride on `tonic` and are always available.
//!
//! ## Quick Start: Client
//!
//! ```no_run
//! use a2a_bridge::client::{ClientTransport, JsonRpcClient, RequestOptions};
//! use a2a_bridge::types::{Message, SendMessageParams, SendMessageResponse};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = JsonRpcClient::new("http://localhost:7420/a2a");
//!
//!     let params = SendMessageParams {
//!         message: Message::user_text("Write a haiku about Rust"),
//!         configuration: None,
//!         metadata: None,
//!     };
//!     let response = client.send_message(params, &RequestOptions::default()).await?;
//!     match response.value {
//!         SendMessageResponse::Task(task) => {
//!             println!("Task: {} (status: {})", task.id, task.status.state);
//!         }
//!         SendMessageResponse::Message(msg) => {
//!             println!("Direct reply: {:?}", msg);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Quick Start: Server
//!
//! Implement [`handler::RequestHandler`] and serve it over any binding:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a2a_bridge::server::jsonrpc_router;
//!
//! let handler: Arc<dyn a2a_bridge::handler::RequestHandler> = Arc::new(MyHandler);
//! let app = jsonrpc_router(handler, agent_card);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:7420").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! The same handler also drives [`server::rest_router`] and
//! [`server::GrpcDispatcher`] without changes.
//!
//! ## Protocol Compliance
//!
//! Implements **A2A protocol v0.3**. The gRPC types match the protobuf
//! definitions at
//! [`a2a.proto`](https://github.com/a2aproject/A2A/blob/main/specification/grpc/a2a.proto).
//!
//! Supported operations on every binding:
//! - `message/send`, `message/stream`
//! - `tasks/get`, `tasks/cancel`, `tasks/resubscribe`
//! - `tasks/pushNotificationConfig/{set,get,list,delete}`
//! - `agent/getAuthenticatedExtendedCard`

pub mod codec;
pub mod context;
pub mod error;
pub mod grpc;
pub mod handler;
pub mod interceptor;
pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod server;

/// Prelude module that re-exports commonly used types and traits.
///
/// Import this module with `use a2a_bridge::prelude::*;` to get access to the
/// most frequently used types without having to import them individually.
pub mod prelude {
    pub use crate::types::{
        AgentCapabilities, AgentCard, AgentInterface, AgentSkill, Artifact, FileContent,
        FileWithBytes, FileWithUri, Message, Part, PushNotificationConfig, Role,
        SendMessageConfiguration, SendMessageParams, SendMessageResponse, StreamResponse, Task,
        TaskArtifactUpdateEvent, TaskPushNotificationConfig, TaskState, TaskStatus,
        TaskStatusUpdateEvent,
    };

    pub use crate::context::{ServerCallContext, User, UserBuilder};
    pub use crate::error::{A2AError, A2AResult};
    pub use crate::handler::{EventStream, Method, RequestHandler};
    pub use crate::interceptor::{AfterFlow, CallInterceptor, CallRequest, CallResponse};

    #[cfg(feature = "client")]
    pub use crate::client::{
        ClientResponse, ClientTransport, GrpcClient, JsonRpcClient, RequestOptions, RestClient,
    };

    #[cfg(feature = "server")]
    pub use crate::server::{jsonrpc_router, rest_router, GrpcDispatcher};
}

// Re-export the core surface at the crate root for convenience.
pub use error::{A2AError, A2AResult};
pub use handler::{EventStream, Method, RequestHandler};
pub use types::*;
