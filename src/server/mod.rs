//! A2A server dispatchers — expose a [`RequestHandler`] over each binding.
//!
//! - [`jsonrpc_router`] — single-endpoint JSON-RPC 2.0 axum router
//! - [`rest_router`] — resource-routed REST/JSON axum router
//! - [`GrpcDispatcher`] — tonic-shaped unary and server-streaming methods
//!
//! All three run the same dispatch algorithm: decode the native request into
//! domain params, build a [`ServerCallContext`](crate::context::ServerCallContext)
//! from the transport metadata, invoke the handler, and encode the result or
//! map the error back through the shared taxonomy. Wrap the handler in an
//! [`InterceptedHandler`](crate::interceptor::InterceptedHandler) to run an
//! interceptor chain on every call.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a2a_bridge::handler::RequestHandler;
//! use a2a_bridge::server::jsonrpc_router;
//!
//! let handler: Arc<dyn RequestHandler> = Arc::new(MyHandler);
//! let app = jsonrpc_router(handler, agent_card);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:7420").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod grpc;
pub mod jsonrpc;
pub mod rest;

pub use self::grpc::{GrpcDispatcher, GrpcEventStream};
pub use self::jsonrpc::{jsonrpc_router, jsonrpc_router_with};
pub use self::rest::{rest_router, rest_router_with};

pub use crate::handler::RequestHandler;
