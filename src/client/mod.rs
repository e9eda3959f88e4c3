//! A2A client — call remote A2A agents over any supported binding.
//!
//! - [`ClientTransport`] — one method per A2A operation, protocol-neutral
//! - [`JsonRpcClient`] / [`RestClient`] / [`GrpcClient`] — per-binding adapters
//! - [`CardResolver`] — discover agent cards via the well-known URL convention
//! - [`SseStream`] — parsed SSE event stream for the HTTP streaming routes
//!
//! # Quick Start
//!
//! ```no_run
//! use a2a_bridge::client::{ClientTransport, JsonRpcClient, RequestOptions};
//! use a2a_bridge::types::{Message, SendMessageParams, SendMessageResponse};
//! use futures::StreamExt;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = JsonRpcClient::new("http://localhost:7420/a2a");
//!
//! let params = SendMessageParams {
//!     message: Message::user_text("Hello, agent!"),
//!     configuration: None,
//!     metadata: None,
//! };
//! let response = client
//!     .send_message(params.clone(), &RequestOptions::default())
//!     .await?;
//! match response.value {
//!     SendMessageResponse::Task(task) => {
//!         println!("Task {} — status: {}", task.id, task.status.state);
//!     }
//!     SendMessageResponse::Message(msg) => {
//!         println!("Direct reply: {:?}", msg);
//!     }
//! }
//!
//! // Stream responses:
//! let mut stream = client
//!     .send_message_stream(params, &RequestOptions::default())
//!     .await?;
//! while let Some(event) = stream.next().await {
//!     println!("{:?}", event?);
//! }
//! # Ok(())
//! # }
//! ```

mod card_resolver;
mod grpc;
mod jsonrpc;
mod rest;
mod sse;
mod transport;

pub use card_resolver::CardResolver;
pub use grpc::GrpcClient;
pub use jsonrpc::JsonRpcClient;
pub use rest::RestClient;
pub use sse::{SseFormat, SseStream};
pub use transport::{ClientResponse, ClientTransport, RequestOptions, TransportConfig};
