//! gRPC wire types and the `a2a.v1.A2AService` client stub.

pub mod pb;
pub mod service;

pub use service::A2aServiceClient;
