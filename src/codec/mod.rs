//! Pure wire codecs, one per transport binding.
//!
//! Each codec maps between the domain types in [`crate::types`] /
//! [`crate::error`] and one wire representation. Codecs perform no I/O;
//! the client adapters and server dispatchers own the sockets.

pub mod grpc;
pub mod names;
pub mod rest;
