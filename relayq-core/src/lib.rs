//! Core types for relayq
//!
//! This crate provides the types shared between the queue engine and the
//! server binary: the HTTP-facing error taxonomy and request IDs.

pub mod error;
pub mod request_id;

pub use error::ApiError;
pub use request_id::RequestId;
