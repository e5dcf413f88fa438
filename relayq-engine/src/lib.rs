//! Keyed FIFO message queue engine for relayq
//!
//! Provides the in-memory queue engine with support for:
//! - Per-key FIFO storage, created lazily on first use
//! - Blocking dequeue ("long-polling") with a per-call deadline
//! - Direct producer-to-consumer hand-off that bypasses storage

pub mod handlers;
mod engine;

pub use engine::{Enqueued, QueueEngine};
