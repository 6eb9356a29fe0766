//! # fabric-queue — the wire schema and transport primitives
//!
//! [`QueueClient`] is the one surface the worker runtime and submitters
//! use; [`RedisQueueClient`] and [`memory::MemoryQueueClient`] are its
//! two implementations. Nothing outside [`schema`] constructs a raw
//! key or channel name.

#![deny(missing_docs)]

pub mod client;
pub mod error;
pub mod memory;
pub mod redis_client;
pub mod schema;

pub use client::{QueueClient, ResultStream};
pub use error::QueueError;
pub use redis_client::RedisQueueClient;
