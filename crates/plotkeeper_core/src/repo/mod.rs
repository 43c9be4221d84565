//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the key-value contract the persistence gateway writes through.
//! - Isolate SQLite query details from gateway and context orchestration.
//!
//! # Invariants
//! - Multi-key writes are all-or-nothing.

pub mod kv_repo;
