//! Core use-case services.
//!
//! # Responsibility
//! - Hold the in-memory catalogs and the active set.
//! - Evaluate time and dispatch completion notifications.
//! - Stay storage-agnostic; persistence is orchestrated by `context`.

pub mod definitions;
pub mod evaluator;
pub mod notifier;
pub mod tracker;
