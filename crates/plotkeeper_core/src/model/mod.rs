//! Domain model for plots, process definitions and running instances.
//!
//! # Responsibility
//! - Define the record shapes owned by the core and mirrored to storage.
//! - Keep derived time values (end time) out of stored state.
//!
//! # Invariants
//! - Process durations are whole minutes and strictly positive.
//! - Active instances reference definitions by id only; references may
//!   dangle once a definition is deleted.

pub mod active;
pub mod plot;
pub mod process;
pub mod seed;
