//! Core error taxonomy.
//!
//! # Invariants
//! - Every fallible core operation returns `CoreResult`; nothing panics past
//!   an operation boundary.
//! - `Persistence` is reported through logs and the context's persistence
//!   status, never as the result of a CRUD call.

use crate::model::process::ProcessValidationError;
use crate::persistence::PersistenceError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CoreResult<T> = Result<T, CoreError>;

/// Record family named in lookup errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Plot,
    Process,
    ActiveProcess,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Plot => "plot",
            Self::Process => "process",
            Self::ActiveProcess => "active_process",
        }
    }
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub enum CoreError {
    /// Rejected input; the operation had no effect.
    InvalidInput(String),
    /// `start` referenced a definition that does not exist.
    ReferenceNotFound { kind: RecordKind, id: i64 },
    /// Update or reset of a missing record.
    NotFound { kind: RecordKind, id: i64 },
    /// Caller-assigned id already in use.
    DuplicateId { kind: RecordKind, id: i64 },
    Persistence(PersistenceError),
}

impl Display for CoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::ReferenceNotFound { kind, id } => {
                write!(f, "referenced {kind} does not exist: {id}")
            }
            Self::NotFound { kind, id } => write!(f, "{kind} not found: {id}"),
            Self::DuplicateId { kind, id } => write!(f, "{kind} id already in use: {id}"),
            Self::Persistence(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Persistence(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ProcessValidationError> for CoreError {
    fn from(value: ProcessValidationError) -> Self {
        Self::InvalidInput(value.to_string())
    }
}

impl From<PersistenceError> for CoreError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}
