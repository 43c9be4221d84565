//! Process definition model.
//!
//! # Invariants
//! - `duration_minutes` must be `> 0`; `validate()` is the single check used
//!   by every write path.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Identifier of a process definition.
pub type ProcessId = i64;

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: i64 = 60_000;

/// Named task template with a fixed duration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Process {
    pub id: ProcessId,
    pub name: String,
    /// Accepts the legacy `duration` key written by older stores.
    #[serde(alias = "duration")]
    pub duration_minutes: i64,
}

/// Validation failure for process definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessValidationError {
    NonPositiveDuration(i64),
}

impl Display for ProcessValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositiveDuration(minutes) => {
                write!(f, "duration must be a positive number of minutes, got {minutes}")
            }
        }
    }
}

impl Error for ProcessValidationError {}

impl Process {
    pub fn new(id: ProcessId, name: impl Into<String>, duration_minutes: i64) -> Self {
        Self {
            id,
            name: name.into(),
            duration_minutes,
        }
    }

    /// Checks the positive-duration invariant.
    pub fn validate(&self) -> Result<(), ProcessValidationError> {
        validate_duration(self.duration_minutes)
    }

    /// Full run length in milliseconds.
    pub fn duration_millis(&self) -> i64 {
        self.duration_minutes.saturating_mul(MILLIS_PER_MINUTE)
    }
}

/// Rejects zero and negative minute counts.
pub fn validate_duration(duration_minutes: i64) -> Result<(), ProcessValidationError> {
    if duration_minutes <= 0 {
        return Err(ProcessValidationError::NonPositiveDuration(duration_minutes));
    }
    Ok(())
}
