//! Plot definition model.

use serde::{Deserialize, Serialize};

/// Identifier of a plot. User-assigned values may be zero or negative.
pub type PlotId = i64;

/// A named location a process can run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plot {
    pub id: PlotId,
    pub name: String,
    pub description: String,
}

impl Plot {
    pub fn new(id: PlotId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }
}
