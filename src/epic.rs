//! Epic data structure.
//!
//! Epics are the top-level units of work on the roadmap. Each one is bucketed
//! into a week label and owns zero or more tasks.

use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A top-level work item bucketed to a calendar week.
///
/// `status` only becomes `Done` automatically through
/// [`maybe_auto_complete`](crate::transition::maybe_auto_complete); operators
/// may still set any status by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Epic {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    /// Opaque week bucket, e.g. "Week 40 - 2025". Matched by equality only.
    pub week: String,
    pub status: EpicStatus,
    pub created_at_utc: i64,
    pub updated_at_utc: i64,
}

/// Field values for an epic that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewEpic {
    pub name: String,
    pub description: Option<String>,
    pub week: String,
    pub status: EpicStatus,
}

impl NewEpic {
    pub fn new(name: impl Into<String>, week: impl Into<String>) -> Self {
        NewEpic {
            name: name.into(),
            description: None,
            week: week.into(),
            status: EpicStatus::Pending,
        }
    }

    pub fn status(mut self, status: EpicStatus) -> Self {
        self.status = status;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
