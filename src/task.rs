//! Task data structure.
//!
//! A task is the unit of work inside an epic. It carries its own priority and
//! a two-state completion status, and lives only as long as its owning epic.

use serde::{Deserialize, Serialize};

use crate::fields::*;

/// A unit of work belonging to exactly one epic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub epic_id: u64,
    pub title: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub status: TaskStatus,
    pub created_at_utc: i64,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Field values for a task that has not been stored yet.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub owner: Option<String>,
    pub priority: Priority,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        NewTask {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
