//! Enumerations and field types for epics and tasks.
//!
//! This module defines the structured values carried by roadmap records: the
//! three-state epic status, the two-state task status and task priority, along
//! with their display and parse helpers.

use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::RoadmapError;

/// Lifecycle status of an epic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum EpicStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "InProgress")]
    InProgress,
    #[serde(alias = "Done")]
    Done,
}

/// Completion status of a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Done")]
    Done,
}

/// Task priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// Output format for metrics and reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl EpicStatus {
    pub const ALL: [EpicStatus; 3] = [EpicStatus::Pending, EpicStatus::InProgress, EpicStatus::Done];
}

/// Format an epic status for display.
pub fn format_epic_status(s: EpicStatus) -> &'static str {
    match s {
        EpicStatus::Pending => "Pending",
        EpicStatus::InProgress => "In Progress",
        EpicStatus::Done => "Done",
    }
}

/// Format a task status for display.
pub fn format_task_status(s: TaskStatus) -> &'static str {
    match s {
        TaskStatus::Pending => "Pending",
        TaskStatus::Done => "Done",
    }
}

/// Format a priority for display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::High => "High",
        Priority::Medium => "Medium",
        Priority::Low => "Low",
    }
}

impl fmt::Display for EpicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_epic_status(*self))
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_task_status(*self))
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(format_priority(*self))
    }
}

/// Fold a raw status/priority string into a comparable key.
fn normalise_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Parses an operator-supplied status. Unknown values are rejected rather
/// than coerced to a default.
impl FromStr for EpicStatus {
    type Err = RoadmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_key(s).as_str() {
            "pending" => Ok(EpicStatus::Pending),
            "in progress" | "in-progress" | "in_progress" | "inprogress" => Ok(EpicStatus::InProgress),
            "done" => Ok(EpicStatus::Done),
            _ => Err(RoadmapError::InvalidState(format!("unknown epic status '{}'", s.trim()))),
        }
    }
}

impl FromStr for TaskStatus {
    type Err = RoadmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_key(s).as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "done" => Ok(TaskStatus::Done),
            _ => Err(RoadmapError::InvalidState(format!("unknown task status '{}'", s.trim()))),
        }
    }
}

impl FromStr for Priority {
    type Err = RoadmapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalise_key(s).as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(RoadmapError::InvalidState(format!("unknown priority '{}'", s.trim()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_epic_status_variants() {
        assert_eq!("pending".parse::<EpicStatus>().unwrap(), EpicStatus::Pending);
        assert_eq!("In Progress".parse::<EpicStatus>().unwrap(), EpicStatus::InProgress);
        assert_eq!("in-progress".parse::<EpicStatus>().unwrap(), EpicStatus::InProgress);
        assert_eq!("in_progress".parse::<EpicStatus>().unwrap(), EpicStatus::InProgress);
        assert_eq!(" DONE ".parse::<EpicStatus>().unwrap(), EpicStatus::Done);
    }

    #[test]
    fn test_parse_epic_status_rejects_unknown() {
        let err = "blocked".parse::<EpicStatus>().unwrap_err();
        assert!(matches!(err, RoadmapError::InvalidState(_)));
        assert!("".parse::<EpicStatus>().is_err());
    }

    #[test]
    fn test_parse_epic_status_rejects_mangled_separators() {
        for raw in ["d o n e", "-done-", "p_e-n d_ing", "IN--PROG_RESS", "in  progress"] {
            let err = raw.parse::<EpicStatus>().unwrap_err();
            assert!(matches!(err, RoadmapError::InvalidState(_)), "{raw} accepted");
        }
        assert_eq!("InProgress".parse::<EpicStatus>().unwrap(), EpicStatus::InProgress);
    }

    #[test]
    fn test_parse_priority_and_task_status() {
        assert_eq!("High".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("low".parse::<Priority>().unwrap(), Priority::Low);
        assert!("urgent".parse::<Priority>().is_err());
        assert_eq!("done".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        assert!("in-progress".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_serde_accepts_legacy_casing() {
        let s: EpicStatus = serde_json::from_str("\"InProgress\"").unwrap();
        assert_eq!(s, EpicStatus::InProgress);
        assert_eq!(serde_json::to_string(&EpicStatus::InProgress).unwrap(), "\"in-progress\"");
    }

    #[test]
    fn test_priority_ordering_is_high_first() {
        let mut ps = vec![Priority::Low, Priority::High, Priority::Medium];
        ps.sort();
        assert_eq!(ps, vec![Priority::High, Priority::Medium, Priority::Low]);
    }
}
