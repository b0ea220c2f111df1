//! Completion progress for a set of tasks.

use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Completed/total counts and the derived percentage.
///
/// `percentage` is kept unrounded; rounding is left to whoever displays it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
}

impl ProgressSnapshot {
    /// Build a snapshot from raw counts. A zero total yields 0%.
    pub fn from_counts(completed: usize, total: usize) -> Self {
        ProgressSnapshot {
            completed,
            total,
            percentage: percentage(completed, total),
        }
    }

    /// True when there is at least one task and every task is done.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.percentage == 100.0
    }
}

/// `completed / total * 100`, or 0 when `total` is 0.
pub fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}

/// Count done tasks. The result depends only on the counts, not on order.
pub fn compute_progress(tasks: &[Task]) -> ProgressSnapshot {
    let completed = tasks.iter().filter(|t| t.is_done()).count();
    ProgressSnapshot::from_counts(completed, tasks.len())
}
