//! Cross-epic metrics aggregation.
//!
//! Metrics are always recomputed from the current store contents; nothing
//! here is cached or updated incrementally.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::epic::Epic;
use crate::error::RoadmapResult;
use crate::fields::*;
use crate::progress::{compute_progress, percentage, ProgressSnapshot};
use crate::store::RoadmapStore;

/// Per-epic line of a [`MetricsReport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpicDetail {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub week: String,
    pub status: EpicStatus,
    pub progress: ProgressSnapshot,
}

/// Summary counts over a set of epics plus one detail record per epic.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricsReport {
    pub total_epics: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub done: usize,
    pub total_tasks: usize,
    pub completed_tasks: usize,
    /// In the order the epics were supplied.
    pub epic_details: Vec<EpicDetail>,
}

/// Task progress for one week label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekProgress {
    pub week: String,
    pub progress: ProgressSnapshot,
}

impl MetricsReport {
    /// Overall task completion, 0 when there are no tasks.
    pub fn overall_percentage(&self) -> f64 {
        percentage(self.completed_tasks, self.total_tasks)
    }

    pub fn count_for(&self, status: EpicStatus) -> usize {
        match status {
            EpicStatus::Pending => self.pending,
            EpicStatus::InProgress => self.in_progress,
            EpicStatus::Done => self.done,
        }
    }

    /// Task progress grouped by week label, ordered by label.
    pub fn week_progress(&self) -> Vec<WeekProgress> {
        let mut by_week: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for d in &self.epic_details {
            let entry = by_week.entry(d.week.as_str()).or_default();
            entry.0 += d.progress.completed;
            entry.1 += d.progress.total;
        }
        by_week
            .into_iter()
            .map(|(week, (completed, total))| WeekProgress {
                week: week.to_string(),
                progress: ProgressSnapshot::from_counts(completed, total),
            })
            .collect()
    }

    /// In-progress epics that have not completed a single task.
    pub fn stalled_epics(&self) -> impl Iterator<Item = &EpicDetail> {
        self.epic_details
            .iter()
            .filter(|d| d.status == EpicStatus::InProgress && d.progress.percentage == 0.0)
    }

    fn add(&mut self, epic: &Epic, progress: ProgressSnapshot) {
        self.total_epics += 1;
        match epic.status {
            EpicStatus::Pending => self.pending += 1,
            EpicStatus::InProgress => self.in_progress += 1,
            EpicStatus::Done => self.done += 1,
        }
        self.total_tasks += progress.total;
        self.completed_tasks += progress.completed;
        self.epic_details.push(EpicDetail {
            id: epic.id,
            name: epic.name.clone(),
            description: epic.description.clone(),
            week: epic.week.clone(),
            status: epic.status,
            progress,
        });
    }
}

/// Fold `epics` into a [`MetricsReport`], fetching each epic's tasks from
/// `store`.
///
/// With a `week_filter`, only epics whose week label is exactly equal to it
/// are counted. Input order is preserved in `epic_details`; callers wanting a
/// different order sort first.
pub fn aggregate<S: RoadmapStore + ?Sized>(
    store: &S,
    epics: &[Epic],
    week_filter: Option<&str>,
) -> RoadmapResult<MetricsReport> {
    let mut report = MetricsReport::default();
    for epic in epics.iter().filter(|e| week_filter.map_or(true, |w| e.week == w)) {
        let tasks = store.list_tasks(epic.id)?;
        report.add(epic, compute_progress(&tasks));
    }
    debug!(
        week = week_filter.unwrap_or("*"),
        epics = report.total_epics,
        tasks = report.total_tasks,
        "aggregated metrics"
    );
    Ok(report)
}

/// Read the current epics from `store` and aggregate them.
pub fn collect_metrics<S: RoadmapStore + ?Sized>(store: &S, week_filter: Option<&str>) -> RoadmapResult<MetricsReport> {
    let epics = store.list_epics(week_filter)?;
    aggregate(store, &epics, week_filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::epic::NewEpic;
    use crate::error::{RoadmapError, StoreError};
    use crate::report::ReportAssembler;
    use crate::store::Database;
    use crate::task::{NewTask, Task};
    use crate::transition::maybe_auto_complete;

    /// Store whose task listing fails for one epic.
    struct BrokenTasks {
        inner: Database,
        broken: u64,
    }

    impl RoadmapStore for BrokenTasks {
        fn list_epics(&self, week: Option<&str>) -> Result<Vec<Epic>, StoreError> {
            self.inner.list_epics(week)
        }
        fn get_epic(&self, id: u64) -> Result<Epic, StoreError> {
            self.inner.get_epic(id)
        }
        fn get_task(&self, id: u64) -> Result<Task, StoreError> {
            self.inner.get_task(id)
        }
        fn list_tasks(&self, epic_id: u64) -> Result<Vec<Task>, StoreError> {
            if epic_id == self.broken {
                return Err(StoreError::InvalidRecord("task table unreadable".into()));
            }
            self.inner.list_tasks(epic_id)
        }
        fn update_epic_status(&mut self, id: u64, status: EpicStatus) -> Result<(), StoreError> {
            self.inner.update_epic_status(id, status)
        }
        fn create_epic(&mut self, epic: NewEpic) -> Result<u64, StoreError> {
            self.inner.create_epic(epic)
        }
        fn create_task(&mut self, epic_id: u64, task: NewTask) -> Result<u64, StoreError> {
            self.inner.create_task(epic_id, task)
        }
        fn update_task_status(&mut self, id: u64, status: TaskStatus) -> Result<(), StoreError> {
            self.inner.update_task_status(id, status)
        }
        fn delete_epic(&mut self, id: u64) -> Result<(), StoreError> {
            self.inner.delete_epic(id)
        }
        fn delete_task(&mut self, id: u64) -> Result<(), StoreError> {
            self.inner.delete_task(id)
        }
        fn epic_count_by_week(&self) -> Result<Vec<(String, usize)>, StoreError> {
            self.inner.epic_count_by_week()
        }
    }

    #[test]
    fn test_task_listing_failure_propagates() {
        let (db, s) = scenario_db();
        let store = BrokenTasks { inner: db, broken: s.half };
        let is_collaborator =
            |r: RoadmapResult<_>| matches!(r, Err(RoadmapError::Collaborator(StoreError::InvalidRecord(_))));

        let epics = store.list_epics(None).unwrap();
        assert!(is_collaborator(aggregate(&store, &epics, None).map(|_| ())));
        assert!(is_collaborator(collect_metrics(&store, Some(WEEK_40)).map(|_| ())));
        assert!(is_collaborator(ReportAssembler::new(&store).build(None, None).map(|_| ())));

        // The broken epic is outside this week, so aggregation succeeds.
        let m = collect_metrics(&store, Some(WEEK_41)).unwrap();
        assert_eq!(m.total_epics, 1);
    }

    #[test]
    fn test_scenario_counts() {
        let (db, _) = scenario_db();
        let m = collect_metrics(&db, None).unwrap();
        assert_eq!(m.total_epics, 3);
        assert_eq!((m.pending, m.in_progress, m.done), (1, 2, 0));
        assert_eq!((m.total_tasks, m.completed_tasks), (4, 3));
        assert_eq!(m.overall_percentage(), 75.0);
    }

    #[test]
    fn test_auto_complete_then_reaggregate() {
        let (mut db, s) = scenario_db();
        assert!(maybe_auto_complete(&mut db, s.finished).unwrap());
        let m = collect_metrics(&db, None).unwrap();
        assert_eq!((m.pending, m.in_progress, m.done), (1, 1, 1));
    }

    #[test]
    fn test_aggregate_is_deterministic() {
        let (db, _) = scenario_db();
        let a = collect_metrics(&db, None).unwrap();
        let b = collect_metrics(&db, None).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_status_counts_sum_to_total() {
        let (db, _) = scenario_db();
        for filter in [None, Some(WEEK_40), Some(WEEK_41), Some("Week 99 - 2030")] {
            let m = collect_metrics(&db, filter).unwrap();
            assert_eq!(m.pending + m.in_progress + m.done, m.total_epics);
            assert!(m.completed_tasks <= m.total_tasks);
        }
        let empty = collect_metrics(&Database::in_memory(), None).unwrap();
        assert_eq!(empty, MetricsReport::default());
    }

    #[test]
    fn test_week_filter_is_exact() {
        let (db, _) = scenario_db();
        let m = collect_metrics(&db, Some(WEEK_40)).unwrap();
        assert_eq!(m.total_epics, 2);
        assert_eq!((m.total_tasks, m.completed_tasks), (2, 1));

        assert_eq!(collect_metrics(&db, Some("Week 40")).unwrap().total_epics, 0);
    }

    #[test]
    fn test_aggregate_filters_supplied_epics() {
        let (db, _) = scenario_db();
        let epics = db.list_epics(None).unwrap();
        let m = aggregate(&db, &epics, Some(WEEK_41)).unwrap();
        assert_eq!(m.total_epics, 1);
        assert_eq!(m.epic_details[0].name, "Search");
    }

    #[test]
    fn test_details_preserve_input_order() {
        let (db, _) = scenario_db();
        let mut epics = db.list_epics(None).unwrap();
        epics.sort_by(|a, b| a.name.cmp(&b.name));
        let names: Vec<String> = aggregate(&db, &epics, None)
            .unwrap()
            .epic_details
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(names, vec!["Onboarding", "Payments", "Search"]);
    }

    #[test]
    fn test_week_progress_and_stalled() {
        let (mut db, s) = scenario_db();
        let m = collect_metrics(&db, None).unwrap();
        let weeks = m.week_progress();
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].week, WEEK_40);
        assert_eq!(weeks[0].progress.percentage, 50.0);
        assert_eq!(weeks[1].progress.percentage, 100.0);
        assert_eq!(m.stalled_epics().count(), 0);

        db.update_epic_status(s.empty, EpicStatus::InProgress).unwrap();
        let m = collect_metrics(&db, None).unwrap();
        let stalled: Vec<u64> = m.stalled_epics().map(|d| d.id).collect();
        assert_eq!(stalled, vec![s.empty]);
    }
}
