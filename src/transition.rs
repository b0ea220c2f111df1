//! Epic status transitions.
//!
//! There are two ways an epic's status changes. Operators set any status by
//! hand through [`set_epic_status`]; nothing checks it against task
//! completion. The only automatic change is [`maybe_auto_complete`], which
//! promotes an epic to `Done` once it has tasks and all of them are done.

use tracing::{debug, info};

use crate::error::RoadmapResult;
use crate::fields::*;
use crate::progress::compute_progress;
use crate::store::RoadmapStore;

/// Promote the epic to `Done` if every one of its tasks is done.
///
/// Task state is re-read from the store right before deciding. Returns `true`
/// only when a transition was persisted; an epic without tasks, one with
/// pending tasks, or one already `Done` is left untouched.
pub fn maybe_auto_complete<S: RoadmapStore + ?Sized>(store: &mut S, epic_id: u64) -> RoadmapResult<bool> {
    let epic = store.get_epic(epic_id)?;
    let tasks = store.list_tasks(epic_id)?;
    let progress = compute_progress(&tasks);

    if !progress.is_complete() {
        debug!(epic = epic_id, completed = progress.completed, total = progress.total, "epic not complete");
        return Ok(false);
    }
    if epic.status == EpicStatus::Done {
        return Ok(false);
    }

    store.update_epic_status(epic_id, EpicStatus::Done)?;
    info!(epic = epic_id, name = %epic.name, from = %epic.status, "auto-completed epic");
    Ok(true)
}

/// Manual status change. Accepted unconditionally.
pub fn set_epic_status<S: RoadmapStore + ?Sized>(store: &mut S, epic_id: u64, status: EpicStatus) -> RoadmapResult<()> {
    store.update_epic_status(epic_id, status)?;
    info!(epic = epic_id, status = %status, "epic status set manually");
    Ok(())
}

/// Manual status change from raw operator input. Values outside the
/// three-state enumeration fail with `InvalidState` before reaching storage.
pub fn set_epic_status_str<S: RoadmapStore + ?Sized>(store: &mut S, epic_id: u64, raw: &str) -> RoadmapResult<EpicStatus> {
    let status: EpicStatus = raw.parse()?;
    set_epic_status(store, epic_id, status)?;
    Ok(status)
}

/// Set a task's status and run the auto-completion rule for its epic.
/// Returns whether the owning epic was promoted.
pub fn set_task_status<S: RoadmapStore + ?Sized>(store: &mut S, task_id: u64, status: TaskStatus) -> RoadmapResult<bool> {
    let task = store.get_task(task_id)?;
    store.update_task_status(task_id, status)?;
    if status == TaskStatus::Done {
        maybe_auto_complete(store, task.epic_id)
    } else {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RoadmapError, StoreError};
    use crate::fixtures::*;
    use crate::store::Database;
    use crate::task::NewTask;
    use crate::epic::NewEpic;

    #[test]
    fn test_all_done_promotes_once() {
        let (mut db, s) = scenario_db();
        assert!(maybe_auto_complete(&mut db, s.finished).unwrap());
        assert_eq!(db.get_epic(s.finished).unwrap().status, EpicStatus::Done);

        assert!(!maybe_auto_complete(&mut db, s.finished).unwrap());
        assert_eq!(db.get_epic(s.finished).unwrap().status, EpicStatus::Done);
    }

    #[test]
    fn test_partial_epic_is_not_promoted() {
        let (mut db, s) = scenario_db();
        assert!(!maybe_auto_complete(&mut db, s.half).unwrap());
        assert_eq!(db.get_epic(s.half).unwrap().status, EpicStatus::InProgress);
    }

    #[test]
    fn test_epic_without_tasks_never_transitions() {
        let (mut db, s) = scenario_db();
        for _ in 0..3 {
            assert!(!maybe_auto_complete(&mut db, s.empty).unwrap());
        }
        assert_eq!(db.get_epic(s.empty).unwrap().status, EpicStatus::Pending);
    }

    #[test]
    fn test_manual_status_ignores_task_state() {
        let (mut db, s) = scenario_db();
        set_epic_status(&mut db, s.empty, EpicStatus::Done).unwrap();
        assert_eq!(db.get_epic(s.empty).unwrap().status, EpicStatus::Done);

        // Demoting a fully-done epic is allowed; the rule promotes it again on demand.
        maybe_auto_complete(&mut db, s.finished).unwrap();
        set_epic_status(&mut db, s.finished, EpicStatus::Pending).unwrap();
        assert_eq!(db.get_epic(s.finished).unwrap().status, EpicStatus::Pending);
        assert!(maybe_auto_complete(&mut db, s.finished).unwrap());
    }

    #[test]
    fn test_invalid_manual_status_is_rejected_before_storage() {
        let (mut db, s) = scenario_db();
        let err = set_epic_status_str(&mut db, s.half, "archived").unwrap_err();
        assert!(matches!(err, RoadmapError::InvalidState(_)));
        assert_eq!(db.get_epic(s.half).unwrap().status, EpicStatus::InProgress);

        assert_eq!(set_epic_status_str(&mut db, s.half, "done").unwrap(), EpicStatus::Done);
    }

    #[test]
    fn test_completing_last_task_promotes_epic() {
        let mut db = Database::in_memory();
        let e = db.create_epic(NewEpic::new("Docs", WEEK_40)).unwrap();
        let a = db.create_task(e, NewTask::new("guide")).unwrap();
        let b = db.create_task(e, NewTask::new("api ref")).unwrap();

        assert!(!set_task_status(&mut db, a, TaskStatus::Done).unwrap());
        assert!(set_task_status(&mut db, b, TaskStatus::Done).unwrap());
        assert_eq!(db.get_epic(e).unwrap().status, EpicStatus::Done);

        // Reopening a task does not demote the epic automatically.
        assert!(!set_task_status(&mut db, b, TaskStatus::Pending).unwrap());
        assert_eq!(db.get_epic(e).unwrap().status, EpicStatus::Done);
    }

    #[test]
    fn test_missing_epic_is_a_collaborator_failure() {
        let mut db = Database::in_memory();
        let err = maybe_auto_complete(&mut db, 42).unwrap_err();
        assert!(matches!(err, RoadmapError::Collaborator(StoreError::EpicNotFound(42))));
    }
}
