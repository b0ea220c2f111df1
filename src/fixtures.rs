//! Shared test data.

use crate::epic::NewEpic;
use crate::fields::*;
use crate::store::{Database, RoadmapStore};
use crate::task::NewTask;

pub const WEEK_40: &str = "Week 40 - 2025";
pub const WEEK_41: &str = "Week 41 - 2025";

/// Ids of the three epics created by [`scenario_db`].
pub struct Scenario {
    pub empty: u64,
    pub half: u64,
    pub finished: u64,
}

/// Three epics: pending with no tasks, in progress with one of two tasks
/// done, and in progress with both tasks done.
pub fn scenario_db() -> (Database, Scenario) {
    let mut db = Database::in_memory();
    let empty = db
        .create_epic(NewEpic::new("Onboarding", WEEK_40))
        .unwrap();
    let half = db
        .create_epic(NewEpic::new("Payments", WEEK_40).status(EpicStatus::InProgress))
        .unwrap();
    let finished = db
        .create_epic(NewEpic::new("Search", WEEK_41).status(EpicStatus::InProgress))
        .unwrap();

    let t = db.create_task(half, NewTask::new("Stripe webhook").owner("ana")).unwrap();
    db.update_task_status(t, TaskStatus::Done).unwrap();
    db.create_task(half, NewTask::new("Refunds").priority(Priority::High)).unwrap();

    for title in ["Index builder", "Query parser"] {
        let t = db.create_task(finished, NewTask::new(title)).unwrap();
        db.update_task_status(t, TaskStatus::Done).unwrap();
    }

    (db, Scenario { empty, half, finished })
}
