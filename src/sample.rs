//! Demo roadmap used by `roadmap seed`.

use tracing::info;

use crate::epic::NewEpic;
use crate::error::RoadmapResult;
use crate::fields::{EpicStatus, Priority};
use crate::store::RoadmapStore;
use crate::task::NewTask;

struct SampleEpic {
    name: &'static str,
    description: &'static str,
    week: &'static str,
    status: EpicStatus,
    tasks: &'static [(&'static str, Priority, &'static str)],
}

const SAMPLE: &[SampleEpic] = &[
    SampleEpic {
        name: "User authentication",
        description: "Complete login and sign-up flow",
        week: "Week 40 - 2025",
        status: EpicStatus::InProgress,
        tasks: &[
            ("Design database schema", Priority::High, "Backend Dev"),
            ("Implement API endpoints", Priority::High, "Backend Dev"),
            ("Build login and sign-up forms", Priority::Medium, "Frontend Dev"),
            ("Add input validation", Priority::Medium, "Frontend Dev"),
            ("Security testing", Priority::High, "QA"),
        ],
    },
    SampleEpic {
        name: "Application performance",
        description: "Faster load times and snappier UI",
        week: "Week 41 - 2025",
        status: EpicStatus::Pending,
        tasks: &[
            ("Profile current performance", Priority::High, "Tech Lead"),
            ("Optimise database queries", Priority::High, "Backend Dev"),
            ("Add caching layer", Priority::Medium, "Backend Dev"),
            ("Compress static assets", Priority::Low, "Frontend Dev"),
        ],
    },
    SampleEpic {
        name: "Metrics dashboard",
        description: "Panel showing business KPIs",
        week: "Week 42 - 2025",
        status: EpicStatus::Pending,
        tasks: &[
            ("Define dashboard metrics", Priority::High, "Product Manager"),
            ("Design dashboard mockups", Priority::High, "UX Designer"),
            ("Implement interactive charts", Priority::Medium, "Frontend Dev"),
            ("Connect data APIs", Priority::Medium, "Backend Dev"),
        ],
    },
];

/// Outcome of seeding one epic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededEpic {
    pub id: u64,
    pub name: &'static str,
    pub tasks: usize,
}

/// Create the demo epics and their tasks in `store`.
///
/// Tasks are attached to the id returned by `create_epic`, never to whatever
/// epic happens to be newest.
pub fn seed_sample_data<S: RoadmapStore + ?Sized>(store: &mut S) -> RoadmapResult<Vec<SeededEpic>> {
    let mut seeded = Vec::with_capacity(SAMPLE.len());
    for sample in SAMPLE {
        let epic = NewEpic::new(sample.name, sample.week)
            .status(sample.status)
            .description(sample.description);
        let id = store.create_epic(epic)?;
        for (title, priority, owner) in sample.tasks {
            store.create_task(id, NewTask::new(*title).owner(*owner).priority(*priority))?;
        }
        info!(epic = id, tasks = sample.tasks.len(), "seeded sample epic");
        seeded.push(SeededEpic {
            id,
            name: sample.name,
            tasks: sample.tasks.len(),
        });
    }
    Ok(seeded)
}
