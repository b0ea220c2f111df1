//! Storage collaborator for epics and tasks.
//!
//! The reporting core only talks to storage through the [`RoadmapStore`]
//! trait. [`Database`] is the file-backed implementation used by the CLI: a
//! single JSON document written atomically after every mutation.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::epic::{Epic, NewEpic};
use crate::error::StoreError;
use crate::fields::*;
use crate::task::{NewTask, Task};

/// CRUD contract the reporting core consumes.
pub trait RoadmapStore {
    /// Epics newest first, optionally restricted to one week label.
    fn list_epics(&self, week: Option<&str>) -> Result<Vec<Epic>, StoreError>;

    fn get_epic(&self, id: u64) -> Result<Epic, StoreError>;

    fn get_task(&self, id: u64) -> Result<Task, StoreError>;

    /// Tasks of one epic, highest priority first, then in creation order.
    fn list_tasks(&self, epic_id: u64) -> Result<Vec<Task>, StoreError>;

    fn update_epic_status(&mut self, id: u64, status: EpicStatus) -> Result<(), StoreError>;

    /// Store a new epic and return its identifier.
    fn create_epic(&mut self, epic: NewEpic) -> Result<u64, StoreError>;

    /// Store a new pending task under `epic_id` and return its identifier.
    fn create_task(&mut self, epic_id: u64, task: NewTask) -> Result<u64, StoreError>;

    fn update_task_status(&mut self, id: u64, status: TaskStatus) -> Result<(), StoreError>;

    /// Delete an epic together with all of its tasks.
    fn delete_epic(&mut self, id: u64) -> Result<(), StoreError>;

    fn delete_task(&mut self, id: u64) -> Result<(), StoreError>;

    /// Number of epics per week label, ordered by label.
    fn epic_count_by_week(&self) -> Result<Vec<(String, usize)>, StoreError>;
}

/// JSON-file database holding every epic and task.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Database {
    pub epics: Vec<Epic>,
    pub tasks: Vec<Task>,
    /// File the database persists to. `None` keeps it in memory only.
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl Database {
    /// In-memory database that never touches disk.
    pub fn in_memory() -> Self {
        Database::default()
    }

    /// Load database from a JSON file, starting empty if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            debug!(path = %path.display(), "no database file yet, starting empty");
            return Ok(Database {
                path: Some(path.to_path_buf()),
                ..Default::default()
            });
        }
        let mut buf = String::new();
        File::open(path)?.read_to_string(&mut buf)?;
        let mut db: Database = serde_json::from_str(&buf)?;
        db.path = Some(path.to_path_buf());
        debug!(path = %path.display(), epics = db.epics.len(), tasks = db.tasks.len(), "loaded database");
        Ok(db)
    }

    /// Save database to its JSON file using atomic write (temp file + rename).
    pub fn save(&self) -> Result<(), StoreError> {
        let Some(path) = self.path.as_ref() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = path.with_extension("json.tmp");
        let data = serde_json::to_string_pretty(self)?;
        let mut f = File::create(&tmp)?;
        f.write_all(data.as_bytes())?;
        f.flush()?;
        fs::rename(&tmp, path)?;
        debug!(path = %path.display(), "saved database");
        Ok(())
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Generate the next available epic ID.
    pub fn next_epic_id(&self) -> u64 {
        self.epics.iter().map(|e| e.id).max().unwrap_or(0) + 1
    }

    /// Generate the next available task ID.
    pub fn next_task_id(&self) -> u64 {
        self.tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1
    }

    fn epic_mut(&mut self, id: u64) -> Result<&mut Epic, StoreError> {
        self.epics
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::EpicNotFound(id))
    }

    fn task_mut(&mut self, id: u64) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }

    /// Apply `change` and persist it. On any error, in memory or on disk, the
    /// records are restored to their state before the call.
    fn commit<T>(
        &mut self,
        change: impl FnOnce(&mut Self) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let epics = self.epics.clone();
        let tasks = self.tasks.clone();
        let result = match change(self) {
            Ok(value) => self.save().map(|_| value),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            debug!(error = %e, "change not applied, records restored");
            self.epics = epics;
            self.tasks = tasks;
        }
        result
    }
}

/// Trim an optional free-text field, dropping it when blank.
fn clean_optional(s: Option<String>) -> Option<String> {
    s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl RoadmapStore for Database {
    fn list_epics(&self, week: Option<&str>) -> Result<Vec<Epic>, StoreError> {
        let mut epics: Vec<Epic> = self
            .epics
            .iter()
            .filter(|e| week.map_or(true, |w| e.week == w))
            .cloned()
            .collect();
        epics.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(epics)
    }

    fn get_epic(&self, id: u64) -> Result<Epic, StoreError> {
        self.epics
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(StoreError::EpicNotFound(id))
    }

    fn get_task(&self, id: u64) -> Result<Task, StoreError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(StoreError::TaskNotFound(id))
    }

    fn list_tasks(&self, epic_id: u64) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.epic_id == epic_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.id.cmp(&b.id)));
        Ok(tasks)
    }

    fn update_epic_status(&mut self, id: u64, status: EpicStatus) -> Result<(), StoreError> {
        self.commit(|db| {
            let epic = db.epic_mut(id)?;
            epic.status = status;
            epic.updated_at_utc = Utc::now().timestamp();
            Ok(())
        })
    }

    fn create_epic(&mut self, epic: NewEpic) -> Result<u64, StoreError> {
        let name = epic.name.trim().to_string();
        if name.is_empty() {
            return Err(StoreError::InvalidRecord("epic name cannot be empty".into()));
        }
        let now_utc = Utc::now().timestamp();
        self.commit(|db| {
            let id = db.next_epic_id();
            db.epics.push(Epic {
                id,
                name,
                description: clean_optional(epic.description),
                week: epic.week,
                status: epic.status,
                created_at_utc: now_utc,
                updated_at_utc: now_utc,
            });
            Ok(id)
        })
    }

    fn create_task(&mut self, epic_id: u64, task: NewTask) -> Result<u64, StoreError> {
        let title = task.title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::InvalidRecord("task title cannot be empty".into()));
        }
        if !self.epics.iter().any(|e| e.id == epic_id) {
            return Err(StoreError::InvalidRecord(format!(
                "task refers to missing epic {}",
                epic_id
            )));
        }
        self.commit(|db| {
            let id = db.next_task_id();
            db.tasks.push(Task {
                id,
                epic_id,
                title,
                description: clean_optional(task.description),
                owner: clean_optional(task.owner),
                priority: task.priority,
                status: TaskStatus::Pending,
                created_at_utc: Utc::now().timestamp(),
            });
            Ok(id)
        })
    }

    fn update_task_status(&mut self, id: u64, status: TaskStatus) -> Result<(), StoreError> {
        self.commit(|db| {
            db.task_mut(id)?.status = status;
            Ok(())
        })
    }

    fn delete_epic(&mut self, id: u64) -> Result<(), StoreError> {
        self.commit(|db| {
            let before = db.epics.len();
            db.epics.retain(|e| e.id != id);
            if db.epics.len() == before {
                return Err(StoreError::EpicNotFound(id));
            }
            let tasks_before = db.tasks.len();
            db.tasks.retain(|t| t.epic_id != id);
            let removed = tasks_before - db.tasks.len();
            if removed > 0 {
                warn!(epic = id, tasks = removed, "deleted epic together with its tasks");
            }
            Ok(())
        })
    }

    fn delete_task(&mut self, id: u64) -> Result<(), StoreError> {
        self.commit(|db| {
            let before = db.tasks.len();
            db.tasks.retain(|t| t.id != id);
            if db.tasks.len() == before {
                return Err(StoreError::TaskNotFound(id));
            }
            Ok(())
        })
    }

    fn epic_count_by_week(&self) -> Result<Vec<(String, usize)>, StoreError> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for e in &self.epics {
            *counts.entry(e.week.clone()).or_default() += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
