//! Command implementations for the CLI interface.
//!
//! Each handler loads what it needs from the store, calls into the reporting
//! core and prints the outcome. Errors bubble up to `main` as `anyhow` errors.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use clap::Subcommand;
use clap_complete::{generate, Shell};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::epic::NewEpic;
use crate::fields::*;
use crate::metrics::{collect_metrics, MetricsReport};
use crate::recommend::{recommend, Recommendation};
use crate::render::renderer_for;
use crate::report::{truncate, ReportAssembler};
use crate::sample::seed_sample_data;
use crate::store::{Database, RoadmapStore};
use crate::task::NewTask;
use crate::transition::{set_epic_status_str, set_task_status};

#[derive(Subcommand)]
pub enum Commands {
    /// Manage epics.
    Epic {
        #[command(subcommand)]
        action: EpicAction,
    },

    /// Manage tasks inside an epic.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Count epics per week.
    Weeks,

    /// Print summary metrics and recommendations.
    Metrics {
        /// Restrict to one week label (exact match).
        #[arg(long)]
        week: Option<String>,
        /// Output format: text | json.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },

    /// Build a report and write it to the reports directory.
    Report {
        /// Restrict to one week label (exact match).
        #[arg(long)]
        week: Option<String>,
        /// Output format: text | json.
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Output file path (default: <reports_dir>/roadmap_report_<timestamp>.<ext>)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Fill the database with a demo roadmap.
    Seed {
        /// Seed even when the database already holds epics.
        #[arg(long)]
        force: bool,
    },

    /// List reports already written to the reports directory.
    Reports,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum EpicAction {
    /// Create an epic, optionally with initial tasks.
    Add {
        /// Epic name.
        name: String,
        /// Week label, e.g. "Week 40 - 2025". Defaults to the first configured week.
        #[arg(long)]
        week: Option<String>,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Initial status: pending | in-progress | done.
        #[arg(long, value_enum, default_value_t = EpicStatus::Pending)]
        status: EpicStatus,
        /// Initial task as TITLE[:OWNER[:PRIORITY]]. May be repeated.
        #[arg(long = "task")]
        tasks: Vec<String>,
    },
    /// List epics with their progress.
    List {
        /// Restrict to one week label (exact match).
        #[arg(long)]
        week: Option<String>,
    },
    /// Set an epic's status by hand.
    Status {
        /// Epic ID.
        id: u64,
        /// New status: pending | in-progress | done.
        status: String,
    },
    /// Delete an epic and all of its tasks.
    Delete {
        /// Epic ID.
        id: u64,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to an epic.
    Add {
        /// Owning epic ID.
        epic_id: u64,
        /// Task title.
        title: String,
        #[arg(long)]
        desc: Option<String>,
        /// Person responsible.
        #[arg(long)]
        owner: Option<String>,
        /// Priority: high | medium | low.
        #[arg(long, value_enum, default_value_t = Priority::Medium)]
        priority: Priority,
    },
    /// Mark a task done. Completes the epic when it was the last open task.
    Done {
        /// Task ID.
        id: u64,
    },
    /// Mark a task pending again.
    Reopen {
        /// Task ID.
        id: u64,
    },
    /// Delete a task.
    Delete {
        /// Task ID.
        id: u64,
    },
}

/// Parse `TITLE[:OWNER[:PRIORITY]]` into a new task.
pub fn parse_task_arg(arg: &str) -> Result<NewTask> {
    let mut parts = arg.splitn(3, ':').map(str::trim);
    let title = parts.next().unwrap_or_default();
    if title.is_empty() {
        bail!("Task argument '{}' has an empty title", arg);
    }
    let mut task = NewTask::new(title);
    if let Some(owner) = parts.next().filter(|o| !o.is_empty()) {
        task = task.owner(owner);
    }
    if let Some(priority) = parts.next().filter(|p| !p.is_empty()) {
        task = task.priority(priority.parse()?);
    }
    Ok(task)
}

/// Create an epic and its initial tasks.
pub fn cmd_epic_add(
    db: &mut Database,
    config: &Config,
    name: String,
    week: Option<String>,
    desc: Option<String>,
    status: EpicStatus,
    tasks: Vec<String>,
) -> Result<()> {
    let Some(week) = week.or_else(|| config.weeks.first().cloned()) else {
        bail!("No week given and no weeks configured. Pass --week.");
    };
    let new_tasks = tasks
        .iter()
        .map(|s| parse_task_arg(s))
        .collect::<Result<Vec<_>>>()?;

    let mut epic = NewEpic::new(name, week.clone()).status(status);
    epic.description = desc;
    let epic_id = db.create_epic(epic)?;
    for t in new_tasks.iter().cloned() {
        db.create_task(epic_id, t)?;
    }

    let count = new_tasks.len();
    if count > 0 {
        println!(
            "Added epic {} for {} with {} task{}",
            epic_id,
            week,
            count,
            if count == 1 { "" } else { "s" }
        );
    } else {
        println!("Added epic {} for {}", epic_id, week);
    }
    Ok(())
}

/// List epics with progress, newest first.
pub fn cmd_epic_list(db: &Database, week: Option<String>) -> Result<()> {
    let metrics = collect_metrics(db, week.as_deref())?;
    if metrics.epic_details.is_empty() {
        println!("No epics found.");
        return Ok(());
    }
    println!(
        "{:<5} {:<12} {:<16} {:<16} {}",
        "ID", "Status", "Week", "Progress", "Name"
    );
    for d in &metrics.epic_details {
        let p = &d.progress;
        println!(
            "{:<5} {:<12} {:<16} {:<16} {}",
            d.id,
            format_epic_status(d.status),
            truncate(&d.week, 16),
            format!("{}/{} ({:.0}%)", p.completed, p.total, p.percentage),
            d.name
        );
    }
    Ok(())
}

/// Manually set an epic's status. No task-completion check is applied.
pub fn cmd_epic_status(db: &mut Database, id: u64, status: String) -> Result<()> {
    let status = set_epic_status_str(db, id, &status)?;
    println!("Epic {} is now {}", id, status);
    Ok(())
}

pub fn cmd_epic_delete(db: &mut Database, id: u64) -> Result<()> {
    let epic = db.get_epic(id)?;
    let tasks = db.list_tasks(id)?.len();
    db.delete_epic(id)?;
    println!("Deleted epic {} '{}' and {} task(s).", id, epic.name, tasks);
    Ok(())
}

pub fn cmd_task_add(
    db: &mut Database,
    epic_id: u64,
    title: String,
    desc: Option<String>,
    owner: Option<String>,
    priority: Priority,
) -> Result<()> {
    let mut task = NewTask::new(title).priority(priority);
    task.description = desc;
    task.owner = owner;
    let id = db.create_task(epic_id, task)?;
    println!("Added task {} to epic {}", id, epic_id);
    Ok(())
}

/// Set a task's status and report an automatic epic completion.
pub fn cmd_task_status(db: &mut Database, id: u64, status: TaskStatus) -> Result<()> {
    let promoted = set_task_status(db, id, status)?;
    println!("Task {} is now {}", id, status);
    if promoted {
        let epic_id = db.get_task(id)?.epic_id;
        let epic = db.get_epic(epic_id)?;
        println!("All tasks done: epic {} '{}' moved to Done.", epic.id, epic.name);
    }
    Ok(())
}

pub fn cmd_task_delete(db: &mut Database, id: u64) -> Result<()> {
    db.delete_task(id)?;
    println!("Deleted task {}", id);
    Ok(())
}

/// Print epic counts per week, including configured weeks with no epics.
pub fn cmd_weeks(db: &Database, config: &Config) -> Result<()> {
    let mut counts = db.epic_count_by_week()?;
    for w in &config.weeks {
        if !counts.iter().any(|(week, _)| week == w) {
            counts.push((w.clone(), 0));
        }
    }
    counts.sort();
    println!("{:<24} {}", "Week", "Epics");
    for (week, count) in counts {
        println!("{:<24} {}", truncate(&week, 24), count);
    }
    Ok(())
}

#[derive(Serialize)]
struct MetricsOutput<'a> {
    week: Option<&'a str>,
    overall_percentage: f64,
    metrics: &'a MetricsReport,
    recommendations: &'a [Recommendation],
}

/// Print summary metrics and recommendations.
pub fn cmd_metrics(db: &Database, week: Option<String>, format: OutputFormat) -> Result<()> {
    let metrics = collect_metrics(db, week.as_deref())?;
    let recs = recommend(&metrics);

    match format {
        OutputFormat::Json => {
            let out = MetricsOutput {
                week: week.as_deref(),
                overall_percentage: metrics.overall_percentage(),
                metrics: &metrics,
                recommendations: &recs,
            };
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
        OutputFormat::Text => {
            println!("Week:              {}", week.as_deref().unwrap_or("All weeks"));
            println!("Total epics:       {}", metrics.total_epics);
            println!("Completed epics:   {}", metrics.done);
            println!("Epics in progress: {}", metrics.in_progress);
            println!("Pending epics:     {}", metrics.pending);
            println!("Total tasks:       {}", metrics.total_tasks);
            println!("Completed tasks:   {}", metrics.completed_tasks);
            println!("Overall progress:  {:.1}%", metrics.overall_percentage());
            println!();
            println!("Recommendations:");
            for r in &recs {
                println!("  • {}", r);
            }
        }
    }
    Ok(())
}

/// Build, render and write a report. Returns the written path.
pub fn cmd_report(
    db: &Database,
    config: &Config,
    week: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<PathBuf> {
    let doc = ReportAssembler::new(db).build(week.as_deref(), None)?;
    let renderer = renderer_for(format);
    let bytes = renderer.render(&doc)?;

    let path = output.unwrap_or_else(|| {
        config
            .reports_dir()
            .join(format!("{}.{}", doc.id, renderer.extension()))
    });
    write_artifact(&path, &bytes)?;
    info!(path = %path.display(), bytes = bytes.len(), "wrote report");

    println!("Report written to {}", path.display());
    println!(
        "{} epic(s), {}/{} tasks done ({:.1}%)",
        doc.metrics.total_epics,
        doc.metrics.completed_tasks,
        doc.metrics.total_tasks,
        doc.metrics.overall_percentage()
    );
    Ok(path)
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Seed the demo roadmap. Refuses a non-empty database unless `force` is set.
pub fn cmd_seed(db: &mut Database, force: bool) -> Result<()> {
    if !db.epics.is_empty() && !force {
        bail!(
            "Database already holds {} epic(s). Pass --force to add the demo roadmap anyway.",
            db.epics.len()
        );
    }
    for epic in seed_sample_data(db)? {
        println!("Added epic {} '{}' with {} tasks", epic.id, epic.name, epic.tasks);
    }
    Ok(())
}

/// A report file found in the reports directory.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFile {
    pub path: PathBuf,
    pub bytes: u64,
    pub modified: SystemTime,
}

/// Collect `.txt` and `.json` reports, newest first.
pub fn list_reports(dir: &Path) -> Result<Vec<ReportFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut reports = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let is_report = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("txt") | Some("json")
        );
        if !is_report || !path.is_file() {
            continue;
        }
        let meta = entry.metadata()?;
        reports.push(ReportFile {
            path,
            bytes: meta.len(),
            modified: meta.modified()?,
        });
    }
    reports.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(reports)
}

/// Print the reports written so far with their sizes.
pub fn cmd_reports(config: &Config) -> Result<()> {
    let dir = config.reports_dir();
    let reports = list_reports(&dir)?;
    if reports.is_empty() {
        println!("No reports in {}", dir.display());
        return Ok(());
    }
    let total: u64 = reports.iter().map(|r| r.bytes).sum();
    println!("{:<44} {:>10} {}", "Report", "Size (KB)", "Modified");
    for r in &reports {
        let name = r.path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let modified: DateTime<Local> = r.modified.into();
        println!(
            "{:<44} {:>10.1} {}",
            truncate(name, 44),
            r.bytes as f64 / 1024.0,
            modified.format("%Y-%m-%d %H:%M")
        );
    }
    println!(
        "{} report(s), {:.1} KB total, {:.1} KB average",
        reports.len(),
        total as f64 / 1024.0,
        total as f64 / reports.len() as f64 / 1024.0
    );
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use clap::CommandFactory;
    use crate::cli::Cli;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
