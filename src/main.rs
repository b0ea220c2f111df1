//! # Roadmap - Weekly Roadmap Tracker
//!
//! A command-line tracker for epics and their tasks, bucketed by calendar
//! week, with progress metrics, automatic epic completion and generated
//! reports.
//!
//! ## Key Features
//!
//! - **Epics and Tasks**: Epics carry a week label and a Pending / In Progress /
//!   Done status; tasks carry an owner, a priority and a Pending / Done status.
//! - **Auto-completion**: An epic moves to Done as soon as its last open task
//!   is marked done. Operators can still set any status by hand.
//! - **Metrics**: Per-status epic counts, task totals and per-epic progress,
//!   optionally restricted to one week.
//! - **Recommendations**: A small rule set flags pending backlogs, low overall
//!   progress and in-progress epics with nothing done.
//! - **Reports**: Structured report documents rendered as plain text or JSON.
//!
//! ## Quick Start
//!
//! ```bash
//! # Create an epic with two initial tasks
//! roadmap epic add "Checkout redesign" --week "Week 41 - 2025" \
//!     --task "Wireframes:ana:high" --task "Payment form"
//!
//! # Close a task; the epic completes itself when nothing is left
//! roadmap task done 1
//!
//! # Metrics and recommendations for one week
//! roadmap metrics --week "Week 41 - 2025"
//!
//! # Write a full report
//! roadmap report --format json
//!
//! # Try it out on a demo roadmap, then list the reports written so far
//! roadmap seed
//! roadmap reports
//! ```
//!
//! Data is stored locally in `~/.roadmap/roadmap.json`; settings are read from
//! `~/.roadmap/config.toml` when present.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod cli;
pub mod cmd;
pub mod config;
pub mod epic;
pub mod error;
pub mod fields;
pub mod metrics;
pub mod progress;
pub mod recommend;
pub mod render;
pub mod report;
pub mod sample;
pub mod store;
pub mod task;
pub mod transition;

#[cfg(test)]
mod fixtures;

use cli::Cli;
use cmd::*;
use config::Config;
use fields::TaskStatus;
use store::Database;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if cli.verbose => EnvFilter::new("debug"),
        Err(_) => EnvFilter::new("warn"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    if let Commands::Completions { shell } = cli.command {
        cmd_completions(shell);
        return Ok(());
    }

    let config = match cli.config.as_ref() {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load()?,
    };
    let db_path = cli.db.clone().unwrap_or_else(|| config.db_path());
    let mut db = Database::load(&db_path)
        .with_context(|| format!("Failed to load database {}", db_path.display()))?;
    tracing::debug!(db = %db_path.display(), epics = db.epics.len(), "database ready");

    match cli.command {
        Commands::Completions { .. } => unreachable!("completions handled above"),

        Commands::Epic { action } => match action {
            EpicAction::Add { name, week, desc, status, tasks } =>
                cmd_epic_add(&mut db, &config, name, week, desc, status, tasks),
            EpicAction::List { week } => cmd_epic_list(&db, week),
            EpicAction::Status { id, status } => cmd_epic_status(&mut db, id, status),
            EpicAction::Delete { id } => cmd_epic_delete(&mut db, id),
        },

        Commands::Task { action } => match action {
            TaskAction::Add { epic_id, title, desc, owner, priority } =>
                cmd_task_add(&mut db, epic_id, title, desc, owner, priority),
            TaskAction::Done { id } => cmd_task_status(&mut db, id, TaskStatus::Done),
            TaskAction::Reopen { id } => cmd_task_status(&mut db, id, TaskStatus::Pending),
            TaskAction::Delete { id } => cmd_task_delete(&mut db, id),
        },

        Commands::Weeks => cmd_weeks(&db, &config),

        Commands::Metrics { week, format } =>
            cmd_metrics(&db, week, format.unwrap_or(config.default_format)),

        Commands::Report { week, format, output } =>
            cmd_report(&db, &config, week, format.unwrap_or(config.default_format), output).map(|_| ()),

        Commands::Seed { force } => cmd_seed(&mut db, force),

        Commands::Reports => cmd_reports(&config),
    }
}
