//! Report assembly.
//!
//! Turns the current roadmap into a [`ReportDocument`]: an ordered list of
//! typed sections plus the [`MetricsReport`] the sections were built from.
//! Charts are delegated to a [`ChartSource`], which receives only the metrics
//! and returns data series. Layout and pixels belong to the renderer.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RoadmapResult;
use crate::fields::*;
use crate::metrics::{collect_metrics, EpicDetail, MetricsReport};
use crate::recommend::recommend;
use crate::store::RoadmapStore;
use crate::task::Task;

pub const REPORT_TITLE: &str = "Weekly Roadmap Report";
pub const ID_PREFIX: &str = "roadmap_report_";
const TASK_TITLE_WIDTH: usize = 40;
const CHART_LABEL_WIDTH: usize = 30;

/// A finished report and the metrics it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    /// Artifact name, timestamp-derived unless the caller chose one.
    pub id: String,
    pub generated_at: NaiveDateTime,
    pub week_filter: Option<String>,
    pub sections: Vec<Section>,
    pub metrics: MetricsReport,
}

/// One block of a report, in display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "kebab-case")]
pub enum Section {
    Title {
        title: String,
        generated_at: String,
        filter: Option<String>,
    },
    Heading {
        level: u8,
        text: String,
    },
    Table {
        header: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    /// Placeholder for a chart, carrying only the data to plot.
    Chart(Chart),
    Text {
        text: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Pie,
    Bar,
    HorizontalBar,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub title: String,
    pub points: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

/// Chart collaborator: decides which charts a report carries.
pub trait ChartSource {
    fn charts(&self, metrics: &MetricsReport) -> Vec<Chart>;
}

/// Epic status distribution, task progress per week and per epic.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCharts;

impl ChartSource for StandardCharts {
    fn charts(&self, metrics: &MetricsReport) -> Vec<Chart> {
        let mut charts = vec![
            Chart {
                kind: ChartKind::Pie,
                title: "Epics by status".into(),
                points: EpicStatus::ALL
                    .iter()
                    .map(|&s| ChartPoint {
                        label: format_epic_status(s).into(),
                        value: metrics.count_for(s) as f64,
                    })
                    .collect(),
            },
            Chart {
                kind: ChartKind::Bar,
                title: "Task progress by week (%)".into(),
                points: metrics
                    .week_progress()
                    .into_iter()
                    .map(|w| ChartPoint { label: w.week, value: w.progress.percentage })
                    .collect(),
            },
        ];
        if !metrics.epic_details.is_empty() {
            charts.push(Chart {
                kind: ChartKind::HorizontalBar,
                title: "Progress by epic (%)".into(),
                points: metrics
                    .epic_details
                    .iter()
                    .map(|d| ChartPoint {
                        label: truncate(&d.name, CHART_LABEL_WIDTH),
                        value: d.progress.percentage,
                    })
                    .collect(),
            });
        }
        charts
    }
}

/// Builds report documents from a store.
pub struct ReportAssembler<'a, S: RoadmapStore + ?Sized, C: ChartSource = StandardCharts> {
    store: &'a S,
    charts: C,
}

impl<'a, S: RoadmapStore + ?Sized> ReportAssembler<'a, S, StandardCharts> {
    pub fn new(store: &'a S) -> Self {
        ReportAssembler { store, charts: StandardCharts }
    }
}

impl<'a, S: RoadmapStore + ?Sized, C: ChartSource> ReportAssembler<'a, S, C> {
    pub fn with_charts(store: &'a S, charts: C) -> Self {
        ReportAssembler { store, charts }
    }

    /// Build a report stamped with the current local time.
    pub fn build(&self, week_filter: Option<&str>, artifact_id: Option<&str>) -> RoadmapResult<ReportDocument> {
        self.build_at(week_filter, artifact_id, Local::now().naive_local())
    }

    /// Build a report as of `now`. Without `artifact_id`, the id is derived
    /// from `now` at one-second resolution, so two builds in the same second
    /// share an id.
    pub fn build_at(
        &self,
        week_filter: Option<&str>,
        artifact_id: Option<&str>,
        now: NaiveDateTime,
    ) -> RoadmapResult<ReportDocument> {
        let metrics = collect_metrics(self.store, week_filter)?;
        let id = artifact_id.map(str::to_string).unwrap_or_else(|| default_artifact_id(now));

        let mut sections = vec![Section::Title {
            title: REPORT_TITLE.into(),
            generated_at: now.format("%Y-%m-%d %H:%M").to_string(),
            filter: week_filter.map(str::to_string),
        }];

        sections.push(heading(2, "Executive Summary"));
        sections.push(summary_table(&metrics));

        sections.push(heading(2, "Visual Analysis"));
        sections.extend(self.charts.charts(&metrics).into_iter().map(Section::Chart));

        sections.push(heading(2, "Epic Details"));
        for detail in &metrics.epic_details {
            let tasks = self.store.list_tasks(detail.id)?;
            sections.extend(epic_sections(detail, &tasks));
        }

        sections.push(heading(2, "Recommendations"));
        sections.extend(recommend(&metrics).into_iter().map(|text| Section::Text { text }));

        sections.push(Section::Text {
            text: "Generated automatically by the weekly roadmap tracker".into(),
        });

        info!(id = %id, epics = metrics.total_epics, sections = sections.len(), "built report");
        Ok(ReportDocument {
            id,
            generated_at: now,
            week_filter: week_filter.map(str::to_string),
            sections,
            metrics,
        })
    }
}

/// `roadmap_report_YYYYmmdd_HHMMSS`.
pub fn default_artifact_id(now: NaiveDateTime) -> String {
    format!("{}{}", ID_PREFIX, now.format("%Y%m%d_%H%M%S"))
}

fn heading(level: u8, text: &str) -> Section {
    Section::Heading { level, text: text.into() }
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

fn summary_table(m: &MetricsReport) -> Section {
    Section::Table {
        header: row(&["Metric", "Value"]),
        rows: vec![
            row(&["Total epics", &m.total_epics.to_string()]),
            row(&["Completed epics", &m.done.to_string()]),
            row(&["Epics in progress", &m.in_progress.to_string()]),
            row(&["Pending epics", &m.pending.to_string()]),
            row(&["Total tasks", &m.total_tasks.to_string()]),
            row(&["Completed tasks", &m.completed_tasks.to_string()]),
            row(&["Overall progress", &format!("{:.1}%", m.overall_percentage())]),
        ],
    }
}

fn epic_sections(detail: &EpicDetail, tasks: &[Task]) -> Vec<Section> {
    let p = &detail.progress;
    let mut out = vec![
        heading(3, &format!("{} ({})", detail.name, format_epic_status(detail.status))),
        Section::Table {
            header: row(&["Field", "Value"]),
            rows: vec![
                row(&["Week", &detail.week]),
                row(&["Status", format_epic_status(detail.status)]),
                row(&["Description", detail.description.as_deref().unwrap_or("No description")]),
                row(&["Task progress", &format!("{}/{} ({:.1}%)", p.completed, p.total, p.percentage)]),
            ],
        },
    ];
    if !tasks.is_empty() {
        out.push(heading(4, "Tasks"));
        out.push(Section::Table {
            header: row(&["Task", "Owner", "Priority", "Done"]),
            rows: tasks
                .iter()
                .map(|t| {
                    vec![
                        truncate(&t.title, TASK_TITLE_WIDTH),
                        t.owner.clone().unwrap_or_else(|| "Unassigned".into()),
                        format_priority(t.priority).into(),
                        (if t.is_done() { "✅" } else { "⏳" }).to_string(),
                    ]
                })
                .collect(),
        });
    }
    out
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(width - 1).collect();
    out.push('…');
    out
}
