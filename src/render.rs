//! Renderers turning a [`ReportDocument`] into bytes.

use std::fmt::Write;

use crate::error::{RoadmapError, RoadmapResult};
use crate::fields::OutputFormat;
use crate::report::{Chart, ReportDocument, Section};

/// Rendering collaborator for report documents.
pub trait ReportRenderer {
    fn render(&self, doc: &ReportDocument) -> RoadmapResult<Vec<u8>>;

    /// File extension of the produced artifact, without the dot.
    fn extension(&self) -> &'static str;
}

/// Plain-text report with fixed-width tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

/// Pretty-printed JSON of the whole document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

/// Pick the renderer for an output format.
pub fn renderer_for(format: OutputFormat) -> Box<dyn ReportRenderer> {
    match format {
        OutputFormat::Text => Box::new(TextRenderer),
        OutputFormat::Json => Box::new(JsonRenderer),
    }
}

impl ReportRenderer for JsonRenderer {
    fn render(&self, doc: &ReportDocument) -> RoadmapResult<Vec<u8>> {
        serde_json::to_vec_pretty(doc).map_err(|e| RoadmapError::Render(e.to_string()))
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

impl ReportRenderer for TextRenderer {
    fn render(&self, doc: &ReportDocument) -> RoadmapResult<Vec<u8>> {
        let mut out = String::new();
        for section in &doc.sections {
            write_section(&mut out, section).map_err(|e| RoadmapError::Render(e.to_string()))?;
        }
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

fn write_section(out: &mut String, section: &Section) -> std::fmt::Result {
    match section {
        Section::Title { title, generated_at, filter } => {
            writeln!(out, "{}", title.to_uppercase())?;
            writeln!(out, "{}", "=".repeat(title.chars().count()))?;
            writeln!(out, "Generated: {}", generated_at)?;
            if let Some(f) = filter {
                writeln!(out, "Filtered by: {}", f)?;
            }
        }
        Section::Heading { level, text } => {
            writeln!(out)?;
            match *level {
                0..=2 => {
                    writeln!(out, "{}", text)?;
                    writeln!(out, "{}", "-".repeat(text.chars().count()))?;
                }
                _ => writeln!(out, "{} {}", "#".repeat(*level as usize), text)?,
            }
        }
        Section::Table { header, rows } => write_table(out, header, rows)?,
        Section::Chart(chart) => write_chart(out, chart)?,
        Section::Text { text } => writeln!(out, "• {}", text)?,
    }
    Ok(())
}

fn write_table(out: &mut String, header: &[String], rows: &[Vec<String>]) -> std::fmt::Result {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate() {
            let w = cell.chars().count();
            match widths.get_mut(i) {
                Some(cur) => *cur = (*cur).max(w),
                None => widths.push(w),
            }
        }
    }
    let line = |out: &mut String, cells: &[String]| -> std::fmt::Result {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
            .collect();
        writeln!(out, "{}", padded.join("  ").trim_end())
    };
    line(out, header)?;
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    writeln!(out, "{}", rule.join("  "))?;
    for r in rows {
        line(out, r.as_slice())?;
    }
    Ok(())
}

fn write_chart(out: &mut String, chart: &Chart) -> std::fmt::Result {
    writeln!(out, "[chart: {}]", chart.title)?;
    if chart.points.is_empty() {
        writeln!(out, "  (no data)")?;
    }
    for p in &chart.points {
        writeln!(out, "  {:<30} {:>6.1}", p.label, p.value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use crate::report::ReportAssembler;
    use chrono::NaiveDate;

    fn doc() -> ReportDocument {
        let (db, _) = scenario_db();
        let at = NaiveDate::from_ymd_opt(2025, 10, 6)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        ReportAssembler::new(&db).build_at(Some(WEEK_40), None, at).unwrap()
    }

    #[test]
    fn test_text_render_contains_sections() {
        let bytes = TextRenderer.render(&doc()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("WEEKLY ROADMAP REPORT\n"));
        assert!(text.contains("Generated: 2025-10-06 08:00"));
        assert!(text.contains("Filtered by: Week 40 - 2025"));
        assert!(text.contains("Overall progress   50.0%"));
        assert!(text.contains("### Payments (In Progress)"));
        assert!(text.contains("[chart: Epics by status]"));
        assert!(text.contains("• "));
    }

    #[test]
    fn test_json_render_round_trips() {
        let d = doc();
        let bytes = JsonRenderer.render(&d).unwrap();
        let back: ReportDocument = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_renderer_for_format() {
        assert_eq!(renderer_for(OutputFormat::Text).extension(), "txt");
        assert_eq!(renderer_for(OutputFormat::Json).extension(), "json");
    }
}
