//! Rule-based recommendations over a [`MetricsReport`].
//!
//! Rules are an ordered table of predicate/message pairs. Every matching rule
//! contributes its message; the fallback is emitted only when none match.

use tracing::debug;

use crate::metrics::MetricsReport;

/// Advisory text produced by one rule.
pub type Recommendation = String;

/// A single recommendation rule.
pub struct Rule {
    pub name: &'static str,
    /// Returns the message when the rule applies.
    pub check: fn(&MetricsReport) -> Option<Recommendation>,
}

pub const FALLBACK: &str = "The project is on track. Continue with the current plan";

pub const RULES: &[Rule] = &[
    Rule { name: "pending-backlog", check: pending_backlog },
    Rule { name: "low-progress", check: low_progress },
    Rule { name: "stalled-epics", check: stalled_epics },
];

fn pending_backlog(m: &MetricsReport) -> Option<Recommendation> {
    (m.pending > m.in_progress)
        .then(|| "Consider moving more epics to In Progress to speed up delivery".to_string())
}

// Silent when there are no tasks at all.
fn low_progress(m: &MetricsReport) -> Option<Recommendation> {
    (m.total_tasks > 0 && m.overall_percentage() < 50.0)
        .then(|| "Overall progress is below 50%. Review resources and priorities".to_string())
}

fn stalled_epics(m: &MetricsReport) -> Option<Recommendation> {
    match m.stalled_epics().count() {
        0 => None,
        1 => Some("1 in-progress epic has no completed tasks. Check for blockers".to_string()),
        n => Some(format!("{} in-progress epics have no completed tasks. Check for blockers", n)),
    }
}

/// Evaluate `rules` in order against `report`.
pub fn recommend_with(rules: &[Rule], report: &MetricsReport) -> Vec<Recommendation> {
    let mut out: Vec<Recommendation> = rules
        .iter()
        .filter_map(|r| {
            let msg = (r.check)(report)?;
            debug!(rule = r.name, "recommendation rule fired");
            Some(msg)
        })
        .collect();
    if out.is_empty() {
        out.push(FALLBACK.to_string());
    }
    out
}

/// Evaluate the standard rule set. Never returns an empty list.
pub fn recommend(report: &MetricsReport) -> Vec<Recommendation> {
    recommend_with(RULES, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::EpicStatus;
    use crate::fixtures::*;
    use crate::metrics::{collect_metrics, EpicDetail};
    use crate::progress::ProgressSnapshot;

    fn detail(id: u64, status: EpicStatus, completed: usize, total: usize) -> EpicDetail {
        EpicDetail {
            id,
            name: format!("epic {}", id),
            description: None,
            week: WEEK_40.to_string(),
            status,
            progress: ProgressSnapshot::from_counts(completed, total),
        }
    }

    fn report(details: Vec<EpicDetail>) -> MetricsReport {
        let mut m = MetricsReport::default();
        for d in &details {
            m.total_epics += 1;
            match d.status {
                EpicStatus::Pending => m.pending += 1,
                EpicStatus::InProgress => m.in_progress += 1,
                EpicStatus::Done => m.done += 1,
            }
            m.total_tasks += d.progress.total;
            m.completed_tasks += d.progress.completed;
        }
        m.epic_details = details;
        m
    }

    #[test]
    fn test_empty_report_gets_only_fallback() {
        assert_eq!(recommend(&MetricsReport::default()), vec![FALLBACK.to_string()]);
    }

    #[test]
    fn test_unmatched_week_gets_only_fallback() {
        let (db, _) = scenario_db();
        let m = collect_metrics(&db, Some("Week 52 - 2025")).unwrap();
        assert_eq!(m.total_epics, 0);
        assert_eq!(recommend(&m), vec![FALLBACK.to_string()]);
    }

    #[test]
    fn test_scenario_is_on_track() {
        // 1 pending vs 2 in progress, 75% done, no stalled epics.
        let (db, _) = scenario_db();
        let m = collect_metrics(&db, None).unwrap();
        assert_eq!(recommend(&m), vec![FALLBACK.to_string()]);
    }

    #[test]
    fn test_all_rules_fire_in_order() {
        let m = report(vec![
            detail(1, EpicStatus::Pending, 0, 2),
            detail(2, EpicStatus::Pending, 0, 2),
            detail(3, EpicStatus::Pending, 0, 0),
            detail(4, EpicStatus::InProgress, 0, 3),
            detail(5, EpicStatus::InProgress, 0, 1),
        ]);
        let recs = recommend(&m);
        assert_eq!(recs.len(), 3);
        assert!(recs[0].contains("In Progress"));
        assert!(recs[1].contains("below 50%"));
        assert!(recs[2].starts_with("2 in-progress epics"));
        assert!(!recs.contains(&FALLBACK.to_string()));
    }

    #[test]
    fn test_stalled_message_counts_not_lists() {
        let m = report(vec![
            detail(1, EpicStatus::InProgress, 0, 4),
            detail(2, EpicStatus::Done, 10, 10),
        ]);
        let recs = recommend(&m);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0], "1 in-progress epic has no completed tasks. Check for blockers");
    }

    #[test]
    fn test_exactly_fifty_percent_does_not_fire() {
        let m = report(vec![detail(1, EpicStatus::InProgress, 1, 2)]);
        assert_eq!(recommend(&m), vec![FALLBACK.to_string()]);
    }

    #[test]
    fn test_fallback_iff_no_rule_matches() {
        let cases = vec![
            report(vec![]),
            report(vec![detail(1, EpicStatus::Pending, 0, 0)]),
            report(vec![detail(1, EpicStatus::InProgress, 0, 0)]),
            report(vec![detail(1, EpicStatus::Done, 1, 3)]),
            report(vec![detail(1, EpicStatus::Done, 3, 3)]),
        ];
        for m in cases {
            let recs = recommend(&m);
            assert!(!recs.is_empty());
            let fired = RULES.iter().any(|r| (r.check)(&m).is_some());
            assert_eq!(recs == vec![FALLBACK.to_string()], !fired);
        }
    }

    #[test]
    fn test_custom_rule_table() {
        fn always(_: &MetricsReport) -> Option<Recommendation> {
            Some("ship it".to_string())
        }
        let rules = [Rule { name: "always", check: always }];
        assert_eq!(recommend_with(&rules, &MetricsReport::default()), vec!["ship it".to_string()]);
        assert_eq!(recommend_with(&[], &MetricsReport::default()), vec![FALLBACK.to_string()]);
    }
}
