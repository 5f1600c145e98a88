use std::fmt::Write as _;

use serde::Serialize;
use tessera_domain::Report;
use ts_rs::TS;

/// Structured report with a plain-text rendering.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/report-response.ts"
)]
pub struct ReportResponse {
    pub report_type: String,
    pub summary: String,
    #[ts(type = "unknown")]
    pub report: Report,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            report_type: report.kind().as_str().to_owned(),
            summary: render_summary(&report),
            report,
        }
    }
}

fn render_summary(report: &Report) -> String {
    match report {
        Report::PersonnelActivity(activity) => {
            let mut summary = format!(
                "{} personnel: {} active, {} inactive",
                activity.total, activity.active, activity.inactive
            );
            for (role, count) in &activity.by_role {
                let _ = write!(summary, "; {role}: {count}");
            }
            summary
        }
        Report::TaskCompletion(completion) => format!(
            "{} of {} tasks completed ({}%); {} pending, {} in progress",
            completion.completed,
            completion.total,
            completion.completion_rate_percent,
            completion.pending,
            completion.in_progress
        ),
        Report::AuthorizedPerformance(performance) => {
            if performance.entries.is_empty() {
                return "no owners or managers on record".to_owned();
            }

            performance
                .entries
                .iter()
                .map(|entry| {
                    format!(
                        "{} ({}): {} tasks created, {} completed, {} announcements",
                        entry.name,
                        entry.role.as_str(),
                        entry.tasks_created,
                        entry.tasks_completed,
                        entry.announcements_created
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use tessera_domain::{PersonnelActivityReport, Report, TaskCompletionReport};

    use super::render_summary;

    #[test]
    fn task_completion_summary_reads_naturally() {
        let report = Report::TaskCompletion(TaskCompletionReport {
            total: 4,
            pending: 1,
            in_progress: 1,
            completed: 2,
            completion_rate_percent: 50,
        });

        assert_eq!(
            render_summary(&report),
            "2 of 4 tasks completed (50%); 1 pending, 1 in progress"
        );
    }

    #[test]
    fn personnel_summary_lists_roles_in_order() {
        let report = Report::PersonnelActivity(PersonnelActivityReport {
            total: 3,
            active: 2,
            inactive: 1,
            by_role: BTreeMap::from([("employee".to_owned(), 2), ("owner".to_owned(), 1)]),
        });

        assert_eq!(
            render_summary(&report),
            "3 personnel: 2 active, 1 inactive; employee: 2; owner: 1"
        );
    }
}
