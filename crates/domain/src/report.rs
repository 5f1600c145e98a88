use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, CallerIdentity, CompanyId};

use crate::{Announcement, CompanyRole, Member, Task, TaskStatus};

/// Report families exposed under their stable type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Personnel headcount and activity.
    PersonnelActivity,
    /// Task completion ratios.
    TaskCompletion,
    /// Output of owners and managers.
    AuthorizedPerformance,
}

impl ReportKind {
    /// Returns the stable report type string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonnelActivity => "personel_aktivite",
            Self::TaskCompletion => "gorev_tamamlanma",
            Self::AuthorizedPerformance => "yetkili_performans",
        }
    }

    /// Returns all report kinds.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[
            Self::PersonnelActivity,
            Self::TaskCompletion,
            Self::AuthorizedPerformance,
        ]
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown report type '{value}'")))
    }
}

/// Headcount over personnel records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonnelActivityReport {
    /// All personnel records.
    pub total: usize,
    /// Active records.
    pub active: usize,
    /// Inactive records.
    pub inactive: usize,
    /// Records per role storage value.
    pub by_role: BTreeMap<String, usize>,
}

/// Completion ratio over tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCompletionReport {
    /// All tasks.
    pub total: usize,
    /// Pending tasks.
    pub pending: usize,
    /// In-progress tasks.
    pub in_progress: usize,
    /// Completed tasks.
    pub completed: usize,
    /// Completed share rounded down to whole percent; zero without tasks.
    pub completion_rate_percent: u8,
}

/// Output of one owner or manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedPerformanceEntry {
    /// Member identity.
    pub identity: CallerIdentity,
    /// Display name.
    pub name: String,
    /// Company role.
    pub role: CompanyRole,
    /// Tasks created by the member.
    pub tasks_created: usize,
    /// Created tasks that are completed.
    pub tasks_completed: usize,
    /// Announcements published by the member.
    pub announcements_created: usize,
}

/// Output of all owners and managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedPerformanceReport {
    /// One entry per owner or manager with a personnel record.
    pub entries: Vec<AuthorizedPerformanceEntry>,
}

/// Structured read-only aggregate for one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Report {
    /// See [`PersonnelActivityReport`].
    PersonnelActivity(PersonnelActivityReport),
    /// See [`TaskCompletionReport`].
    TaskCompletion(TaskCompletionReport),
    /// See [`AuthorizedPerformanceReport`].
    AuthorizedPerformance(AuthorizedPerformanceReport),
}

impl Report {
    /// Computes a report of `kind` over one company's records.
    ///
    /// Records from other companies are ignored.
    #[must_use]
    pub fn build(
        kind: ReportKind,
        company_id: &CompanyId,
        members: &[Member],
        tasks: &[Task],
        announcements: &[Announcement],
    ) -> Self {
        let personnel: Vec<&Member> = members
            .iter()
            .filter(|member| member.company_id() == company_id && member.personnel_id().is_some())
            .collect();
        let tasks: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.company_id() == company_id)
            .collect();
        let announcements: Vec<&Announcement> = announcements
            .iter()
            .filter(|announcement| &announcement.company_id == company_id)
            .collect();

        match kind {
            ReportKind::PersonnelActivity => Self::PersonnelActivity(personnel_activity(&personnel)),
            ReportKind::TaskCompletion => Self::TaskCompletion(task_completion(&tasks)),
            ReportKind::AuthorizedPerformance => Self::AuthorizedPerformance(
                authorized_performance(&personnel, &tasks, &announcements),
            ),
        }
    }

    /// Returns the kind of this report.
    #[must_use]
    pub fn kind(&self) -> ReportKind {
        match self {
            Self::PersonnelActivity(_) => ReportKind::PersonnelActivity,
            Self::TaskCompletion(_) => ReportKind::TaskCompletion,
            Self::AuthorizedPerformance(_) => ReportKind::AuthorizedPerformance,
        }
    }
}

fn personnel_activity(personnel: &[&Member]) -> PersonnelActivityReport {
    let active = personnel.iter().filter(|member| member.is_active()).count();
    let mut by_role = BTreeMap::new();
    for member in personnel {
        *by_role.entry(member.role().as_str().to_owned()).or_insert(0) += 1;
    }

    PersonnelActivityReport {
        total: personnel.len(),
        active,
        inactive: personnel.len() - active,
        by_role,
    }
}

fn task_completion(tasks: &[&Task]) -> TaskCompletionReport {
    let count = |status: TaskStatus| tasks.iter().filter(|task| task.status() == status).count();
    let completed = count(TaskStatus::Completed);
    let completion_rate_percent = if tasks.is_empty() {
        0
    } else {
        u8::try_from(completed * 100 / tasks.len()).unwrap_or(100)
    };

    TaskCompletionReport {
        total: tasks.len(),
        pending: count(TaskStatus::Pending),
        in_progress: count(TaskStatus::InProgress),
        completed,
        completion_rate_percent,
    }
}

fn authorized_performance(
    personnel: &[&Member],
    tasks: &[&Task],
    announcements: &[&Announcement],
) -> AuthorizedPerformanceReport {
    let entries = personnel
        .iter()
        .filter(|member| matches!(member.role(), CompanyRole::Owner | CompanyRole::Manager))
        .map(|member| {
            let created: Vec<&&Task> = tasks
                .iter()
                .filter(|task| task.created_by() == member.identity())
                .collect();
            AuthorizedPerformanceEntry {
                identity: member.identity().clone(),
                name: member.name().as_str().to_owned(),
                role: member.role(),
                tasks_created: created.len(),
                tasks_completed: created
                    .iter()
                    .filter(|task| task.status() == TaskStatus::Completed)
                    .count(),
                announcements_created: announcements
                    .iter()
                    .filter(|announcement| &announcement.created_by == member.identity())
                    .count(),
            }
        })
        .collect();

    AuthorizedPerformanceReport { entries }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tessera_core::{CallerIdentity, CompanyId, NonEmptyString, Timestamp};

    use super::{Report, ReportKind};
    use crate::{CompanyRole, Member, PersonnelId, Task, TaskDraft, TaskId, TaskStatus};

    fn company(value: &str) -> CompanyId {
        CompanyId::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn identity(value: &str) -> CallerIdentity {
        CallerIdentity::new(value).unwrap_or_else(|_| unreachable!())
    }

    fn member(name: &str, company_id: &str, role: CompanyRole, active: bool) -> Member {
        let mut member = Member::new(
            identity(name),
            company(company_id),
            NonEmptyString::new(name).unwrap_or_else(|_| unreachable!()),
            role,
        )
        .with_personnel_id(PersonnelId::generate());
        member.set_active(active);
        member
    }

    fn task(id: &str, company_id: &str, creator: &str, status: TaskStatus) -> Task {
        Task::new(TaskDraft {
            id: TaskId::new(id).unwrap_or_else(|_| unreachable!()),
            company_id: company(company_id),
            description: NonEmptyString::new("work").unwrap_or_else(|_| unreachable!()),
            priority: 1,
            assignee: identity("bob"),
            created_by: identity(creator),
            starts_at: Timestamp::from_nanos(0),
            ends_at: Timestamp::from_nanos(1),
            status,
        })
        .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn report_type_strings_parse() {
        assert_eq!(
            ReportKind::from_str("gorev_tamamlanma"),
            Ok(ReportKind::TaskCompletion)
        );
        assert!(ReportKind::from_str("sales").is_err());
    }

    #[test]
    fn personnel_activity_counts_only_own_company() {
        let members = vec![
            member("alice", "acme", CompanyRole::Owner, true),
            member("bob", "acme", CompanyRole::Employee, false),
            member("eve", "other", CompanyRole::Employee, true),
        ];

        let report = Report::build(ReportKind::PersonnelActivity, &company("acme"), &members, &[], &[]);
        let Report::PersonnelActivity(activity) = report else {
            panic!("unexpected report kind");
        };
        assert_eq!(activity.total, 2);
        assert_eq!(activity.active, 1);
        assert_eq!(activity.inactive, 1);
        assert_eq!(activity.by_role.get("employee"), Some(&1));
    }

    #[test]
    fn task_completion_rate_rounds_down() {
        let tasks = vec![
            task("t1", "acme", "alice", TaskStatus::Completed),
            task("t2", "acme", "alice", TaskStatus::Pending),
            task("t3", "acme", "alice", TaskStatus::InProgress),
            task("t4", "other", "eve", TaskStatus::Completed),
        ];

        let report = Report::build(ReportKind::TaskCompletion, &company("acme"), &[], &tasks, &[]);
        let Report::TaskCompletion(completion) = report else {
            panic!("unexpected report kind");
        };
        assert_eq!(completion.total, 3);
        assert_eq!(completion.completed, 1);
        assert_eq!(completion.completion_rate_percent, 33);
    }

    #[test]
    fn authorized_performance_skips_employees() {
        let members = vec![
            member("alice", "acme", CompanyRole::Owner, true),
            member("bob", "acme", CompanyRole::Employee, true),
        ];
        let tasks = vec![task("t1", "acme", "alice", TaskStatus::Completed)];

        let report = Report::build(
            ReportKind::AuthorizedPerformance,
            &company("acme"),
            &members,
            &tasks,
            &[],
        );
        let Report::AuthorizedPerformance(performance) = report else {
            panic!("unexpected report kind");
        };
        assert_eq!(performance.entries.len(), 1);
        assert_eq!(performance.entries[0].tasks_completed, 1);
    }
}
