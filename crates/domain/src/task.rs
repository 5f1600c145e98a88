use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId, NonEmptyString, Timestamp};

use crate::TaskId;

/// Progress state of a task. Any transition between states is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started.
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
}

impl TaskStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Returns all statuses in workflow order.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Pending, Self::InProgress, Self::Completed]
    }
}

impl FromStr for TaskStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(AppError::Validation(format!("unknown task status '{value}'"))),
        }
    }
}

/// Input for a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Caller-chosen id, unique within the company.
    pub id: TaskId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Work description.
    pub description: NonEmptyString,
    /// Priority, higher is more urgent.
    pub priority: u32,
    /// Member the task is assigned to.
    pub assignee: CallerIdentity,
    /// Member that created the task.
    pub created_by: CallerIdentity,
    /// Planned start.
    pub starts_at: Timestamp,
    /// Planned end.
    pub ends_at: Timestamp,
    /// Initial status.
    pub status: TaskStatus,
}

/// Company-scoped unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    company_id: CompanyId,
    description: NonEmptyString,
    priority: u32,
    assignee: CallerIdentity,
    created_by: CallerIdentity,
    starts_at: Timestamp,
    ends_at: Timestamp,
    status: TaskStatus,
}

impl Task {
    /// Creates a task after checking its schedule.
    pub fn new(draft: TaskDraft) -> AppResult<Self> {
        validate_schedule(draft.starts_at, draft.ends_at)?;

        Ok(Self {
            id: draft.id,
            company_id: draft.company_id,
            description: draft.description,
            priority: draft.priority,
            assignee: draft.assignee,
            created_by: draft.created_by,
            starts_at: draft.starts_at,
            ends_at: draft.ends_at,
            status: draft.status,
        })
    }

    /// Returns the task id.
    #[must_use]
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Returns the owning company.
    #[must_use]
    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &NonEmptyString {
        &self.description
    }

    /// Returns the priority.
    #[must_use]
    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Returns the assignee identity.
    #[must_use]
    pub fn assignee(&self) -> &CallerIdentity {
        &self.assignee
    }

    /// Returns the creator identity.
    #[must_use]
    pub fn created_by(&self) -> &CallerIdentity {
        &self.created_by
    }

    /// Returns the planned start.
    #[must_use]
    pub fn starts_at(&self) -> Timestamp {
        self.starts_at
    }

    /// Returns the planned end.
    #[must_use]
    pub fn ends_at(&self) -> Timestamp {
        self.ends_at
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Applies an edit of the mutable fields.
    pub fn update(&mut self, description: NonEmptyString, priority: u32, status: TaskStatus) {
        self.description = description;
        self.priority = priority;
        self.status = status;
    }
}

fn validate_schedule(starts_at: Timestamp, ends_at: Timestamp) -> AppResult<()> {
    if starts_at > ends_at {
        return Err(AppError::Validation(
            "task end must not be before its start".to_owned(),
        ));
    }

    Ok(())
}
