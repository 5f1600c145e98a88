use serde::{Deserialize, Serialize};
use tessera_application::{NewAnnouncement, NewTask, TaskUpdate};
use tessera_core::{AppError, CallerIdentity, NonEmptyString, Timestamp};
use tessera_domain::{Announcement, AnnouncementId, Task, TaskId, TaskStatus};
use ts_rs::TS;

use super::parse_role;

/// Incoming payload for task creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-task-request.ts"
)]
pub struct CreateTaskRequest {
    pub id: String,
    pub description: String,
    pub priority: u32,
    pub assignee: String,
    pub starts_at: i64,
    pub ends_at: i64,
    pub status: Option<String>,
}

impl TryFrom<CreateTaskRequest> for NewTask {
    type Error = AppError;

    fn try_from(value: CreateTaskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: TaskId::new(value.id)?,
            description: NonEmptyString::new(value.description.trim())?,
            priority: value.priority,
            assignee: CallerIdentity::new(value.assignee)?,
            starts_at: Timestamp::from_nanos(value.starts_at),
            ends_at: Timestamp::from_nanos(value.ends_at),
            status: value
                .status
                .as_deref()
                .map(str::parse::<TaskStatus>)
                .transpose()?
                .unwrap_or(TaskStatus::Pending),
        })
    }
}

/// Incoming payload for task edits.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-task-request.ts"
)]
pub struct UpdateTaskRequest {
    pub description: String,
    pub priority: u32,
    pub status: String,
}

impl TryFrom<UpdateTaskRequest> for TaskUpdate {
    type Error = AppError;

    fn try_from(value: UpdateTaskRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            description: NonEmptyString::new(value.description.trim())?,
            priority: value.priority,
            status: value.status.parse()?,
        })
    }
}

/// API representation of a task.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/task-response.ts"
)]
pub struct TaskResponse {
    pub id: String,
    pub company_id: String,
    pub description: String,
    pub priority: u32,
    pub assignee: String,
    pub created_by: String,
    pub starts_at: i64,
    pub ends_at: i64,
    pub status: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id().as_str().to_owned(),
            company_id: task.company_id().as_str().to_owned(),
            description: task.description().as_str().to_owned(),
            priority: task.priority(),
            assignee: task.assignee().as_str().to_owned(),
            created_by: task.created_by().as_str().to_owned(),
            starts_at: task.starts_at().as_nanos(),
            ends_at: task.ends_at().as_nanos(),
            status: task.status().as_str().to_owned(),
        }
    }
}

/// Query string for task listings.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
}

/// Incoming payload for announcement creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-announcement-request.ts"
)]
pub struct CreateAnnouncementRequest {
    pub id: String,
    pub content: String,
    pub target_role: Option<String>,
}

impl TryFrom<CreateAnnouncementRequest> for NewAnnouncement {
    type Error = AppError;

    fn try_from(value: CreateAnnouncementRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AnnouncementId::new(value.id)?,
            content: NonEmptyString::new(value.content.trim())?,
            target_role: value.target_role.as_deref().map(parse_role).transpose()?,
        })
    }
}

/// API representation of an announcement.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/announcement-response.ts"
)]
pub struct AnnouncementResponse {
    pub id: String,
    pub company_id: String,
    pub content: String,
    pub target_role: Option<String>,
    pub created_at: i64,
    pub created_by: String,
}

impl From<Announcement> for AnnouncementResponse {
    fn from(announcement: Announcement) -> Self {
        Self {
            id: announcement.id.as_str().to_owned(),
            company_id: announcement.company_id.as_str().to_owned(),
            content: announcement.content.as_str().to_owned(),
            target_role: announcement
                .target_role
                .map(|role| role.as_str().to_owned()),
            created_at: announcement.created_at.as_nanos(),
            created_by: announcement.created_by.as_str().to_owned(),
        }
    }
}

/// Query string for announcement listings.
#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementListQuery {
    #[serde(default)]
    pub visible_only: bool,
}
