use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId, NonEmptyString, Timestamp};
use tessera_domain::{
    Announcement, AnnouncementId, Capability, CapabilitySet, Company, CompanyRole, InviteCode,
    InviteCodeHash, InviteState, Member, PersonnelId, Task, TaskDraft, TaskId, TaskStatus,
};

/// Wraps a decoding failure of a stored row as an internal error.
pub(super) fn decode<T>(what: &str, result: AppResult<T>) -> AppResult<T> {
    result.map_err(|error| AppError::Internal(format!("failed to decode stored {what}: {error}")))
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CompanyRow {
    company_id: String,
    name: String,
    registered_by: String,
    registered_at: i64,
}

impl TryFrom<CompanyRow> for Company {
    type Error = AppError;

    fn try_from(row: CompanyRow) -> AppResult<Self> {
        Ok(Self::new(
            CompanyId::new(row.company_id)?,
            NonEmptyString::new(row.name)?,
            CallerIdentity::new(row.registered_by)?,
            Timestamp::from_nanos(row.registered_at),
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct MemberRow {
    identity: String,
    company_id: String,
    personnel_id: Option<String>,
    name: String,
    role: String,
    permissions: Vec<String>,
    active: bool,
}

impl TryFrom<MemberRow> for Member {
    type Error = AppError;

    fn try_from(row: MemberRow) -> AppResult<Self> {
        let permissions = row
            .permissions
            .iter()
            .map(|permission| permission.parse::<Capability>())
            .collect::<AppResult<Vec<_>>>()?;

        Ok(Self::restore(
            CallerIdentity::new(row.identity)?,
            CompanyId::new(row.company_id)?,
            row.personnel_id.map(PersonnelId::new).transpose()?,
            NonEmptyString::new(row.name)?,
            row.role.parse()?,
            CapabilitySet::from_capabilities(permissions),
            row.active,
        ))
    }
}

/// Column encoding of a capability set.
pub(super) fn permission_names(permissions: &CapabilitySet) -> Vec<String> {
    permissions
        .granted()
        .into_iter()
        .map(|capability| capability.as_str().to_owned())
        .collect()
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct InviteRow {
    code_hash: String,
    company_id: String,
    target_role: String,
    issued_by: String,
    issued_at: i64,
    expires_at: i64,
    state: String,
    consumed_by: Option<String>,
    state_changed_at: Option<i64>,
}

impl TryFrom<InviteRow> for InviteCode {
    type Error = AppError;

    fn try_from(row: InviteRow) -> AppResult<Self> {
        let changed_at = || {
            row.state_changed_at.map(Timestamp::from_nanos).ok_or_else(|| {
                AppError::Validation("terminal invite state without a timestamp".to_owned())
            })
        };

        let state = match row.state.as_str() {
            "active" => InviteState::Active,
            "consumed" => InviteState::Consumed {
                consumed_by: CallerIdentity::new(row.consumed_by.clone().ok_or_else(|| {
                    AppError::Validation("consumed invite without a redeemer".to_owned())
                })?)?,
                consumed_at: changed_at()?,
            },
            "expired" => InviteState::Expired {
                observed_at: changed_at()?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "unknown invite state '{other}'"
                )));
            }
        };

        Ok(Self::restore(
            InviteCodeHash::new(row.code_hash)?,
            CompanyId::new(row.company_id)?,
            row.target_role.parse()?,
            CallerIdentity::new(row.issued_by)?,
            Timestamp::from_nanos(row.issued_at),
            Timestamp::from_nanos(row.expires_at),
            state,
        ))
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct TaskRow {
    company_id: String,
    task_id: String,
    description: String,
    priority: i64,
    assignee: String,
    created_by: String,
    starts_at: i64,
    ends_at: i64,
    status: String,
}

impl TryFrom<TaskRow> for Task {
    type Error = AppError;

    fn try_from(row: TaskRow) -> AppResult<Self> {
        let priority = u32::try_from(row.priority).map_err(|_| {
            AppError::Validation(format!("task priority '{}' is out of range", row.priority))
        })?;

        Task::new(TaskDraft {
            id: TaskId::new(row.task_id)?,
            company_id: CompanyId::new(row.company_id)?,
            description: NonEmptyString::new(row.description)?,
            priority,
            assignee: CallerIdentity::new(row.assignee)?,
            created_by: CallerIdentity::new(row.created_by)?,
            starts_at: Timestamp::from_nanos(row.starts_at),
            ends_at: Timestamp::from_nanos(row.ends_at),
            status: row.status.parse::<TaskStatus>()?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct AnnouncementRow {
    company_id: String,
    announcement_id: String,
    content: String,
    target_role: Option<String>,
    created_at: i64,
    created_by: String,
}

impl TryFrom<AnnouncementRow> for Announcement {
    type Error = AppError;

    fn try_from(row: AnnouncementRow) -> AppResult<Self> {
        Ok(Self {
            id: AnnouncementId::new(row.announcement_id)?,
            company_id: CompanyId::new(row.company_id)?,
            content: NonEmptyString::new(row.content)?,
            target_role: row
                .target_role
                .map(|role| role.parse::<CompanyRole>())
                .transpose()?,
            created_at: Timestamp::from_nanos(row.created_at),
            created_by: CallerIdentity::new(row.created_by)?,
        })
    }
}
