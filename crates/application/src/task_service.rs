use std::sync::Arc;

use tessera_core::{AppError, AppResult, CallerIdentity, NonEmptyString, Timestamp};
use tessera_domain::{Capability, Task, TaskDraft, TaskId, TaskStatus};

use crate::{AuthorizationGate, MemberRepository, TaskRepository, WriteSerializer};

/// Input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Caller-chosen id, unique within the company.
    pub id: TaskId,
    /// Work description.
    pub description: NonEmptyString,
    /// Priority.
    pub priority: u32,
    /// Assigned member.
    pub assignee: CallerIdentity,
    /// Planned start.
    pub starts_at: Timestamp,
    /// Planned end.
    pub ends_at: Timestamp,
    /// Initial status.
    pub status: TaskStatus,
}

/// Input for editing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    /// Work description.
    pub description: NonEmptyString,
    /// Priority.
    pub priority: u32,
    /// New status; any value is accepted.
    pub status: TaskStatus,
}

/// Company-scoped task store.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    members: Arc<dyn MemberRepository>,
    gate: AuthorizationGate,
    serializer: WriteSerializer,
}

impl TaskService {
    /// Creates a task service.
    #[must_use]
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        members: Arc<dyn MemberRepository>,
        gate: AuthorizationGate,
        serializer: WriteSerializer,
    ) -> Self {
        Self {
            tasks,
            members,
            gate,
            serializer,
        }
    }

    /// Creates a task assigned to an active member of the caller's company.
    pub async fn add(&self, caller: &CallerIdentity, input: NewTask) -> AppResult<Task> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::TaskAdd)
            .await?;
        let assignee = self
            .members
            .find_member(&input.assignee)
            .await?
            .ok_or_else(|| AppError::NotFound("assignee not found".to_owned()))?;
        context.ensure_same_company(assignee.company_id())?;
        if !assignee.is_active() {
            return Err(AppError::Validation("assignee is not active".to_owned()));
        }

        let task = Task::new(TaskDraft {
            id: input.id,
            company_id: context.company_id,
            description: input.description,
            priority: input.priority,
            assignee: input.assignee,
            created_by: context.identity,
            starts_at: input.starts_at,
            ends_at: input.ends_at,
            status: input.status,
        })?;
        self.tasks.insert_task(task.clone()).await?;
        Ok(task)
    }

    /// Edits a task in the caller's company.
    pub async fn update(
        &self,
        caller: &CallerIdentity,
        task_id: &TaskId,
        update: TaskUpdate,
    ) -> AppResult<Task> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::TaskEdit)
            .await?;
        let mut task = self
            .tasks
            .find_task(&context.company_id, task_id)
            .await?
            .ok_or_else(|| not_found(task_id))?;

        task.update(update.description, update.priority, update.status);
        self.tasks.update_task(task.clone()).await?;
        Ok(task)
    }

    /// Deletes a task in the caller's company.
    pub async fn remove(&self, caller: &CallerIdentity, task_id: &TaskId) -> AppResult<()> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::TaskDelete)
            .await?;
        self.tasks.delete_task(&context.company_id, task_id).await
    }

    /// Returns one task of the caller's company.
    pub async fn get(&self, caller: &CallerIdentity, task_id: &TaskId) -> AppResult<Task> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::TaskView)
            .await?;
        self.tasks
            .find_task(&context.company_id, task_id)
            .await?
            .ok_or_else(|| not_found(task_id))
    }

    /// Lists the caller's company tasks.
    pub async fn list(&self, caller: &CallerIdentity) -> AppResult<Vec<Task>> {
        self.list_filtered(caller, None).await
    }

    /// Lists the caller's company tasks with one status.
    pub async fn list_by_status(
        &self,
        caller: &CallerIdentity,
        status: TaskStatus,
    ) -> AppResult<Vec<Task>> {
        self.list_filtered(caller, Some(status)).await
    }

    async fn list_filtered(
        &self,
        caller: &CallerIdentity,
        status: Option<TaskStatus>,
    ) -> AppResult<Vec<Task>> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::TaskView)
            .await?;
        self.tasks.list_tasks(&context.company_id, status).await
    }
}

fn not_found(task_id: &TaskId) -> AppError {
    AppError::NotFound(format!("task '{task_id}' not found"))
}
