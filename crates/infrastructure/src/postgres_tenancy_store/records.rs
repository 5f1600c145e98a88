use async_trait::async_trait;
use tessera_application::{AnnouncementRepository, TaskRepository};
use tessera_core::{AppError, AppResult, CompanyId};
use tessera_domain::{Announcement, AnnouncementId, Task, TaskId, TaskStatus};

use super::rows::{AnnouncementRow, TaskRow, decode};
use super::{PostgresTenancyStore, write_error};

const TASK_COLUMNS: &str = "company_id, task_id, description, priority, assignee, created_by, \
                            starts_at, ends_at, status";

#[async_trait]
impl TaskRepository for PostgresTenancyStore {
    async fn insert_task(&self, task: Task) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO tasks (
                company_id,
                task_id,
                description,
                priority,
                assignee,
                created_by,
                starts_at,
                ends_at,
                status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(task.company_id().as_str())
        .bind(task.id().as_str())
        .bind(task.description().as_str())
        .bind(i64::from(task.priority()))
        .bind(task.assignee().as_str())
        .bind(task.created_by().as_str())
        .bind(task.starts_at().as_nanos())
        .bind(task.ends_at().as_nanos())
        .bind(task.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                error,
                "insert task",
                &format!("task '{}' already exists", task.id()),
            )
        })?;

        Ok(())
    }

    async fn update_task(&self, task: Task) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET description = $3, priority = $4, status = $5
            WHERE company_id = $1 AND task_id = $2
            "#,
        )
        .bind(task.company_id().as_str())
        .bind(task.id().as_str())
        .bind(task.description().as_str())
        .bind(i64::from(task.priority()))
        .bind(task.status().as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update task: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("task '{}' not found", task.id())));
        }

        Ok(())
    }

    async fn delete_task(&self, company_id: &CompanyId, task_id: &TaskId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE company_id = $1 AND task_id = $2")
            .bind(company_id.as_str())
            .bind(task_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete task: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("task '{task_id}' not found")));
        }

        Ok(())
    }

    async fn find_task(
        &self,
        company_id: &CompanyId,
        task_id: &TaskId,
    ) -> AppResult<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE company_id = $1 AND task_id = $2"
        ))
        .bind(company_id.as_str())
        .bind(task_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find task: {error}")))?;

        row.map(|row| decode("task", Task::try_from(row)))
            .transpose()
    }

    async fn list_tasks(
        &self,
        company_id: &CompanyId,
        status: Option<TaskStatus>,
    ) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE company_id = $1 AND ($2::TEXT IS NULL OR status = $2) \
             ORDER BY task_id"
        ))
        .bind(company_id.as_str())
        .bind(status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list tasks: {error}")))?;

        rows.into_iter()
            .map(|row| decode("task", Task::try_from(row)))
            .collect()
    }
}

#[async_trait]
impl AnnouncementRepository for PostgresTenancyStore {
    async fn insert_announcement(&self, announcement: Announcement) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO announcements (
                company_id,
                announcement_id,
                content,
                target_role,
                created_at,
                created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(announcement.company_id.as_str())
        .bind(announcement.id.as_str())
        .bind(announcement.content.as_str())
        .bind(announcement.target_role.map(|role| role.as_str()))
        .bind(announcement.created_at.as_nanos())
        .bind(announcement.created_by.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                error,
                "insert announcement",
                &format!("announcement '{}' already exists", announcement.id),
            )
        })?;

        Ok(())
    }

    async fn delete_announcement(
        &self,
        company_id: &CompanyId,
        announcement_id: &AnnouncementId,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "DELETE FROM announcements WHERE company_id = $1 AND announcement_id = $2",
        )
        .bind(company_id.as_str())
        .bind(announcement_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete announcement: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "announcement '{announcement_id}' not found"
            )));
        }

        Ok(())
    }

    async fn list_announcements(&self, company_id: &CompanyId) -> AppResult<Vec<Announcement>> {
        let rows = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT company_id, announcement_id, content, target_role, created_at, created_by
            FROM announcements
            WHERE company_id = $1
            ORDER BY created_at DESC, announcement_id
            "#,
        )
        .bind(company_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list announcements: {error}")))?;

        rows.into_iter()
            .map(|row| decode("announcement", Announcement::try_from(row)))
            .collect()
    }
}
