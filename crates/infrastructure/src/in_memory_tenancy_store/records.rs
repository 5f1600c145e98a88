use std::cmp::Reverse;

use async_trait::async_trait;
use tessera_application::{AnnouncementRepository, TaskRepository};
use tessera_core::{AppError, AppResult, CompanyId};
use tessera_domain::{Announcement, AnnouncementId, Task, TaskId, TaskStatus};

use super::InMemoryTenancyStore;

#[async_trait]
impl TaskRepository for InMemoryTenancyStore {
    async fn insert_task(&self, task: Task) -> AppResult<()> {
        let key = (task.company_id().clone(), task.id().clone());
        let mut state = self.state.write().await;
        if state.tasks.contains_key(&key) {
            return Err(AppError::Duplicate(format!(
                "task '{}' already exists",
                key.1
            )));
        }

        state.tasks.insert(key, task);
        Ok(())
    }

    async fn update_task(&self, task: Task) -> AppResult<()> {
        let key = (task.company_id().clone(), task.id().clone());
        let mut state = self.state.write().await;
        let Some(stored) = state.tasks.get_mut(&key) else {
            return Err(AppError::NotFound(format!("task '{}' not found", key.1)));
        };

        *stored = task;
        Ok(())
    }

    async fn delete_task(&self, company_id: &CompanyId, task_id: &TaskId) -> AppResult<()> {
        self.state
            .write()
            .await
            .tasks
            .remove(&(company_id.clone(), task_id.clone()))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("task '{task_id}' not found")))
    }

    async fn find_task(
        &self,
        company_id: &CompanyId,
        task_id: &TaskId,
    ) -> AppResult<Option<Task>> {
        Ok(self
            .state
            .read()
            .await
            .tasks
            .get(&(company_id.clone(), task_id.clone()))
            .cloned())
    }

    async fn list_tasks(
        &self,
        company_id: &CompanyId,
        status: Option<TaskStatus>,
    ) -> AppResult<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .iter()
            .filter_map(|((stored_company_id, _), task)| {
                (stored_company_id == company_id
                    && status.is_none_or(|status| task.status() == status))
                .then_some(task.clone())
            })
            .collect();
        tasks.sort_by(|left, right| left.id().cmp(right.id()));
        Ok(tasks)
    }
}

#[async_trait]
impl AnnouncementRepository for InMemoryTenancyStore {
    async fn insert_announcement(&self, announcement: Announcement) -> AppResult<()> {
        let key = (announcement.company_id.clone(), announcement.id.clone());
        let mut state = self.state.write().await;
        if state.announcements.contains_key(&key) {
            return Err(AppError::Duplicate(format!(
                "announcement '{}' already exists",
                key.1
            )));
        }

        state.announcements.insert(key, announcement);
        Ok(())
    }

    async fn delete_announcement(
        &self,
        company_id: &CompanyId,
        announcement_id: &AnnouncementId,
    ) -> AppResult<()> {
        self.state
            .write()
            .await
            .announcements
            .remove(&(company_id.clone(), announcement_id.clone()))
            .map(|_| ())
            .ok_or_else(|| {
                AppError::NotFound(format!("announcement '{announcement_id}' not found"))
            })
    }

    async fn list_announcements(&self, company_id: &CompanyId) -> AppResult<Vec<Announcement>> {
        let state = self.state.read().await;
        let mut announcements: Vec<Announcement> = state
            .announcements
            .iter()
            .filter_map(|((stored_company_id, _), announcement)| {
                (stored_company_id == company_id).then_some(announcement.clone())
            })
            .collect();
        announcements.sort_by_key(|announcement| {
            (Reverse(announcement.created_at), announcement.id.clone())
        });
        Ok(announcements)
    }
}
