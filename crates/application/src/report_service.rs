use std::sync::Arc;

use tessera_core::{AppResult, CallerIdentity};
use tessera_domain::{Capability, Report, ReportKind};

use crate::{
    AnnouncementRepository, AuthorizationGate, MemberRepository, TaskRepository,
};

/// Read-only aggregates over one company's records.
#[derive(Clone)]
pub struct ReportService {
    members: Arc<dyn MemberRepository>,
    tasks: Arc<dyn TaskRepository>,
    announcements: Arc<dyn AnnouncementRepository>,
    gate: AuthorizationGate,
}

impl ReportService {
    /// Creates a report service.
    #[must_use]
    pub fn new(
        members: Arc<dyn MemberRepository>,
        tasks: Arc<dyn TaskRepository>,
        announcements: Arc<dyn AnnouncementRepository>,
        gate: AuthorizationGate,
    ) -> Self {
        Self {
            members,
            tasks,
            announcements,
            gate,
        }
    }

    /// Builds the report named by `report_type` for the caller's company.
    pub async fn report(&self, caller: &CallerIdentity, report_type: &str) -> AppResult<Report> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::ReportView)
            .await?;
        let kind = report_type.trim().parse::<ReportKind>()?;

        let members = self.members.list_members(&context.company_id).await?;
        let tasks = self.tasks.list_tasks(&context.company_id, None).await?;
        let announcements = self
            .announcements
            .list_announcements(&context.company_id)
            .await?;

        Ok(Report::build(
            kind,
            &context.company_id,
            &members,
            &tasks,
            &announcements,
        ))
    }
}
