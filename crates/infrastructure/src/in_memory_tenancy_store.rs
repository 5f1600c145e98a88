use std::collections::HashMap;

use async_trait::async_trait;
use tessera_application::{
    AuditEvent, AuditRepository, CompanyRepository, SystemRoleRepository,
};
use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId};
use tessera_domain::{
    Announcement, AnnouncementId, Company, InviteCode, InviteCodeHash, Member, SystemRole, Task,
    TaskId,
};
use tokio::sync::RwLock;

mod invites;
mod members;
mod records;

/// Every record held by the in-memory store.
#[derive(Debug, Default)]
struct TenancyState {
    companies: HashMap<CompanyId, Company>,
    members: HashMap<CallerIdentity, Member>,
    system_roles: HashMap<CallerIdentity, SystemRole>,
    invites: HashMap<InviteCodeHash, InviteCode>,
    tasks: HashMap<(CompanyId, TaskId), Task>,
    announcements: HashMap<(CompanyId, AnnouncementId), Announcement>,
    audit_events: Vec<AuditEvent>,
}

/// In-memory implementation of every tenancy port.
///
/// All state sits behind one lock, so each port call is atomic with respect
/// to every other call.
#[derive(Debug, Default)]
pub struct InMemoryTenancyStore {
    state: RwLock<TenancyState>,
}

impl InMemoryTenancyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the recorded audit events, oldest first.
    pub async fn recorded_events(&self) -> Vec<AuditEvent> {
        self.state.read().await.audit_events.clone()
    }
}

#[async_trait]
impl CompanyRepository for InMemoryTenancyStore {
    async fn create_company(&self, company: Company) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.companies.contains_key(&company.company_id) {
            return Err(AppError::Duplicate(format!(
                "company '{}' already exists",
                company.company_id
            )));
        }

        state.companies.insert(company.company_id.clone(), company);
        Ok(())
    }

    async fn find_company(&self, company_id: &CompanyId) -> AppResult<Option<Company>> {
        Ok(self.state.read().await.companies.get(company_id).cloned())
    }

    async fn find_company_registered_by(
        &self,
        identity: &CallerIdentity,
    ) -> AppResult<Option<Company>> {
        Ok(self
            .state
            .read()
            .await
            .companies
            .values()
            .filter(|company| &company.registered_by == identity)
            .min_by_key(|company| company.registered_at)
            .cloned())
    }
}

#[async_trait]
impl SystemRoleRepository for InMemoryTenancyStore {
    async fn assign_system_role(
        &self,
        identity: &CallerIdentity,
        role: SystemRole,
    ) -> AppResult<()> {
        self.state
            .write()
            .await
            .system_roles
            .insert(identity.clone(), role);
        Ok(())
    }

    async fn find_system_role(&self, identity: &CallerIdentity) -> AppResult<Option<SystemRole>> {
        Ok(self.state.read().await.system_roles.get(identity).copied())
    }
}

#[async_trait]
impl AuditRepository for InMemoryTenancyStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.state.write().await.audit_events.push(event);
        Ok(())
    }
}
