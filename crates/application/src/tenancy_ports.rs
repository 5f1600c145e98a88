use std::sync::Arc;

use async_trait::async_trait;
use tessera_core::{AppResult, CallerIdentity, CompanyId, NonEmptyString, Timestamp};
use tessera_domain::{
    Announcement, AnnouncementId, AuditAction, Company, InviteCode, InviteCodeHash, Member,
    PersonnelId, SystemRole, Task, TaskId, TaskStatus,
};

/// Port for tenant registration.
#[async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Stores a new company, failing with `Duplicate` when the id is taken.
    async fn create_company(&self, company: Company) -> AppResult<()>;

    /// Finds a company by id.
    async fn find_company(&self, company_id: &CompanyId) -> AppResult<Option<Company>>;

    /// Finds the earliest company registered by an identity.
    async fn find_company_registered_by(
        &self,
        identity: &CallerIdentity,
    ) -> AppResult<Option<Company>>;
}

/// Port for member records, the source of every profile and personnel view.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Finds the member bound to an identity.
    async fn find_member(&self, identity: &CallerIdentity) -> AppResult<Option<Member>>;

    /// Finds the member holding a personnel record in a company.
    async fn find_member_by_personnel_id(
        &self,
        company_id: &CompanyId,
        personnel_id: &PersonnelId,
    ) -> AppResult<Option<Member>>;

    /// Stores a new member.
    ///
    /// Fails with `Duplicate` when the identity already has a member or the
    /// personnel id is taken in the company.
    async fn insert_member(&self, member: Member) -> AppResult<()>;

    /// Replaces an existing member, keyed by identity.
    ///
    /// Fails with `NotFound` when absent and `Validation` when the company
    /// would change.
    async fn update_member(&self, member: Member) -> AppResult<()>;

    /// Lists all members of a company.
    async fn list_members(&self, company_id: &CompanyId) -> AppResult<Vec<Member>>;
}

/// Port for the platform-wide role table.
#[async_trait]
pub trait SystemRoleRepository: Send + Sync {
    /// Sets the system role of an identity.
    async fn assign_system_role(&self, identity: &CallerIdentity, role: SystemRole)
    -> AppResult<()>;

    /// Returns the explicitly stored system role, if any.
    async fn find_system_role(&self, identity: &CallerIdentity) -> AppResult<Option<SystemRole>>;
}

/// Inputs for one invite redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteRedemption {
    /// Digest of the presented code.
    pub code_hash: InviteCodeHash,
    /// Redeeming identity.
    pub identity: CallerIdentity,
    /// Display name for the new member.
    pub display_name: NonEmptyString,
    /// Personnel record id allocated for the new member.
    pub personnel_id: PersonnelId,
    /// Redemption time.
    pub redeemed_at: Timestamp,
}

/// Port for invite persistence.
#[async_trait]
pub trait InviteCodeRepository: Send + Sync {
    /// Stores a newly issued invite.
    async fn create_invite(&self, invite: InviteCode) -> AppResult<()>;

    /// Atomically consumes an invite and creates the bound member.
    ///
    /// Checks run in this order: unknown digest fails `InvalidCode`; a
    /// consumed or expired code fails `AlreadyUsed` or `Expired` (a lazily
    /// observed expiry is persisted); an identity that already has a member
    /// fails `Duplicate` without consuming the code.
    async fn redeem_invite(&self, redemption: InviteRedemption) -> AppResult<Member>;

    /// Lists all invites issued for a company.
    async fn list_invites(&self, company_id: &CompanyId) -> AppResult<Vec<InviteCode>>;
}

/// Port for company-scoped tasks.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task, failing with `Duplicate` when the id is taken in its company.
    async fn insert_task(&self, task: Task) -> AppResult<()>;

    /// Replaces an existing task, failing with `NotFound` when absent.
    async fn update_task(&self, task: Task) -> AppResult<()>;

    /// Deletes a task, failing with `NotFound` when absent.
    async fn delete_task(&self, company_id: &CompanyId, task_id: &TaskId) -> AppResult<()>;

    /// Finds a task within a company.
    async fn find_task(&self, company_id: &CompanyId, task_id: &TaskId)
    -> AppResult<Option<Task>>;

    /// Lists a company's tasks, optionally filtered by status.
    async fn list_tasks(
        &self,
        company_id: &CompanyId,
        status: Option<TaskStatus>,
    ) -> AppResult<Vec<Task>>;
}

/// Port for company-scoped announcements.
#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Stores a new announcement, failing with `Duplicate` when the id is taken.
    async fn insert_announcement(&self, announcement: Announcement) -> AppResult<()>;

    /// Deletes an announcement, failing with `NotFound` when absent.
    async fn delete_announcement(
        &self,
        company_id: &CompanyId,
        announcement_id: &AnnouncementId,
    ) -> AppResult<()>;

    /// Lists a company's announcements, newest first.
    async fn list_announcements(&self, company_id: &CompanyId) -> AppResult<Vec<Announcement>>;
}

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Company scope, absent for platform-level actions.
    pub company_id: Option<CompanyId>,
    /// Identity that performed the action.
    pub subject: CallerIdentity,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload.
    pub detail: Option<String>,
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Every port the tenancy services depend on.
#[derive(Clone)]
pub struct TenancyPorts {
    /// Company registry.
    pub companies: Arc<dyn CompanyRepository>,
    /// Member records.
    pub members: Arc<dyn MemberRepository>,
    /// System role table.
    pub system_roles: Arc<dyn SystemRoleRepository>,
    /// Invite codes.
    pub invites: Arc<dyn InviteCodeRepository>,
    /// Tasks.
    pub tasks: Arc<dyn TaskRepository>,
    /// Announcements.
    pub announcements: Arc<dyn AnnouncementRepository>,
    /// Audit trail.
    pub audit: Arc<dyn AuditRepository>,
}

impl TenancyPorts {
    /// Wires every port to one store implementing all of them.
    #[must_use]
    pub fn from_store<S>(store: Arc<S>) -> Self
    where
        S: CompanyRepository
            + MemberRepository
            + SystemRoleRepository
            + InviteCodeRepository
            + TaskRepository
            + AnnouncementRepository
            + AuditRepository
            + 'static,
    {
        Self {
            companies: store.clone(),
            members: store.clone(),
            system_roles: store.clone(),
            invites: store.clone(),
            tasks: store.clone(),
            announcements: store.clone(),
            audit: store,
        }
    }
}
