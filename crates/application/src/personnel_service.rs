use std::sync::Arc;

use tessera_core::{AppError, AppResult, CallerIdentity, NonEmptyString};
use tessera_domain::{
    AuditAction, Capability, CapabilitySet, CompanyRole, Member, Personnel, PersonnelId,
};

use crate::{
    AuditEvent, AuditRepository, AuthorizationGate, CallerContext, MemberRepository,
    WriteSerializer,
};

/// Input for adding a personnel record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPersonnel {
    /// Caller-chosen id, unique within the company.
    pub id: PersonnelId,
    /// Display name.
    pub name: NonEmptyString,
    /// Company role to assign.
    pub role: CompanyRole,
    /// Capability flags to assign.
    pub permissions: CapabilitySet,
    /// Identity the record is bound to.
    pub identity: CallerIdentity,
}

/// Input for editing a personnel record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonnelUpdate {
    /// Display name.
    pub name: NonEmptyString,
    /// Company role.
    pub role: CompanyRole,
    /// Capability flags.
    pub permissions: CapabilitySet,
    /// Whether the member is active.
    pub active: bool,
}

/// Company-scoped personnel administration.
///
/// Personnel records are projections of members, so every write here also
/// changes the bound identity's profile.
#[derive(Clone)]
pub struct PersonnelService {
    members: Arc<dyn MemberRepository>,
    audit: Arc<dyn AuditRepository>,
    gate: AuthorizationGate,
    serializer: WriteSerializer,
}

impl PersonnelService {
    /// Creates a personnel service.
    #[must_use]
    pub fn new(
        members: Arc<dyn MemberRepository>,
        audit: Arc<dyn AuditRepository>,
        gate: AuthorizationGate,
        serializer: WriteSerializer,
    ) -> Self {
        Self {
            members,
            audit,
            gate,
            serializer,
        }
    }

    /// Adds a personnel record bound to an identity.
    pub async fn add(&self, caller: &CallerIdentity, input: NewPersonnel) -> AppResult<Personnel> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::PersonnelAdd)
            .await?;
        context.ensure_manages(input.role)?;
        context.ensure_can_grant(&CapabilitySet::none(), &input.permissions)?;

        if self
            .members
            .find_member_by_personnel_id(&context.company_id, &input.id)
            .await?
            .is_some()
        {
            return Err(AppError::Duplicate(format!(
                "personnel '{}' already exists",
                input.id
            )));
        }

        let mut member = self
            .members
            .find_member(&input.identity)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("bound identity has not joined any company".to_owned())
            })?;
        context.ensure_same_company(member.company_id())?;
        if member.personnel_id().is_some() {
            return Err(AppError::Duplicate(
                "identity is already bound to a personnel record".to_owned(),
            ));
        }
        context.ensure_manages(member.role())?;

        member.attach_personnel(input.id.clone())?;
        member.rename(input.name);
        member.set_role(input.role);
        member.set_permissions(input.permissions);
        member.set_active(true);
        self.members.update_member(member.clone()).await?;

        self.record(&context, AuditAction::PersonnelAdded, &input.id, &member)
            .await?;
        project(&member)
    }

    /// Updates a personnel record in the caller's company.
    pub async fn update(
        &self,
        caller: &CallerIdentity,
        personnel_id: &PersonnelId,
        update: PersonnelUpdate,
    ) -> AppResult<Personnel> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::PersonnelEdit)
            .await?;
        let mut member = self.load(&context, personnel_id).await?;
        context.ensure_manages(member.role())?;
        context.ensure_manages(update.role)?;
        context.ensure_can_grant(member.permissions(), &update.permissions)?;

        member.rename(update.name);
        member.set_role(update.role);
        member.set_permissions(update.permissions);
        member.set_active(update.active);
        self.members.update_member(member.clone()).await?;

        self.record(&context, AuditAction::PersonnelUpdated, personnel_id, &member)
            .await?;
        project(&member)
    }

    /// Removes a personnel record and deactivates the bound profile.
    pub async fn remove(&self, caller: &CallerIdentity, personnel_id: &PersonnelId) -> AppResult<()> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::PersonnelDelete)
            .await?;
        let mut member = self.load(&context, personnel_id).await?;
        context.ensure_manages(member.role())?;

        member.detach_personnel();
        self.members.update_member(member.clone()).await?;
        self.record(&context, AuditAction::PersonnelRemoved, personnel_id, &member)
            .await
    }

    /// Returns one personnel record.
    pub async fn get(
        &self,
        caller: &CallerIdentity,
        personnel_id: &PersonnelId,
    ) -> AppResult<Personnel> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::PersonnelView)
            .await?;
        let member = self.load(&context, personnel_id).await?;
        project(&member)
    }

    /// Lists the caller's company personnel.
    pub async fn list(&self, caller: &CallerIdentity) -> AppResult<Vec<Personnel>> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::PersonnelView)
            .await?;
        let mut personnel: Vec<Personnel> = self
            .members
            .list_members(&context.company_id)
            .await?
            .iter()
            .filter_map(Member::personnel)
            .collect();
        personnel.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(personnel)
    }

    /// Lists the caller's company personnel that are active.
    pub async fn list_active(&self, caller: &CallerIdentity) -> AppResult<Vec<Personnel>> {
        Ok(self
            .list(caller)
            .await?
            .into_iter()
            .filter(|personnel| personnel.active)
            .collect())
    }

    async fn load(&self, context: &CallerContext, personnel_id: &PersonnelId) -> AppResult<Member> {
        self.members
            .find_member_by_personnel_id(&context.company_id, personnel_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("personnel '{personnel_id}' not found")))
    }

    async fn record(
        &self,
        context: &CallerContext,
        action: AuditAction,
        personnel_id: &PersonnelId,
        member: &Member,
    ) -> AppResult<()> {
        self.audit
            .append_event(AuditEvent {
                company_id: Some(context.company_id.clone()),
                subject: context.identity.clone(),
                action,
                resource_type: "personnel".to_owned(),
                resource_id: personnel_id.to_string(),
                detail: Some(format!(
                    "identity={} role={} active={}",
                    member.identity(),
                    member.role().as_str(),
                    member.is_active()
                )),
            })
            .await
    }
}

fn project(member: &Member) -> AppResult<Personnel> {
    member
        .personnel()
        .ok_or_else(|| AppError::Internal("member lost its personnel record".to_owned()))
}
