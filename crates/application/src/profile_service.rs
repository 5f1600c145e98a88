use std::sync::Arc;

use tessera_core::{AppError, AppResult, CallerIdentity, NonEmptyString};
use tessera_domain::{
    AuditAction, Capability, CapabilitySet, Company, CompanyRole, Member, PersonnelId, UserProfile,
};

use crate::{
    AuditEvent, AuthorizationGate, AuditRepository, CompanyRepository, MemberRepository,
    WriteSerializer,
};

/// Application service resolving identities to company profiles.
#[derive(Clone)]
pub struct ProfileService {
    companies: Arc<dyn CompanyRepository>,
    members: Arc<dyn MemberRepository>,
    audit: Arc<dyn AuditRepository>,
    gate: AuthorizationGate,
    serializer: WriteSerializer,
}

impl ProfileService {
    /// Creates a profile service.
    #[must_use]
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        members: Arc<dyn MemberRepository>,
        audit: Arc<dyn AuditRepository>,
        gate: AuthorizationGate,
        serializer: WriteSerializer,
    ) -> Self {
        Self {
            companies,
            members,
            audit,
            gate,
            serializer,
        }
    }

    /// Returns the caller's own profile, if one exists.
    pub async fn caller_profile(&self, caller: &CallerIdentity) -> AppResult<Option<UserProfile>> {
        Ok(self
            .members
            .find_member(caller)
            .await?
            .map(|member| member.profile()))
    }

    /// Saves the caller's profile.
    ///
    /// Without an existing profile this is the owner bootstrap of a company
    /// the caller registered. With one, only the display name may change.
    pub async fn save_caller_profile(
        &self,
        caller: &CallerIdentity,
        profile: UserProfile,
    ) -> AppResult<UserProfile> {
        let _guard = self.serializer.acquire().await;

        match self.members.find_member(caller).await? {
            Some(member) => self.rename_profile(caller, member, profile).await,
            None => {
                if profile.role != CompanyRole::Owner
                    || profile.permissions != CapabilitySet::all()
                    || !profile.active
                {
                    return Err(AppError::Unauthorized(
                        "a first profile may only bootstrap the company owner".to_owned(),
                    ));
                }

                let company = self
                    .companies
                    .find_company(&profile.company_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound("company not found".to_owned()))?;

                let member = bootstrap_owner(
                    self.members.as_ref(),
                    self.audit.as_ref(),
                    caller,
                    &company,
                    profile.name,
                )
                .await?;
                Ok(member.profile())
            }
        }
    }

    /// Returns the profile bound to `identity`.
    ///
    /// Callers may always read their own profile; reading another member's
    /// profile requires `personnel.view` in the same company.
    pub async fn profile_for(
        &self,
        caller: &CallerIdentity,
        identity: &CallerIdentity,
    ) -> AppResult<UserProfile> {
        if caller == identity {
            return self
                .caller_profile(caller)
                .await?
                .ok_or_else(|| AppError::NotFound("profile not found".to_owned()));
        }

        let context = self
            .gate
            .authorize_own_company(caller, Capability::PersonnelView)
            .await?;
        let member = self
            .members
            .find_member(identity)
            .await?
            .ok_or_else(|| AppError::NotFound("profile not found".to_owned()))?;
        context.ensure_same_company(member.company_id())?;

        Ok(member.profile())
    }

    async fn rename_profile(
        &self,
        caller: &CallerIdentity,
        mut member: Member,
        profile: UserProfile,
    ) -> AppResult<UserProfile> {
        if !member.is_active() {
            return Err(AppError::Inactive("caller profile is deactivated".to_owned()));
        }

        let current = member.profile();
        if profile.company_id != current.company_id
            || profile.role != current.role
            || profile.permissions != current.permissions
            || profile.active != current.active
        {
            return Err(AppError::Unauthorized(
                "profile self-edits may only change the display name".to_owned(),
            ));
        }

        if profile.name == current.name {
            return Ok(current);
        }

        member.rename(profile.name);
        self.members.update_member(member.clone()).await?;
        self.audit
            .append_event(AuditEvent {
                company_id: Some(member.company_id().clone()),
                subject: caller.clone(),
                action: AuditAction::ProfileRenamed,
                resource_type: "profile".to_owned(),
                resource_id: caller.to_string(),
                detail: Some(member.name().to_string()),
            })
            .await?;

        Ok(member.profile())
    }
}

/// Creates the owner member of a freshly registered company.
///
/// Must run under the write serializer.
pub(crate) async fn bootstrap_owner(
    members: &dyn MemberRepository,
    audit: &dyn AuditRepository,
    caller: &CallerIdentity,
    company: &Company,
    name: NonEmptyString,
) -> AppResult<Member> {
    if !company.was_registered_by(caller) {
        return Err(AppError::Unauthorized(
            "only the registering identity may become the company owner".to_owned(),
        ));
    }

    if !members.list_members(&company.company_id).await?.is_empty() {
        return Err(AppError::Duplicate(format!(
            "company '{}' already has an owner",
            company.company_id
        )));
    }

    let personnel_id = PersonnelId::generate();
    let member = Member::new(
        caller.clone(),
        company.company_id.clone(),
        name,
        CompanyRole::Owner,
    )
    .with_personnel_id(personnel_id.clone());
    members.insert_member(member.clone()).await?;

    audit
        .append_event(AuditEvent {
            company_id: Some(company.company_id.clone()),
            subject: caller.clone(),
            action: AuditAction::CompanyOwnerBootstrapped,
            resource_type: "personnel".to_owned(),
            resource_id: personnel_id.to_string(),
            detail: Some(member.name().to_string()),
        })
        .await?;

    Ok(member)
}
