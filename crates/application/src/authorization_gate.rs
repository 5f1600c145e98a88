use std::sync::Arc;

use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId};
use tessera_domain::{Capability, CapabilitySet, CompanyRole, Member, PersonnelId};

use crate::MemberRepository;

/// Resolved and checked caller, handed to entity services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    /// Caller identity.
    pub identity: CallerIdentity,
    /// Caller's company.
    pub company_id: CompanyId,
    /// Caller's company role.
    pub role: CompanyRole,
    /// Caller's stored capability flags.
    pub permissions: CapabilitySet,
    /// Caller's personnel record, if attached.
    pub personnel_id: Option<PersonnelId>,
}

impl CallerContext {
    fn from_member(member: &Member) -> Self {
        Self {
            identity: member.identity().clone(),
            company_id: member.company_id().clone(),
            role: member.role(),
            permissions: *member.permissions(),
            personnel_id: member.personnel_id().cloned(),
        }
    }

    /// Fails with `Unauthorized` unless the capability flag is raised.
    pub fn require(&self, capability: Capability) -> AppResult<()> {
        if self.permissions.allows(capability) {
            return Ok(());
        }

        Err(AppError::Unauthorized(format!(
            "caller is missing capability '{}'",
            capability.as_str()
        )))
    }

    /// Fails with `CrossTenant` unless `company_id` is the caller's company.
    pub fn ensure_same_company(&self, company_id: &CompanyId) -> AppResult<()> {
        if &self.company_id == company_id {
            return Ok(());
        }

        Err(AppError::CrossTenant(format!(
            "company '{company_id}' is outside the caller's company"
        )))
    }

    /// Fails with `Unauthorized` unless every flag raised in `next` but not in
    /// `previous` is also raised for the caller.
    pub fn ensure_can_grant(&self, previous: &CapabilitySet, next: &CapabilitySet) -> AppResult<()> {
        match next
            .newly_granted(previous)
            .into_iter()
            .find(|capability| !self.permissions.allows(*capability))
        {
            Some(capability) => Err(AppError::Unauthorized(format!(
                "caller cannot grant capability '{}' it does not hold",
                capability.as_str()
            ))),
            None => Ok(()),
        }
    }

    /// Fails with `Unauthorized` unless the caller's role manages `role`.
    pub fn ensure_manages(&self, role: CompanyRole) -> AppResult<()> {
        if self.role.can_manage(role) {
            return Ok(());
        }

        Err(AppError::Unauthorized(format!(
            "role '{}' cannot manage role '{}'",
            self.role.as_str(),
            role.as_str()
        )))
    }
}

/// Cross-cutting check run before every entity operation.
///
/// Verifies, in order, that the caller has an active profile, holds the
/// required capability, and targets its own company.
#[derive(Clone)]
pub struct AuthorizationGate {
    members: Arc<dyn MemberRepository>,
}

impl AuthorizationGate {
    /// Creates a gate reading profiles from the member repository.
    #[must_use]
    pub fn new(members: Arc<dyn MemberRepository>) -> Self {
        Self { members }
    }

    /// Resolves the caller's active profile.
    pub async fn resolve_active(&self, identity: &CallerIdentity) -> AppResult<CallerContext> {
        let member = self
            .members
            .find_member(identity)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("caller has no profile".to_owned()))?;

        if !member.is_active() {
            return Err(AppError::Inactive("caller profile is deactivated".to_owned()));
        }

        Ok(CallerContext::from_member(&member))
    }

    /// Runs the full check against an explicit target company.
    pub async fn authorize(
        &self,
        identity: &CallerIdentity,
        capability: Capability,
        target_company: &CompanyId,
    ) -> AppResult<CallerContext> {
        let context = self.resolve_active(identity).await?;
        context.require(capability)?;
        context.ensure_same_company(target_company)?;
        Ok(context)
    }

    /// Runs the check with the target fixed to the caller's own company.
    pub async fn authorize_own_company(
        &self,
        identity: &CallerIdentity,
        capability: Capability,
    ) -> AppResult<CallerContext> {
        let context = self.resolve_active(identity).await?;
        context.require(capability)?;
        Ok(context)
    }
}
