use std::sync::Arc;

use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId, NonEmptyString};
use tessera_domain::{AuditAction, Company, UserProfile};

use crate::profile_service::bootstrap_owner;
use crate::{
    AuditEvent, AuditRepository, Clock, CompanyRepository, MemberRepository, WriteSerializer,
};

/// Application service for tenant registration.
#[derive(Clone)]
pub struct CompanyService {
    companies: Arc<dyn CompanyRepository>,
    members: Arc<dyn MemberRepository>,
    audit: Arc<dyn AuditRepository>,
    clock: Arc<dyn Clock>,
    serializer: WriteSerializer,
}

impl CompanyService {
    /// Creates a company service.
    #[must_use]
    pub fn new(
        companies: Arc<dyn CompanyRepository>,
        members: Arc<dyn MemberRepository>,
        audit: Arc<dyn AuditRepository>,
        clock: Arc<dyn Clock>,
        serializer: WriteSerializer,
    ) -> Self {
        Self {
            companies,
            members,
            audit,
            clock,
            serializer,
        }
    }

    /// Registers a new company on behalf of a caller without a profile.
    pub async fn register_company(
        &self,
        caller: &CallerIdentity,
        company_id: &str,
        name: &str,
    ) -> AppResult<Company> {
        let company_id = CompanyId::new(company_id)?;
        let name = NonEmptyString::new(name.trim())?;

        let _guard = self.serializer.acquire().await;
        self.register_locked(caller, company_id, name).await
    }

    /// Registers a company and bootstraps the caller as its owner in one step.
    pub async fn register_company_with_owner(
        &self,
        caller: &CallerIdentity,
        company_id: &str,
        name: &str,
        owner_name: &str,
    ) -> AppResult<(Company, UserProfile)> {
        let company_id = CompanyId::new(company_id)?;
        let name = NonEmptyString::new(name.trim())?;
        let owner_name = NonEmptyString::new(owner_name.trim())?;

        let _guard = self.serializer.acquire().await;
        let company = self.register_locked(caller, company_id, name).await?;
        let owner = bootstrap_owner(
            self.members.as_ref(),
            self.audit.as_ref(),
            caller,
            &company,
            owner_name,
        )
        .await?;

        Ok((company, owner.profile()))
    }

    /// Returns whether a company id is registered. Malformed ids are never registered.
    pub async fn company_exists(&self, company_id: &str) -> AppResult<bool> {
        let Ok(company_id) = CompanyId::new(company_id) else {
            return Ok(false);
        };

        Ok(self.companies.find_company(&company_id).await?.is_some())
    }

    /// Finds a registered company.
    pub async fn find_company(&self, company_id: &str) -> AppResult<Option<Company>> {
        let Ok(company_id) = CompanyId::new(company_id) else {
            return Ok(None);
        };

        self.companies.find_company(&company_id).await
    }

    async fn register_locked(
        &self,
        caller: &CallerIdentity,
        company_id: CompanyId,
        name: NonEmptyString,
    ) -> AppResult<Company> {
        if self.members.find_member(caller).await?.is_some() {
            return Err(AppError::Duplicate(
                "caller already belongs to a company".to_owned(),
            ));
        }

        if let Some(pending) = self.companies.find_company_registered_by(caller).await? {
            return Err(AppError::Duplicate(format!(
                "caller already registered company '{}'",
                pending.company_id
            )));
        }

        if self.companies.find_company(&company_id).await?.is_some() {
            return Err(AppError::Duplicate(format!(
                "company '{company_id}' already exists"
            )));
        }

        let company = Company::new(company_id, name, caller.clone(), self.clock.now());
        self.companies.create_company(company.clone()).await?;

        self.audit
            .append_event(AuditEvent {
                company_id: Some(company.company_id.clone()),
                subject: caller.clone(),
                action: AuditAction::CompanyRegistered,
                resource_type: "company".to_owned(),
                resource_id: company.company_id.to_string(),
                detail: Some(company.name.to_string()),
            })
            .await?;

        Ok(company)
    }
}
