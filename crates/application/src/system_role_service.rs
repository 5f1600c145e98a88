use std::sync::Arc;

use tessera_core::{AppError, AppResult, CallerIdentity};
use tessera_domain::{AuditAction, SystemRole};

use crate::{AuditEvent, AuditRepository, SystemRoleRepository, WriteSerializer};

/// Application service for the platform-wide role layer.
///
/// Never consulted by company-level authorization.
#[derive(Clone)]
pub struct SystemRoleService {
    repository: Arc<dyn SystemRoleRepository>,
    audit: Arc<dyn AuditRepository>,
    serializer: WriteSerializer,
}

impl SystemRoleService {
    /// Creates a system role service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SystemRoleRepository>,
        audit: Arc<dyn AuditRepository>,
        serializer: WriteSerializer,
    ) -> Self {
        Self {
            repository,
            audit,
            serializer,
        }
    }

    /// Returns an identity's system role, `User` when none is stored.
    pub async fn system_role(&self, identity: &CallerIdentity) -> AppResult<SystemRole> {
        Ok(self
            .repository
            .find_system_role(identity)
            .await?
            .unwrap_or_default())
    }

    /// Returns whether an identity is a platform administrator.
    pub async fn is_admin(&self, identity: &CallerIdentity) -> AppResult<bool> {
        Ok(self.system_role(identity).await? == SystemRole::Admin)
    }

    /// Assigns a system role. Only administrators may assign roles.
    pub async fn assign_system_role(
        &self,
        caller: &CallerIdentity,
        identity: &CallerIdentity,
        role: SystemRole,
    ) -> AppResult<()> {
        let _guard = self.serializer.acquire().await;

        if !self.is_admin(caller).await? {
            return Err(AppError::Unauthorized(
                "only system administrators may assign system roles".to_owned(),
            ));
        }

        self.repository.assign_system_role(identity, role).await?;
        self.audit
            .append_event(AuditEvent {
                company_id: None,
                subject: caller.clone(),
                action: AuditAction::SystemRoleAssigned,
                resource_type: "system_role".to_owned(),
                resource_id: identity.to_string(),
                detail: Some(role.as_str().to_owned()),
            })
            .await
    }

    /// Grants `Admin` to configured identities at startup.
    pub async fn seed_admins(&self, identities: &[CallerIdentity]) -> AppResult<()> {
        let _guard = self.serializer.acquire().await;

        for identity in identities {
            self.repository
                .assign_system_role(identity, SystemRole::Admin)
                .await?;
        }

        Ok(())
    }
}
