//! Invite code issuance and redemption.
//!
//! Codes are 32 random bytes rendered as hex. Only their SHA-256 digest is
//! stored, and the raw code is returned once at issuance.

use std::sync::Arc;

use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId, NonEmptyString, Timestamp};
use tessera_domain::{
    AuditAction, Capability, CompanyRole, InviteCode, InviteStatus, PersonnelId, UserProfile,
};

use crate::{
    AuditEvent, AuditRepository, AuthorizationGate, Clock, InviteCodeRepository, InviteRedemption,
    WriteSerializer,
};

mod token_crypto;

use token_crypto::{generate_code, hash_code};

/// Default upper bound on invite validity: 30 days.
pub const DEFAULT_INVITE_MAX_VALIDITY_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Tunables for invite issuance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InviteSettings {
    /// Longest accepted validity in nanoseconds.
    pub max_validity_nanos: i64,
}

impl InviteSettings {
    /// Builds settings from a maximum validity in seconds.
    pub fn from_max_validity_seconds(seconds: i64) -> AppResult<Self> {
        let max_validity_nanos = seconds
            .checked_mul(tessera_core::time::NANOS_PER_SECOND)
            .filter(|nanos| *nanos >= 0)
            .ok_or_else(|| {
                AppError::Validation(format!("invite max validity '{seconds}' is out of range"))
            })?;

        Ok(Self { max_validity_nanos })
    }
}

impl Default for InviteSettings {
    fn default() -> Self {
        Self {
            max_validity_nanos: DEFAULT_INVITE_MAX_VALIDITY_SECONDS
                * tessera_core::time::NANOS_PER_SECOND,
        }
    }
}

/// Freshly issued invite including the one-time raw code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedInvite {
    /// Raw code to hand to the invitee. Not recoverable later.
    pub code: String,
    /// Company the invitee joins.
    pub company_id: CompanyId,
    /// Role the invitee receives.
    pub target_role: CompanyRole,
    /// Last redeemable instant.
    pub expires_at: Timestamp,
}

/// Listing view of an invite. Never carries the raw code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteSummary {
    /// Short digest prefix identifying the invite.
    pub reference: String,
    /// Role granted on redemption.
    pub target_role: CompanyRole,
    /// Issuer identity.
    pub issued_by: CallerIdentity,
    /// Issue time.
    pub issued_at: Timestamp,
    /// Last redeemable instant.
    pub expires_at: Timestamp,
    /// Status observed now.
    pub status: InviteStatus,
}

/// Application service for invite codes.
#[derive(Clone)]
pub struct InviteCodeService {
    invites: Arc<dyn InviteCodeRepository>,
    audit: Arc<dyn AuditRepository>,
    gate: AuthorizationGate,
    clock: Arc<dyn Clock>,
    serializer: WriteSerializer,
    settings: InviteSettings,
}

impl InviteCodeService {
    /// Creates an invite code service.
    #[must_use]
    pub fn new(
        invites: Arc<dyn InviteCodeRepository>,
        audit: Arc<dyn AuditRepository>,
        gate: AuthorizationGate,
        clock: Arc<dyn Clock>,
        serializer: WriteSerializer,
        settings: InviteSettings,
    ) -> Self {
        Self {
            invites,
            audit,
            gate,
            clock,
            serializer,
            settings,
        }
    }

    /// Issues a single-use code for `target_role` in the issuer's company.
    ///
    /// Owners may invite managers and employees; managers may invite employees.
    pub async fn generate_code(
        &self,
        issuer: &CallerIdentity,
        target_role: CompanyRole,
        validity_nanos: i64,
    ) -> AppResult<IssuedInvite> {
        let _guard = self.serializer.acquire().await;

        let context = self.gate.resolve_active(issuer).await?;
        if !context.role.can_issue_invite_for(target_role) {
            return Err(AppError::Unauthorized(format!(
                "role '{}' cannot issue invites for role '{}'",
                context.role.as_str(),
                target_role.as_str()
            )));
        }

        if validity_nanos > self.settings.max_validity_nanos {
            return Err(AppError::Validation(format!(
                "invite validity must not exceed {} seconds",
                self.settings.max_validity_nanos / tessera_core::time::NANOS_PER_SECOND
            )));
        }

        let (code, code_hash) = generate_code()?;
        let invite = InviteCode::issue(
            code_hash,
            context.company_id.clone(),
            target_role,
            issuer.clone(),
            self.clock.now(),
            validity_nanos,
        )?;
        let expires_at = invite.expires_at();
        let reference = invite.code_hash().reference().to_owned();
        self.invites.create_invite(invite).await?;

        self.audit
            .append_event(AuditEvent {
                company_id: Some(context.company_id.clone()),
                subject: issuer.clone(),
                action: AuditAction::InviteIssued,
                resource_type: "invite".to_owned(),
                resource_id: reference,
                detail: Some(target_role.as_str().to_owned()),
            })
            .await?;

        Ok(IssuedInvite {
            code,
            company_id: context.company_id,
            target_role,
            expires_at,
        })
    }

    /// Redeems a code, creating the caller's profile in the invite's company.
    ///
    /// Exactly one of any number of concurrent redemptions of one code succeeds;
    /// the others fail with `AlreadyUsed`.
    pub async fn redeem_code(
        &self,
        caller: &CallerIdentity,
        code: &str,
        user_name: &str,
    ) -> AppResult<UserProfile> {
        let display_name = NonEmptyString::new(user_name.trim())?;
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::InvalidCode);
        }

        let _guard = self.serializer.acquire().await;

        let member = self
            .invites
            .redeem_invite(InviteRedemption {
                code_hash: hash_code(code)?,
                identity: caller.clone(),
                display_name,
                personnel_id: PersonnelId::generate(),
                redeemed_at: self.clock.now(),
            })
            .await?;
        let personnel_id = member.personnel_id().ok_or_else(|| {
            AppError::Internal("redeemed member has no personnel record".to_owned())
        })?;

        self.audit
            .append_event(AuditEvent {
                company_id: Some(member.company_id().clone()),
                subject: caller.clone(),
                action: AuditAction::InviteRedeemed,
                resource_type: "personnel".to_owned(),
                resource_id: personnel_id.to_string(),
                detail: Some(member.role().as_str().to_owned()),
            })
            .await?;

        Ok(member.profile())
    }

    /// Lists the caller's company invites with their current status.
    pub async fn list_invites(&self, caller: &CallerIdentity) -> AppResult<Vec<InviteSummary>> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::PersonnelView)
            .await?;
        if context.role == CompanyRole::Employee {
            return Err(AppError::Unauthorized(
                "employees cannot list invites".to_owned(),
            ));
        }

        let now = self.clock.now();
        let mut invites = self.invites.list_invites(&context.company_id).await?;
        invites.sort_by_key(|invite| std::cmp::Reverse(invite.issued_at()));

        Ok(invites
            .into_iter()
            .map(|invite| InviteSummary {
                reference: invite.code_hash().reference().to_owned(),
                target_role: invite.target_role(),
                issued_by: invite.issued_by().clone(),
                issued_at: invite.issued_at(),
                expires_at: invite.expires_at(),
                status: invite.status_at(now),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests;
