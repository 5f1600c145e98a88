use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId, Timestamp};

use crate::CompanyRole;

/// Stored digest of an invite code. The raw code is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCodeHash(String);

impl InviteCodeHash {
    /// Wraps a lowercase hex digest.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty()
            || !value
                .chars()
                .all(|character| matches!(character, '0'..='9' | 'a'..='f'))
        {
            return Err(AppError::Validation(
                "invite code hash must be lowercase hex".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the digest string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns a short non-secret reference for listings and logs.
    #[must_use]
    pub fn reference(&self) -> &str {
        let end = self.0.len().min(12);
        &self.0[..end]
    }
}

impl TryFrom<String> for InviteCodeHash {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InviteCodeHash> for String {
    fn from(value: InviteCodeHash) -> Self {
        value.0
    }
}

impl Display for InviteCodeHash {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.reference())
    }
}

/// Lifecycle of an invite code. Both non-active states are terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InviteState {
    /// Redeemable until `expires_at`.
    Active,
    /// Redeemed once.
    Consumed {
        /// Identity that redeemed the code.
        consumed_by: CallerIdentity,
        /// Redemption time.
        consumed_at: Timestamp,
    },
    /// Observed past its expiry at a redemption attempt.
    Expired {
        /// Time the expiry was observed.
        observed_at: Timestamp,
    },
}

/// Point-in-time status of an invite as shown in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InviteStatus {
    /// Still redeemable.
    Active,
    /// Already redeemed.
    Consumed,
    /// Past its expiry.
    Expired,
}

impl InviteStatus {
    /// Returns a stable storage value for this status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Consumed => "consumed",
            Self::Expired => "expired",
        }
    }
}

/// Membership granted by a successful redemption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteGrant {
    /// Company the redeemer joins.
    pub company_id: CompanyId,
    /// Role the redeemer receives.
    pub role: CompanyRole,
}

/// Company- and role-scoped single-use onboarding token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InviteCode {
    code_hash: InviteCodeHash,
    company_id: CompanyId,
    target_role: CompanyRole,
    issued_by: CallerIdentity,
    issued_at: Timestamp,
    expires_at: Timestamp,
    state: InviteState,
}

impl InviteCode {
    /// Issues a new active invite expiring `validity_nanos` after `issued_at`.
    pub fn issue(
        code_hash: InviteCodeHash,
        company_id: CompanyId,
        target_role: CompanyRole,
        issued_by: CallerIdentity,
        issued_at: Timestamp,
        validity_nanos: i64,
    ) -> AppResult<Self> {
        if target_role == CompanyRole::Owner {
            return Err(AppError::Validation(
                "owner invites cannot be issued".to_owned(),
            ));
        }

        if validity_nanos < 0 {
            return Err(AppError::Validation(
                "invite validity must not be negative".to_owned(),
            ));
        }

        let expires_at = issued_at.checked_add_nanos(validity_nanos).ok_or_else(|| {
            AppError::Validation("invite validity exceeds the timestamp range".to_owned())
        })?;

        Ok(Self {
            code_hash,
            company_id,
            target_role,
            issued_by,
            issued_at,
            expires_at,
            state: InviteState::Active,
        })
    }

    /// Rebuilds an invite from persisted columns.
    #[must_use]
    pub fn restore(
        code_hash: InviteCodeHash,
        company_id: CompanyId,
        target_role: CompanyRole,
        issued_by: CallerIdentity,
        issued_at: Timestamp,
        expires_at: Timestamp,
        state: InviteState,
    ) -> Self {
        Self {
            code_hash,
            company_id,
            target_role,
            issued_by,
            issued_at,
            expires_at,
            state,
        }
    }

    /// Returns the stored digest.
    #[must_use]
    pub fn code_hash(&self) -> &InviteCodeHash {
        &self.code_hash
    }

    /// Returns the issuing company.
    #[must_use]
    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    /// Returns the role granted on redemption.
    #[must_use]
    pub fn target_role(&self) -> CompanyRole {
        self.target_role
    }

    /// Returns the issuer identity.
    #[must_use]
    pub fn issued_by(&self) -> &CallerIdentity {
        &self.issued_by
    }

    /// Returns the issue time.
    #[must_use]
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }

    /// Returns the last instant at which the code is redeemable.
    #[must_use]
    pub fn expires_at(&self) -> Timestamp {
        self.expires_at
    }

    /// Returns the persisted lifecycle state.
    #[must_use]
    pub fn state(&self) -> &InviteState {
        &self.state
    }

    /// Returns the status as observed at `now`, without mutating state.
    #[must_use]
    pub fn status_at(&self, now: Timestamp) -> InviteStatus {
        match self.state {
            InviteState::Consumed { .. } => InviteStatus::Consumed,
            InviteState::Expired { .. } => InviteStatus::Expired,
            InviteState::Active if now > self.expires_at => InviteStatus::Expired,
            InviteState::Active => InviteStatus::Active,
        }
    }

    /// Verifies the code can be redeemed at `now`.
    ///
    /// An active code found past its expiry moves to `Expired` before the
    /// error is returned, so callers should persist the invite on `Expired`.
    pub fn check_redeemable(&mut self, now: Timestamp) -> AppResult<()> {
        match self.state {
            InviteState::Consumed { .. } => Err(AppError::AlreadyUsed),
            InviteState::Expired { .. } => Err(AppError::Expired),
            InviteState::Active if now > self.expires_at => {
                self.state = InviteState::Expired { observed_at: now };
                Err(AppError::Expired)
            }
            InviteState::Active => Ok(()),
        }
    }

    /// Consumes the code for `redeemer`.
    pub fn consume(&mut self, redeemer: CallerIdentity, now: Timestamp) -> AppResult<InviteGrant> {
        self.check_redeemable(now)?;
        self.state = InviteState::Consumed {
            consumed_by: redeemer,
            consumed_at: now,
        };

        Ok(InviteGrant {
            company_id: self.company_id.clone(),
            role: self.target_role,
        })
    }
}
