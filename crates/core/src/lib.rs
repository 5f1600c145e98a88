//! Shared primitives for all Rust crates in Tessera.

#![forbid(unsafe_code)]

/// Caller identity primitives supplied by the external identity provider.
pub mod auth;
/// Nanosecond-precision timestamps.
pub mod time;

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::CallerIdentity;
pub use time::Timestamp;

/// Result type used across Tessera crates.
pub type AppResult<T> = Result<T, AppError>;

/// Maximum length of externally supplied record keys such as company ids.
pub const RECORD_KEY_MAX_LENGTH: usize = 64;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::Validation(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Validates an externally supplied record key and returns its trimmed form.
///
/// Keys are 1 to [`RECORD_KEY_MAX_LENGTH`] ASCII characters drawn from
/// letters, digits, `-` and `_`.
pub fn validate_record_key(label: &str, value: impl Into<String>) -> AppResult<String> {
    let value = value.into();
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{label} must not be empty")));
    }

    if trimmed.len() > RECORD_KEY_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "{label} must not exceed {RECORD_KEY_MAX_LENGTH} characters"
        )));
    }

    if !trimmed
        .chars()
        .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_'))
    {
        return Err(AppError::Validation(format!(
            "{label} may only contain letters, digits, '-' and '_'"
        )));
    }

    Ok(trimmed.to_owned())
}

/// Company identifier used as the partition key for every persisted resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompanyId(String);

impl CompanyId {
    /// Creates a validated company identifier.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        validate_record_key("company id", value).map(Self)
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for CompanyId {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CompanyId> for String {
    fn from(value: CompanyId) -> Self {
        value.0
    }
}

impl Display for CompanyId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Stable machine-readable error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input or violated invariant.
    Validation,
    /// Record already exists.
    Duplicate,
    /// Record absent in the caller's company.
    NotFound,
    /// No profile resolves for the caller.
    Unauthenticated,
    /// Caller profile is deactivated.
    Inactive,
    /// Capability or role rule denies the action.
    Unauthorized,
    /// Target belongs to another company.
    CrossTenant,
    /// Invite code is unknown.
    InvalidCode,
    /// Invite code validity has elapsed.
    Expired,
    /// Invite code was already redeemed.
    AlreadyUsed,
    /// No caller identity reached the service.
    SessionUnavailable,
    /// Infrastructure failure.
    Internal,
}

impl ErrorKind {
    /// Returns the stable transport value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Duplicate => "duplicate",
            Self::NotFound => "not_found",
            Self::Unauthenticated => "unauthenticated",
            Self::Inactive => "inactive",
            Self::Unauthorized => "unauthorized",
            Self::CrossTenant => "cross_tenant",
            Self::InvalidCode => "invalid_code",
            Self::Expired => "expired",
            Self::AlreadyUsed => "already_used",
            Self::SessionUnavailable => "session_unavailable",
            Self::Internal => "internal",
        }
    }
}

/// Common application error categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Company, personnel or other record id already exists.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// Requested resource does not exist in the caller's company.
    #[error("not found: {0}")]
    NotFound(String),

    /// Caller has no resolvable profile.
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    /// Caller profile exists but is deactivated.
    #[error("inactive: {0}")]
    Inactive(String),

    /// Caller is missing a capability or violates a role rule.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Target company differs from the caller's company.
    #[error("cross-tenant access denied: {0}")]
    CrossTenant(String),

    /// Invite code is unknown.
    #[error("invalid invite code")]
    InvalidCode,

    /// Invite code is past its expiry.
    #[error("invite code expired")]
    Expired,

    /// Invite code was already consumed.
    #[error("invite code already used")]
    AlreadyUsed,

    /// No active session or caller identity reached the service.
    #[error("session unavailable: {0}")]
    SessionUnavailable(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Duplicate(_) => ErrorKind::Duplicate,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unauthenticated(_) => ErrorKind::Unauthenticated,
            Self::Inactive(_) => ErrorKind::Inactive,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::CrossTenant(_) => ErrorKind::CrossTenant,
            Self::InvalidCode => ErrorKind::InvalidCode,
            Self::Expired => ErrorKind::Expired,
            Self::AlreadyUsed => ErrorKind::AlreadyUsed,
            Self::SessionUnavailable(_) => ErrorKind::SessionUnavailable,
            Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns whether this error denies access at the tenancy boundary.
    ///
    /// `NotFound` and `CrossTenant` must look identical to callers.
    #[must_use]
    pub fn is_tenancy_denial(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::CrossTenant(_))
    }

    /// Returns whether this error stems from infrastructure rather than a business rule.
    #[must_use]
    pub fn is_infrastructural(&self) -> bool {
        matches!(self, Self::SessionUnavailable(_) | Self::Internal(_))
    }
}
