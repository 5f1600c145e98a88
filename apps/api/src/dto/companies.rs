use serde::{Deserialize, Serialize};
use tessera_core::{AppError, CallerIdentity, CompanyId, NonEmptyString};
use tessera_domain::{Company, SystemRole, UserProfile};
use ts_rs::TS;

use super::{capability_names, parse_capabilities, parse_role};

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: &'static str,
}

/// Incoming payload for company registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/register-company-request.ts"
)]
pub struct RegisterCompanyRequest {
    pub company_id: String,
    pub name: String,
    /// When present the caller is bootstrapped as owner in the same step.
    pub owner_name: Option<String>,
}

/// API representation of a company.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/company-response.ts"
)]
pub struct CompanyResponse {
    pub company_id: String,
    pub name: String,
    pub registered_by: String,
    pub registered_at: i64,
}

impl From<Company> for CompanyResponse {
    fn from(company: Company) -> Self {
        Self {
            company_id: company.company_id.as_str().to_owned(),
            name: company.name.as_str().to_owned(),
            registered_by: company.registered_by.as_str().to_owned(),
            registered_at: company.registered_at.as_nanos(),
        }
    }
}

/// Registration result with the optional bootstrapped owner.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/register-company-response.ts"
)]
pub struct RegisterCompanyResponse {
    pub company: CompanyResponse,
    pub owner: Option<UserProfileDto>,
}

/// Company existence probe result.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/company-exists-response.ts"
)]
pub struct CompanyExistsResponse {
    pub exists: bool,
}

/// Profile payload used for both reads and writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-profile.ts"
)]
pub struct UserProfileDto {
    pub company_id: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub active: bool,
}

impl From<UserProfile> for UserProfileDto {
    fn from(profile: UserProfile) -> Self {
        Self {
            company_id: profile.company_id.as_str().to_owned(),
            name: profile.name.as_str().to_owned(),
            role: profile.role.as_str().to_owned(),
            permissions: capability_names(&profile.permissions),
            active: profile.active,
        }
    }
}

impl TryFrom<UserProfileDto> for UserProfile {
    type Error = AppError;

    fn try_from(value: UserProfileDto) -> Result<Self, Self::Error> {
        Ok(Self {
            company_id: CompanyId::new(value.company_id)?,
            name: NonEmptyString::new(value.name.trim())?,
            role: parse_role(value.role.as_str())?,
            permissions: parse_capabilities(&value.permissions)?,
            active: value.active,
        })
    }
}

/// System role of one identity.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/system-role-response.ts"
)]
pub struct SystemRoleResponse {
    pub identity: String,
    pub role: String,
    pub is_admin: bool,
}

impl SystemRoleResponse {
    #[must_use]
    pub fn new(identity: &CallerIdentity, role: SystemRole) -> Self {
        Self {
            identity: identity.as_str().to_owned(),
            role: role.as_str().to_owned(),
            is_admin: role == SystemRole::Admin,
        }
    }
}

/// Incoming payload for system role assignment.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/assign-system-role-request.ts"
)]
pub struct AssignSystemRoleRequest {
    pub role: String,
}
