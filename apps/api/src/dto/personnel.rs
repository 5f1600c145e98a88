use serde::{Deserialize, Serialize};
use tessera_application::{NewPersonnel, PersonnelUpdate};
use tessera_core::{AppError, CallerIdentity, NonEmptyString};
use tessera_domain::{Personnel, PersonnelId};
use ts_rs::TS;

use super::{capability_names, parse_capabilities, parse_role};

/// Incoming payload for personnel creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-personnel-request.ts"
)]
pub struct CreatePersonnelRequest {
    pub id: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub identity: String,
}

impl TryFrom<CreatePersonnelRequest> for NewPersonnel {
    type Error = AppError;

    fn try_from(value: CreatePersonnelRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PersonnelId::new(value.id)?,
            name: NonEmptyString::new(value.name.trim())?,
            role: parse_role(value.role.as_str())?,
            permissions: parse_capabilities(&value.permissions)?,
            identity: CallerIdentity::new(value.identity)?,
        })
    }
}

/// Incoming payload for personnel edits.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-personnel-request.ts"
)]
pub struct UpdatePersonnelRequest {
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub active: bool,
}

impl TryFrom<UpdatePersonnelRequest> for PersonnelUpdate {
    type Error = AppError;

    fn try_from(value: UpdatePersonnelRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            name: NonEmptyString::new(value.name.trim())?,
            role: parse_role(value.role.as_str())?,
            permissions: parse_capabilities(&value.permissions)?,
            active: value.active,
        })
    }
}

/// API representation of a personnel record.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/personnel-response.ts"
)]
pub struct PersonnelResponse {
    pub id: String,
    pub company_id: String,
    pub identity: String,
    pub name: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub active: bool,
}

impl From<Personnel> for PersonnelResponse {
    fn from(personnel: Personnel) -> Self {
        Self {
            id: personnel.id.as_str().to_owned(),
            company_id: personnel.company_id.as_str().to_owned(),
            identity: personnel.identity.as_str().to_owned(),
            name: personnel.name.as_str().to_owned(),
            role: personnel.role.as_str().to_owned(),
            permissions: capability_names(&personnel.permissions),
            active: personnel.active,
        }
    }
}

/// Query string for personnel listings.
#[derive(Debug, Default, Deserialize)]
pub struct PersonnelListQuery {
    #[serde(default)]
    pub active: bool,
}
