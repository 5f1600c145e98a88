//! Company members, their roles and the profile/personnel projections.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId, NonEmptyString};

use crate::{CapabilitySet, PersonnelId};

/// Business hierarchy role inside one company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompanyRole {
    /// Registered the company; manages everyone else.
    Owner,
    /// Manages employees.
    Manager,
    /// Manages nobody.
    Employee,
}

impl CompanyRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Manager => "manager",
            Self::Employee => "employee",
        }
    }

    /// Returns all company roles, highest first.
    #[must_use]
    pub fn all() -> &'static [Self] {
        &[Self::Owner, Self::Manager, Self::Employee]
    }

    /// Returns whether a member with this role may manage members holding `other`.
    ///
    /// Owner manages Manager and Employee; Manager manages Employee.
    #[must_use]
    pub fn can_manage(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Owner, Self::Manager | Self::Employee) | (Self::Manager, Self::Employee)
        )
    }

    /// Returns whether a member with this role may issue invites for `target`.
    #[must_use]
    pub fn can_issue_invite_for(self, target: Self) -> bool {
        self.can_manage(target)
    }
}

impl FromStr for CompanyRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "manager" => Ok(Self::Manager),
            "employee" => Ok(Self::Employee),
            _ => Err(AppError::Validation(format!(
                "unknown company role '{value}'"
            ))),
        }
    }
}

/// Platform-wide role, stored apart from any company membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemRole {
    /// Platform administrator.
    Admin,
    /// Regular platform user.
    #[default]
    User,
    /// Restricted platform guest.
    Guest,
}

impl SystemRole {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Guest => "guest",
        }
    }
}

impl FromStr for SystemRole {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "guest" => Ok(Self::Guest),
            _ => Err(AppError::Validation(format!(
                "unknown system role '{value}'"
            ))),
        }
    }
}

/// The single source of truth for one identity's membership in a company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    identity: CallerIdentity,
    company_id: CompanyId,
    personnel_id: Option<PersonnelId>,
    name: NonEmptyString,
    role: CompanyRole,
    permissions: CapabilitySet,
    active: bool,
}

impl Member {
    /// Creates an active member seeded with the role's default capabilities.
    #[must_use]
    pub fn new(
        identity: CallerIdentity,
        company_id: CompanyId,
        name: NonEmptyString,
        role: CompanyRole,
    ) -> Self {
        Self {
            identity,
            company_id,
            personnel_id: None,
            name,
            role,
            permissions: CapabilitySet::for_role(role),
            active: true,
        }
    }

    /// Rebuilds a member from persisted columns.
    #[must_use]
    pub fn restore(
        identity: CallerIdentity,
        company_id: CompanyId,
        personnel_id: Option<PersonnelId>,
        name: NonEmptyString,
        role: CompanyRole,
        permissions: CapabilitySet,
        active: bool,
    ) -> Self {
        Self {
            identity,
            company_id,
            personnel_id,
            name,
            role,
            permissions,
            active,
        }
    }

    /// Attaches a personnel record id.
    #[must_use]
    pub fn with_personnel_id(mut self, personnel_id: PersonnelId) -> Self {
        self.personnel_id = Some(personnel_id);
        self
    }

    /// Overrides the capability set.
    #[must_use]
    pub fn with_permissions(mut self, permissions: CapabilitySet) -> Self {
        self.permissions = permissions;
        self
    }

    /// Returns the bound identity.
    #[must_use]
    pub fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    /// Returns the owning company. Fixed for the member's lifetime.
    #[must_use]
    pub fn company_id(&self) -> &CompanyId {
        &self.company_id
    }

    /// Returns the attached personnel record id, if any.
    #[must_use]
    pub fn personnel_id(&self) -> Option<&PersonnelId> {
        self.personnel_id.as_ref()
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the company role.
    #[must_use]
    pub fn role(&self) -> CompanyRole {
        self.role
    }

    /// Returns the stored capability flags.
    #[must_use]
    pub fn permissions(&self) -> &CapabilitySet {
        &self.permissions
    }

    /// Returns whether the member is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Changes the display name.
    pub fn rename(&mut self, name: NonEmptyString) {
        self.name = name;
    }

    /// Changes the company role. Capabilities are left untouched.
    pub fn set_role(&mut self, role: CompanyRole) {
        self.role = role;
    }

    /// Replaces the capability flags.
    pub fn set_permissions(&mut self, permissions: CapabilitySet) {
        self.permissions = permissions;
    }

    /// Activates or deactivates the member.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Attaches a personnel record, failing when one is already attached.
    pub fn attach_personnel(&mut self, personnel_id: PersonnelId) -> AppResult<()> {
        if let Some(existing) = &self.personnel_id {
            return Err(AppError::Duplicate(format!(
                "identity is already bound to personnel '{existing}'"
            )));
        }

        self.personnel_id = Some(personnel_id);
        Ok(())
    }

    /// Detaches the personnel record and deactivates the member.
    pub fn detach_personnel(&mut self) {
        self.personnel_id = None;
        self.active = false;
    }

    /// Returns the caller-facing profile projection.
    #[must_use]
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            company_id: self.company_id.clone(),
            name: self.name.clone(),
            role: self.role,
            permissions: self.permissions,
            active: self.active,
        }
    }

    /// Returns the admin-facing personnel projection when a record is attached.
    #[must_use]
    pub fn personnel(&self) -> Option<Personnel> {
        self.personnel_id.as_ref().map(|id| Personnel {
            id: id.clone(),
            company_id: self.company_id.clone(),
            identity: self.identity.clone(),
            name: self.name.clone(),
            role: self.role,
            permissions: self.permissions,
            active: self.active,
        })
    }
}

/// Profile view of a member, keyed externally by identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: NonEmptyString,
    /// Company role.
    pub role: CompanyRole,
    /// Capability flags.
    pub permissions: CapabilitySet,
    /// Whether the profile is active.
    pub active: bool,
}

/// Personnel view of a member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personnel {
    /// Personnel record id.
    pub id: PersonnelId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Bound identity.
    pub identity: CallerIdentity,
    /// Display name.
    pub name: NonEmptyString,
    /// Company role.
    pub role: CompanyRole,
    /// Capability flags.
    pub permissions: CapabilitySet,
    /// Whether the member is active.
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use tessera_core::{AppError, CallerIdentity, CompanyId, NonEmptyString};

    use super::{CompanyRole, Member, SystemRole};
    use crate::{CapabilitySet, PersonnelId};

    fn member(role: CompanyRole) -> Member {
        Member::new(
            CallerIdentity::new("alice").unwrap_or_else(|_| unreachable!()),
            CompanyId::new("acme").unwrap_or_else(|_| unreachable!()),
            NonEmptyString::new("Alice").unwrap_or_else(|_| unreachable!()),
            role,
        )
    }

    #[test]
    fn role_hierarchy_is_strict() {
        assert!(CompanyRole::Owner.can_manage(CompanyRole::Manager));
        assert!(CompanyRole::Owner.can_manage(CompanyRole::Employee));
        assert!(!CompanyRole::Owner.can_manage(CompanyRole::Owner));
        assert!(CompanyRole::Manager.can_manage(CompanyRole::Employee));
        assert!(!CompanyRole::Manager.can_manage(CompanyRole::Manager));
        assert!(!CompanyRole::Employee.can_issue_invite_for(CompanyRole::Employee));
    }

    #[test]
    fn company_role_parses_case_insensitively() {
        assert_eq!(CompanyRole::from_str("Manager"), Ok(CompanyRole::Manager));
        assert!(CompanyRole::from_str("boss").is_err());
    }

    #[test]
    fn system_role_defaults_to_user() {
        assert_eq!(SystemRole::default(), SystemRole::User);
        assert_eq!(SystemRole::from_str("admin"), Ok(SystemRole::Admin));
    }

    #[test]
    fn new_member_uses_role_defaults() {
        let employee = member(CompanyRole::Employee);
        assert_eq!(
            employee.permissions(),
            &CapabilitySet::for_role(CompanyRole::Employee)
        );
        assert!(employee.is_active());
        assert!(employee.personnel().is_none());
    }

    #[test]
    fn projections_stay_consistent_after_edits() {
        let mut owner = member(CompanyRole::Owner).with_personnel_id(PersonnelId::generate());
        owner.set_active(false);
        owner.rename(NonEmptyString::new("Alicia").unwrap_or_else(|_| unreachable!()));

        let profile = owner.profile();
        let personnel = owner.personnel();
        assert_eq!(personnel.as_ref().map(|value| value.active), Some(false));
        assert_eq!(
            personnel.map(|value| value.name),
            Some(profile.name.clone())
        );
        assert!(!profile.active);
    }

    #[test]
    fn attaching_twice_is_duplicate() {
        let mut owner = member(CompanyRole::Owner).with_personnel_id(PersonnelId::generate());
        let result = owner.attach_personnel(PersonnelId::generate());
        assert!(matches!(result, Err(AppError::Duplicate(_))));

        owner.detach_personnel();
        assert!(!owner.is_active());
        assert!(owner.attach_personnel(PersonnelId::generate()).is_ok());
    }
}
