use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tessera_core::AppError;

use crate::CompanyRole;

/// Feature capabilities enforced by the authorization gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Allows listing and reading personnel records.
    PersonnelView,
    /// Allows adding personnel records.
    PersonnelAdd,
    /// Allows editing personnel records and their capabilities.
    PersonnelEdit,
    /// Allows removing personnel records.
    PersonnelDelete,
    /// Allows listing and reading tasks.
    TaskView,
    /// Allows creating tasks.
    TaskAdd,
    /// Allows editing tasks.
    TaskEdit,
    /// Allows deleting tasks.
    TaskDelete,
    /// Allows listing announcements.
    AnnouncementView,
    /// Allows publishing announcements.
    AnnouncementAdd,
    /// Allows editing announcements.
    AnnouncementEdit,
    /// Allows deleting announcements.
    AnnouncementDelete,
    /// Allows reading company reports.
    ReportView,
}

impl Capability {
    /// Returns a stable storage value for this capability.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonnelView => "personnel.view",
            Self::PersonnelAdd => "personnel.add",
            Self::PersonnelEdit => "personnel.edit",
            Self::PersonnelDelete => "personnel.delete",
            Self::TaskView => "task.view",
            Self::TaskAdd => "task.add",
            Self::TaskEdit => "task.edit",
            Self::TaskDelete => "task.delete",
            Self::AnnouncementView => "announcement.view",
            Self::AnnouncementAdd => "announcement.add",
            Self::AnnouncementEdit => "announcement.edit",
            Self::AnnouncementDelete => "announcement.delete",
            Self::ReportView => "report.view",
        }
    }

    /// Returns all known capabilities.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Capability] = &[
            Capability::PersonnelView,
            Capability::PersonnelAdd,
            Capability::PersonnelEdit,
            Capability::PersonnelDelete,
            Capability::TaskView,
            Capability::TaskAdd,
            Capability::TaskEdit,
            Capability::TaskDelete,
            Capability::AnnouncementView,
            Capability::AnnouncementAdd,
            Capability::AnnouncementEdit,
            Capability::AnnouncementDelete,
            Capability::ReportView,
        ];

        ALL
    }
}

impl FromStr for Capability {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|capability| capability.as_str() == value)
            .ok_or_else(|| AppError::Validation(format!("unknown capability value '{value}'")))
    }
}

/// Per-user bag of independent capability flags.
///
/// Stored as data on the member record. A role only seeds the initial value;
/// checks always read the stored flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySet {
    /// Personnel listing.
    pub personnel_view: bool,
    /// Personnel creation.
    pub personnel_add: bool,
    /// Personnel editing.
    pub personnel_edit: bool,
    /// Personnel removal.
    pub personnel_delete: bool,
    /// Task listing.
    pub task_view: bool,
    /// Task creation.
    pub task_add: bool,
    /// Task editing.
    pub task_edit: bool,
    /// Task removal.
    pub task_delete: bool,
    /// Announcement listing.
    pub announcement_view: bool,
    /// Announcement publishing.
    pub announcement_add: bool,
    /// Announcement editing.
    pub announcement_edit: bool,
    /// Announcement removal.
    pub announcement_delete: bool,
    /// Report access.
    pub report_view: bool,
}

impl CapabilitySet {
    /// Returns a set with every flag cleared.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns a set with every flag raised.
    #[must_use]
    pub fn all() -> Self {
        Self::from_capabilities(Capability::all().iter().copied())
    }

    /// Builds a set from granted capabilities.
    #[must_use]
    pub fn from_capabilities(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        let mut set = Self::none();
        for capability in capabilities {
            set.set(capability, true);
        }
        set
    }

    /// Returns the bootstrap default for a company role.
    #[must_use]
    pub fn for_role(role: CompanyRole) -> Self {
        match role {
            CompanyRole::Owner => Self::all(),
            CompanyRole::Manager => {
                let mut set = Self::all();
                set.set(Capability::PersonnelDelete, false);
                set
            }
            CompanyRole::Employee => {
                Self::from_capabilities([Capability::TaskView, Capability::AnnouncementView])
            }
        }
    }

    /// Returns whether the capability flag is raised.
    #[must_use]
    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::PersonnelView => self.personnel_view,
            Capability::PersonnelAdd => self.personnel_add,
            Capability::PersonnelEdit => self.personnel_edit,
            Capability::PersonnelDelete => self.personnel_delete,
            Capability::TaskView => self.task_view,
            Capability::TaskAdd => self.task_add,
            Capability::TaskEdit => self.task_edit,
            Capability::TaskDelete => self.task_delete,
            Capability::AnnouncementView => self.announcement_view,
            Capability::AnnouncementAdd => self.announcement_add,
            Capability::AnnouncementEdit => self.announcement_edit,
            Capability::AnnouncementDelete => self.announcement_delete,
            Capability::ReportView => self.report_view,
        }
    }

    /// Raises or clears one flag, leaving the others untouched.
    pub fn set(&mut self, capability: Capability, granted: bool) {
        let slot = match capability {
            Capability::PersonnelView => &mut self.personnel_view,
            Capability::PersonnelAdd => &mut self.personnel_add,
            Capability::PersonnelEdit => &mut self.personnel_edit,
            Capability::PersonnelDelete => &mut self.personnel_delete,
            Capability::TaskView => &mut self.task_view,
            Capability::TaskAdd => &mut self.task_add,
            Capability::TaskEdit => &mut self.task_edit,
            Capability::TaskDelete => &mut self.task_delete,
            Capability::AnnouncementView => &mut self.announcement_view,
            Capability::AnnouncementAdd => &mut self.announcement_add,
            Capability::AnnouncementEdit => &mut self.announcement_edit,
            Capability::AnnouncementDelete => &mut self.announcement_delete,
            Capability::ReportView => &mut self.report_view,
        };
        *slot = granted;
    }

    /// Lists raised flags in declaration order.
    #[must_use]
    pub fn granted(&self) -> Vec<Capability> {
        Capability::all()
            .iter()
            .copied()
            .filter(|capability| self.allows(*capability))
            .collect()
    }

    /// Lists flags raised here but not in `previous`.
    #[must_use]
    pub fn newly_granted(&self, previous: &Self) -> Vec<Capability> {
        self.granted()
            .into_iter()
            .filter(|capability| !previous.allows(*capability))
            .collect()
    }

    /// Returns whether every raised flag is also raised in `other`.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.granted()
            .into_iter()
            .all(|capability| other.allows(capability))
    }
}

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a company is registered.
    CompanyRegistered,
    /// Emitted when the registering identity becomes the company owner.
    CompanyOwnerBootstrapped,
    /// Emitted when a member renames their own profile.
    ProfileRenamed,
    /// Emitted when an invite code is issued.
    InviteIssued,
    /// Emitted when an invite code is redeemed.
    InviteRedeemed,
    /// Emitted when a personnel record is added.
    PersonnelAdded,
    /// Emitted when a personnel record is updated.
    PersonnelUpdated,
    /// Emitted when a personnel record is removed.
    PersonnelRemoved,
    /// Emitted when a system role is assigned.
    SystemRoleAssigned,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CompanyRegistered => "company.registered",
            Self::CompanyOwnerBootstrapped => "company.owner_bootstrapped",
            Self::ProfileRenamed => "profile.renamed",
            Self::InviteIssued => "invite.issued",
            Self::InviteRedeemed => "invite.redeemed",
            Self::PersonnelAdded => "personnel.added",
            Self::PersonnelUpdated => "personnel.updated",
            Self::PersonnelRemoved => "personnel.removed",
            Self::SystemRoleAssigned => "system_role.assigned",
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use proptest::prelude::*;

    use super::{Capability, CapabilitySet};
    use crate::CompanyRole;

    #[test]
    fn capability_roundtrip_storage_value() {
        for capability in Capability::all() {
            assert_eq!(Capability::from_str(capability.as_str()), Ok(*capability));
        }
    }

    #[test]
    fn unknown_capability_is_rejected() {
        assert!(Capability::from_str("personnel.promote").is_err());
    }

    #[test]
    fn there_are_thirteen_capabilities() {
        assert_eq!(Capability::all().len(), 13);
        assert_eq!(CapabilitySet::all().granted().len(), 13);
    }

    #[test]
    fn employee_defaults_are_not_owner_defaults() {
        let employee = CapabilitySet::for_role(CompanyRole::Employee);
        assert_ne!(employee, CapabilitySet::for_role(CompanyRole::Owner));
        assert!(employee.allows(Capability::TaskView));
        assert!(!employee.allows(Capability::TaskAdd));
        assert!(!employee.allows(Capability::ReportView));
    }

    #[test]
    fn manager_defaults_exclude_personnel_delete() {
        let manager = CapabilitySet::for_role(CompanyRole::Manager);
        assert!(manager.allows(Capability::PersonnelEdit));
        assert!(!manager.allows(Capability::PersonnelDelete));
        assert!(manager.is_subset_of(&CapabilitySet::all()));
    }

    #[test]
    fn newly_granted_lists_only_additions() {
        let previous = CapabilitySet::from_capabilities([Capability::TaskView]);
        let next =
            CapabilitySet::from_capabilities([Capability::TaskView, Capability::ReportView]);
        assert_eq!(next.newly_granted(&previous), vec![Capability::ReportView]);
        assert!(previous.newly_granted(&next).is_empty());
    }

    #[test]
    fn serializes_with_camel_case_flags() {
        let value = serde_json::to_value(CapabilitySet::from_capabilities([
            Capability::PersonnelView,
        ]));
        let personnel_view = value
            .ok()
            .and_then(|json| json.get("personnelView").cloned());
        assert_eq!(personnel_view, Some(serde_json::Value::Bool(true)));
    }

    fn capability_strategy() -> impl Strategy<Value = Capability> {
        proptest::sample::select(Capability::all().to_vec())
    }

    proptest! {
        #[test]
        fn setting_one_flag_leaves_others_untouched(
            seed in proptest::collection::vec(capability_strategy(), 0..13),
            target in capability_strategy(),
            granted in any::<bool>(),
        ) {
            let before = CapabilitySet::from_capabilities(seed);
            let mut after = before;
            after.set(target, granted);

            prop_assert_eq!(after.allows(target), granted);
            for capability in Capability::all() {
                if *capability != target {
                    prop_assert_eq!(after.allows(*capability), before.allows(*capability));
                }
            }
        }
    }
}
