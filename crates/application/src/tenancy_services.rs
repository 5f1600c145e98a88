use std::sync::Arc;

use crate::{
    AnnouncementService, AuthorizationGate, Clock, CompanyService, InviteCodeService,
    InviteSettings, PersonnelService, ProfileService, ReportService, SystemRoleService,
    TaskService, TenancyPorts, WriteSerializer,
};

/// All tenancy services wired to one set of ports.
///
/// Every service shares a single write serializer and authorization gate.
#[derive(Clone)]
pub struct TenancyServices {
    /// Company registration.
    pub companies: CompanyService,
    /// Profile resolution and self-edits.
    pub profiles: ProfileService,
    /// Platform-wide roles.
    pub system_roles: SystemRoleService,
    /// Invite issuance and redemption.
    pub invites: InviteCodeService,
    /// Personnel administration.
    pub personnel: PersonnelService,
    /// Tasks.
    pub tasks: TaskService,
    /// Announcements.
    pub announcements: AnnouncementService,
    /// Reports.
    pub reports: ReportService,
}

impl TenancyServices {
    /// Builds every service from the given ports.
    #[must_use]
    pub fn new(ports: TenancyPorts, clock: Arc<dyn Clock>, settings: InviteSettings) -> Self {
        let serializer = WriteSerializer::new();
        let gate = AuthorizationGate::new(ports.members.clone());

        Self {
            companies: CompanyService::new(
                ports.companies.clone(),
                ports.members.clone(),
                ports.audit.clone(),
                clock.clone(),
                serializer.clone(),
            ),
            profiles: ProfileService::new(
                ports.companies.clone(),
                ports.members.clone(),
                ports.audit.clone(),
                gate.clone(),
                serializer.clone(),
            ),
            system_roles: SystemRoleService::new(
                ports.system_roles.clone(),
                ports.audit.clone(),
                serializer.clone(),
            ),
            invites: InviteCodeService::new(
                ports.invites.clone(),
                ports.audit.clone(),
                gate.clone(),
                clock.clone(),
                serializer.clone(),
                settings,
            ),
            personnel: PersonnelService::new(
                ports.members.clone(),
                ports.audit.clone(),
                gate.clone(),
                serializer.clone(),
            ),
            tasks: TaskService::new(
                ports.tasks.clone(),
                ports.members.clone(),
                gate.clone(),
                serializer.clone(),
            ),
            announcements: AnnouncementService::new(
                ports.announcements.clone(),
                gate.clone(),
                clock,
                serializer,
            ),
            reports: ReportService::new(ports.members, ports.tasks, ports.announcements, gate),
        }
    }
}
