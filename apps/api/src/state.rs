use axum::http::HeaderName;
use tessera_application::{
    AnnouncementService, CompanyService, InviteCodeService, PersonnelService, ProfileService,
    ReportService, SystemRoleService, TaskService, TenancyServices,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub company_service: CompanyService,
    pub profile_service: ProfileService,
    pub system_role_service: SystemRoleService,
    pub invite_code_service: InviteCodeService,
    pub personnel_service: PersonnelService,
    pub task_service: TaskService,
    pub announcement_service: AnnouncementService,
    pub report_service: ReportService,
    pub identity_header: HeaderName,
    pub store_backend: &'static str,
}

impl AppState {
    pub fn new(
        services: TenancyServices,
        identity_header: HeaderName,
        store_backend: &'static str,
    ) -> Self {
        Self {
            company_service: services.companies,
            profile_service: services.profiles,
            system_role_service: services.system_roles,
            invite_code_service: services.invites,
            personnel_service: services.personnel,
            task_service: services.tasks,
            announcement_service: services.announcements,
            report_service: services.reports,
            identity_header,
            store_backend,
        }
    }
}
