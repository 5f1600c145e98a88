use tessera_core::AppResult;
use tessera_domain::{Capability, CapabilitySet, CompanyRole};

mod companies;
mod invites;
mod personnel;
mod records;
mod reports;

pub use companies::{
    AssignSystemRoleRequest, CompanyExistsResponse, CompanyResponse, HealthResponse,
    RegisterCompanyRequest, RegisterCompanyResponse, SystemRoleResponse, UserProfileDto,
};
pub use invites::{
    GenerateInviteRequest, InviteSummaryResponse, IssuedInviteResponse, RedeemInviteRequest,
};
pub use personnel::{
    CreatePersonnelRequest, PersonnelListQuery, PersonnelResponse, UpdatePersonnelRequest,
};
pub use records::{
    AnnouncementListQuery, AnnouncementResponse, CreateAnnouncementRequest, CreateTaskRequest,
    TaskListQuery, TaskResponse, UpdateTaskRequest,
};
pub use reports::ReportResponse;

fn parse_role(value: &str) -> AppResult<CompanyRole> {
    value.parse()
}

fn parse_capabilities(values: &[String]) -> AppResult<CapabilitySet> {
    values
        .iter()
        .map(|value| value.parse::<Capability>())
        .collect::<AppResult<Vec<_>>>()
        .map(CapabilitySet::from_capabilities)
}

fn capability_names(permissions: &CapabilitySet) -> Vec<String> {
    permissions
        .granted()
        .into_iter()
        .map(|capability| capability.as_str().to_owned())
        .collect()
}
