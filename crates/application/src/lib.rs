//! Application services and ports.

#![forbid(unsafe_code)]

mod announcement_service;
mod authorization_gate;
mod company_service;
mod invite_code_service;
mod personnel_service;
mod profile_service;
mod report_service;
mod system_role_service;
mod task_service;
mod tenancy_ports;
mod tenancy_services;
mod write_serializer;

pub use announcement_service::{AnnouncementService, NewAnnouncement};
pub use authorization_gate::{AuthorizationGate, CallerContext};
pub use company_service::CompanyService;
pub use invite_code_service::{
    DEFAULT_INVITE_MAX_VALIDITY_SECONDS, InviteCodeService, InviteSettings, InviteSummary,
    IssuedInvite,
};
pub use personnel_service::{NewPersonnel, PersonnelService, PersonnelUpdate};
pub use profile_service::ProfileService;
pub use report_service::ReportService;
pub use system_role_service::SystemRoleService;
pub use task_service::{NewTask, TaskService, TaskUpdate};
pub use tenancy_ports::{
    AnnouncementRepository, AuditEvent, AuditRepository, Clock, CompanyRepository,
    InviteCodeRepository, InviteRedemption, MemberRepository, SystemRoleRepository,
    TaskRepository, TenancyPorts,
};
pub use tenancy_services::TenancyServices;
pub use write_serializer::{WriteGuard, WriteSerializer};
