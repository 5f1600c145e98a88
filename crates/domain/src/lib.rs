//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod announcement;
mod company;
mod ids;
mod invite;
mod report;
mod security;
mod task;
mod user;

pub use announcement::Announcement;
pub use company::Company;
pub use ids::{AnnouncementId, PersonnelId, TaskId};
pub use invite::{InviteCode, InviteCodeHash, InviteGrant, InviteState, InviteStatus};
pub use report::{
    AuthorizedPerformanceEntry, AuthorizedPerformanceReport, PersonnelActivityReport, Report,
    ReportKind, TaskCompletionReport,
};
pub use security::{AuditAction, Capability, CapabilitySet};
pub use task::{Task, TaskDraft, TaskStatus};
pub use user::{CompanyRole, Member, Personnel, SystemRole, UserProfile};
