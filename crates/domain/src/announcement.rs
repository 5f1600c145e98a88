use serde::{Deserialize, Serialize};
use tessera_core::{CallerIdentity, CompanyId, NonEmptyString, Timestamp};

use crate::{AnnouncementId, CompanyRole};

/// Company-wide notice, optionally addressed to one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Caller-chosen id, unique within the company.
    pub id: AnnouncementId,
    /// Owning company.
    pub company_id: CompanyId,
    /// Message body.
    pub content: NonEmptyString,
    /// Audience filter; `None` addresses every role.
    pub target_role: Option<CompanyRole>,
    /// Publication time.
    pub created_at: Timestamp,
    /// Publishing member.
    pub created_by: CallerIdentity,
}

impl Announcement {
    /// Returns whether a member holding `role` is part of the audience.
    ///
    /// Owners see every announcement of their company.
    #[must_use]
    pub fn is_visible_to(&self, role: CompanyRole) -> bool {
        role == CompanyRole::Owner || self.target_role.is_none_or(|target| target == role)
    }
}

#[cfg(test)]
mod tests {
    use tessera_core::{CallerIdentity, CompanyId, NonEmptyString, Timestamp};

    use super::Announcement;
    use crate::{AnnouncementId, CompanyRole};

    fn announcement(target_role: Option<CompanyRole>) -> Announcement {
        Announcement {
            id: AnnouncementId::new("a1").unwrap_or_else(|_| unreachable!()),
            company_id: CompanyId::new("acme").unwrap_or_else(|_| unreachable!()),
            content: NonEmptyString::new("Office closed").unwrap_or_else(|_| unreachable!()),
            target_role,
            created_at: Timestamp::from_nanos(0),
            created_by: CallerIdentity::new("alice").unwrap_or_else(|_| unreachable!()),
        }
    }

    #[test]
    fn untargeted_announcements_reach_everyone() {
        let notice = announcement(None);
        for role in CompanyRole::all() {
            assert!(notice.is_visible_to(*role));
        }
    }

    #[test]
    fn owner_targeted_announcement_is_hidden_from_managers() {
        let notice = announcement(Some(CompanyRole::Owner));
        assert!(!notice.is_visible_to(CompanyRole::Manager));
        assert!(notice.is_visible_to(CompanyRole::Owner));

        let for_staff = announcement(Some(CompanyRole::Employee));
        assert!(for_staff.is_visible_to(CompanyRole::Owner));
        assert!(!for_staff.is_visible_to(CompanyRole::Manager));
    }
}
