use std::sync::Arc;

use tessera_core::{AppResult, CallerIdentity, NonEmptyString};
use tessera_domain::{Announcement, AnnouncementId, Capability, CompanyRole};

use crate::{AnnouncementRepository, AuthorizationGate, Clock, WriteSerializer};

/// Input for publishing an announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAnnouncement {
    /// Caller-chosen id, unique within the company.
    pub id: AnnouncementId,
    /// Message body.
    pub content: NonEmptyString,
    /// Audience filter; `None` addresses every role.
    pub target_role: Option<CompanyRole>,
}

/// Company-scoped announcement store.
#[derive(Clone)]
pub struct AnnouncementService {
    announcements: Arc<dyn AnnouncementRepository>,
    gate: AuthorizationGate,
    clock: Arc<dyn Clock>,
    serializer: WriteSerializer,
}

impl AnnouncementService {
    /// Creates an announcement service.
    #[must_use]
    pub fn new(
        announcements: Arc<dyn AnnouncementRepository>,
        gate: AuthorizationGate,
        clock: Arc<dyn Clock>,
        serializer: WriteSerializer,
    ) -> Self {
        Self {
            announcements,
            gate,
            clock,
            serializer,
        }
    }

    /// Publishes an announcement in the caller's company.
    pub async fn add(
        &self,
        caller: &CallerIdentity,
        input: NewAnnouncement,
    ) -> AppResult<Announcement> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::AnnouncementAdd)
            .await?;
        let announcement = Announcement {
            id: input.id,
            company_id: context.company_id,
            content: input.content,
            target_role: input.target_role,
            created_at: self.clock.now(),
            created_by: context.identity,
        };
        self.announcements
            .insert_announcement(announcement.clone())
            .await?;
        Ok(announcement)
    }

    /// Deletes an announcement in the caller's company.
    pub async fn remove(
        &self,
        caller: &CallerIdentity,
        announcement_id: &AnnouncementId,
    ) -> AppResult<()> {
        let _guard = self.serializer.acquire().await;

        let context = self
            .gate
            .authorize_own_company(caller, Capability::AnnouncementDelete)
            .await?;
        self.announcements
            .delete_announcement(&context.company_id, announcement_id)
            .await
    }

    /// Lists every announcement of the caller's company, regardless of audience.
    pub async fn list(&self, caller: &CallerIdentity) -> AppResult<Vec<Announcement>> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::AnnouncementView)
            .await?;
        self.announcements
            .list_announcements(&context.company_id)
            .await
    }

    /// Lists the announcements addressed to the caller's role.
    pub async fn list_visible(&self, caller: &CallerIdentity) -> AppResult<Vec<Announcement>> {
        let context = self
            .gate
            .authorize_own_company(caller, Capability::AnnouncementView)
            .await?;
        Ok(self
            .announcements
            .list_announcements(&context.company_id)
            .await?
            .into_iter()
            .filter(|announcement| announcement.is_visible_to(context.role))
            .collect())
    }
}
