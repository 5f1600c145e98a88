use async_trait::async_trait;
use tessera_application::MemberRepository;
use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId};
use tessera_domain::{Member, PersonnelId};

use super::{InMemoryTenancyStore, TenancyState};

impl TenancyState {
    fn personnel_taken(&self, member: &Member) -> bool {
        let Some(personnel_id) = member.personnel_id() else {
            return false;
        };

        self.members.values().any(|stored| {
            stored.identity() != member.identity()
                && stored.company_id() == member.company_id()
                && stored.personnel_id() == Some(personnel_id)
        })
    }

    pub(super) fn insert_member_checked(&mut self, member: Member) -> AppResult<()> {
        if self.members.contains_key(member.identity()) {
            return Err(AppError::Duplicate(
                "identity already has a profile".to_owned(),
            ));
        }

        if self.personnel_taken(&member) {
            return Err(AppError::Duplicate(
                "personnel id already exists in company".to_owned(),
            ));
        }

        self.members.insert(member.identity().clone(), member);
        Ok(())
    }
}

#[async_trait]
impl MemberRepository for InMemoryTenancyStore {
    async fn find_member(&self, identity: &CallerIdentity) -> AppResult<Option<Member>> {
        Ok(self.state.read().await.members.get(identity).cloned())
    }

    async fn find_member_by_personnel_id(
        &self,
        company_id: &CompanyId,
        personnel_id: &PersonnelId,
    ) -> AppResult<Option<Member>> {
        Ok(self
            .state
            .read()
            .await
            .members
            .values()
            .find(|member| {
                member.company_id() == company_id && member.personnel_id() == Some(personnel_id)
            })
            .cloned())
    }

    async fn insert_member(&self, member: Member) -> AppResult<()> {
        self.state.write().await.insert_member_checked(member)
    }

    async fn update_member(&self, member: Member) -> AppResult<()> {
        let mut state = self.state.write().await;
        let Some(stored) = state.members.get(member.identity()) else {
            return Err(AppError::NotFound("member not found".to_owned()));
        };

        if stored.company_id() != member.company_id() {
            return Err(AppError::Validation(
                "a member's company cannot change".to_owned(),
            ));
        }

        if state.personnel_taken(&member) {
            return Err(AppError::Duplicate(
                "personnel id already exists in company".to_owned(),
            ));
        }

        state.members.insert(member.identity().clone(), member);
        Ok(())
    }

    async fn list_members(&self, company_id: &CompanyId) -> AppResult<Vec<Member>> {
        let state = self.state.read().await;
        let mut members: Vec<Member> = state
            .members
            .values()
            .filter(|member| member.company_id() == company_id)
            .cloned()
            .collect();
        members.sort_by(|left, right| left.identity().cmp(right.identity()));
        Ok(members)
    }
}
