use async_trait::async_trait;
use tessera_application::{InviteCodeRepository, InviteRedemption};
use tessera_core::{AppError, AppResult, CompanyId};
use tessera_domain::{InviteCode, Member};

use super::InMemoryTenancyStore;

#[async_trait]
impl InviteCodeRepository for InMemoryTenancyStore {
    async fn create_invite(&self, invite: InviteCode) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.invites.contains_key(invite.code_hash()) {
            return Err(AppError::Duplicate("invite code already exists".to_owned()));
        }

        state.invites.insert(invite.code_hash().clone(), invite);
        Ok(())
    }

    async fn redeem_invite(&self, redemption: InviteRedemption) -> AppResult<Member> {
        let mut state = self.state.write().await;
        let already_member = state.members.contains_key(&redemption.identity);

        let invite = state
            .invites
            .get_mut(&redemption.code_hash)
            .ok_or(AppError::InvalidCode)?;
        invite.check_redeemable(redemption.redeemed_at)?;

        if already_member {
            return Err(AppError::Duplicate(
                "identity already has a profile".to_owned(),
            ));
        }

        let mut consumed = invite.clone();
        let grant = consumed.consume(redemption.identity.clone(), redemption.redeemed_at)?;
        let member = Member::new(
            redemption.identity,
            grant.company_id,
            redemption.display_name,
            grant.role,
        )
        .with_personnel_id(redemption.personnel_id);

        state.insert_member_checked(member.clone())?;
        state.invites.insert(consumed.code_hash().clone(), consumed);
        Ok(member)
    }

    async fn list_invites(&self, company_id: &CompanyId) -> AppResult<Vec<InviteCode>> {
        Ok(self
            .state
            .read()
            .await
            .invites
            .values()
            .filter(|invite| invite.company_id() == company_id)
            .cloned()
            .collect())
    }
}
