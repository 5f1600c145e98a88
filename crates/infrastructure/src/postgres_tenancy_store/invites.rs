use async_trait::async_trait;
use tessera_application::{InviteCodeRepository, InviteRedemption};
use tessera_core::{AppError, AppResult, CompanyId};
use tessera_domain::{InviteCode, InviteState, Member};
use tracing::debug;

use super::members::insert_member_in;
use super::rows::{InviteRow, decode};
use super::{PostgresTenancyStore, write_error};

const INVITE_COLUMNS: &str = "code_hash, company_id, target_role, issued_by, issued_at, \
                              expires_at, state, consumed_by, state_changed_at";

#[async_trait]
impl InviteCodeRepository for PostgresTenancyStore {
    async fn create_invite(&self, invite: InviteCode) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO invite_codes (
                code_hash,
                company_id,
                target_role,
                issued_by,
                issued_at,
                expires_at,
                state
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'active')
            "#,
        )
        .bind(invite.code_hash().as_str())
        .bind(invite.company_id().as_str())
        .bind(invite.target_role().as_str())
        .bind(invite.issued_by().as_str())
        .bind(invite.issued_at().as_nanos())
        .bind(invite.expires_at().as_nanos())
        .execute(&self.pool)
        .await
        .map_err(|error| write_error(error, "create invite", "invite code already exists"))?;

        Ok(())
    }

    async fn redeem_invite(&self, redemption: InviteRedemption) -> AppResult<Member> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        let row = sqlx::query_as::<_, InviteRow>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invite_codes WHERE code_hash = $1 FOR UPDATE"
        ))
        .bind(redemption.code_hash.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load invite: {error}")))?
        .ok_or(AppError::InvalidCode)?;
        let mut invite = decode("invite", InviteCode::try_from(row))?;
        let was_active = matches!(invite.state(), InviteState::Active);

        if let Err(error) = invite.check_redeemable(redemption.redeemed_at) {
            if was_active && error == AppError::Expired {
                sqlx::query(
                    r#"
                    UPDATE invite_codes
                    SET state = 'expired', state_changed_at = $2
                    WHERE code_hash = $1 AND state = 'active'
                    "#,
                )
                .bind(redemption.code_hash.as_str())
                .bind(redemption.redeemed_at.as_nanos())
                .execute(&mut *transaction)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to record invite expiry: {error}"))
                })?;
                transaction.commit().await.map_err(|error| {
                    AppError::Internal(format!("failed to commit transaction: {error}"))
                })?;
                debug!(invite = %redemption.code_hash, "invite expiry recorded");
            }

            return Err(error);
        }

        let already_member = sqlx::query_scalar::<_, String>(
            r#"
            SELECT identity
            FROM members
            WHERE identity = $1
            "#,
        )
        .bind(redemption.identity.as_str())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find member: {error}")))?
        .is_some();
        if already_member {
            return Err(AppError::Duplicate(
                "identity already has a profile".to_owned(),
            ));
        }

        let grant = invite.consume(redemption.identity.clone(), redemption.redeemed_at)?;
        let consumed = sqlx::query(
            r#"
            UPDATE invite_codes
            SET state = 'consumed', consumed_by = $2, state_changed_at = $3
            WHERE code_hash = $1 AND state = 'active'
            "#,
        )
        .bind(redemption.code_hash.as_str())
        .bind(redemption.identity.as_str())
        .bind(redemption.redeemed_at.as_nanos())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to consume invite: {error}")))?;
        if consumed.rows_affected() != 1 {
            return Err(AppError::AlreadyUsed);
        }

        let member = Member::new(
            redemption.identity,
            grant.company_id,
            redemption.display_name,
            grant.role,
        )
        .with_personnel_id(redemption.personnel_id);
        insert_member_in(&mut transaction, &member).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(member)
    }

    async fn list_invites(&self, company_id: &CompanyId) -> AppResult<Vec<InviteCode>> {
        let rows = sqlx::query_as::<_, InviteRow>(&format!(
            "SELECT {INVITE_COLUMNS} FROM invite_codes WHERE company_id = $1 \
             ORDER BY issued_at DESC, code_hash"
        ))
        .bind(company_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list invites: {error}")))?;

        rows.into_iter()
            .map(|row| decode("invite", InviteCode::try_from(row)))
            .collect()
    }
}
