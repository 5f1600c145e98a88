use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tessera_application::MemberRepository;
use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId};
use tessera_domain::{Member, PersonnelId};

use super::rows::{MemberRow, decode, permission_names};
use super::{PostgresTenancyStore, write_error};

const MEMBER_COLUMNS: &str = "identity, company_id, personnel_id, name, role, permissions, active";

/// Inserts a member inside an open transaction.
pub(super) async fn insert_member_in(
    transaction: &mut Transaction<'_, Postgres>,
    member: &Member,
) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO members (identity, company_id, personnel_id, name, role, permissions, active)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(member.identity().as_str())
    .bind(member.company_id().as_str())
    .bind(member.personnel_id().map(PersonnelId::as_str))
    .bind(member.name().as_str())
    .bind(member.role().as_str())
    .bind(permission_names(member.permissions()))
    .bind(member.is_active())
    .execute(&mut **transaction)
    .await
    .map_err(|error| {
        write_error(
            error,
            "insert member",
            "identity or personnel id already exists",
        )
    })?;

    Ok(())
}

fn decode_member(row: MemberRow) -> AppResult<Member> {
    decode("member", Member::try_from(row))
}

#[async_trait]
impl MemberRepository for PostgresTenancyStore {
    async fn find_member(&self, identity: &CallerIdentity) -> AppResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE identity = $1"
        ))
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find member: {error}")))?;

        row.map(decode_member).transpose()
    }

    async fn find_member_by_personnel_id(
        &self,
        company_id: &CompanyId,
        personnel_id: &PersonnelId,
    ) -> AppResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE company_id = $1 AND personnel_id = $2"
        ))
        .bind(company_id.as_str())
        .bind(personnel_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find personnel: {error}")))?;

        row.map(decode_member).transpose()
    }

    async fn insert_member(&self, member: Member) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to begin transaction: {error}"))
        })?;

        insert_member_in(&mut transaction, &member).await?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })
    }

    async fn update_member(&self, member: Member) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE members
            SET personnel_id = $3,
                name = $4,
                role = $5,
                permissions = $6,
                active = $7
            WHERE identity = $1 AND company_id = $2
            "#,
        )
        .bind(member.identity().as_str())
        .bind(member.company_id().as_str())
        .bind(member.personnel_id().map(PersonnelId::as_str))
        .bind(member.name().as_str())
        .bind(member.role().as_str())
        .bind(permission_names(member.permissions()))
        .bind(member.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                error,
                "update member",
                "personnel id already exists in company",
            )
        })?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        match self.find_member(member.identity()).await? {
            Some(_) => Err(AppError::Validation(
                "a member's company cannot change".to_owned(),
            )),
            None => Err(AppError::NotFound("member not found".to_owned())),
        }
    }

    async fn list_members(&self, company_id: &CompanyId) -> AppResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE company_id = $1 ORDER BY identity"
        ))
        .bind(company_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list members: {error}")))?;

        rows.into_iter().map(decode_member).collect()
    }
}
