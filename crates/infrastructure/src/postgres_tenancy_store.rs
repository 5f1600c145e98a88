use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use tessera_application::{
    AuditEvent, AuditRepository, CompanyRepository, SystemRoleRepository,
};
use tessera_core::{AppError, AppResult, CallerIdentity, CompanyId};
use tessera_domain::{Company, SystemRole};
use tracing::info;

mod invites;
mod members;
mod records;
mod rows;

use rows::{CompanyRow, decode};

/// Embedded schema migrations for the tenancy tables.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending tenancy migration.
pub async fn run_migrations(pool: &PgPool) -> AppResult<()> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
    info!("tenancy migrations applied");
    Ok(())
}

/// PostgreSQL-backed implementation of every tenancy port.
#[derive(Clone)]
pub struct PostgresTenancyStore {
    pool: PgPool,
}

impl PostgresTenancyStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps unique-key violations to `Duplicate` and everything else to `Internal`.
fn write_error(error: sqlx::Error, action: &str, duplicate: &str) -> AppError {
    if error
        .as_database_error()
        .is_some_and(|database_error| database_error.is_unique_violation())
    {
        return AppError::Duplicate(duplicate.to_owned());
    }

    AppError::Internal(format!("failed to {action}: {error}"))
}

#[async_trait]
impl CompanyRepository for PostgresTenancyStore {
    async fn create_company(&self, company: Company) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO companies (company_id, name, registered_by, registered_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(company.company_id.as_str())
        .bind(company.name.as_str())
        .bind(company.registered_by.as_str())
        .bind(company.registered_at.as_nanos())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            write_error(
                error,
                "create company",
                &format!("company '{}' already exists", company.company_id),
            )
        })?;

        Ok(())
    }

    async fn find_company(&self, company_id: &CompanyId) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT company_id, name, registered_by, registered_at
            FROM companies
            WHERE company_id = $1
            "#,
        )
        .bind(company_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find company: {error}")))?;

        row.map(|row| decode("company", Company::try_from(row)))
            .transpose()
    }

    async fn find_company_registered_by(
        &self,
        identity: &CallerIdentity,
    ) -> AppResult<Option<Company>> {
        let row = sqlx::query_as::<_, CompanyRow>(
            r#"
            SELECT company_id, name, registered_by, registered_at
            FROM companies
            WHERE registered_by = $1
            ORDER BY registered_at, company_id
            LIMIT 1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find company by registrant: {error}"))
        })?;

        row.map(|row| decode("company", Company::try_from(row)))
            .transpose()
    }
}

#[async_trait]
impl SystemRoleRepository for PostgresTenancyStore {
    async fn assign_system_role(
        &self,
        identity: &CallerIdentity,
        role: SystemRole,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO system_roles (identity, role)
            VALUES ($1, $2)
            ON CONFLICT (identity) DO UPDATE SET role = EXCLUDED.role
            "#,
        )
        .bind(identity.as_str())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign system role: {error}")))?;

        Ok(())
    }

    async fn find_system_role(&self, identity: &CallerIdentity) -> AppResult<Option<SystemRole>> {
        let stored = sqlx::query_scalar::<_, String>(
            r#"
            SELECT role
            FROM system_roles
            WHERE identity = $1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find system role: {error}")))?;

        stored
            .map(|role| decode("system role", role.parse::<SystemRole>()))
            .transpose()
    }
}

#[async_trait]
impl AuditRepository for PostgresTenancyStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_events (
                company_id,
                subject,
                action,
                resource_type,
                resource_id,
                detail
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.company_id.as_ref().map(CompanyId::as_str))
        .bind(event.subject.as_str())
        .bind(event.action.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.detail)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests;
