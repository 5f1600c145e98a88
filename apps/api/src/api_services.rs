use std::sync::Arc;

use tessera_application::{InviteSettings, TenancyPorts, TenancyServices};
use tessera_core::AppError;
use tessera_infrastructure::{InMemoryTenancyStore, PostgresTenancyStore, SystemClock};
use tracing::info;

use crate::api_config::{ApiConfig, StoreBackend};
use crate::state::AppState;

mod database;

pub use database::connect_and_migrate;

/// Wires the configured store into the application services and seeds platform admins.
pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let (ports, store_backend) = match &config.store_backend {
        StoreBackend::Memory => (
            TenancyPorts::from_store(Arc::new(InMemoryTenancyStore::new())),
            "memory",
        ),
        StoreBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = connect_and_migrate(database_url, *max_connections).await?;
            (
                TenancyPorts::from_store(Arc::new(PostgresTenancyStore::new(pool))),
                "postgres",
            )
        }
    };

    let settings = InviteSettings::from_max_validity_seconds(config.invite_max_validity_seconds)?;
    let services = TenancyServices::new(ports, Arc::new(SystemClock), settings);

    services
        .system_roles
        .seed_admins(&config.system_admins)
        .await?;
    if !config.system_admins.is_empty() {
        info!(count = config.system_admins.len(), "system administrators seeded");
    }

    Ok(AppState::new(
        services,
        config.identity_header.clone(),
        store_backend,
    ))
}
