use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use axum::http::HeaderName;
use tessera_application::DEFAULT_INVITE_MAX_VALIDITY_SECONDS;
use tessera_core::{AppError, CallerIdentity};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub frontend_url: String,
    pub store_backend: StoreBackend,
    pub identity_header: HeaderName,
    pub system_admins: Vec<CallerIdentity>,
    pub invite_max_validity_seconds: i64,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parsed_env("API_PORT", 3001_u16)?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_owned())
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" => StoreBackend::Postgres {
                database_url: required_non_empty_env("DATABASE_URL")?,
                max_connections: parsed_env("DATABASE_MAX_CONNECTIONS", 10_u32)?,
            },
            other => {
                return Err(AppError::Validation(format!(
                    "STORE_BACKEND must be either 'memory' or 'postgres', got '{other}'"
                )));
            }
        };

        if migrate_only && store_backend == StoreBackend::Memory {
            return Err(AppError::Validation(
                "the migrate command requires STORE_BACKEND=postgres".to_owned(),
            ));
        }

        let identity_header = env::var("IDENTITY_HEADER")
            .unwrap_or_else(|_| "x-caller-identity".to_owned());
        let identity_header = HeaderName::from_str(identity_header.trim()).map_err(|error| {
            AppError::Validation(format!("invalid IDENTITY_HEADER '{identity_header}': {error}"))
        })?;

        let system_admins = parse_identity_list(
            env::var("SYSTEM_ADMIN_IDENTITIES")
                .unwrap_or_default()
                .as_str(),
        )?;

        let invite_max_validity_seconds = parsed_env(
            "INVITE_MAX_VALIDITY_SECONDS",
            DEFAULT_INVITE_MAX_VALIDITY_SECONDS,
        )?;

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            frontend_url,
            store_backend,
            identity_header,
            system_admins,
            invite_max_validity_seconds,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_identity_list(value: &str) -> Result<Vec<CallerIdentity>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(CallerIdentity::new)
        .collect()
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::parse_identity_list;

    #[test]
    fn identity_list_skips_blank_entries() {
        let identities = parse_identity_list(" root , ,ops-admin,")
            .unwrap_or_else(|error| panic!("parse failed: {error}"));
        let values: Vec<&str> = identities.iter().map(|identity| identity.as_str()).collect();
        assert_eq!(values, vec!["root", "ops-admin"]);
    }

    #[test]
    fn empty_identity_list_is_allowed() {
        assert_eq!(parse_identity_list(""), Ok(Vec::new()));
    }
}
