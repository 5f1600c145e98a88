use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// Maximum accepted byte length of an identity token.
pub const CALLER_IDENTITY_MAX_LENGTH: usize = 512;

/// Opaque caller identifier yielded by the external identity provider.
///
/// The value is never parsed; identities are only compared for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallerIdentity(String);

impl CallerIdentity {
    /// Wraps a provider-issued identity token.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(AppError::Validation(
                "caller identity must not be empty".to_owned(),
            ));
        }

        if value.len() > CALLER_IDENTITY_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "caller identity must not exceed {CALLER_IDENTITY_MAX_LENGTH} bytes"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the raw identity token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for CallerIdentity {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CallerIdentity> for String {
    fn from(value: CallerIdentity) -> Self {
        value.0
    }
}

impl Display for CallerIdentity {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}
