use serde::{Deserialize, Serialize};
use tessera_core::{CallerIdentity, CompanyId, NonEmptyString, Timestamp};

/// A tenant. Created once by registration and never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Company {
    /// Unique, immutable tenant key.
    pub company_id: CompanyId,
    /// Display name.
    pub name: NonEmptyString,
    /// Identity that registered the company and may bootstrap its owner.
    pub registered_by: CallerIdentity,
    /// Registration time.
    pub registered_at: Timestamp,
}

impl Company {
    /// Creates a new company record.
    #[must_use]
    pub fn new(
        company_id: CompanyId,
        name: NonEmptyString,
        registered_by: CallerIdentity,
        registered_at: Timestamp,
    ) -> Self {
        Self {
            company_id,
            name,
            registered_by,
            registered_at,
        }
    }

    /// Returns whether `identity` registered this company.
    #[must_use]
    pub fn was_registered_by(&self, identity: &CallerIdentity) -> bool {
        &self.registered_by == identity
    }
}
