use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use tessera_core::{AppError, AppResult, validate_record_key};
use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a validated identifier from a caller-supplied key.
            pub fn new(value: impl Into<String>) -> AppResult<Self> {
                validate_record_key($label, value).map(Self)
            }

            /// Allocates a fresh random identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4().simple()))
            }

            /// Returns the identifier string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = AppError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Display for $name {
            fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
                formatter.write_str(self.0.as_str())
            }
        }
    };
}

record_id!(
    /// Personnel record identifier, unique within a company.
    PersonnelId,
    "personnel id",
    "p"
);

record_id!(
    /// Task identifier, unique within a company.
    TaskId,
    "task id",
    "t"
);

record_id!(
    /// Announcement identifier, unique within a company.
    AnnouncementId,
    "announcement id",
    "a"
);

#[cfg(test)]
mod tests {
    use super::{PersonnelId, TaskId};

    #[test]
    fn generated_ids_pass_key_validation() {
        let generated = PersonnelId::generate();
        assert!(generated.as_str().starts_with("p-"));
        assert_eq!(PersonnelId::new(generated.as_str()), Ok(generated));
    }

    #[test]
    fn supplied_ids_are_validated() {
        assert!(TaskId::new("").is_err());
        assert!(TaskId::new("task 1").is_err());
        assert!(TaskId::new("task-1").is_ok());
    }
}
