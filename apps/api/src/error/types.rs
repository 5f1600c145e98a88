use serde::Serialize;
use ts_rs::TS;

/// API error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/error-response.ts"
)]
pub struct ErrorResponse {
    kind: String,
    message: String,
}

impl ErrorResponse {
    pub(super) fn new(kind: &str, message: String) -> Self {
        Self {
            kind: kind.to_owned(),
            message,
        }
    }

    #[cfg(test)]
    pub(super) fn kind(&self) -> &str {
        &self.kind
    }

    #[cfg(test)]
    pub(super) fn message(&self) -> &str {
        &self.message
    }
}
