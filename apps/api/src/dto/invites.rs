use serde::{Deserialize, Serialize};
use tessera_application::{InviteSummary, IssuedInvite};
use ts_rs::TS;

/// Incoming payload for invite issuance.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/generate-invite-request.ts"
)]
pub struct GenerateInviteRequest {
    pub target_role: String,
    /// Validity window in nanoseconds.
    pub validity_nanos: i64,
}

/// Freshly issued invite. The code is shown only here.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/issued-invite-response.ts"
)]
pub struct IssuedInviteResponse {
    pub code: String,
    pub company_id: String,
    pub target_role: String,
    pub expires_at: i64,
}

impl From<IssuedInvite> for IssuedInviteResponse {
    fn from(invite: IssuedInvite) -> Self {
        Self {
            code: invite.code,
            company_id: invite.company_id.as_str().to_owned(),
            target_role: invite.target_role.as_str().to_owned(),
            expires_at: invite.expires_at.as_nanos(),
        }
    }
}

/// Listing entry for an invite.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/invite-summary-response.ts"
)]
pub struct InviteSummaryResponse {
    pub reference: String,
    pub target_role: String,
    pub issued_by: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub status: String,
}

impl From<InviteSummary> for InviteSummaryResponse {
    fn from(summary: InviteSummary) -> Self {
        Self {
            reference: summary.reference,
            target_role: summary.target_role.as_str().to_owned(),
            issued_by: summary.issued_by.as_str().to_owned(),
            issued_at: summary.issued_at.as_nanos(),
            expires_at: summary.expires_at.as_nanos(),
            status: summary.status.as_str().to_owned(),
        }
    }
}

/// Incoming payload for invite redemption.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/redeem-invite-request.ts"
)]
pub struct RedeemInviteRequest {
    pub code: String,
    pub user_name: String,
}
