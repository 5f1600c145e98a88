use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tessera_core::CallerIdentity;
use tessera_domain::CompanyRole;
use tracing::info;

use crate::dto::{
    GenerateInviteRequest, InviteSummaryResponse, IssuedInviteResponse, RedeemInviteRequest,
    UserProfileDto,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn generate_invite_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<GenerateInviteRequest>,
) -> ApiResult<(StatusCode, Json<IssuedInviteResponse>)> {
    let target_role = payload.target_role.parse::<CompanyRole>()?;
    let issued = state
        .invite_code_service
        .generate_code(&caller, target_role, payload.validity_nanos)
        .await?;

    info!(
        company_id = issued.company_id.as_str(),
        identity = caller.as_str(),
        target_role = target_role.as_str(),
        "invite issued"
    );

    Ok((StatusCode::CREATED, Json(IssuedInviteResponse::from(issued))))
}

pub async fn list_invites_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Vec<InviteSummaryResponse>>> {
    let invites = state
        .invite_code_service
        .list_invites(&caller)
        .await?
        .into_iter()
        .map(InviteSummaryResponse::from)
        .collect();

    Ok(Json(invites))
}

pub async fn redeem_invite_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<RedeemInviteRequest>,
) -> ApiResult<Json<UserProfileDto>> {
    let profile = state
        .invite_code_service
        .redeem_code(&caller, payload.code.as_str(), payload.user_name.as_str())
        .await?;

    info!(
        company_id = profile.company_id.as_str(),
        identity = caller.as_str(),
        role = profile.role.as_str(),
        "invite redeemed"
    );

    Ok(Json(UserProfileDto::from(profile)))
}
