use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use tessera_core::CallerIdentity;
use tessera_domain::{SystemRole, UserProfile};
use tracing::info;

use crate::dto::{AssignSystemRoleRequest, SystemRoleResponse, UserProfileDto};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn caller_profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<Option<UserProfileDto>>> {
    let profile = state
        .profile_service
        .caller_profile(&caller)
        .await?
        .map(UserProfileDto::from);

    Ok(Json(profile))
}

pub async fn save_caller_profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<UserProfileDto>,
) -> ApiResult<Json<UserProfileDto>> {
    let profile = UserProfile::try_from(payload)?;
    let saved = state
        .profile_service
        .save_caller_profile(&caller, profile)
        .await?;

    Ok(Json(UserProfileDto::from(saved)))
}

pub async fn profile_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(identity): Path<String>,
) -> ApiResult<Json<UserProfileDto>> {
    let identity = CallerIdentity::new(identity)?;
    let profile = state.profile_service.profile_for(&caller, &identity).await?;

    Ok(Json(UserProfileDto::from(profile)))
}

pub async fn system_role_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
) -> ApiResult<Json<SystemRoleResponse>> {
    let role = state.system_role_service.system_role(&caller).await?;

    Ok(Json(SystemRoleResponse::new(&caller, role)))
}

pub async fn assign_system_role_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(identity): Path<String>,
    Json(payload): Json<AssignSystemRoleRequest>,
) -> ApiResult<StatusCode> {
    let identity = CallerIdentity::new(identity)?;
    let role = payload.role.parse::<SystemRole>()?;
    state
        .system_role_service
        .assign_system_role(&caller, &identity, role)
        .await?;

    info!(
        identity = identity.as_str(),
        role = role.as_str(),
        assigned_by = caller.as_str(),
        "system role assigned"
    );

    Ok(StatusCode::NO_CONTENT)
}
