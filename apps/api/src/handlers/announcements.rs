use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use tessera_application::NewAnnouncement;
use tessera_core::CallerIdentity;
use tessera_domain::AnnouncementId;

use crate::dto::{AnnouncementListQuery, AnnouncementResponse, CreateAnnouncementRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_announcements_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<AnnouncementListQuery>,
) -> ApiResult<Json<Vec<AnnouncementResponse>>> {
    let announcements = if query.visible_only {
        state.announcement_service.list_visible(&caller).await?
    } else {
        state.announcement_service.list(&caller).await?
    };

    Ok(Json(
        announcements
            .into_iter()
            .map(AnnouncementResponse::from)
            .collect(),
    ))
}

pub async fn create_announcement_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<AnnouncementResponse>)> {
    let announcement = state
        .announcement_service
        .add(&caller, NewAnnouncement::try_from(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AnnouncementResponse::from(announcement)),
    ))
}

pub async fn delete_announcement_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(announcement_id): Path<String>,
) -> ApiResult<StatusCode> {
    let announcement_id = AnnouncementId::new(announcement_id)?;
    state
        .announcement_service
        .remove(&caller, &announcement_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
