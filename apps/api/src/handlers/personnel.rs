use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use tessera_application::{NewPersonnel, PersonnelUpdate};
use tessera_core::CallerIdentity;
use tessera_domain::PersonnelId;

use crate::dto::{
    CreatePersonnelRequest, PersonnelListQuery, PersonnelResponse, UpdatePersonnelRequest,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_personnel_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<PersonnelListQuery>,
) -> ApiResult<Json<Vec<PersonnelResponse>>> {
    let personnel = if query.active {
        state.personnel_service.list_active(&caller).await?
    } else {
        state.personnel_service.list(&caller).await?
    };

    Ok(Json(
        personnel.into_iter().map(PersonnelResponse::from).collect(),
    ))
}

pub async fn create_personnel_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<CreatePersonnelRequest>,
) -> ApiResult<(StatusCode, Json<PersonnelResponse>)> {
    let personnel = state
        .personnel_service
        .add(&caller, NewPersonnel::try_from(payload)?)
        .await?;

    Ok((StatusCode::CREATED, Json(PersonnelResponse::from(personnel))))
}

pub async fn get_personnel_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(personnel_id): Path<String>,
) -> ApiResult<Json<PersonnelResponse>> {
    let personnel_id = PersonnelId::new(personnel_id)?;
    let personnel = state.personnel_service.get(&caller, &personnel_id).await?;

    Ok(Json(PersonnelResponse::from(personnel)))
}

pub async fn update_personnel_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(personnel_id): Path<String>,
    Json(payload): Json<UpdatePersonnelRequest>,
) -> ApiResult<Json<PersonnelResponse>> {
    let personnel_id = PersonnelId::new(personnel_id)?;
    let personnel = state
        .personnel_service
        .update(&caller, &personnel_id, PersonnelUpdate::try_from(payload)?)
        .await?;

    Ok(Json(PersonnelResponse::from(personnel)))
}

pub async fn delete_personnel_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(personnel_id): Path<String>,
) -> ApiResult<StatusCode> {
    let personnel_id = PersonnelId::new(personnel_id)?;
    state
        .personnel_service
        .remove(&caller, &personnel_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
