use axum::Json;
use axum::extract::{Extension, Path, State};
use tessera_core::CallerIdentity;

use crate::dto::ReportResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn report_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Path(report_type): Path<String>,
) -> ApiResult<Json<ReportResponse>> {
    let report = state
        .report_service
        .report(&caller, report_type.as_str())
        .await?;

    Ok(Json(ReportResponse::from(report)))
}
