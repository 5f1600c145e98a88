use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use tessera_core::CallerIdentity;
use tracing::info;

use crate::dto::{
    CompanyExistsResponse, CompanyResponse, RegisterCompanyRequest, RegisterCompanyResponse,
    UserProfileDto,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn register_company_handler(
    State(state): State<AppState>,
    Extension(caller): Extension<CallerIdentity>,
    Json(payload): Json<RegisterCompanyRequest>,
) -> ApiResult<(StatusCode, Json<RegisterCompanyResponse>)> {
    let (company, owner) = match payload.owner_name {
        Some(owner_name) => {
            let (company, owner) = state
                .company_service
                .register_company_with_owner(
                    &caller,
                    payload.company_id.as_str(),
                    payload.name.as_str(),
                    owner_name.as_str(),
                )
                .await?;
            (company, Some(UserProfileDto::from(owner)))
        }
        None => {
            let company = state
                .company_service
                .register_company(&caller, payload.company_id.as_str(), payload.name.as_str())
                .await?;
            (company, None)
        }
    };

    info!(
        company_id = company.company_id.as_str(),
        identity = caller.as_str(),
        owner_bootstrapped = owner.is_some(),
        "company registered"
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterCompanyResponse {
            company: CompanyResponse::from(company),
            owner,
        }),
    ))
}

pub async fn company_exists_handler(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
) -> ApiResult<Json<CompanyExistsResponse>> {
    let exists = state
        .company_service
        .company_exists(company_id.as_str())
        .await?;

    Ok(Json(CompanyExistsResponse { exists }))
}
