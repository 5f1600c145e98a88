use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use tessera_core::{AppError, CallerIdentity};

use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the caller identity set by the trusted gateway and stores it as a request extension.
pub async fn require_identity(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = caller_identity(request.headers(), &state)?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

fn caller_identity(headers: &HeaderMap, state: &AppState) -> Result<CallerIdentity, AppError> {
    let value = headers
        .get(&state.identity_header)
        .ok_or_else(|| AppError::SessionUnavailable("no active session".to_owned()))?
        .to_str()
        .map_err(|_| AppError::SessionUnavailable("identity header is not valid text".to_owned()))?;

    CallerIdentity::new(value.trim())
        .map_err(|_| AppError::SessionUnavailable("identity header is empty".to_owned()))
}
