use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{delete, get, post, put};
use tessera_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route(
            "/api/companies",
            post(handlers::companies::register_company_handler),
        )
        .route(
            "/api/companies/{company_id}/exists",
            get(handlers::companies::company_exists_handler),
        )
        .route(
            "/api/profile",
            get(handlers::profiles::caller_profile_handler)
                .put(handlers::profiles::save_caller_profile_handler),
        )
        .route(
            "/api/profiles/{identity}",
            get(handlers::profiles::profile_handler),
        )
        .route(
            "/api/system-role",
            get(handlers::profiles::system_role_handler),
        )
        .route(
            "/api/system-roles/{identity}",
            put(handlers::profiles::assign_system_role_handler),
        )
        .route(
            "/api/invites",
            get(handlers::invites::list_invites_handler)
                .post(handlers::invites::generate_invite_handler),
        )
        .route(
            "/api/invites/redeem",
            post(handlers::invites::redeem_invite_handler),
        )
        .route(
            "/api/personnel",
            get(handlers::personnel::list_personnel_handler)
                .post(handlers::personnel::create_personnel_handler),
        )
        .route(
            "/api/personnel/{personnel_id}",
            get(handlers::personnel::get_personnel_handler)
                .put(handlers::personnel::update_personnel_handler)
                .delete(handlers::personnel::delete_personnel_handler),
        )
        .route(
            "/api/tasks",
            get(handlers::tasks::list_tasks_handler).post(handlers::tasks::create_task_handler),
        )
        .route(
            "/api/tasks/{task_id}",
            get(handlers::tasks::get_task_handler)
                .put(handlers::tasks::update_task_handler)
                .delete(handlers::tasks::delete_task_handler),
        )
        .route(
            "/api/announcements",
            get(handlers::announcements::list_announcements_handler)
                .post(handlers::announcements::create_announcement_handler),
        )
        .route(
            "/api/announcements/{announcement_id}",
            delete(handlers::announcements::delete_announcement_handler),
        )
        .route(
            "/api/reports/{report_type}",
            get(handlers::reports::report_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_identity,
        ));

    let cors_layer = cors::build_cors_layer(frontend_url, app_state.identity_header.clone())?;

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(app_state))
}

#[cfg(test)]
mod tests;
