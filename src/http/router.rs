//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving. The API is nested under
//! the configured prefix; `/health` stays at the root.

use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    self, account, admin, calendar, change_requests, leave, notifications, organization, presence,
    time_entries,
};
use super::state::AppState;

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(account::login))
        .route("/auth/refresh", post(account::refresh))
        .route("/auth/me", get(account::me))
        .route("/auth/logout", post(account::logout))
        .route("/auth/settings", get(account::public_settings))
        .route(
            "/users/profile",
            get(account::get_profile).put(account::update_profile),
        )
        .route("/users/password", put(account::change_password))
}

fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/calendar/month", get(calendar::month))
        .route("/calendar/day", get(calendar::day))
        .route("/calendar/working-days", get(calendar::working_days))
        .route(
            "/time-entries",
            get(time_entries::list).post(time_entries::create),
        )
        .route("/time-entries/day-summary", get(time_entries::day_summary))
        .route(
            "/time-entries/{id}",
            get(time_entries::get)
                .put(time_entries::update)
                .delete(time_entries::delete),
        )
        .route(
            "/day-status",
            get(leave::list_statuses).post(leave::set_status),
        )
        .route("/day-status/my-sick-days", get(leave::my_sick_days))
        .route("/day-status/date", get(leave::status_for_date))
        .route("/day-status/sick-day", post(leave::set_sick_days))
        .route(
            "/day-status/{id}",
            put(leave::update_status).delete(leave::delete_status),
        )
        .route(
            "/vacations",
            get(leave::list_vacations).post(leave::create_vacation),
        )
        .route("/vacations/current", get(leave::current_vacation))
        .route(
            "/vacations/{id}",
            get(leave::get_vacation)
                .put(leave::update_vacation)
                .delete(leave::delete_vacation),
        )
        .route(
            "/workplace-plans",
            get(presence::list_plans).post(presence::set_plan),
        )
        .route("/workplace-plans/date", get(presence::plan_for_date))
        .route("/workplace-plans/{date}", delete(presence::delete_plan))
        .route("/office", get(presence::office))
        .route("/office/week", get(presence::office_week))
        .route("/office/all-employees", get(presence::all_employees))
        .route("/stats/me", get(admin::my_stats))
}

fn workflow_routes() -> Router<AppState> {
    Router::new()
        .route("/change-requests/my", get(change_requests::list_mine))
        .route("/change-requests", post(change_requests::create))
        .route("/change-requests/{id}", delete(change_requests::delete))
        .route("/change-requests/admin/all", get(change_requests::list_all))
        .route(
            "/change-requests/admin/pending-count",
            get(change_requests::pending_count),
        )
        .route("/change-requests/admin/{id}", put(change_requests::resolve))
        .route("/notifications", get(notifications::list))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route(
            "/notifications/settings",
            get(notifications::get_settings).put(notifications::update_settings),
        )
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route(
            "/notifications/admin/check-events",
            post(notifications::check_events),
        )
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/departments",
            get(organization::list_departments).post(organization::create_department),
        )
        .route("/departments/{id}", delete(organization::delete_department))
        .route("/admin/settings", get(organization::settings))
        .route("/admin/settings/icons/allowed", get(organization::allowed_icons))
        .route("/admin/settings/icons", put(organization::update_icons))
        .route(
            "/admin/settings/logo",
            put(organization::set_logo).delete(organization::delete_logo),
        )
        .route(
            "/admin/employees",
            get(admin::list_employees).post(admin::create_employee),
        )
        .route(
            "/admin/employees/{id}",
            get(admin::get_employee)
                .put(admin::update_employee)
                .delete(admin::delete_employee),
        )
        .route(
            "/admin/employees/{id}/profile",
            put(admin::update_employee_profile),
        )
        .route(
            "/admin/employees/{id}/activate",
            patch(admin::activate_employee),
        )
        .route(
            "/admin/employees/{id}/deactivate",
            patch(admin::deactivate_employee),
        )
        .route(
            "/admin/employees/{id}/time-entries",
            get(admin::employee_time_entries).post(admin::create_employee_time_entry),
        )
        .route(
            "/admin/employees/{id}/day-status",
            post(admin::set_employee_day_status),
        )
        .route(
            "/admin/employees/{id}/day-status/{status_id}",
            delete(admin::delete_employee_day_status),
        )
        .route("/admin/stats", get(admin::employee_stats))
        .route("/admin/stats/summary", get(admin::stats_summary))
}

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The SPA is served from another origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .merge(auth_routes())
        .merge(tracking_routes())
        .merge(workflow_routes())
        .merge(admin_routes());

    let prefix = state.config.api_prefix.trim_end_matches('/').to_string();
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(&prefix, api)
    };

    router
        .route("/health", get(handlers::health_check))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::db::{FullRepository, LocalRepository};
    use crate::services::mailer::{EmailService, MemoryTransport};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn state() -> AppState {
        let repo = Arc::new(LocalRepository::new()) as Arc<dyn FullRepository>;
        let config = AppConfig::default();
        let mail = EmailService::new(
            Arc::new(MemoryTransport::new()),
            &config.app_name,
            &config.frontend_url,
        );
        AppState::new(repo, config, Arc::new(mail))
    }

    #[tokio::test]
    async fn test_health_is_outside_prefix() {
        let app = create_router(state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let app = create_router(state());
        let response = app
            .oneshot(Request::get("/api/auth/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
