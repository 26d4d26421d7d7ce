use axum::routing::{delete, get, post, put};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{
    daily_handlers, import_handlers, member_handlers, ops_handlers, report_handlers,
};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/imports", post(import_handlers::import_upload))
        .route("/v1/daily", get(daily_handlers::get_daily))
        .route("/v1/daily/cleanup", post(daily_handlers::cleanup_daily))
        .route("/v1/daily/:date/:tag", delete(daily_handlers::delete_upload))
        .route(
            "/v1/members",
            get(member_handlers::list_members).post(member_handlers::add_member),
        )
        .route("/v1/members/bulk", post(member_handlers::add_members_bulk))
        .route("/v1/members/refresh", post(member_handlers::refresh_all_members))
        .route(
            "/v1/members/:id",
            get(member_handlers::get_member).delete(member_handlers::delete_member),
        )
        .route("/v1/members/:id/toggle", post(member_handlers::toggle_member))
        .route("/v1/members/:id/refresh", post(member_handlers::refresh_member))
        .route("/v1/reports/summary", get(report_handlers::report_summary))
        .route("/v1/reports/dashboard", get(report_handlers::report_dashboard))
        .route("/v1/reports/html", get(report_handlers::report_html))
        .route("/v1/ops/remote/push", post(ops_handlers::remote_push))
        .route("/v1/ops/remote/pull", post(ops_handlers::remote_pull))
        .route(
            "/v1/ops/backoffice-token",
            put(ops_handlers::rotate_backoffice_token),
        )
        .route("/v1/ops/health/live", get(ops_handlers::health_live))
        .route("/v1/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v1/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}
