use crate::{handlers::*, AppState};
use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::services::ServeDir;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/api/info", get(api_info))
        // Session scoped jobs
        .route("/start", post(start_download))
        .route("/status/:job_id", get(get_status))
        .route("/download/:job_id", get(get_download))
        .route("/cancel/:job_id", delete(cancel_download))
        .route("/jobs", get(list_jobs))
        // Format discovery
        .route("/formats", post(get_formats))
        // Health and metrics
        .route("/healthz", get(health_check))
        .route("/metrics", get(metrics))
}

/// API routes plus the front-end directory (`/` serves its `index.html`).
pub fn build_router(state: AppState) -> Router {
    let frontend = ServeDir::new(&state.config.server.frontend_dir);
    create_router().fallback_service(frontend).with_state(state)
}
