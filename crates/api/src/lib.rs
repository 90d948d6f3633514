pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod state;

pub use handlers::*;
pub use middleware::*;
pub use routes::*;
pub use session::*;
pub use state::*;

use axum::Router;
use std::future::Future;
use tracing::info;

/// Full application: routes, static front-end and the middleware stack.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();
    apply_middleware(build_router(state), &config)
}

pub async fn start_server<F>(
    state: AppState,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind = format!("{}:{}", state.config.server.bind, state.config.server.port);
    let app = app(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Media Sessions API listening on {}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
