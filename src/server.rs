use anyhow::{anyhow, Result};
use media_api::AppState;
use media_control::SessionJanitor;
use media_extractor::YtDlp;
use media_metrics::MetricsService;
use media_models::Config;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Runs the API and the session janitor until `shutdown` resolves.
pub async fn run<F>(config: Config, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    info!(
        bind = %config.server.bind,
        port = config.server.port,
        max_sessions = config.sessions.max_sessions,
        max_extractions = config.limits.max_concurrent_extractions,
        "Starting Media Sessions"
    );

    if !Path::new(&config.extractor.cookies_file).exists() {
        warn!(
            "Cookie file {} not found, extracting without cookies",
            config.extractor.cookies_file
        );
    }
    if !Path::new(&config.server.frontend_dir).is_dir() {
        warn!("Front-end directory {} not found", config.server.frontend_dir);
    }

    let metrics = Arc::new(MetricsService::new()?);
    let extractor = Arc::new(YtDlp::new(config.extractor.clone()));
    let state = AppState::with_extractor(config, extractor, metrics);

    let janitor = SessionJanitor::new(state.manager.clone());
    let janitor_handle = tokio::spawn(async move { janitor.start().await });

    let result = media_api::start_server(state, shutdown).await;
    janitor_handle.abort();

    info!("Media Sessions stopped");
    result.map_err(|e| anyhow!("API server error: {e}"))
}
