use media_control::DownloadManager;
use media_extractor::Extractor;
use media_metrics::MetricsService;
use media_models::Config;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub manager: Arc<DownloadManager>,
    pub metrics: Arc<MetricsService>,
}

impl AppState {
    pub fn new(config: Config, manager: Arc<DownloadManager>, metrics: Arc<MetricsService>) -> Self {
        Self {
            config,
            manager,
            metrics,
        }
    }

    /// Builds the download manager around `extractor`, sharing `metrics`.
    pub fn with_extractor(
        config: Config,
        extractor: Arc<dyn Extractor>,
        metrics: Arc<MetricsService>,
    ) -> Self {
        let manager = Arc::new(DownloadManager::new(&config, extractor, metrics.clone()));
        Self::new(config, manager, metrics)
    }
}
