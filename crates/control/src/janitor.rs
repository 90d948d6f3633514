use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::manager::DownloadManager;
use tracing::{info, instrument};

/// Periodically expires idle sessions so memory stays bounded even when
/// nobody starts new jobs.
pub struct SessionJanitor {
    manager: Arc<DownloadManager>,
    period: Duration,
}

impl SessionJanitor {
    pub fn new(manager: Arc<DownloadManager>) -> Self {
        let secs = manager.sessions_config().cleanup_interval_secs.max(1);
        Self {
            manager,
            period: Duration::from_secs(secs),
        }
    }

    pub fn with_period(manager: Arc<DownloadManager>, period: Duration) -> Self {
        Self { manager, period }
    }

    #[instrument(skip(self))]
    pub async fn start(&self) {
        info!(
            "Starting session janitor every {:?}, session timeout {}h, max sessions {}",
            self.period,
            self.manager.sessions_config().timeout_hours,
            self.manager.sessions_config().max_sessions
        );

        let mut ticker = interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.run_cleanup_cycle().await;
        }
    }

    pub async fn run_cleanup_cycle(&self) -> usize {
        self.manager.cleanup().await
    }
}
