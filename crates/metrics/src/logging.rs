use media_models::{JobStatus, MediaError};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub struct TracingService;

impl TracingService {
    /// Installs the global subscriber. `RUST_LOG` overrides the default
    /// `info` level; `json` switches to one JSON object per line.
    pub fn init(json: bool) -> Result<(), MediaError> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339());

        let result = if json {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
        result.map_err(|e| MediaError::InternalError { reason: e.to_string() })
    }

    pub fn log_job_started(session_id: &str, job_id: &str, quality: &str) {
        info!(
            session_id = %session_id,
            job_id = %job_id,
            quality = %quality,
            "Fetching download link"
        );
    }

    pub fn log_job_finished(
        session_id: &str,
        job_id: &str,
        status: JobStatus,
        duration_ms: u64,
        error_message: Option<&str>,
    ) {
        match status {
            JobStatus::Ready => {
                info!(
                    session_id = %session_id,
                    job_id = %job_id,
                    duration_ms = duration_ms,
                    "Download link ready"
                );
            }
            JobStatus::Error => {
                error!(
                    session_id = %session_id,
                    job_id = %job_id,
                    duration_ms = duration_ms,
                    error_message = %error_message.unwrap_or("unknown"),
                    "Download link failed"
                );
            }
            _ => {
                warn!(
                    session_id = %session_id,
                    job_id = %job_id,
                    status = ?status,
                    "Job finished in unexpected state"
                );
            }
        }
    }

    pub fn log_result_discarded(session_id: &str, job_id: &str) {
        info!(
            session_id = %session_id,
            job_id = %job_id,
            "Extraction result discarded, job no longer processing"
        );
    }

    pub fn log_job_cancelled(session_id: &str, job_id: &str) {
        info!(session_id = %session_id, job_id = %job_id, "Job cancelled");
    }

    pub fn log_cleanup(sessions_remaining: usize, jobs_removed: usize) {
        info!(
            sessions_remaining = sessions_remaining,
            jobs_removed = jobs_removed,
            "Session cleanup completed"
        );
    }
}
