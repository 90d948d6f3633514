use crate::catalog::build_catalog;
use crate::concurrency::ExtractionLimiter;
use crate::filename::sanitize_filename;
use crate::sessions::{JobKey, SessionStore};
use crate::url_policy::{friendly_error, Platform, UrlPolicy};
use chrono::{TimeDelta, Utc};
use dashmap::DashMap;
use media_extractor::{ExtractSpec, Extractor};
use media_metrics::{MetricsService, TracingService};
use media_models::{
    Config, DownloadLink, DownloadResponse, FormatsResponse, Job, JobOutcome, JobStatus,
    ListJobsResponse, MediaError, MediaInfo, SessionsConfig,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{info, instrument, warn};

/// Maps the requested quality onto an extractor format selector. An explicit
/// format id always wins; unknown quality words are taken as format ids.
pub fn format_selector(quality: &str, format_id: Option<&str>) -> String {
    if let Some(id) = format_id.filter(|id| !id.is_empty()) {
        return id.to_string();
    }
    match quality {
        "audio" => "bestaudio/best".to_string(),
        "best" => "best".to_string(),
        other => other.to_string(),
    }
}

/// Chooses the direct link for a resolved page: the top-level URL, or the
/// first format that carries one.
pub fn resolve_link(info: &MediaInfo) -> Result<DownloadLink, MediaError> {
    let download_url = info
        .url
        .clone()
        .filter(|u| !u.is_empty())
        .or_else(|| info.formats.iter().find_map(|f| f.url.clone()))
        .ok_or(MediaError::NoDownloadUrl)?;

    let title = info.title.clone().unwrap_or_else(|| "video".to_string());
    let ext = info.ext.clone().unwrap_or_else(|| "mp4".to_string());

    Ok(DownloadLink {
        download_url,
        filename: sanitize_filename(&format!("{title}.{ext}")),
        file_size: info.size_hint(),
        title,
        duration: info.duration.unwrap_or(0.0),
    })
}

pub struct DownloadManager {
    store: SessionStore,
    extractor: Arc<dyn Extractor>,
    limiter: ExtractionLimiter,
    metrics: Arc<MetricsService>,
    policy: UrlPolicy,
    sessions_config: SessionsConfig,
    tasks: Arc<DashMap<JobKey, AbortHandle>>,
}

impl DownloadManager {
    pub fn new(config: &Config, extractor: Arc<dyn Extractor>, metrics: Arc<MetricsService>) -> Self {
        Self {
            store: SessionStore::new(),
            extractor,
            limiter: ExtractionLimiter::new(config.limits.max_concurrent_extractions),
            metrics,
            policy: UrlPolicy::new(&config.policy.allowed_domains),
            sessions_config: config.sessions.clone(),
            tasks: Arc::new(DashMap::new()),
        }
    }

    // Accessors for subsystems
    pub fn store(&self) -> SessionStore { self.store.clone() }
    pub fn limiter(&self) -> ExtractionLimiter { self.limiter.clone() }
    pub fn metrics(&self) -> Arc<MetricsService> { self.metrics.clone() }
    pub fn sessions_config(&self) -> &SessionsConfig { &self.sessions_config }

    fn check_url(&self, url: Option<&str>) -> Result<String, MediaError> {
        let url = url.map(str::trim).filter(|u| !u.is_empty()).ok_or(MediaError::UrlRequired)?;
        if !self.policy.is_allowed(url) {
            self.metrics.record_rejected_url();
            return Err(MediaError::UrlNotAllowed);
        }
        Ok(url.to_string())
    }

    /// Registers a job for the session and resolves its link in the background.
    #[instrument(skip(self, url))]
    pub async fn start(
        &self,
        session_id: &str,
        url: Option<&str>,
        quality: Option<&str>,
        format_id: Option<&str>,
    ) -> Result<Job, MediaError> {
        self.cleanup().await;

        let url = self.check_url(url)?;
        let quality = quality.filter(|q| !q.is_empty()).unwrap_or("best");
        let selector = format_selector(quality, format_id);

        let job = Job::new(session_id, &url, quality);
        let key = JobKey::new(session_id, &job.id);
        self.store.insert(job.clone()).await;
        self.metrics.record_job_started(session_id);
        self.metrics.set_active_sessions(self.store.session_count().await);
        TracingService::log_job_started(session_id, &job.id, quality);

        let worker = JobWorker {
            store: self.store.clone(),
            extractor: self.extractor.clone(),
            limiter: self.limiter.clone(),
            metrics: self.metrics.clone(),
            tasks: self.tasks.clone(),
        };
        let (registered_tx, registered_rx) = oneshot::channel();
        let handle = tokio::spawn(worker.run(
            key.clone(),
            ExtractSpec::download_link(&url, &selector),
            registered_rx,
        ));
        self.tasks.insert(key, handle.abort_handle());
        let _ = registered_tx.send(());

        Ok(job)
    }

    pub async fn get(&self, session_id: &str, job_id: &str) -> Result<Job, MediaError> {
        match self.store.get(session_id, job_id).await {
            Some(job) => Ok(job),
            None => {
                warn!("Job {} not found for session {}", job_id, session_id);
                if let Some(owner) = self.store.find_owner(job_id).await {
                    warn!("Job {} belongs to a different session: {}", job_id, owner);
                }
                Err(MediaError::JobNotFound { job_id: job_id.to_string() })
            }
        }
    }

    pub async fn download(&self, session_id: &str, job_id: &str) -> Result<DownloadResponse, MediaError> {
        let job = self
            .store
            .get(session_id, job_id)
            .await
            .ok_or_else(|| MediaError::JobNotFound { job_id: job_id.to_string() })?;

        if job.status != JobStatus::Ready {
            return Err(MediaError::JobNotReady { job_id: job_id.to_string() });
        }

        let download_url = job
            .download_url
            .ok_or_else(|| MediaError::DownloadUrlUnavailable { job_id: job_id.to_string() })?;

        Ok(DownloadResponse {
            download_url,
            filename: job.filename.unwrap_or_else(|| "video.mp4".to_string()),
            file_size: job.file_size,
        })
    }

    /// Marks the job cancelled and stops its extractor if it is still running.
    #[instrument(skip(self))]
    pub async fn cancel(&self, session_id: &str, job_id: &str) -> Result<(), MediaError> {
        if !self.store.cancel(session_id, job_id).await {
            return Err(MediaError::JobNotFound { job_id: job_id.to_string() });
        }
        if let Some((_, handle)) = self.tasks.remove(&JobKey::new(session_id, job_id)) {
            handle.abort();
        }
        self.metrics.record_job_cancelled();
        TracingService::log_job_cancelled(session_id, job_id);
        Ok(())
    }

    pub async fn list(&self, session_id: &str) -> ListJobsResponse {
        let jobs = self.store.list(session_id).await;
        let active = jobs.iter().filter(|j| j.status == JobStatus::Processing).count();
        ListJobsResponse {
            session_id: session_id.to_string(),
            total: jobs.len(),
            active,
            jobs,
        }
    }

    /// Lists the formats of a page without creating a job. Extraction
    /// failures come back as `ExtractionFailed` with a user-facing message.
    #[instrument(skip(self, url))]
    pub async fn formats(&self, url: Option<&str>) -> Result<FormatsResponse, MediaError> {
        let url = self.check_url(url)?;
        self.metrics.record_format_request();
        info!("Fetching formats for an allowed URL");

        let platform = Platform::detect(&url);
        let result = async {
            let _permit = self.limiter.acquire().await?;
            let started = Instant::now();
            let info = self.extractor.extract(ExtractSpec::formats(&url)).await;
            self.metrics
                .record_extraction_duration(started.elapsed().as_millis() as f64);
            build_catalog(&info?)
        }
        .await;

        result.map_err(|e| {
            self.metrics.record_format_failure();
            let message = friendly_error(platform, &e.to_string());
            warn!(platform = platform.as_str(), "Format listing failed: {}", message);
            MediaError::ExtractionFailed { message }
        })
    }

    /// Applies the session age and capacity limits, stopping the work of
    /// every evicted job. Returns how many jobs were removed.
    pub async fn cleanup(&self) -> usize {
        let max_age = i64::try_from(self.sessions_config.timeout_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .unwrap_or(TimeDelta::MAX);
        let removed = self
            .store
            .cleanup(Utc::now(), max_age, self.sessions_config.max_sessions)
            .await;

        for key in &removed {
            if let Some((_, handle)) = self.tasks.remove(key) {
                handle.abort();
            }
        }

        let remaining = self.store.session_count().await;
        self.metrics.set_active_sessions(remaining);
        if !removed.is_empty() {
            TracingService::log_cleanup(remaining, removed.len());
        }
        removed.len()
    }

    /// Number of background extractions not yet finished.
    pub fn running_jobs(&self) -> usize {
        self.tasks.len()
    }
}

struct JobWorker {
    store: SessionStore,
    extractor: Arc<dyn Extractor>,
    limiter: ExtractionLimiter,
    metrics: Arc<MetricsService>,
    tasks: Arc<DashMap<JobKey, AbortHandle>>,
}

impl JobWorker {
    /// Waits until `start` has registered the abort handle, so the entry
    /// removed at the end always exists.
    async fn run(self, key: JobKey, spec: ExtractSpec, registered: oneshot::Receiver<()>) {
        let _ = registered.await;
        let started = Instant::now();
        let outcome = match self.resolve(spec).await {
            Ok(link) => JobOutcome::Ready(link),
            Err(e) => JobOutcome::Failed(e.to_string()),
        };
        let error_message = match &outcome {
            JobOutcome::Failed(message) => Some(message.clone()),
            JobOutcome::Ready(_) => None,
        };

        match self.store.complete(&key, outcome).await {
            Some(status) => {
                match status {
                    JobStatus::Ready => self.metrics.record_job_ready(),
                    _ => self.metrics.record_job_failed(),
                }
                TracingService::log_job_finished(
                    &key.session_id,
                    &key.job_id,
                    status,
                    started.elapsed().as_millis() as u64,
                    error_message.as_deref(),
                );
            }
            None => TracingService::log_result_discarded(&key.session_id, &key.job_id),
        }

        self.tasks.remove(&key);
    }

    async fn resolve(&self, spec: ExtractSpec) -> Result<DownloadLink, MediaError> {
        let _permit = self.limiter.acquire().await?;
        let started = Instant::now();
        let info = self.extractor.extract(spec).await;
        self.metrics
            .record_extraction_duration(started.elapsed().as_millis() as f64);
        resolve_link(&info?)
    }
}
