use media_models::MediaError;
use prometheus::{
    Counter, Encoder, Histogram, HistogramOpts, IntGauge, Registry, TextEncoder,
};
use tracing::debug;

pub struct MetricsService {
    registry: Registry,
    jobs_started_total: Counter,
    jobs_ready_total: Counter,
    jobs_failed_total: Counter,
    jobs_cancelled_total: Counter,
    format_requests_total: Counter,
    format_failures_total: Counter,
    rejected_urls_total: Counter,
    extraction_duration_ms: Histogram,
    active_sessions: IntGauge,
}

fn internal(e: prometheus::Error) -> MediaError {
    MediaError::InternalError { reason: e.to_string() }
}

impl MetricsService {
    pub fn new() -> Result<Self, MediaError> {
        let registry = Registry::new();

        let jobs_started_total = Counter::new(
            "media_jobs_started_total",
            "Total number of download link jobs started",
        )
        .map_err(internal)?;

        let jobs_ready_total = Counter::new(
            "media_jobs_ready_total",
            "Total number of jobs that produced a download link",
        )
        .map_err(internal)?;

        let jobs_failed_total = Counter::new(
            "media_jobs_failed_total",
            "Total number of jobs that ended in error",
        )
        .map_err(internal)?;

        let jobs_cancelled_total = Counter::new(
            "media_jobs_cancelled_total",
            "Total number of jobs cancelled by their session",
        )
        .map_err(internal)?;

        let format_requests_total = Counter::new(
            "media_format_requests_total",
            "Total number of format listing requests",
        )
        .map_err(internal)?;

        let format_failures_total = Counter::new(
            "media_format_failures_total",
            "Total number of format listing requests that failed",
        )
        .map_err(internal)?;

        let rejected_urls_total = Counter::new(
            "media_rejected_urls_total",
            "Total number of URLs rejected by the domain policy",
        )
        .map_err(internal)?;

        let extraction_duration_ms = Histogram::with_opts(
            HistogramOpts::new(
                "media_extraction_duration_ms",
                "Extractor run time in milliseconds",
            )
            .buckets(vec![
                250.0, 500.0, 1000.0, 2500.0, 5000.0, 10000.0, 30000.0, 60000.0, 120000.0,
            ]),
        )
        .map_err(internal)?;

        let active_sessions = IntGauge::new(
            "media_active_sessions",
            "Number of sessions currently holding jobs",
        )
        .map_err(internal)?;

        registry.register(Box::new(jobs_started_total.clone())).map_err(internal)?;
        registry.register(Box::new(jobs_ready_total.clone())).map_err(internal)?;
        registry.register(Box::new(jobs_failed_total.clone())).map_err(internal)?;
        registry.register(Box::new(jobs_cancelled_total.clone())).map_err(internal)?;
        registry.register(Box::new(format_requests_total.clone())).map_err(internal)?;
        registry.register(Box::new(format_failures_total.clone())).map_err(internal)?;
        registry.register(Box::new(rejected_urls_total.clone())).map_err(internal)?;
        registry.register(Box::new(extraction_duration_ms.clone())).map_err(internal)?;
        registry.register(Box::new(active_sessions.clone())).map_err(internal)?;

        Ok(Self {
            registry,
            jobs_started_total,
            jobs_ready_total,
            jobs_failed_total,
            jobs_cancelled_total,
            format_requests_total,
            format_failures_total,
            rejected_urls_total,
            extraction_duration_ms,
            active_sessions,
        })
    }

    pub fn record_job_started(&self, session_id: &str) {
        self.jobs_started_total.inc();
        debug!("Recorded job start for session: {}", session_id);
    }

    pub fn record_job_ready(&self) {
        self.jobs_ready_total.inc();
    }

    pub fn record_job_failed(&self) {
        self.jobs_failed_total.inc();
    }

    pub fn record_job_cancelled(&self) {
        self.jobs_cancelled_total.inc();
    }

    pub fn record_format_request(&self) {
        self.format_requests_total.inc();
    }

    pub fn record_format_failure(&self) {
        self.format_failures_total.inc();
    }

    pub fn record_rejected_url(&self) {
        self.rejected_urls_total.inc();
    }

    pub fn record_extraction_duration(&self, duration_ms: f64) {
        self.extraction_duration_ms.observe(duration_ms);
        debug!("Recorded extraction duration: {}ms", duration_ms);
    }

    pub fn set_active_sessions(&self, count: usize) {
        self.active_sessions.set(count as i64);
    }

    pub fn get_prometheus_metrics(&self) -> Result<String, MediaError> {
        let metric_families = self.registry.gather();
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(internal)?;

        String::from_utf8(buffer).map_err(|e| MediaError::InternalError { reason: e.to_string() })
    }
}
