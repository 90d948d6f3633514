use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title shown while the extractor is still running.
pub const PENDING_TITLE: &str = "Fetching information...";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Ready,
    Error,
    Cancelled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Processing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Job {
    pub id: String,
    pub session_id: String,
    pub url: String,
    pub status: JobStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
    pub download_url: Option<String>,
    pub filename: Option<String>,
    pub file_size: u64,
    pub title: String,
    pub duration: f64,
    pub quality_requested: String,
}

impl Job {
    pub fn new(session_id: &str, url: &str, quality: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            url: url.to_string(),
            status: JobStatus::Processing,
            progress: 0,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
            download_url: None,
            filename: None,
            file_size: 0,
            title: PENDING_TITLE.to_string(),
            duration: 0.0,
            quality_requested: quality.to_string(),
        }
    }

    pub fn apply(&mut self, outcome: JobOutcome) {
        let now = Utc::now();
        match outcome {
            JobOutcome::Ready(link) => {
                self.status = JobStatus::Ready;
                self.progress = 100;
                self.download_url = Some(link.download_url);
                self.filename = Some(link.filename);
                self.file_size = link.file_size;
                self.title = link.title;
                self.duration = link.duration;
            }
            JobOutcome::Failed(message) => {
                self.status = JobStatus::Error;
                self.error = Some(message);
            }
        }
        self.completed_at = Some(now);
    }

    pub fn cancel(&mut self) {
        self.status = JobStatus::Cancelled;
        self.completed_at = Some(Utc::now());
    }
}

/// A resolved direct link for a job.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadLink {
    pub download_url: String,
    pub filename: String,
    pub file_size: u64,
    pub title: String,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Ready(DownloadLink),
    Failed(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub url: Option<String>,
    pub quality: Option<String>,
    pub format_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub success: bool,
    pub job_id: String,
    pub session_id: String,
    pub message: String,
    pub status_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadResponse {
    pub download_url: String,
    pub filename: String,
    pub file_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListJobsResponse {
    pub session_id: String,
    pub jobs: Vec<Job>,
    pub total: usize,
    pub active: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormatsRequest {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub version: String,
    pub features: Vec<String>,
    pub endpoints: Vec<String>,
}
