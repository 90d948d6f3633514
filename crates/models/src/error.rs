use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorShape {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_detected: Option<String>,
}

impl ErrorShape {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            success: None,
            platform_detected: None,
        }
    }

    /// Shape used by endpoints that report `success` explicitly.
    pub fn unsuccessful(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            ..Self::new(message)
        }
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform_detected = Some(platform.into());
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MediaError {
    #[error("URL required")]
    UrlRequired,

    #[error("URL not allowed. Only YouTube, Instagram, TikTok, Facebook, Twitter and Vimeo are accepted")]
    UrlNotAllowed,

    #[error("Invalid session id: {reason}")]
    InvalidSession { reason: String },

    #[error("Job not found in this session")]
    JobNotFound { job_id: String },

    #[error("Download is not ready")]
    JobNotReady { job_id: String },

    #[error("Download URL not available")]
    DownloadUrlUnavailable { job_id: String },

    #[error("{message}")]
    ExtractionFailed { message: String },

    #[error("Extraction timed out after {timeout_secs}s")]
    ExtractionTimeout { timeout_secs: u64 },

    #[error("This live event has ended and is not available for download")]
    LiveStreamEnded,

    #[error("Active live streams cannot be downloaded")]
    LiveStreamActive,

    #[error("Could not obtain a download URL")]
    NoDownloadUrl,

    #[error("Internal server error: {reason}")]
    InternalError { reason: String },

    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

impl MediaError {
    pub fn to_error_shape(&self) -> ErrorShape {
        ErrorShape::new(self.to_string())
    }

    pub fn http_status(&self) -> u16 {
        match self {
            MediaError::UrlRequired => 400,
            MediaError::UrlNotAllowed => 400,
            MediaError::InvalidSession { .. } => 400,
            MediaError::JobNotFound { .. } => 404,
            MediaError::JobNotReady { .. } => 400,
            MediaError::DownloadUrlUnavailable { .. } => 500,
            // Extraction problems are reported as bad input to the caller
            MediaError::ExtractionFailed { .. } => 400,
            MediaError::ExtractionTimeout { .. } => 400,
            MediaError::LiveStreamEnded => 400,
            MediaError::LiveStreamActive => 400,
            MediaError::NoDownloadUrl => 400,
            MediaError::InternalError { .. } => 500,
            MediaError::ConfigError { .. } => 500,
        }
    }
}
