pub mod ytdlp;

pub use ytdlp::*;

use async_trait::async_trait;
use media_models::{MediaError, MediaInfo};

/// What the extraction is for. Link jobs carry a few extra extractor hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractPurpose {
    DownloadLink,
    Formats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractSpec {
    pub url: String,
    /// yt-dlp format selector, only set for link jobs.
    pub format: Option<String>,
    pub purpose: ExtractPurpose,
}

impl ExtractSpec {
    pub fn download_link(url: &str, format: &str) -> Self {
        Self {
            url: url.to_string(),
            format: Some(format.to_string()),
            purpose: ExtractPurpose::DownloadLink,
        }
    }

    pub fn formats(url: &str) -> Self {
        Self {
            url: url.to_string(),
            format: None,
            purpose: ExtractPurpose::Formats,
        }
    }
}

#[async_trait]
pub trait Extractor: Send + Sync + 'static {
    async fn extract(&self, spec: ExtractSpec) -> Result<MediaInfo, MediaError>;
}
