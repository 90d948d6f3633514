use serde::{Deserialize, Serialize};

/// The part of the extractor's info document this service reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MediaInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub formats: Vec<RawFormat>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub upload_date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub live_status: Option<String>,
}

impl MediaInfo {
    /// Exact size when known, otherwise the estimate, otherwise zero.
    pub fn size_hint(&self) -> u64 {
        self.filesize
            .filter(|s| *s > 0)
            .or_else(|| self.filesize_approx.map(|s| s.max(0.0) as u64))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<f64>,
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub vbr: Option<f64>,
    #[serde(default)]
    pub fps: Option<f64>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub resolution: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub asr: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FormatKind {
    #[serde(rename = "video+audio")]
    VideoAudio,
    #[serde(rename = "video")]
    VideoOnly,
    #[serde(rename = "audio")]
    AudioOnly,
    #[serde(rename = "auto")]
    Auto,
}

/// A downloadable format as reported to the browser.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatInfo {
    pub format_id: Option<String>,
    pub ext: String,
    pub filesize: Option<u64>,
    pub tbr: Option<f64>,
    pub abr: Option<f64>,
    pub vbr: Option<f64>,
    pub fps: Option<f64>,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub resolution: String,
    #[serde(rename = "type")]
    pub kind: FormatKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vcodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acodec: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QualityOption {
    pub value: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FormatKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoInfo {
    pub title: String,
    pub duration: f64,
    pub thumbnail: Option<String>,
    pub uploader: String,
    pub view_count: u64,
    pub upload_date: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DetailedFormats {
    pub video_audio: Vec<FormatInfo>,
    pub video_only: Vec<FormatInfo>,
    pub audio_only: Vec<FormatInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormatsResponse {
    pub success: bool,
    pub video_info: VideoInfo,
    pub common_qualities: Vec<QualityOption>,
    pub detailed_formats: DetailedFormats,
    pub total_formats: usize,
}
