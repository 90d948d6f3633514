//! Turns an extractor info document into the quality picker shown to users.

use media_models::{
    DetailedFormats, FormatInfo, FormatKind, FormatsResponse, MediaError, MediaInfo,
    QualityOption, RawFormat, VideoInfo,
};
use std::collections::BTreeSet;
use tracing::{debug, info};

const DESCRIPTION_LEN: usize = 500;

pub fn build_catalog(info: &MediaInfo) -> Result<FormatsResponse, MediaError> {
    match info.live_status.as_deref() {
        Some("was_live") => return Err(MediaError::LiveStreamEnded),
        Some("is_live") => return Err(MediaError::LiveStreamActive),
        _ => {}
    }

    let video_info = video_info(info);

    let mut detailed = DetailedFormats::default();
    for (i, raw) in info.formats.iter().enumerate() {
        match classify(raw) {
            Some(format) => {
                debug!(
                    index = i + 1,
                    format_id = ?format.format_id,
                    kind = ?format.kind,
                    height = ?format.height,
                    "Format accepted"
                );
                match format.kind {
                    FormatKind::VideoAudio => detailed.video_audio.push(format),
                    FormatKind::VideoOnly => detailed.video_only.push(format),
                    _ => detailed.audio_only.push(format),
                }
            }
            None => debug!(index = i + 1, format_id = ?raw.format_id, "Format discarded"),
        }
    }

    let common_qualities = common_qualities(&detailed);

    info!(
        total = info.formats.len(),
        video_audio = detailed.video_audio.len(),
        video_only = detailed.video_only.len(),
        audio_only = detailed.audio_only.len(),
        qualities = common_qualities.len(),
        "Format catalog built"
    );

    Ok(FormatsResponse {
        success: true,
        video_info,
        common_qualities,
        detailed_formats: detailed,
        total_formats: info.formats.len(),
    })
}

fn video_info(info: &MediaInfo) -> VideoInfo {
    let description = match info.description.as_deref() {
        Some(d) if !d.is_empty() => {
            let head: String = d.chars().take(DESCRIPTION_LEN).collect();
            format!("{head}...")
        }
        _ => String::new(),
    };

    VideoInfo {
        title: info.title.clone().unwrap_or_else(|| "Untitled video".to_string()),
        duration: info.duration.unwrap_or(0.0),
        thumbnail: info.thumbnail.clone(),
        uploader: info.uploader.clone().unwrap_or_else(|| "Unknown".to_string()),
        view_count: info.view_count.unwrap_or(0),
        upload_date: info.upload_date.clone().unwrap_or_default(),
        description,
    }
}

/// A missing codec counts as present; only an explicit "none" means absent.
fn has_stream(codec: &Option<String>) -> bool {
    codec.as_deref() != Some("none")
}

/// Classifies one format. Formats without a URL, and formats carrying
/// neither audio nor video (storyboards), are dropped.
pub fn classify(raw: &RawFormat) -> Option<FormatInfo> {
    raw.url.as_ref()?;

    let has_video = has_stream(&raw.vcodec);
    let has_audio = has_stream(&raw.acodec);
    let kind = match (has_video, has_audio) {
        (true, true) => FormatKind::VideoAudio,
        (true, false) => FormatKind::VideoOnly,
        (false, true) => FormatKind::AudioOnly,
        (false, false) => return None,
    };

    let codec = |c: &Option<String>| Some(c.clone().unwrap_or_else(|| "unknown".to_string()));
    let resolution = raw.resolution.clone().unwrap_or_else(|| {
        let dim = |d: Option<u32>| d.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
        format!("{}x{}", dim(raw.width), dim(raw.height))
    });

    Some(FormatInfo {
        format_id: raw.format_id.clone(),
        ext: raw.ext.clone().unwrap_or_else(|| "unknown".to_string()),
        filesize: raw
            .filesize
            .filter(|s| *s > 0)
            .or_else(|| raw.filesize_approx.map(|s| s.max(0.0) as u64)),
        tbr: raw.tbr,
        abr: raw.abr,
        vbr: raw.vbr,
        fps: raw.fps,
        height: raw.height,
        width: raw.width,
        resolution,
        kind,
        vcodec: if has_video { codec(&raw.vcodec) } else { None },
        acodec: if has_audio { codec(&raw.acodec) } else { None },
        sample_rate: if kind == FormatKind::AudioOnly { raw.asr } else { None },
    })
}

fn bitrate(format: &FormatInfo) -> f64 {
    format
        .vbr
        .filter(|v| *v > 0.0)
        .or(format.tbr)
        .unwrap_or(0.0)
}

/// One entry per resolution (highest first) plus one per audio stream,
/// after the automatic "best" choice.
pub fn common_qualities(detailed: &DetailedFormats) -> Vec<QualityOption> {
    let mut options = vec![QualityOption {
        value: "best".to_string(),
        label: "Best quality (automatic)".to_string(),
        kind: FormatKind::Auto,
    }];

    let video: Vec<&FormatInfo> = detailed
        .video_audio
        .iter()
        .chain(detailed.video_only.iter())
        .collect();

    let heights: BTreeSet<u32> = video
        .iter()
        .filter_map(|f| f.height)
        .filter(|h| *h > 0)
        .collect();

    for height in heights.into_iter().rev() {
        let combined = detailed
            .video_audio
            .iter()
            .find(|f| f.height == Some(height));

        let chosen = combined.or_else(|| {
            detailed
                .video_only
                .iter()
                .filter(|f| f.height == Some(height))
                .fold(None, |best: Option<&FormatInfo>, f| match best {
                    Some(b) if bitrate(f) <= bitrate(b) => Some(b),
                    _ => Some(f),
                })
        });

        if let Some(format) = chosen {
            options.push(QualityOption {
                value: format.format_id.clone().unwrap_or_default(),
                label: video_label(height, format),
                kind: format.kind,
            });
        }
    }

    for format in &detailed.audio_only {
        let mut label = format!("Audio {}", format.ext.to_uppercase());
        if let Some(abr) = format.abr.filter(|a| *a > 0.0) {
            label.push_str(&format!(" ({}k)", abr.round() as u64));
        }
        options.push(QualityOption {
            value: format.format_id.clone().unwrap_or_default(),
            label,
            kind: FormatKind::AudioOnly,
        });
    }

    options
}

fn video_label(height: u32, format: &FormatInfo) -> String {
    let mut label = format!("{height}p");
    if let Some(fps) = format.fps.filter(|f| *f > 25.0) {
        if fps.fract() == 0.0 {
            label.push_str(&format!(" {}fps", fps as u64));
        } else {
            label.push_str(&format!(" {fps}fps"));
        }
    }
    match format.kind {
        FormatKind::VideoAudio => label.push_str(" Video+Audio"),
        _ => label.push_str(" Video only"),
    }
    label
}
