use media_models::{MediaInfo, RawFormat};

pub fn video_format(id: &str, height: u32, fps: f64, vbr: f64, with_audio: bool) -> RawFormat {
    RawFormat {
        format_id: Some(id.to_string()),
        url: Some(format!("https://cdn.example/{id}")),
        ext: Some("mp4".to_string()),
        filesize: Some(1_000_000),
        height: Some(height),
        width: Some(height * 16 / 9),
        fps: Some(fps),
        vbr: Some(vbr),
        tbr: Some(vbr + if with_audio { 128.0 } else { 0.0 }),
        vcodec: Some("avc1.64001F".to_string()),
        acodec: Some(if with_audio { "mp4a.40.2" } else { "none" }.to_string()),
        ..Default::default()
    }
}

pub fn audio_format(id: &str, ext: &str, abr: f64) -> RawFormat {
    RawFormat {
        format_id: Some(id.to_string()),
        url: Some(format!("https://cdn.example/{id}")),
        ext: Some(ext.to_string()),
        filesize_approx: Some(400_000.0),
        abr: Some(abr),
        asr: Some(44_100),
        vcodec: Some("none".to_string()),
        acodec: Some("opus".to_string()),
        ..Default::default()
    }
}

pub fn storyboard(id: &str) -> RawFormat {
    RawFormat {
        format_id: Some(id.to_string()),
        url: Some(format!("https://cdn.example/{id}")),
        ext: Some("mhtml".to_string()),
        vcodec: Some("none".to_string()),
        acodec: Some("none".to_string()),
        ..Default::default()
    }
}

/// A page with a mix of combined, video-only, audio-only and unusable formats.
pub fn sample_info() -> MediaInfo {
    MediaInfo {
        title: Some("Sample clip".to_string()),
        ext: Some("mp4".to_string()),
        url: Some("https://cdn.example/direct.mp4".to_string()),
        duration: Some(212.0),
        filesize: Some(5_000_000),
        thumbnail: Some("https://img.example/thumb.jpg".to_string()),
        uploader: Some("Uploader".to_string()),
        view_count: Some(1234),
        upload_date: Some("20240101".to_string()),
        description: Some("A short description".to_string()),
        formats: vec![
            storyboard("sb0"),
            audio_format("140", "m4a", 129.5),
            video_format("18", 360, 30.0, 500.0, true),
            video_format("134", 360, 30.0, 300.0, false),
            video_format("136", 720, 30.0, 1500.0, false),
            video_format("298", 720, 60.0, 2500.0, false),
            video_format("299", 1080, 60.0, 4500.0, false),
            RawFormat {
                format_id: Some("no-url".to_string()),
                height: Some(1440),
                ..Default::default()
            },
        ],
        ..Default::default()
    }
}

/// Raw JSON as the extractor would print it.
pub fn sample_info_json() -> String {
    serde_json::to_string(&sample_info()).expect("fixture serializes")
}
