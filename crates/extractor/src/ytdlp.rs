use crate::{ExtractPurpose, ExtractSpec, Extractor};
use async_trait::async_trait;
use media_models::{ExtractorConfig, MediaError, MediaInfo};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, instrument, warn};

const ACCEPT_HEADERS: &[(&str, &str)] = &[
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.5"),
    ("Accept-Encoding", "gzip, deflate"),
    ("DNT", "1"),
    ("Connection", "keep-alive"),
    ("Upgrade-Insecure-Requests", "1"),
];

/// Runs the `yt-dlp` binary in metadata-only mode and parses its JSON output.
pub struct YtDlp {
    config: ExtractorConfig,
}

impl YtDlp {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Command line for one extraction. `with_cookies` is decided by the caller
    /// so this stays free of filesystem access.
    pub fn build_args(&self, spec: &ExtractSpec, with_cookies: bool) -> Vec<String> {
        let cfg = &self.config;
        let mut args: Vec<String> = vec![
            "--dump-single-json".into(),
            "--no-playlist".into(),
            "--no-warnings".into(),
            "--retries".into(),
            cfg.retries.to_string(),
            "--fragment-retries".into(),
            cfg.fragment_retries.to_string(),
            "--file-access-retries".into(),
            cfg.file_access_retries.to_string(),
        ];

        if let Some(format) = &spec.format {
            args.push("--format".into());
            args.push(format.clone());
        }

        if with_cookies {
            args.push("--cookies".into());
            args.push(cfg.cookies_file.clone());
        }

        if let Some(runtime) = &cfg.js_runtime {
            args.push("--js-runtimes".into());
            args.push(runtime.clone());
        }
        if let Some(components) = &cfg.remote_components {
            args.push("--remote-components".into());
            args.push(components.clone());
        }

        args.push("--user-agent".into());
        args.push(cfg.user_agent.clone());
        args.push("--referer".into());
        args.push(spec.url.clone());
        for (name, value) in ACCEPT_HEADERS {
            args.push("--add-header".into());
            args.push(format!("{name}:{value}"));
        }

        args.push("--extractor-args".into());
        args.push("youtube:player_client=android,web,ios".into());
        args.push("--extractor-args".into());
        args.push("instagram:comment_count=0".into());
        if spec.purpose == ExtractPurpose::DownloadLink {
            args.push("--extractor-args".into());
            args.push("tiktok:api_hostname=api.tiktokv.com".into());
        }

        // End of options, the URL can never be read as a flag
        args.push("--".into());
        args.push(spec.url.clone());
        args
    }

    async fn cookies_available(&self) -> bool {
        let path = Path::new(&self.config.cookies_file);
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }
}

#[async_trait]
impl Extractor for YtDlp {
    #[instrument(skip(self, spec), fields(purpose = ?spec.purpose))]
    async fn extract(&self, spec: ExtractSpec) -> Result<MediaInfo, MediaError> {
        let with_cookies = self.cookies_available().await;
        let args = self.build_args(&spec, with_cookies);

        let mut cmd = Command::new(&self.config.binary);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let timeout_secs = self.config.timeout_secs;
        let output = match tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(MediaError::InternalError {
                    reason: format!("failed to run {}: {}", self.config.binary, e),
                })
            }
            Err(_) => {
                warn!("Extractor timed out after {}s", timeout_secs);
                return Err(MediaError::ExtractionTimeout { timeout_secs });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = failure_message(&stderr)
                .unwrap_or_else(|| format!("extractor exited with {}", output.status));
            warn!("Extractor failed: {}", message);
            return Err(MediaError::ExtractionFailed { message });
        }

        let info = parse_info(&output.stdout)?;
        info!(formats = info.formats.len(), cookies = with_cookies, "Extraction finished");
        Ok(info)
    }
}

pub fn parse_info(stdout: &[u8]) -> Result<MediaInfo, MediaError> {
    serde_json::from_slice(stdout).map_err(|e| MediaError::ExtractionFailed {
        message: format!("Could not read extractor output: {e}"),
    })
}

/// Picks the most useful line out of the extractor's stderr: the last
/// `ERROR:` line, otherwise the last non-empty one.
pub fn failure_message(stderr: &str) -> Option<String> {
    let lines: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    lines
        .iter()
        .rev()
        .find_map(|l| l.strip_prefix("ERROR:"))
        .map(|l| l.trim().to_string())
        .or_else(|| lines.last().map(|l| l.to_string()))
}
