use crate::MediaError;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub sessions: SessionsConfig,
    pub limits: LimitsConfig,
    pub extractor: ExtractorConfig,
    pub policy: PolicyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub worker_threads: usize,
    pub request_timeout_secs: u64,
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SessionsConfig {
    pub timeout_hours: u64,
    pub max_sessions: usize,
    pub cleanup_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_concurrent_extractions: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ExtractorConfig {
    pub binary: String,
    pub cookies_file: String,
    pub js_runtime: Option<String>,
    pub remote_components: Option<String>,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub retries: u32,
    pub fragment_retries: u32,
    pub file_access_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PolicyConfig {
    pub allowed_domains: Vec<String>,
}

pub const DEFAULT_ALLOWED_DOMAINS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "m.youtube.com",
    "instagram.com",
    "www.instagram.com",
    "tiktok.com",
    "www.tiktok.com",
    "vm.tiktok.com",
    "facebook.com",
    "www.facebook.com",
    "fb.watch",
    "twitter.com",
    "x.com",
    "vimeo.com",
];

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind: "0.0.0.0".to_string(),
                port: 1005,
                worker_threads: 8,
                request_timeout_secs: 120,
                frontend_dir: "frontend_sessions".to_string(),
            },
            cors: CorsConfig {
                allowed_origins: vec![
                    "https://videos.naperu.cloud".to_string(),
                    "http://localhost:1005".to_string(),
                ],
            },
            sessions: SessionsConfig {
                timeout_hours: 24,
                max_sessions: 1000,
                cleanup_interval_secs: 300, // 5 minutes
            },
            limits: LimitsConfig {
                max_concurrent_extractions: 8,
            },
            extractor: ExtractorConfig {
                binary: "yt-dlp".to_string(),
                cookies_file: "/app/cookies/youtube.txt".to_string(),
                js_runtime: Some("node:/usr/bin/node".to_string()),
                remote_components: Some("ejs:github".to_string()),
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
                timeout_secs: 120,
                retries: 20,
                fragment_retries: 50,
                file_access_retries: 10,
            },
            policy: PolicyConfig {
                allowed_domains: DEFAULT_ALLOWED_DOMAINS
                    .iter()
                    .map(|d| d.to_string())
                    .collect(),
            },
        }
    }
}

/// Ten years.
pub const MAX_SESSION_TIMEOUT_HOURS: u64 = 87_600;

impl Config {
    /// Defaults, then the TOML file (if it exists), then `MEDIA_*` env vars.
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed("MEDIA_").split("__"))
    }

    pub fn load(path: Option<&Path>) -> Result<Self, MediaError> {
        let mut config: Config = Self::figment(path)
            .extract()
            .map_err(|e| MediaError::ConfigError { reason: e.to_string() })?;

        // Older deployments configure CORS with a bare comma separated list
        if let Ok(origins) = std::env::var("ALLOWED_ORIGINS") {
            let origins: Vec<String> = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
            if !origins.is_empty() {
                config.cors.allowed_origins = origins;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MediaError> {
        if self.server.worker_threads == 0 {
            return Err(MediaError::ConfigError {
                reason: "server.worker_threads must be at least 1".to_string(),
            });
        }
        if self.sessions.timeout_hours > MAX_SESSION_TIMEOUT_HOURS {
            return Err(MediaError::ConfigError {
                reason: format!(
                    "sessions.timeout_hours must be at most {MAX_SESSION_TIMEOUT_HOURS}"
                ),
            });
        }
        if self.limits.max_concurrent_extractions == 0 {
            return Err(MediaError::ConfigError {
                reason: "limits.max_concurrent_extractions must be at least 1".to_string(),
            });
        }
        if self.extractor.binary.trim().is_empty() {
            return Err(MediaError::ConfigError {
                reason: "extractor.binary must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
