use url::Url;

/// Decides which page URLs may be handed to the extractor.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_domains: Vec<String>,
}

impl UrlPolicy {
    pub fn new<I, S>(allowed_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_domains: allowed_domains
                .into_iter()
                .map(|d| d.as_ref().trim().to_ascii_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    /// The host (port ignored) must equal an allowed domain or be a
    /// subdomain of one. Only http(s) URLs are considered.
    pub fn is_allowed(&self, raw: &str) -> bool {
        let Some(host) = host_of(raw) else {
            return false;
        };
        self.allowed_domains
            .iter()
            .any(|domain| host == *domain || host.ends_with(&format!(".{domain}")))
    }
}

fn host_of(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Instagram,
    Tiktok,
    Youtube,
    Unknown,
}

impl Platform {
    pub fn detect(raw: &str) -> Self {
        let Some(host) = host_of(raw) else {
            return Platform::Unknown;
        };
        let under = |domain: &str| host == domain || host.ends_with(&format!(".{domain}"));

        if under("instagram.com") {
            Platform::Instagram
        } else if under("tiktok.com") {
            Platform::Tiktok
        } else if under("youtube.com") || under("youtu.be") {
            Platform::Youtube
        } else {
            Platform::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
            Platform::Unknown => "unknown",
        }
    }
}

const GENERIC_FAILURE: &str =
    "Error processing the video. Check that the URL is valid and the content is available.";

/// Rewrites raw extractor failures into something a user can act on.
pub fn friendly_error(platform: Platform, raw: &str) -> String {
    let lower = raw.to_lowercase();
    let message = match platform {
        Platform::Instagram if lower.contains("login") || lower.contains("private") => {
            "This Instagram content is private or requires login".to_string()
        }
        Platform::Instagram if lower.contains("not found") => {
            "The Instagram content was not found or has been removed".to_string()
        }
        Platform::Instagram if lower.contains("age") => {
            "This Instagram content is age restricted".to_string()
        }
        Platform::Tiktok if lower.contains("private") => "This TikTok video is private".to_string(),
        Platform::Tiktok if lower.contains("region") => {
            "This TikTok content is not available in your region".to_string()
        }
        _ => raw.to_string(),
    };

    if message.chars().count() > 200 {
        GENERIC_FAILURE.to_string()
    } else {
        message
    }
}
