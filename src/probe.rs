use anyhow::{bail, Context, Result};
use reqwest::StatusCode;
use std::time::Duration;

pub const DEFAULT_PROBE_URL: &str = "http://localhost:1005/api/info";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// One liveness probe. Succeeds only on a 2xx answer within `timeout`.
pub async fn check(url: &str, timeout: Duration) -> Result<StatusCode> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("building probe client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("probe request to {url} failed"))?;

    let status = response.status();
    if !status.is_success() {
        bail!("probe got {status} from {url}");
    }
    Ok(status)
}
