use anyhow::Result;
use media_models::{ApiInfo, Job, ListJobsResponse, StartResponse};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Talks to a running server on behalf of one session.
pub struct SessionClient {
    client: Client,
    base_url: String,
    session_id: String,
}

impl SessionClient {
    pub fn new(base_url: &str, session_id: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session_id: session_id.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn info(&self) -> Result<ApiInfo> {
        let response = self.client.get(self.url("/api/info")).send().await?;
        if !response.status().is_success() {
            anyhow::bail!("Info failed: {}", response.status());
        }
        Ok(response.json().await?)
    }

    pub async fn start(&self, url: &str, quality: Option<&str>) -> Result<StartResponse> {
        let response = self
            .client
            .post(self.url("/start"))
            .header("X-Session-ID", &self.session_id)
            .json(&json!({ "url": url, "quality": quality }))
            .send()
            .await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            anyhow::bail!("Start failed: {}", error_text);
        }
        Ok(response.json().await?)
    }

    /// Status of a job, or `None` when this session does not own it.
    pub async fn status(&self, job_id: &str) -> Result<Option<Job>> {
        let response = self
            .client
            .get(self.url(&format!("/status/{job_id}")))
            .header("X-Session-ID", &self.session_id)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => Ok(Some(response.json().await?)),
            s => anyhow::bail!("Status failed: {}", s),
        }
    }

    pub async fn jobs(&self) -> Result<ListJobsResponse> {
        let response = self
            .client
            .get(self.url("/jobs"))
            .header("X-Session-ID", &self.session_id)
            .send()
            .await?;
        Ok(response.json().await?)
    }

    /// Raw status code and body of the download endpoint.
    pub async fn download(&self, job_id: &str) -> Result<(StatusCode, Value)> {
        let response = self
            .client
            .get(self.url(&format!("/download/{job_id}")))
            .header("X-Session-ID", &self.session_id)
            .send()
            .await?;
        let status = response.status();
        Ok((status, response.json().await?))
    }

    pub async fn cancel(&self, job_id: &str) -> Result<StatusCode> {
        let response = self
            .client
            .delete(self.url(&format!("/cancel/{job_id}")))
            .header("X-Session-ID", &self.session_id)
            .send()
            .await?;
        Ok(response.status())
    }

    /// Polls until the job leaves `processing` or the attempts run out.
    pub async fn wait_for_terminal(&self, job_id: &str, attempts: usize) -> Result<Job> {
        for _ in 0..attempts {
            if let Some(job) = self.status(job_id).await? {
                if job.status.is_terminal() {
                    return Ok(job);
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        anyhow::bail!("job {} did not finish", job_id)
    }
}
