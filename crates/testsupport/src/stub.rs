use async_trait::async_trait;
use media_extractor::{ExtractSpec, Extractor};
use media_models::{MediaError, MediaInfo};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// In-memory extractor with a scripted answer and optional delay.
#[derive(Clone)]
pub struct StubExtractor {
    pub calls: Arc<Mutex<Vec<ExtractSpec>>>,
    response: Arc<Mutex<Result<MediaInfo, MediaError>>>,
    delay: Arc<Mutex<Option<Duration>>>,
}

impl StubExtractor {
    pub fn returning(info: MediaInfo) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            response: Arc::new(Mutex::new(Ok(info))),
            delay: Arc::new(Mutex::new(None)),
        }
    }

    pub fn failing(message: &str) -> Self {
        let stub = Self::returning(MediaInfo::default());
        *stub.response.try_lock().expect("fresh stub") = Err(MediaError::ExtractionFailed {
            message: message.to_string(),
        });
        stub
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.try_lock().expect("fresh stub") = Some(delay);
        self
    }

    pub async fn set_response(&self, response: Result<MediaInfo, MediaError>) {
        *self.response.lock().await = response;
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    pub async fn last_call(&self) -> ExtractSpec {
        self.calls
            .lock()
            .await
            .last()
            .cloned()
            .expect("no extraction")
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, spec: ExtractSpec) -> Result<MediaInfo, MediaError> {
        self.calls.lock().await.push(spec);
        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.response.lock().await.clone()
    }
}
