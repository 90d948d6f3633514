use crate::{AppState, SessionId};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use media_control::Platform;
use media_models::{
    ApiInfo, CancelResponse, DownloadResponse, ErrorShape, FormatsRequest, FormatsResponse, Job,
    ListJobsResponse, MediaError, StartRequest, StartResponse,
};
use tracing::{error, info, instrument, warn};

pub type ApiError = (StatusCode, Json<ErrorShape>);

pub fn error_response(e: &MediaError) -> ApiError {
    (
        StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(e.to_error_shape()),
    )
}

pub async fn api_info() -> Json<ApiInfo> {
    let features = [
        "Per-session download jobs",
        "Direct download to the device",
        "No files stored on the server",
        "Multi-platform support",
        "Jobs visible only to their own session",
    ];
    let endpoints = [
        "POST /formats - List available formats",
        "POST /start - Start a download",
        "GET /status/<job_id> - Job status",
        "GET /download/<job_id> - Download link",
        "DELETE /cancel/<job_id> - Cancel",
        "GET /jobs - List session jobs",
    ];

    Json(ApiInfo {
        message: "Per-session download system - Video Downloader".to_string(),
        version: "3.0".to_string(),
        features: features.iter().map(|s| s.to_string()).collect(),
        endpoints: endpoints.iter().map(|s| s.to_string()).collect(),
    })
}

#[instrument(skip(state, payload))]
pub async fn start_download(
    State(state): State<AppState>,
    session: SessionId,
    payload: Option<Json<StartRequest>>,
) -> Result<Json<StartResponse>, ApiError> {
    let request = payload.map(|Json(r)| r);
    let (url, quality, format_id) = match request {
        Some(r) => (r.url, r.quality, r.format_id),
        None => (None, None, None),
    };

    match state
        .manager
        .start(
            session.as_str(),
            url.as_deref(),
            quality.as_deref(),
            format_id.as_deref(),
        )
        .await
    {
        Ok(job) => Ok(Json(StartResponse {
            success: true,
            status_url: format!("/status/{}", job.id),
            job_id: job.id,
            session_id: session.0,
            message: "Resolving download link...".to_string(),
        })),
        Err(e) => {
            warn!("Rejected start request: {}", e);
            Err(error_response(&e))
        }
    }
}

#[instrument(skip(state))]
pub async fn get_status(
    State(state): State<AppState>,
    session: SessionId,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    state
        .manager
        .get(session.as_str(), &job_id)
        .await
        .map(Json)
        .map_err(|e| error_response(&e))
}

#[instrument(skip(state))]
pub async fn get_download(
    State(state): State<AppState>,
    session: SessionId,
    Path(job_id): Path<String>,
) -> Result<Json<DownloadResponse>, ApiError> {
    match state.manager.download(session.as_str(), &job_id).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            if e.http_status() >= 500 {
                error!("Download link missing for ready job {}: {}", job_id, e);
            }
            Err(error_response(&e))
        }
    }
}

#[instrument(skip(state))]
pub async fn cancel_download(
    State(state): State<AppState>,
    session: SessionId,
    Path(job_id): Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    state
        .manager
        .cancel(session.as_str(), &job_id)
        .await
        .map_err(|e| error_response(&e))?;

    Ok(Json(CancelResponse {
        success: true,
        message: "Download cancelled".to_string(),
    }))
}

#[instrument(skip(state))]
pub async fn list_jobs(
    State(state): State<AppState>,
    session: SessionId,
) -> Json<ListJobsResponse> {
    Json(state.manager.list(session.as_str()).await)
}

#[instrument(skip(state, payload))]
pub async fn get_formats(
    State(state): State<AppState>,
    payload: Option<Json<FormatsRequest>>,
) -> Result<Json<FormatsResponse>, ApiError> {
    let url = payload.and_then(|Json(r)| r.url);

    match state.manager.formats(url.as_deref()).await {
        Ok(catalog) => Ok(Json(catalog)),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let mut shape = ErrorShape::unsuccessful(e.to_string());
            if let MediaError::ExtractionFailed { .. } = e {
                let platform = Platform::detect(url.as_deref().unwrap_or_default());
                info!(platform = platform.as_str(), "Format listing failed");
                shape = shape.with_platform(platform.as_str());
            }
            Err((status, Json(shape)))
        }
    }
}

pub async fn health_check() -> &'static str {
    "OK"
}

#[instrument(skip(state))]
pub async fn metrics(State(state): State<AppState>) -> Result<String, StatusCode> {
    match state.metrics.get_prometheus_metrics() {
        Ok(metrics) => Ok(metrics),
        Err(e) => {
            error!("Failed to get metrics: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
