//! Generation backend HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::api::RoastApi;
use crate::error::{ApiError, ApiResult};
use crate::types::{
    GenerateOptions, GenerateResponse, HealthResponse, LensInfo, LensListResponse, MemeRequest,
    MemeResult, ParodyRequest, ParodyResult, VideoInfo, VideoUpload,
};

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct RoastClientConfig {
    /// Base URL of the generation backend
    pub base_url: String,
    /// Timeout for lookups and meme generation (not applied to `generate`)
    pub request_timeout: Duration,
    /// Timeout for image-to-video parody renders
    pub parody_timeout: Duration,
    /// TCP + TLS connect timeout
    pub connect_timeout: Duration,
    /// Max retries for idempotent GET requests
    pub max_retries: u32,
}

impl Default for RoastClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout: Duration::from_secs(30),
            parody_timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(10),
            max_retries: 2,
        }
    }
}

impl RoastClientConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("RAGEBAIT_API_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("RAGEBAIT_REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            parody_timeout: Duration::from_secs(
                std::env::var("RAGEBAIT_PARODY_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(300),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("RAGEBAIT_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            max_retries: std::env::var("RAGEBAIT_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(2),
        }
    }

    /// Same config pointed at another backend.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// HTTP client for the generation backend.
pub struct RoastClient {
    http: Client,
    config: RoastClientConfig,
}

impl RoastClient {
    /// Create a new backend client.
    pub fn new(config: RoastClientConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> ApiResult<Self> {
        Self::new(RoastClientConfig::from_env())
    }

    pub fn config(&self) -> &RoastClientConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Fetch the backend health report.
    pub async fn health(&self) -> ApiResult<HealthResponse> {
        let url = self.url("/api/health");
        self.get_json(&url, "Health check failed").await
    }

    /// Check if the backend is healthy. Errors count as unhealthy.
    pub async fn is_healthy(&self) -> bool {
        match self.health().await {
            Ok(health) if health.is_healthy() => true,
            Ok(health) => {
                warn!("Backend health degraded: {}", health.status);
                false
            }
            Err(e) => {
                warn!("Backend health check error: {}", e);
                false
            }
        }
    }

    /// List the lenses the backend offers.
    pub async fn lenses(&self) -> ApiResult<Vec<LensInfo>> {
        let url = self.url("/api/lenses");
        let response: LensListResponse = self.get_json(&url, "Lens listing failed").await?;
        Ok(response.lenses)
    }

    /// List meme styles. The payload is passed through untouched.
    pub async fn meme_styles(&self) -> ApiResult<serde_json::Value> {
        let url = self.url("/api/meme/styles");
        self.get_json(&url, "Meme style listing failed").await
    }

    /// List meme templates. The payload is passed through untouched.
    pub async fn meme_templates(&self) -> ApiResult<serde_json::Value> {
        let url = self.url("/api/meme/templates");
        self.get_json(&url, "Meme template listing failed").await
    }

    /// Render a short parody clip from a video frame or a generated meme.
    ///
    /// Not retried: every call starts a new render.
    pub async fn generate_parody(&self, request: &ParodyRequest) -> ApiResult<ParodyResult> {
        let url = self.url("/api/parody/generate");

        debug!(
            video_id = %request.video_id,
            from_meme = request.meme_url.is_some(),
            "Requesting parody generation"
        );

        let response = self
            .http
            .post(&url)
            .timeout(self.config.parody_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.config.parody_timeout))?;

        decode(response, "Parody generation failed").await
    }

    /// GET with retry and JSON decoding.
    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> ApiResult<T> {
        debug!("GET {}", url);

        let response = self
            .with_retry(|| async {
                let response = self
                    .http
                    .get(url)
                    .timeout(self.config.request_timeout)
                    .send()
                    .await
                    .map_err(|e| self.transport_error(e, self.config.request_timeout))?;

                let status = response.status();
                if status.is_server_error() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ApiError::from_http_status(status.as_u16(), context, &body));
                }
                Ok(response)
            })
            .await?;

        decode(response, context).await
    }

    fn transport_error(&self, error: reqwest::Error, timeout: Duration) -> ApiError {
        if error.is_timeout() {
            ApiError::Timeout(timeout.as_secs())
        } else {
            ApiError::Network(error)
        }
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> ApiResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = ApiResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Backend request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ApiError::RequestFailed("Unknown error".to_string())))
    }
}

/// Turn a response into `T`, mapping non-success statuses to errors.
async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> ApiResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_http_status(status.as_u16(), context, &body));
    }

    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl RoastApi for RoastClient {
    async fn generate(
        &self,
        upload: VideoUpload,
        lens: &str,
        options: &GenerateOptions,
    ) -> ApiResult<GenerateResponse> {
        let url = self.url("/api/generate");

        debug!(
            file = %upload.file_name,
            bytes = upload.len(),
            lens = %lens,
            "Uploading video for generation to {}",
            url
        );

        let video = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime_type)?;

        let mut form = Form::new().part("video", video).text("lens", lens.to_string());
        if let Some(context) = &options.context {
            form = form.text("context", serde_json::to_string(context)?);
        }
        if let Some(min) = options.min_scene_duration {
            form = form.text("min_scene_duration", min.to_string());
        }
        if let Some(max) = options.max_scene_duration {
            form = form.text("max_scene_duration", max.to_string());
        }

        // No per-request timeout: the caller owns the generation budget.
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::Network)?;

        decode(response, "Generation failed").await
    }

    async fn video(&self, video_id: &str) -> ApiResult<VideoInfo> {
        let url = self.url(&format!("/api/video/{}", urlencoding::encode(video_id)));
        self.get_json(&url, "Video lookup failed").await
    }

    async fn generate_meme(&self, request: &MemeRequest) -> ApiResult<MemeResult> {
        let url = self.url("/api/meme/generate");

        debug!(video_id = %request.video_id, "Requesting meme generation");

        let response = self
            .http
            .post(&url)
            .timeout(self.config.request_timeout)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e, self.config.request_timeout))?;

        decode(response, "Meme generation failed").await
    }
}
