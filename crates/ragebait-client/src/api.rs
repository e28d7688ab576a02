//! Backend operations the job layer depends on.

use async_trait::async_trait;

use crate::error::ApiResult;
use crate::types::{GenerateOptions, GenerateResponse, MemeRequest, MemeResult, VideoInfo, VideoUpload};

/// The generation backend as seen by the job layer.
///
/// [`crate::RoastClient`] is the HTTP implementation; tests substitute
/// in-process fakes.
#[async_trait]
pub trait RoastApi: Send + Sync {
    /// Upload a video and run the full generation pipeline.
    ///
    /// This is long-running; callers bound it with their own timeout.
    async fn generate(
        &self,
        upload: VideoUpload,
        lens: &str,
        options: &GenerateOptions,
    ) -> ApiResult<GenerateResponse>;

    /// Look up a finished video by its backend id.
    async fn video(&self, video_id: &str) -> ApiResult<VideoInfo>;

    /// Generate a meme from a frame of a finished video.
    async fn generate_meme(&self, request: &MemeRequest) -> ApiResult<MemeResult>;
}
