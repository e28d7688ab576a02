//! Backend request/response types.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ApiResult;

/// A single segment of generated commentary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentarySegment {
    /// Start time in seconds
    pub start_time: f64,
    /// End time in seconds
    pub end_time: f64,
    pub text: String,
    /// Emotion/tone hint used for TTS
    #[serde(default = "default_emotion")]
    pub emotion: String,
}

fn default_emotion() -> String {
    "neutral".to_string()
}

/// Response from `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub video_id: String,
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    pub commentary_segments: Vec<CommentarySegment>,
    pub lens: String,
    /// Clip duration in seconds
    pub duration: f64,
}

/// Response from `GET /api/video/{video_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub video_id: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meme_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub lens: String,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub segments: Vec<CommentarySegment>,
}

/// Body for `POST /api/meme/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeRequest {
    pub video_id: String,
    /// Frame to build the meme from; the backend picks the middle frame when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u32>,
}

impl MemeRequest {
    pub fn new(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            frame_index: None,
        }
    }

    pub fn with_frame(mut self, frame_index: u32) -> Self {
        self.frame_index = Some(frame_index);
        self
    }
}

/// Response from `POST /api/meme/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemeResult {
    #[serde(default)]
    pub meme_id: String,
    pub meme_url: String,
    /// Social media caption with hashtags
    pub caption: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub image_prompt: String,
}

/// Body for `POST /api/parody/generate`.
///
/// The backend animates `meme_url` when given, otherwise a frame of the
/// video (the middle one unless `frame_index` is set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParodyRequest {
    pub video_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_index: Option<u32>,
    /// Motion instruction, e.g. "slow zoom-in, stadium lights flicker slightly"
    pub motion_directive: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meme_url: Option<String>,
}

impl ParodyRequest {
    pub fn new(video_id: impl Into<String>, motion_directive: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            frame_index: None,
            motion_directive: motion_directive.into(),
            meme_url: None,
        }
    }

    pub fn with_frame(mut self, frame_index: u32) -> Self {
        self.frame_index = Some(frame_index);
        self
    }

    /// Animate a generated meme instead of a raw frame.
    pub fn with_meme_url(mut self, meme_url: impl Into<String>) -> Self {
        self.meme_url = Some(meme_url.into());
        self
    }
}

/// Response from `POST /api/parody/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParodyResult {
    pub parody_id: String,
    pub video_url: String,
    pub motion_directive: String,
}

/// Lens entry from `GET /api/lenses`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LensInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub emoji: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LensListResponse {
    pub lenses: Vec<LensInfo>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Per-dependency availability (gemini, tts, storage, ...)
    #[serde(default)]
    pub services: HashMap<String, bool>,
}

impl HealthResponse {
    pub fn is_healthy(&self) -> bool {
        self.status == "ok" || self.status == "healthy"
    }
}

/// Video file to upload for generation.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl VideoUpload {
    /// Wrap in-memory bytes; the MIME type is inferred from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_for_file_name(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Read a file from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.mp4".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type for the video extensions the backend accepts.
pub fn mime_for_file_name(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Optional form fields for `POST /api/generate`.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Extra context JSON (e.g. scraped post metadata)
    pub context: Option<serde_json::Value>,
    /// Minimum scene duration in seconds
    pub min_scene_duration: Option<f64>,
    /// Maximum scene duration in seconds
    pub max_scene_duration: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_inference() {
        assert_eq!(mime_for_file_name("clip.MP4"), "video/mp4");
        assert_eq!(mime_for_file_name("clip.mov"), "video/quicktime");
        assert_eq!(mime_for_file_name("clip.webm"), "video/webm");
        assert_eq!(mime_for_file_name("notes.txt"), "application/octet-stream");
        assert_eq!(mime_for_file_name("noext"), "application/octet-stream");
    }

    #[test]
    fn test_segment_emotion_defaults() {
        let seg: CommentarySegment =
            serde_json::from_str(r#"{"start_time": 1.0, "end_time": 2.0, "text": "hey"}"#).unwrap();
        assert_eq!(seg.emotion, "neutral");
    }

    #[test]
    fn test_meme_request_omits_missing_frame() {
        let json = serde_json::to_value(MemeRequest::new("v1")).unwrap();
        assert_eq!(json, serde_json::json!({ "video_id": "v1" }));

        let json = serde_json::to_value(MemeRequest::new("v1").with_frame(3)).unwrap();
        assert_eq!(json, serde_json::json!({ "video_id": "v1", "frame_index": 3 }));
    }

    #[test]
    fn test_video_info_tolerates_sparse_payload() {
        let info: VideoInfo = serde_json::from_str(r#"{"video_id": "abc"}"#).unwrap();
        assert_eq!(info.video_url, "");
        assert!(info.segments.is_empty());
    }

    #[tokio::test]
    async fn test_upload_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("swing.mov");
        tokio::fs::write(&path, b"fake video").await.unwrap();

        let upload = VideoUpload::from_path(&path).await.unwrap();
        assert_eq!(upload.file_name, "swing.mov");
        assert_eq!(upload.mime_type, "video/quicktime");
        assert_eq!(upload.len(), 10);
    }
}
