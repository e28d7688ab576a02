//! Job result resolution.
//!
//! One identifier can be a fresh job handle, a job whose cached payload was
//! evicted, or a backend video id recovered from a bookmark. The resolver
//! tries, in order:
//!
//! 1. the result cache
//! 2. the job's mapped video id, probed on the backend
//! 3. the identifier itself, probed as a video id
//! 4. a synthetic `processing` result
//!
//! Resolution never fails. Probe errors degrade to `processing` so pollers
//! keep going instead of reporting a spurious failure.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use ragebait_client::RoastApi;
use ragebait_models::RoastResult;

use crate::metrics;
use crate::normalize::completed_from_video;
use crate::store::JobStore;

/// Anything that can report the current result for an id.
#[async_trait]
pub trait ResolveJob: Send + Sync {
    async fn resolve(&self, id: &str) -> RoastResult;
}

/// Resolver backed by the job store and the generation backend.
pub struct JobResolver {
    api: Arc<dyn RoastApi>,
    store: Arc<JobStore>,
    raw_id_probe: bool,
}

impl JobResolver {
    pub fn new(api: Arc<dyn RoastApi>, store: Arc<JobStore>) -> Self {
        Self {
            api,
            store,
            raw_id_probe: true,
        }
    }

    /// Enable or disable probing unknown ids as raw video ids.
    pub fn with_raw_id_probe(mut self, enabled: bool) -> Self {
        self.raw_id_probe = enabled;
        self
    }

    pub async fn resolve(&self, id: &str) -> RoastResult {
        if let Some(cached) = self.store.get(id) {
            return cached;
        }

        let mapped = self.store.video_id_for(id);
        if let Some(video_id) = &mapped {
            if let Some(result) = self.probe(video_id).await {
                return result;
            }
        }

        if self.raw_id_probe && mapped.as_deref() != Some(id) {
            if let Some(result) = self.probe(id).await {
                return result;
            }
        }

        RoastResult::processing(id)
    }

    async fn probe(&self, video_id: &str) -> Option<RoastResult> {
        match self.api.video(video_id).await {
            Ok(info) => Some(completed_from_video(info)),
            Err(e) => {
                debug!(video_id = %video_id, error = %e, "Video probe failed, treating as processing");
                metrics::record_probe_failure();
                None
            }
        }
    }
}

#[async_trait]
impl ResolveJob for JobResolver {
    async fn resolve(&self, id: &str) -> RoastResult {
        JobResolver::resolve(self, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use parking_lot::Mutex;
    use ragebait_client::{
        ApiError, ApiResult, GenerateOptions, GenerateResponse, MemeRequest, MemeResult, VideoInfo,
        VideoUpload,
    };
    use ragebait_models::JobStatus;

    /// Backend fake that serves a fixed set of videos and counts probes.
    #[derive(Default)]
    struct FakeBackend {
        videos: HashMap<String, VideoInfo>,
        probes: Mutex<Vec<String>>,
    }

    impl FakeBackend {
        fn with_video(mut self, video_id: &str) -> Self {
            self.videos.insert(
                video_id.to_string(),
                VideoInfo {
                    video_id: video_id.to_string(),
                    video_url: format!("http://x/{}.mp4", video_id),
                    thumbnail_url: None,
                    meme_url: None,
                    caption: None,
                    lens: "heist_movie".to_string(),
                    duration: 12.0,
                    segments: Vec::new(),
                },
            );
            self
        }

        fn probed(&self) -> Vec<String> {
            self.probes.lock().clone()
        }
    }

    #[async_trait]
    impl RoastApi for FakeBackend {
        async fn generate(
            &self,
            _upload: VideoUpload,
            _lens: &str,
            _options: &GenerateOptions,
        ) -> ApiResult<GenerateResponse> {
            Err(ApiError::RequestFailed("not used".into()))
        }

        async fn video(&self, video_id: &str) -> ApiResult<VideoInfo> {
            self.probes.lock().push(video_id.to_string());
            self.videos
                .get(video_id)
                .cloned()
                .ok_or_else(|| ApiError::NotFound(format!("Video lookup failed: {}", video_id)))
        }

        async fn generate_meme(&self, _request: &MemeRequest) -> ApiResult<MemeResult> {
            Err(ApiError::RequestFailed("not used".into()))
        }
    }

    fn resolver(backend: Arc<FakeBackend>, store: Arc<JobStore>) -> JobResolver {
        JobResolver::new(backend, store)
    }

    #[tokio::test]
    async fn test_unknown_id_degrades_to_processing() {
        let backend = Arc::new(FakeBackend::default());
        let resolver = resolver(backend.clone(), Arc::new(JobStore::new()));

        let result = resolver.resolve("job_1").await;
        assert_eq!(result, RoastResult::processing("job_1"));
        assert_eq!(backend.probed(), vec!["job_1".to_string()]);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_backend() {
        let backend = Arc::new(FakeBackend::default().with_video("job_1"));
        let store = Arc::new(JobStore::new());
        store.register("job_1");
        let resolver = resolver(backend.clone(), store);

        let result = resolver.resolve("job_1").await;
        assert_eq!(result.status, JobStatus::Processing);
        assert!(backend.probed().is_empty());
    }

    #[tokio::test]
    async fn test_mapped_video_id_is_probed_after_eviction() {
        let backend = Arc::new(FakeBackend::default().with_video("v1"));
        let store = Arc::new(JobStore::new());
        store.register("job_1");
        store.map_video_id("job_1", "v1");
        store.evict("job_1");
        let resolver = resolver(backend.clone(), store);

        let result = resolver.resolve("job_1").await;
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.job_id, "v1");
        assert_eq!(result.video_url.as_deref(), Some("http://x/v1.mp4"));
        assert_eq!(backend.probed(), vec!["v1".to_string()]);
    }

    #[tokio::test]
    async fn test_mapped_probe_failure_falls_back_to_raw_id() {
        let backend = Arc::new(FakeBackend::default());
        let store = Arc::new(JobStore::new());
        store.map_video_id("job_1", "v_gone");
        let resolver = resolver(backend.clone(), store);

        let result = resolver.resolve("job_1").await;
        assert_eq!(result.status, JobStatus::Processing);
        assert_eq!(
            backend.probed(),
            vec!["v_gone".to_string(), "job_1".to_string()]
        );
    }

    #[tokio::test]
    async fn test_bookmarked_video_id_resolves() {
        let backend = Arc::new(FakeBackend::default().with_video("a1b2c3d4e5f6"));
        let resolver = resolver(backend, Arc::new(JobStore::new()));

        let result = resolver.resolve("a1b2c3d4e5f6").await;
        assert_eq!(result.status, JobStatus::Completed);
        assert_eq!(result.lens.as_deref(), Some("heist_movie"));
        assert_eq!(result.transcript, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_raw_probe_can_be_disabled() {
        let backend = Arc::new(FakeBackend::default().with_video("a1b2c3d4e5f6"));
        let resolver =
            resolver(backend.clone(), Arc::new(JobStore::new())).with_raw_id_probe(false);

        let result = resolver.resolve("a1b2c3d4e5f6").await;
        assert_eq!(result.status, JobStatus::Processing);
        assert!(backend.probed().is_empty());
    }

    #[tokio::test]
    async fn test_terminal_result_is_stable() {
        let backend = Arc::new(FakeBackend::default());
        let store = Arc::new(JobStore::new());
        store.register("job_1");
        store.set_failed("job_1", "Generation failed: boom").unwrap();
        let resolver = resolver(backend, store);

        for _ in 0..3 {
            let result = resolver.resolve("job_1").await;
            assert_eq!(result.status, JobStatus::Failed);
            assert_eq!(result.error.as_deref(), Some("Generation failed: boom"));
        }
    }
}
