//! Roast generation orchestrator.
//!
//! `start` returns a job id right away and hands the slow backend call to
//! a tokio task the orchestrator owns. The task's last act is writing the
//! terminal record into the [`JobStore`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn, Instrument};

use ragebait_client::{ApiError, GenerateOptions, MemeRequest, MemeResult, RoastApi, VideoUpload};
use ragebait_models::{JobId, JobIdAllocator, RoastResult};

use crate::config::JobsConfig;
use crate::error::{JobError, JobResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::normalize::GenerationOutcome;
use crate::store::JobStore;

/// Error recorded on jobs cancelled before they resolved.
pub const CANCELLED_MESSAGE: &str = "Generation cancelled";

/// Starts generation jobs and writes their outcomes into the store.
pub struct RoastOrchestrator {
    api: Arc<dyn RoastApi>,
    store: Arc<JobStore>,
    ids: JobIdAllocator,
    generation_timeout: Duration,
    tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl RoastOrchestrator {
    pub fn new(api: Arc<dyn RoastApi>, store: Arc<JobStore>, generation_timeout: Duration) -> Self {
        Self {
            api,
            store,
            ids: JobIdAllocator::new(),
            generation_timeout,
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn from_config(api: Arc<dyn RoastApi>, store: Arc<JobStore>, config: &JobsConfig) -> Self {
        Self::new(api, store, config.generation_timeout)
    }

    /// Replace the job id allocator.
    pub fn with_id_allocator(mut self, ids: JobIdAllocator) -> Self {
        self.ids = ids;
        self
    }

    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    pub fn generation_timeout(&self) -> Duration {
        self.generation_timeout
    }

    /// Start a generation job with default options.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self, upload: VideoUpload, lens: &str) -> JobId {
        self.start_with_options(upload, lens, GenerateOptions::default())
    }

    /// Start a generation job.
    ///
    /// Allocates the id, registers the `processing` placeholder and spawns
    /// the backend call. Returns before the backend is contacted.
    pub fn start_with_options(
        &self,
        upload: VideoUpload,
        lens: &str,
        options: GenerateOptions,
    ) -> JobId {
        let job_id = self.ids.next();
        self.store.register(job_id.as_str());
        metrics::record_job_started(lens);

        let logger = JobLogger::new(&job_id, lens);
        let span = logger.span();
        let run = GenerationRun {
            api: Arc::clone(&self.api),
            store: Arc::clone(&self.store),
            logger,
            timeout: self.generation_timeout,
        };
        let lens = lens.to_string();
        let handle = tokio::spawn(run.execute(upload, lens, options).instrument(span));

        let mut tasks = self.tasks.lock();
        tasks.retain(|_, task| !task.is_finished());
        tasks.insert(job_id.to_string(), handle);

        job_id
    }

    /// Regenerate the meme for an already generated video.
    ///
    /// On success only `meme_url` and `caption` of the cached records for
    /// that video change. On failure the store is left untouched.
    pub async fn generate_meme(
        &self,
        video_id: &str,
        frame_index: Option<u32>,
    ) -> JobResult<MemeResult> {
        let mut request = MemeRequest::new(video_id);
        if let Some(frame) = frame_index {
            request = request.with_frame(frame);
        }

        let meme = match self.api.generate_meme(&request).await {
            Ok(meme) => meme,
            Err(e) => {
                warn!(video_id = %video_id, error = %e, "Meme regeneration failed");
                metrics::record_meme_failed();
                return Err(e.into());
            }
        };

        let patched = self.store.patch_meme(video_id, &meme.meme_url, &meme.caption);
        info!(video_id = %video_id, meme_id = %meme.meme_id, patched, "Meme regenerated");
        Ok(meme)
    }

    /// Wait for a job's task to finish and return its stored result.
    pub async fn wait(&self, job_id: &str) -> JobResult<RoastResult> {
        let handle = self.tasks.lock().remove(job_id);
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    error!(job_id = %job_id, "Generation task panicked");
                    self.fail_unresolved(job_id, "Generation task panicked", "backend");
                }
            }
        }

        self.store
            .get(job_id)
            .ok_or_else(|| JobError::unknown_job(job_id))
    }

    /// Abort a job's task.
    ///
    /// Returns `true` when the job was still unresolved and is now `failed`
    /// with [`CANCELLED_MESSAGE`].
    pub fn cancel(&self, job_id: &str) -> bool {
        let handle = self.tasks.lock().remove(job_id);
        match handle {
            Some(handle) => {
                handle.abort();
                let cancelled = self.fail_unresolved(job_id, CANCELLED_MESSAGE, "cancelled");
                if cancelled {
                    info!(job_id = %job_id, "Generation cancelled");
                }
                cancelled
            }
            None => false,
        }
    }

    /// Cancel every job that is still running. Returns how many were cancelled.
    pub fn shutdown(&self) -> usize {
        let handles: Vec<(String, JoinHandle<()>)> = self.tasks.lock().drain().collect();
        let mut cancelled = 0;
        for (job_id, handle) in handles {
            handle.abort();
            if self.fail_unresolved(&job_id, CANCELLED_MESSAGE, "cancelled") {
                cancelled += 1;
            }
        }
        if cancelled > 0 {
            info!("Cancelled {} in-flight generation jobs", cancelled);
        }
        cancelled
    }

    /// Number of generation tasks still running.
    pub fn in_flight(&self) -> usize {
        self.tasks
            .lock()
            .values()
            .filter(|task| !task.is_finished())
            .count()
    }

    fn fail_unresolved(&self, job_id: &str, message: &str, reason: &'static str) -> bool {
        match self.store.get(job_id) {
            Some(result) if result.is_terminal() => false,
            _ => match self.store.set_failed(job_id, message) {
                Ok(()) => {
                    metrics::record_job_failed(reason);
                    true
                }
                Err(e) => {
                    debug!(job_id = %job_id, error = %e, "Job resolved before it could be failed");
                    false
                }
            },
        }
    }
}

/// Everything one spawned generation task needs.
struct GenerationRun {
    api: Arc<dyn RoastApi>,
    store: Arc<JobStore>,
    logger: JobLogger,
    timeout: Duration,
}

impl GenerationRun {
    async fn execute(mut self, upload: VideoUpload, lens: String, options: GenerateOptions) {
        let started = Instant::now();
        self.logger.log_upload(&upload.file_name, upload.len());

        let call = self.api.generate(upload, &lens, &options);
        let generation = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(generation)) => generation,
            Ok(Err(e)) => {
                self.fail(e.to_string(), "backend");
                return;
            }
            Err(_) => {
                self.fail(ApiError::Timeout(self.timeout.as_secs()).to_string(), "timeout");
                return;
            }
        };

        let video_id = generation.video_id.clone();
        self.store.map_video_id(self.logger.job_id(), video_id.as_str());
        self.logger.attach_video_id(&video_id);
        self.logger.log_generated(generation.commentary_segments.len());

        let meme = self.api.generate_meme(&MemeRequest::new(video_id.as_str())).await;
        if let Err(e) = &meme {
            self.logger.log_meme_skipped(e);
            metrics::record_meme_failed();
        }

        let outcome = GenerationOutcome { generation, meme };
        let with_meme = outcome.meme_succeeded();
        match self.store.set_completed(self.logger.job_id(), outcome.into_result()) {
            Ok(()) => {
                let elapsed = started.elapsed();
                metrics::record_job_completed(elapsed.as_secs_f64());
                self.logger.log_completion(with_meme, elapsed);
            }
            Err(e) => self.logger.log_rejected(&e),
        }
    }

    fn fail(&self, message: String, reason: &'static str) {
        self.logger.log_failure(&message, reason);
        match self.store.set_failed(self.logger.job_id(), message) {
            Ok(()) => metrics::record_job_failed(reason),
            Err(e) => self.logger.log_rejected(&e),
        }
    }
}
