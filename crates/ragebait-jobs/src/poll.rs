//! Poll driver.
//!
//! Resolution never fails, so a job stuck on the backend would be polled
//! forever. The driver puts a ceiling on that: after `max_attempts`
//! resolves that all came back `processing`, it reports the job `failed`
//! with [`POLL_TIMEOUT_MESSAGE`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use ragebait_models::RoastResult;

use crate::config::PollConfig;
use crate::metrics;
use crate::resolver::ResolveJob;

/// Error reported when the attempt budget runs out.
pub const POLL_TIMEOUT_MESSAGE: &str = "Generation timed out. Please try again.";

/// How a poll run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    /// Last observed (or synthesized) result; always terminal
    pub result: RoastResult,
    /// Resolves performed
    pub attempts: u32,
    /// The budget ran out before the job resolved
    pub timed_out: bool,
}

/// Drives a [`ResolveJob`] on a fixed cadence until the job resolves.
pub struct PollDriver<R: ?Sized> {
    resolver: Arc<R>,
    config: PollConfig,
}

impl<R: ?Sized> Clone for PollDriver<R> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            config: self.config.clone(),
        }
    }
}

impl<R> PollDriver<R>
where
    R: ResolveJob + ?Sized + 'static,
{
    pub fn new(resolver: Arc<R>, config: PollConfig) -> Self {
        Self { resolver, config }
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Poll until the job resolves or the budget runs out.
    pub async fn run(&self, job_id: &str) -> PollOutcome {
        self.run_with(job_id, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `on_update` with every snapshot.
    ///
    /// The first resolve happens immediately. On timeout `on_update` also
    /// sees the synthesized `failed` result.
    pub async fn run_with<F>(&self, job_id: &str, mut on_update: F) -> PollOutcome
    where
        F: FnMut(&RoastResult),
    {
        let max_attempts = self.config.max_attempts.max(1);
        let period = self.config.interval.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempts = 0u32;
        loop {
            interval.tick().await;
            let result = self.resolver.resolve(job_id).await;
            attempts += 1;
            on_update(&result);

            if result.is_terminal() {
                debug!(job_id = %job_id, attempts, status = %result.status, "Poll finished");
                metrics::record_poll_finished(attempts, false);
                return PollOutcome {
                    result,
                    attempts,
                    timed_out: false,
                };
            }

            if attempts >= max_attempts {
                warn!(job_id = %job_id, attempts, "Job still processing, giving up");
                metrics::record_poll_finished(attempts, true);
                let result = RoastResult::failed(job_id, POLL_TIMEOUT_MESSAGE);
                on_update(&result);
                return PollOutcome {
                    result,
                    attempts,
                    timed_out: true,
                };
            }
        }
    }

    /// Poll on a background task.
    ///
    /// Dropping the returned handle stops the task.
    pub fn spawn(&self, job_id: impl Into<String>) -> PollHandle {
        let job_id = job_id.into();
        let (updates_tx, updates_rx) = watch::channel(RoastResult::processing(job_id.as_str()));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let driver = self.clone();
        let id = job_id.clone();
        let task = tokio::spawn(async move {
            tokio::select! {
                outcome = driver.run_with(&id, |result| {
                    updates_tx.send_replace(result.clone());
                }) => Some(outcome),
                _ = shutdown_rx.changed() => {
                    debug!(job_id = %id, "Poll cancelled");
                    None
                }
            }
        });

        PollHandle {
            job_id,
            updates: updates_rx,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Handle to a spawned poll loop.
pub struct PollHandle {
    job_id: String,
    updates: watch::Receiver<RoastResult>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<Option<PollOutcome>>>,
}

impl PollHandle {
    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    /// Receiver that sees every snapshot the loop observes.
    pub fn subscribe(&self) -> watch::Receiver<RoastResult> {
        self.updates.clone()
    }

    /// Most recent snapshot.
    pub fn latest(&self) -> RoastResult {
        self.updates.borrow().clone()
    }

    /// Stop polling. `finished` then returns `None`.
    pub fn cancel(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the loop to end. `None` when it was cancelled.
    pub async fn finished(mut self) -> Option<PollOutcome> {
        match self.task.take() {
            Some(task) => task.await.ok().flatten(),
            None => None,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use ragebait_models::JobStatus;

    /// Reports `processing` until `completes_after` resolves, then completes.
    struct StubResolver {
        calls: AtomicU32,
        completes_after: Option<u32>,
    }

    impl StubResolver {
        fn completing_after(n: u32) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                completes_after: Some(n),
            })
        }

        fn stuck() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                completes_after: None,
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ResolveJob for StubResolver {
        async fn resolve(&self, id: &str) -> RoastResult {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.completes_after {
                Some(n) if call >= n => RoastResult::completed("v1", "http://x/v1.mp4"),
                _ => RoastResult::processing(id),
            }
        }
    }

    fn config(max_attempts: u32) -> PollConfig {
        PollConfig {
            interval: Duration::from_secs(3),
            max_attempts,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_terminal_state() {
        let resolver = StubResolver::completing_after(3);
        let driver = PollDriver::new(resolver.clone(), config(200));

        let outcome = driver.run("job_1").await;
        assert_eq!(outcome.result.status, JobStatus::Completed);
        assert_eq!(outcome.attempts, 3);
        assert!(!outcome.timed_out);
        assert_eq!(resolver.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_budget_exhaustion_forces_failed() {
        let resolver = StubResolver::stuck();
        let driver = PollDriver::new(resolver.clone(), config(5));
        let started = tokio::time::Instant::now();

        let outcome = driver.run("job_1").await;
        assert!(outcome.timed_out);
        assert_eq!(outcome.attempts, 5);
        assert_eq!(resolver.calls(), 5);
        assert_eq!(outcome.result.status, JobStatus::Failed);
        assert_eq!(outcome.result.job_id, "job_1");
        assert_eq!(outcome.result.error.as_deref(), Some(POLL_TIMEOUT_MESSAGE));
        // First resolve is immediate, the remaining four are one interval apart.
        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_with_reports_every_snapshot() {
        let driver = PollDriver::new(StubResolver::stuck(), config(3));
        let mut seen = Vec::new();

        driver
            .run_with("job_1", |result| seen.push(result.status))
            .await;
        assert_eq!(
            seen,
            vec![
                JobStatus::Processing,
                JobStatus::Processing,
                JobStatus::Processing,
                JobStatus::Failed
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_still_resolves_once() {
        let resolver = StubResolver::completing_after(1);
        let driver = PollDriver::new(resolver.clone(), config(0));

        let outcome = driver.run("job_1").await;
        assert_eq!(outcome.result.status, JobStatus::Completed);
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawned_poll_publishes_updates() {
        let driver = PollDriver::new(StubResolver::completing_after(2), config(200));

        let handle = driver.spawn("job_1");
        let updates = handle.subscribe();
        assert_eq!(handle.job_id(), "job_1");

        let outcome = handle.finished().await.unwrap();
        assert_eq!(outcome.result.status, JobStatus::Completed);
        assert_eq!(updates.borrow().status, JobStatus::Completed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_spawned_poll() {
        let resolver = StubResolver::stuck();
        let driver = PollDriver::new(resolver.clone(), config(200));

        let handle = driver.spawn("job_1");
        tokio::time::sleep(Duration::from_secs(4)).await;
        handle.cancel();

        assert!(handle.finished().await.is_none());
        let calls = resolver.calls();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(resolver.calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_timer() {
        let resolver = StubResolver::stuck();
        let driver = PollDriver::new(resolver.clone(), config(200));

        let handle = driver.spawn("job_1");
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert_eq!(handle.latest().status, JobStatus::Processing);
        drop(handle);

        let calls = resolver.calls();
        assert!(calls >= 1);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(resolver.calls(), calls);
    }
}
