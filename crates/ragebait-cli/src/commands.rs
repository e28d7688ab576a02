//! Command handlers.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{debug, info};

use ragebait_client::{GenerateOptions, ParodyRequest, RoastClient, RoastClientConfig, VideoUpload};
use ragebait_jobs::{
    JobResolver, JobStore, JobsConfig, PollDriver, RoastOrchestrator, SessionStore,
    CANCELLED_MESSAGE,
};
use ragebait_models::{JobStatus, RoastResult};

use crate::cli::{lens_names, motion_directive, Command, SessionCommand};

/// Everything a command needs, wired from the environment.
pub struct App {
    client: Arc<RoastClient>,
    store: Arc<JobStore>,
    orchestrator: RoastOrchestrator,
    resolver: Arc<JobResolver>,
    driver: PollDriver<JobResolver>,
    sessions: SessionStore,
}

impl App {
    pub fn from_env(api_url: Option<String>) -> anyhow::Result<Self> {
        let mut client_config = RoastClientConfig::from_env();
        if let Some(url) = api_url {
            client_config = client_config.with_base_url(url);
        }
        let jobs_config = JobsConfig::from_env();
        info!(base_url = %client_config.base_url, "Using generation backend");
        debug!("Jobs config: {:?}", jobs_config);

        let client =
            Arc::new(RoastClient::new(client_config).context("Failed to create backend client")?);
        let store = Arc::new(JobStore::new());
        let orchestrator =
            RoastOrchestrator::from_config(client.clone(), store.clone(), &jobs_config);
        let resolver = Arc::new(
            JobResolver::new(client.clone(), store.clone())
                .with_raw_id_probe(jobs_config.raw_id_probe),
        );
        let driver = PollDriver::new(resolver.clone(), jobs_config.poll.clone());
        let sessions = SessionStore::in_dir(&jobs_config.data_dir);

        Ok(Self {
            client,
            store,
            orchestrator,
            resolver,
            driver,
            sessions,
        })
    }

    /// Run one command. `Ok(false)` means it finished but the outcome was a
    /// failure (failed job, unhealthy backend).
    pub async fn run(&mut self, command: Command) -> anyhow::Result<bool> {
        let succeeded = match command {
            Command::Submit {
                file,
                lens,
                context,
            } => self.submit(&file, &lens, context).await?,
            Command::Status { id } => {
                let result = self.resolver.resolve(&id).await;
                print_json(&result)?;
                result.status != JobStatus::Failed
            }
            Command::Watch { id } => {
                let mut last = None;
                let outcome = self
                    .driver
                    .run_with(&id, |result| report_status(&mut last, result.status))
                    .await;
                print_json(&outcome.result)?;
                outcome.result.status != JobStatus::Failed
            }
            Command::Meme { video_id, frame } => {
                let meme = self.orchestrator.generate_meme(&video_id, frame).await?;
                print_json(&meme)?;
                true
            }
            Command::Parody {
                video_id,
                motion,
                frame,
                meme_url,
            } => {
                let mut request = ParodyRequest::new(video_id, motion_directive(&motion));
                if let Some(frame) = frame {
                    request = request.with_frame(frame);
                }
                if let Some(meme_url) = meme_url {
                    request = request.with_meme_url(meme_url);
                }
                eprintln!("Rendering parody: {}", request.motion_directive);
                print_json(&self.client.generate_parody(&request).await?)?;
                true
            }
            Command::Lenses => {
                for lens in self.client.lenses().await? {
                    println!("{} {:<22} {}", lens.emoji, lens.id, lens.name);
                }
                true
            }
            Command::Styles => {
                print_json(&self.client.meme_styles().await?)?;
                true
            }
            Command::Templates => {
                print_json(&self.client.meme_templates().await?)?;
                true
            }
            Command::Health => {
                let health = self.client.health().await?;
                println!(
                    "status: {} (version {})",
                    health.status,
                    health.version.as_deref().unwrap_or("unknown")
                );
                let mut services: Vec<_> = health.services.iter().collect();
                services.sort();
                for (name, up) in services {
                    println!("  {:<12} {}", name, if *up { "up" } else { "down" });
                }
                health.is_healthy()
            }
            Command::Sessions { command } => {
                self.sessions_command(command);
                true
            }
            Command::Schema => {
                print_json(&schemars::schema_for!(RoastResult))?;
                true
            }
        };

        self.orchestrator.shutdown();
        Ok(succeeded)
    }

    async fn submit(
        &mut self,
        file: &Path,
        lens: &str,
        context: Option<String>,
    ) -> anyhow::Result<bool> {
        let upload = VideoUpload::from_path(file)
            .await
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let context = context
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .context("--context is not valid JSON")?;
        let options = GenerateOptions {
            context,
            ..GenerateOptions::default()
        };

        let (lens, lens_name) = lens_names(lens);
        let title = format!("{} - {}", upload.file_name, lens_name);
        let job_id = self.orchestrator.start_with_options(upload, &lens, options);
        eprintln!("Started {} ({})", job_id, title);

        let handle = self.driver.spawn(job_id.as_str());
        let printer = tokio::spawn(print_status_changes(handle.subscribe()));
        let outcome = tokio::select! {
            outcome = handle.finished() => outcome,
            _ = tokio::signal::ctrl_c() => {
                self.orchestrator.cancel(job_id.as_str());
                None
            }
        };
        printer.abort();

        let result = match outcome {
            Some(outcome) => outcome.result,
            None => self
                .store
                .get(job_id.as_str())
                .unwrap_or_else(|| RoastResult::failed(job_id.as_str(), CANCELLED_MESSAGE)),
        };

        // Completed results are keyed by the video id, which outlives this process.
        self.sessions.add(result.job_id.as_str(), title);
        if let Some(thumbnail) = &result.thumbnail_url {
            self.sessions.set_thumbnail(&result.job_id, thumbnail.as_str());
        }

        print_json(&result)?;
        Ok(result.status != JobStatus::Failed)
    }

    fn sessions_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::List => {
                if self.sessions.list().is_empty() {
                    eprintln!("No sessions recorded in {}", self.sessions.path().display());
                }
                for session in self.sessions.list() {
                    println!(
                        "{}  {:<24} {}",
                        session.date.format("%Y-%m-%d %H:%M"),
                        session.id,
                        session.title
                    );
                }
            }
            SessionCommand::Remove { id } => {
                if self.sessions.remove(&id) {
                    eprintln!("Removed {}", id);
                } else {
                    eprintln!("No session {}", id);
                }
            }
        }
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn report_status(last: &mut Option<JobStatus>, status: JobStatus) {
    if *last != Some(status) {
        eprintln!("status: {}", status);
        *last = Some(status);
    }
}

async fn print_status_changes(mut updates: watch::Receiver<RoastResult>) {
    let mut last = None;
    loop {
        let status = updates.borrow_and_update().status;
        report_status(&mut last, status);
        if updates.changed().await.is_err() {
            break;
        }
    }
}
