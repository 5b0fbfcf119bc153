//! Coordinates the recommender, the notifier and the daily scheduler.
//!
//! Every job body here is a catch-all boundary: recommender errors and
//! failed deliveries are logged and reported as a [`JobOutcome`], never
//! propagated to the scheduler or the HTTP host. There is no retry; the next
//! scheduled occurrence is the only second chance.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dinnerbot_core::{AppConfig, Notifier, Recommender, TriggerError, TriggerSpec};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::scheduler::{DailyScheduler, JobCallback, JobFuture, SchedulerError};

/// Scheduler id of the one recurring job.
pub const DAILY_JOB_ID: &str = "daily_recommendation";

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid daily trigger: {0}")]
    Trigger(#[from] TriggerError),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error("failed to open notification channel: {0}")]
    Notifier(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where a job invocation was when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Generating,
    Delivering,
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStage::Generating => write!(f, "generating"),
            JobStage::Delivering => write!(f, "delivering"),
        }
    }
}

/// Terminal state of one job invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    Succeeded,
    Failed { stage: JobStage, reason: String },
    /// A previous invocation of the same job was still running.
    Skipped,
}

impl JobOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded)
    }
}

pub struct Orchestrator<R, N> {
    config: Arc<AppConfig>,
    recommender: R,
    notifier: N,
    scheduler: Mutex<Option<DailyScheduler>>,
    running: AtomicBool,
    daily_guard: Mutex<()>,
}

impl<R: Recommender, N: Notifier> Orchestrator<R, N> {
    pub fn new(config: Arc<AppConfig>, recommender: R, notifier: N) -> Self {
        Self {
            config,
            recommender,
            notifier,
            scheduler: Mutex::new(None),
            running: AtomicBool::new(false),
            daily_guard: Mutex::new(()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Open the notifier, register and start the daily job, then announce
    /// the start over the notifier.
    ///
    /// The announcement is best-effort: a failed send is logged and startup
    /// continues. A second call while running is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError`] if the trigger is invalid, the notifier
    /// cannot be opened, or the job cannot be registered or started.
    pub async fn start(self: &Arc<Self>) -> Result<(), OrchestratorError> {
        if self.is_running() {
            tracing::warn!("orchestrator: start requested while already running; ignoring");
            return Ok(());
        }

        let trigger = TriggerSpec::from_config(&self.config)?;
        self.start_notifier().await?;

        let mut scheduler = DailyScheduler::new().await?;
        scheduler
            .register_daily(DAILY_JOB_ID, trigger, self.daily_callback())
            .await?;
        scheduler.start().await?;
        let next_fire = scheduler.next_fire(DAILY_JOB_ID);
        *self.scheduler.lock().await = Some(scheduler);
        self.running.store(true, Ordering::SeqCst);

        tracing::info!(
            send_time = %self.config.send_time_label(),
            timezone = %self.config.timezone,
            next_fire = ?next_fire.map(|t| t.to_rfc3339()),
            "orchestrator: started"
        );

        let announcement = format!(
            "🚀 *저녁식단 추천봇 시작!*\n\n\
             🍽️ 토양체질 저녁 식단: 매일 {}\n\n\
             📅 시작 시각: {}",
            self.config.send_time_label(),
            self.notifier.now().format("%Y-%m-%d %H:%M:%S")
        );
        if !self.notifier.send_message(&announcement).await {
            tracing::warn!("orchestrator: startup notification failed; continuing");
        }
        Ok(())
    }

    /// Open only the outbound channel, for one-shot runs that never schedule.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Notifier`] if the channel cannot be opened.
    pub async fn start_notifier(&self) -> Result<(), OrchestratorError> {
        self.notifier
            .start()
            .await
            .map_err(|e| OrchestratorError::Notifier(Box::new(e)))
    }

    /// Stop firing scheduled jobs and release the notifier.
    ///
    /// Safe without a prior or successful [`Orchestrator::start`]. Does not
    /// wait for a job already in flight.
    pub async fn stop(&self) {
        let scheduler = self.scheduler.lock().await.take();
        if let Some(mut scheduler) = scheduler {
            if let Err(e) = scheduler.shutdown().await {
                tracing::warn!(error = %e, "orchestrator: scheduler shutdown failed");
            }
        }
        self.notifier.close().await;
        let was_running = self.running.swap(false, Ordering::SeqCst);
        tracing::info!(was_running, "orchestrator: stopped");
    }

    /// The scheduled job body. Never fails; see [`JobOutcome`].
    ///
    /// Invocations do not overlap: if the previous run is still in flight
    /// this one is skipped.
    pub async fn run_daily_job(&self) -> JobOutcome {
        let Ok(_guard) = self.daily_guard.try_lock() else {
            tracing::warn!(
                job = DAILY_JOB_ID,
                "orchestrator: previous run still in flight; skipping"
            );
            return JobOutcome::Skipped;
        };

        tracing::info!(job = DAILY_JOB_ID, "orchestrator: generating daily recommendation");
        let outcome = self.generate_and_deliver(None).await;
        log_outcome(DAILY_JOB_ID, &outcome);
        outcome
    }

    /// Manual send of the daily recommendation; returns whether it was delivered.
    pub async fn run_test_job(&self) -> bool {
        tracing::info!(job = "test", "orchestrator: generating test recommendation");
        let outcome = self.generate_and_deliver(None).await;
        log_outcome("test", &outcome);
        outcome.is_success()
    }

    /// Manual send of a recommendation built from `ingredients`.
    ///
    /// Blank input fails immediately without calling the recommender or the
    /// notifier.
    pub async fn run_leftover_job(&self, ingredients: &str) -> bool {
        let ingredients = ingredients.trim();
        if ingredients.is_empty() {
            tracing::error!(
                job = "leftover",
                "orchestrator: no leftover ingredients configured; set LEFTOVER_INGREDIENTS"
            );
            return false;
        }

        tracing::info!(
            job = "leftover",
            ingredients,
            "orchestrator: generating leftover recommendation"
        );
        let outcome = self.generate_and_deliver(Some(ingredients)).await;
        log_outcome("leftover", &outcome);
        outcome.is_success()
    }

    /// [`Orchestrator::run_leftover_job`] with the configured ingredient list.
    pub async fn run_configured_leftover_job(&self) -> bool {
        let ingredients = self.config.leftover_ingredients.clone();
        self.run_leftover_job(&ingredients).await
    }

    async fn generate_and_deliver(&self, ingredients: Option<&str>) -> JobOutcome {
        let generated = match ingredients {
            None => self.recommender.generate().await,
            Some(list) => self.recommender.generate_from_ingredients(list).await,
        };

        let recommendation = match generated {
            Ok(recommendation) => recommendation,
            Err(e) => {
                return JobOutcome::Failed {
                    stage: JobStage::Generating,
                    reason: e.to_string(),
                }
            }
        };

        tracing::debug!(
            dishes = recommendation.dishes.len(),
            "orchestrator: recommendation generated; delivering"
        );

        if self.notifier.send_recommendation(&recommendation).await {
            JobOutcome::Succeeded
        } else {
            JobOutcome::Failed {
                stage: JobStage::Delivering,
                reason: "notifier reported delivery failure".to_string(),
            }
        }
    }

    /// Scheduler callback holding only a weak reference, so a registered job
    /// does not keep the orchestrator alive.
    fn daily_callback(self: &Arc<Self>) -> JobCallback {
        let weak = Arc::downgrade(self);
        Arc::new(move || -> JobFuture {
            let weak = weak.clone();
            Box::pin(async move {
                match weak.upgrade() {
                    Some(orchestrator) => {
                        orchestrator.run_daily_job().await;
                    }
                    None => tracing::warn!("orchestrator: dropped before daily job fired"),
                }
            })
        })
    }
}

fn log_outcome(job: &str, outcome: &JobOutcome) {
    match outcome {
        JobOutcome::Succeeded => tracing::info!(job, "orchestrator: recommendation delivered"),
        JobOutcome::Failed { stage, reason } => tracing::error!(
            job,
            stage = %stage,
            error = %reason,
            "orchestrator: recommendation failed"
        ),
        JobOutcome::Skipped => {}
    }
}
