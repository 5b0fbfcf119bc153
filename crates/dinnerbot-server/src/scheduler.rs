//! Background job scheduler.
//!
//! Wraps a [`JobScheduler`] with daily, timezone-aware triggers keyed by a
//! stable job id, and fires a missed occurrence once on start when it is
//! still inside the trigger's misfire grace window.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use dinnerbot_core::TriggerSpec;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use uuid::Uuid;

pub type JobFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Job body invoked on every firing. Must not fail; errors are the body's
/// own business.
pub type JobCallback = Arc<dyn Fn() -> JobFuture + Send + Sync>;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("scheduler error: {0}")]
    Scheduler(#[from] JobSchedulerError),

    #[error("job \"{0}\" is already registered")]
    DuplicateJob(String),
}

struct RegisteredJob {
    uuid: Uuid,
    trigger: TriggerSpec,
    callback: JobCallback,
    /// Occurrences after this instant belong to the cron job.
    registered_at: DateTime<Utc>,
}

/// Cron job running `fire` on `cron` in `timezone`.
fn cron_job(
    cron: &str,
    timezone: Tz,
    name: Arc<str>,
    fire: JobCallback,
) -> Result<Job, JobSchedulerError> {
    Job::new_async_tz(cron, timezone, move |_uuid, _lock| {
        let name = Arc::clone(&name);
        let fire = Arc::clone(&fire);

        Box::pin(async move {
            tracing::info!(job = %name, "scheduler: trigger fired");
            fire().await;
        })
    })
}

/// Daily job scheduler owning the underlying [`JobScheduler`].
pub struct DailyScheduler {
    inner: JobScheduler,
    jobs: HashMap<String, RegisteredJob>,
}

impl DailyScheduler {
    /// # Errors
    ///
    /// Returns [`SchedulerError::Scheduler`] if the scheduler cannot be initialised.
    pub async fn new() -> Result<Self, SchedulerError> {
        Ok(Self {
            inner: JobScheduler::new().await?,
            jobs: HashMap::new(),
        })
    }

    /// Register `callback` to run daily per `trigger` under the id `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::DuplicateJob`] if `id` is already registered,
    /// or [`SchedulerError::Scheduler`] if the cron job cannot be created.
    pub async fn register_daily(
        &mut self,
        id: &str,
        trigger: TriggerSpec,
        callback: JobCallback,
    ) -> Result<(), SchedulerError> {
        if self.is_registered(id) {
            return Err(SchedulerError::DuplicateJob(id.to_string()));
        }

        let cron = trigger.cron_expression();
        let job = cron_job(&cron, trigger.timezone(), id.into(), Arc::clone(&callback))?;

        let registered_at = Utc::now();
        let uuid = self.inner.add(job).await?;
        tracing::info!(
            job = id,
            cron = %cron,
            timezone = %trigger.timezone(),
            "scheduler: registered daily job"
        );

        self.jobs.insert(
            id.to_string(),
            RegisteredJob {
                uuid,
                trigger,
                callback,
                registered_at,
            },
        );
        Ok(())
    }

    /// Start firing registered jobs, then fire any occurrence missed within
    /// its grace window.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Scheduler`] if the scheduler fails to start.
    pub async fn start(&mut self) -> Result<(), SchedulerError> {
        self.inner.start().await?;
        let _detached = self.fire_missed(Utc::now());
        Ok(())
    }

    /// Spawn one run for each job whose latest occurrence before `now` is
    /// within the grace window and no later than its registration. Older
    /// misses are skipped for good; later ones were the cron job's to fire.
    pub(crate) fn fire_missed(&self, now: DateTime<Utc>) -> Vec<JoinHandle<()>> {
        self.jobs
            .iter()
            .filter_map(|(id, job)| {
                let missed = job
                    .trigger
                    .missed_occurrence(now)
                    .filter(|at| at.with_timezone(&Utc) <= job.registered_at)?;
                tracing::warn!(
                    job = %id,
                    scheduled_for = %missed,
                    "scheduler: firing occurrence missed within grace window"
                );
                Some(tokio::spawn((job.callback)()))
            })
            .collect()
    }

    /// Next time the job registered under `id` will fire.
    pub fn next_fire(&self, id: &str) -> Option<DateTime<Tz>> {
        self.jobs
            .get(id)
            .and_then(|job| job.trigger.next_after(Utc::now()))
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.jobs.contains_key(id)
    }

    /// Stop firing. Runs already in flight are left to finish.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Scheduler`] if the scheduler fails to shut down.
    pub async fn shutdown(&mut self) -> Result<(), SchedulerError> {
        for (id, job) in self.jobs.drain() {
            if let Err(e) = self.inner.remove(&job.uuid).await {
                tracing::warn!(job = %id, error = %e, "scheduler: failed to remove job");
            }
        }
        self.inner.shutdown().await?;
        tracing::info!("scheduler: shut down");
        Ok(())
    }
}
