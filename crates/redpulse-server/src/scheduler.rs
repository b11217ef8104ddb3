//! Background job scheduler.
//!
//! Three recurring jobs: hourly collection (when enabled in the monitor
//! config), daily report generation at 22:00 UTC, and weekly retention
//! cleanup on Sunday 03:00 UTC. Job failures are logged and never crash the
//! process; a failed collection leaves its checkpoint in place so the next
//! attempt resumes.

use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::backend::PgBackend;
use crate::collect::CollectRunner;

const RETENTION_DAYS: i64 = 90;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    runner: Arc<CollectRunner>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_collection_job(&scheduler, pool.clone(), runner).await?;
    register_report_job(&scheduler, pool.clone()).await?;
    register_cleanup_job(&scheduler, pool).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Hourly collection, skipped while the monitor config is disabled.
async fn register_collection_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    runner: Arc<CollectRunner>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 * * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let runner = Arc::clone(&runner);

        Box::pin(async move {
            match redpulse_db::load_monitor_config(&pool).await {
                Ok(monitor) if !monitor.enabled => {
                    tracing::debug!("scheduler: collection disabled, skipping");
                }
                Ok(monitor) if monitor.keywords.is_empty() => {
                    tracing::info!("scheduler: no keywords configured, skipping collection");
                }
                Ok(_) => {
                    tracing::info!("scheduler: starting hourly collection run");
                    match runner.run_once().await {
                        Ok(summary) => tracing::info!(
                            session_id = %summary.session_id,
                            saved = summary.saved,
                            "scheduler: hourly collection run complete"
                        ),
                        Err(e) => tracing::error!(error = %e, "scheduler: collection run failed"),
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: failed to load monitor config");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Daily report generation at 22:00 UTC for the current day.
async fn register_report_job(
    scheduler: &JobScheduler,
    pool: PgPool,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 22 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);

        Box::pin(async move {
            let backend = PgBackend::new(pool.as_ref().clone());
            let date = Utc::now().date_naive();
            match redpulse_pipeline::build_daily_report(&backend, date).await {
                Ok(Some(report)) => tracing::info!(
                    %date,
                    total_posts = report.total_posts,
                    "scheduler: daily report ready"
                ),
                Ok(None) => tracing::info!(%date, "scheduler: no posts for day, report skipped"),
                Err(e) => tracing::error!(error = %e, "scheduler: daily report failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Weekly retention cleanup on Sunday 03:00 UTC.
async fn register_cleanup_job(
    scheduler: &JobScheduler,
    pool: PgPool,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 0 3 * * SUN", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);

        Box::pin(async move {
            match redpulse_db::cleanup_old_data(&pool, RETENTION_DAYS).await {
                Ok(outcome) => tracing::info!(
                    posts_deleted = outcome.posts_deleted,
                    reports_deleted = outcome.reports_deleted,
                    logs_deleted = outcome.logs_deleted,
                    "scheduler: weekly cleanup complete"
                ),
                Err(e) => tracing::error!(error = %e, "scheduler: weekly cleanup failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
