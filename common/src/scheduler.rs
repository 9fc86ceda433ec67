// Job installation
//
// Turns validated schedules into long-lived recording jobs: each schedule's
// start time is normalized into a trigger, the trigger into a cron
// expression, and a task then sleeps until each fire and runs the recorder.

use crate::config::Settings;
use crate::crontime;
use crate::errors::InstallError;
use crate::models::Schedule;
use crate::recorder;
use crate::stream::SourceResolver;
use chrono::Utc;
use cron::Schedule as CronSchedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, instrument, warn};

/// A schedule turned into a running cron job.
pub struct InstalledJob {
    pub title: String,
    pub cron_expression: String,
    pub source_url: String,
    handle: JoinHandle<()>,
}

impl InstalledJob {
    /// Stop firing; an in-flight recording is cut off with the task.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

/// Install every schedule. Any single failure aborts the whole startup,
/// matching the all-or-nothing stance of the loader.
pub async fn install_jobs(
    schedules: Vec<Schedule>,
    settings: Arc<Settings>,
    resolver: Arc<SourceResolver>,
) -> Result<Vec<InstalledJob>, InstallError> {
    let mut jobs = Vec::with_capacity(schedules.len());
    for schedule in schedules {
        jobs.push(install_job(schedule, Arc::clone(&settings), &resolver).await?);
    }
    Ok(jobs)
}

#[instrument(skip_all, fields(title = %schedule.title))]
async fn install_job(
    schedule: Schedule,
    settings: Arc<Settings>,
    resolver: &SourceResolver,
) -> Result<InstalledJob, InstallError> {
    // The source is resolved once at install time; a stale stream address
    // surfaces as a failed recording, not a failed install.
    let source_url = resolver.resolve(&schedule.source).await?;

    let buffer = settings.recording.rec_start_buffer_seconds;
    let normalized = crontime::normalize(
        &schedule.start_time,
        schedule.rec_time,
        buffer,
        settings.recording.time_zone,
    );
    let cron_expression = normalized.trigger.cron_expression();
    let cron_schedule = CronSchedule::from_str(&cron_expression)?;

    info!(
        cron = %cron_expression,
        source = %source_url,
        duration_seconds = normalized.effective_duration_seconds,
        "set rec"
    );

    let handle = tokio::spawn(run_job(
        cron_schedule,
        schedule.clone(),
        source_url.clone(),
        normalized.effective_duration_seconds,
        settings,
    ));

    Ok(InstalledJob {
        title: schedule.title,
        cron_expression,
        source_url,
        handle,
    })
}

async fn run_job(
    cron_schedule: CronSchedule,
    schedule: Schedule,
    source_url: String,
    duration_seconds: i64,
    settings: Arc<Settings>,
) {
    let tz = settings.recording.time_zone;

    loop {
        let now = Utc::now().with_timezone(&tz);
        let Some(next) = cron_schedule.after(&now).next() else {
            warn!(title = %schedule.title, "trigger has no further fire times, job stops");
            break;
        };

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        let fired = Utc::now().with_timezone(&tz).naive_local();
        info!(title = %schedule.title, fired = %fired.format("%Y-%m-%d %H:%M:%S"), "cron running now");

        let output = recorder::output_path(
            &settings.recording.download_dir,
            &settings.recording.download_ext,
            &schedule.title,
            &schedule.start_time,
            fired,
        );

        if let Err(e) = recorder::record(
            &settings.recording.rtmpdump_path,
            &source_url,
            &output,
            duration_seconds,
        )
        .await
        {
            // One failed dump must not take the job down; the next fire
            // gets a fresh attempt.
            error!(title = %schedule.title, error = %e, "recording failed");
        }
    }
}
