// Recorder daemon entry point

use common::config::Settings;
use common::errors::LoadError;
use common::loader;
use common::scheduler;
use common::stream::{SourceResolver, StreamUrlCache};
use common::telemetry;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init_logging("recorder=info,common=info")?;

    info!("Starting recording scheduler daemon");

    let settings = Settings::load().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;
    settings
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {e}"))?;

    info!(
        schedules_path = %settings.recording.schedules_path.display(),
        download_dir = %settings.recording.download_dir.display(),
        time_zone = %settings.recording.time_zone,
        buffer_seconds = settings.recording.rec_start_buffer_seconds,
        "Configuration loaded"
    );

    let schedules = match loader::load_schedules(&settings.recording.schedules_path).await {
        Ok(schedules) => schedules,
        Err(LoadError::Rejected(batches)) => {
            // Surface every invalid record in one report, then abort before
            // any job is installed.
            for batch in &batches {
                error!("{batch}");
            }
            anyhow::bail!("{} schedule record(s) failed validation", batches.len());
        }
        Err(e) => return Err(e.into()),
    };
    info!(count = schedules.len(), "Schedules loaded");

    let settings = Arc::new(settings);
    let cache = StreamUrlCache::new(
        reqwest_client()?,
        settings.stream.agqr_server_info_url.clone(),
    );
    let resolver = Arc::new(SourceResolver::new(cache));

    let jobs = scheduler::install_jobs(schedules, Arc::clone(&settings), resolver)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to install jobs");
            e
        })?;
    info!(count = jobs.len(), "Jobs installed");

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, stopping jobs");
    for job in &jobs {
        job.abort();
    }

    Ok(())
}

fn reqwest_client() -> anyhow::Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?)
}
