// Recording process invocation
//
// Builds the rtmpdump command line for one recording and runs it to
// completion. The dump itself is an external collaborator; everything here
// is argument plumbing and output naming.

use crate::errors::RecordError;
use crate::models::{CronTime, DEFAULT_TITLE};
use chrono::{Duration, NaiveDateTime};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, instrument};

/// Output file path for a recording firing at `now`.
///
/// Late-night slots (hours >= 24) belong to the previous broadcast day, so
/// the date component steps back one calendar day while the hour component
/// keeps the overflowed nominal value (e.g. `25`).
pub fn output_path(
    download_dir: &Path,
    ext: &str,
    title: &str,
    start: &CronTime,
    now: NaiveDateTime,
) -> PathBuf {
    let title = if title.is_empty() { DEFAULT_TITLE } else { title };

    let rec_day = if start.hours < 24 {
        now.date()
    } else {
        now.date() - Duration::days(1)
    };
    let datetime = format!(
        "{}{:02}{:02}",
        rec_day.format("%Y%m%d"),
        start.hours,
        start.minutes
    );

    download_dir.join(format!("{title}_{datetime}.{ext}"))
}

/// rtmpdump argument list for a live dump of `duration_seconds`.
pub fn rtmpdump_args(source_url: &str, output: &Path, duration_seconds: i64) -> Vec<String> {
    vec![
        "--rtmp".to_string(),
        source_url.to_string(),
        "--live".to_string(),
        "--realtime".to_string(),
        "--flv".to_string(),
        output.display().to_string(),
        "--stop".to_string(),
        duration_seconds.to_string(),
    ]
}

/// Run one recording to completion.
#[instrument(skip_all, fields(output = %output.display()))]
pub async fn record(
    rtmpdump: &Path,
    source_url: &str,
    output: &Path,
    duration_seconds: i64,
) -> Result<(), RecordError> {
    let args = rtmpdump_args(source_url, output, duration_seconds);
    info!(command = %rtmpdump.display(), duration_seconds, "starting recording");

    let status = Command::new(rtmpdump)
        .args(&args)
        .status()
        .await
        .map_err(|source| RecordError::Spawn {
            command: rtmpdump.display().to_string(),
            source,
        })?;

    if !status.success() {
        return Err(RecordError::Failed(status));
    }

    info!("recording finished");
    Ok(())
}
