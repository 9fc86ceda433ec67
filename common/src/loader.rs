// Schedule file loading
//
// Reads the JSON schedule file fresh on every call (no caching), validates
// every record, and only decodes once the whole file is clean. A single
// invalid record fails the load with every accumulated error so the user
// can fix the file in one pass.

use crate::errors::{LoadError, RecordErrors};
use crate::models::Schedule;
use crate::validate;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Load and validate the schedule file at `path`.
pub async fn load_schedules(path: impl AsRef<Path>) -> Result<Vec<Schedule>, LoadError> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let schedules = parse_schedules(&json)?;
    debug!(path = %path.display(), count = schedules.len(), "schedule file loaded");

    Ok(schedules)
}

/// Validate and decode a schedule file's contents.
pub fn parse_schedules(json: &str) -> Result<Vec<Schedule>, LoadError> {
    let raw: Value = serde_json::from_str(json)?;
    let records = raw.as_array().ok_or(LoadError::NotAnArray)?;

    let rejected: Vec<RecordErrors> = records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let codes = validate::validate(record);
            if codes.is_empty() {
                None
            } else {
                Some(RecordErrors { index, codes })
            }
        })
        .collect();

    if !rejected.is_empty() {
        return Err(LoadError::Rejected(rejected));
    }

    records
        .iter()
        .map(|record| Schedule::from_value(record).map_err(LoadError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ValidationCode;

    #[test]
    fn test_parse_schedules_decodes_valid_file() {
        let json = r#"[
            {
                "title": "late night",
                "source": "agqr",
                "recTime": 30,
                "startTime": {"dayOfWeek": 3, "hours": 25, "minutes": 30, "seconds": 0}
            },
            {
                "title": "annual",
                "source": "rtmp://h/a",
                "recTime": "60",
                "startTime": {"month": 10, "date": 26, "hours": 8, "minutes": 0, "seconds": 0}
            }
        ]"#;

        let schedules = parse_schedules(json).unwrap();
        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0].title, "late night");
        assert_eq!(schedules[1].rec_time, 60);
    }

    #[test]
    fn test_parse_schedules_rejects_with_all_errors() {
        let json = r#"[
            {"title": "ok", "source": "rtmp://h/a", "recTime": 30,
             "startTime": {"hours": 8, "minutes": 0, "seconds": 0}},
            {"title": 5, "source": "ftp://h/a", "recTime": 0,
             "startTime": {"hours": 8, "minutes": 0, "seconds": 0}},
            {"recTime": 1441}
        ]"#;

        let err = parse_schedules(json).unwrap_err();
        let LoadError::Rejected(batches) = err else {
            panic!("expected Rejected, got {err}");
        };

        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].index, 1);
        assert_eq!(
            batches[0].codes,
            vec![
                ValidationCode::TitleInvalidType,
                ValidationCode::SourceInvalidVal,
                ValidationCode::RecTimeMinLess,
            ]
        );
        assert_eq!(batches[1].index, 2);
        assert_eq!(
            batches[1].codes,
            vec![
                ValidationCode::TitleNotExist,
                ValidationCode::SourceNotExist,
                ValidationCode::RecTimeMaxOver,
                ValidationCode::StartTimeNotExist,
            ]
        );
    }

    #[test]
    fn test_parse_schedules_requires_an_array() {
        let err = parse_schedules(r#"{"title": "x"}"#).unwrap_err();
        assert!(matches!(err, LoadError::NotAnArray));
    }

    #[test]
    fn test_parse_schedules_rejects_malformed_json() {
        let err = parse_schedules("[{").unwrap_err();
        assert!(matches!(err, LoadError::InvalidJson(_)));
    }

    #[tokio::test]
    async fn test_load_schedules_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schedules.json");
        tokio::fs::write(
            &path,
            r#"[{"title": "x", "source": "url", "recTime": 1,
                "startTime": {"hours": 0, "minutes": 0, "seconds": 0}}]"#,
        )
        .await
        .unwrap();

        let schedules = load_schedules(&path).await.unwrap();
        assert_eq!(schedules.len(), 1);
    }

    #[tokio::test]
    async fn test_load_schedules_missing_file() {
        let err = load_schedules("/nonexistent/schedules.json")
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
