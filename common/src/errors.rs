// Error handling framework

use std::path::PathBuf;
use thiserror::Error;

/// Field-level validation codes emitted by `validate::validate`.
///
/// These are data, not failures: validation never aborts, it accumulates
/// every applicable code in a deterministic order and returns the list.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationCode {
    #[error("\"title\" does not exist.")]
    TitleNotExist,
    #[error("\"title\" has an invalid type.")]
    TitleInvalidType,

    #[error("\"source\" does not exist.")]
    SourceNotExist,
    #[error("\"source\" has an invalid type.")]
    SourceInvalidType,
    #[error("\"source\" has an invalid value.")]
    SourceInvalidVal,

    #[error("\"recTime\" does not exist.")]
    RecTimeNotExist,
    #[error("\"recTime\" has an invalid value.")]
    RecTimeInvalidVal,
    #[error("\"recTime\" is below the minimum value.")]
    RecTimeMinLess,
    #[error("\"recTime\" is above the maximum value.")]
    RecTimeMaxOver,

    #[error("\"startTime\" does not exist.")]
    StartTimeNotExist,

    #[error("\"startTime.dayOfWeek\" has an invalid type.")]
    DayOfWeekInvalidType,
    #[error("\"startTime.dayOfWeek\" has an invalid value.")]
    DayOfWeekInvalidVal,
    #[error("\"startTime.dayOfWeek\" is below the minimum value.")]
    DayOfWeekMinLess,
    #[error("\"startTime.dayOfWeek\" is above the maximum value.")]
    DayOfWeekMaxOver,

    #[error("\"startTime.month\" does not exist.")]
    MonthNotExist,
    #[error("\"startTime.month\" has an invalid type.")]
    MonthInvalidType,
    #[error("\"startTime.month\" has an invalid value.")]
    MonthInvalidVal,
    #[error("\"startTime.month\" is below the minimum value.")]
    MonthMinLess,
    #[error("\"startTime.month\" is above the maximum value.")]
    MonthMaxOver,

    #[error("\"startTime.date\" does not exist.")]
    DateNotExist,
    #[error("\"startTime.date\" has an invalid type.")]
    DateInvalidType,
    #[error("\"startTime.date\" has an invalid value.")]
    DateInvalidVal,
    #[error("\"startTime.date\" is below the minimum value.")]
    DateMinLess,
    #[error("\"startTime.date\" is above the maximum value.")]
    DateMaxOver,

    #[error("\"startTime.hours\" does not exist.")]
    HoursNotExist,
    #[error("\"startTime.hours\" has an invalid value.")]
    HoursInvalidVal,
    #[error("\"startTime.hours\" is below the minimum value.")]
    HoursMinLess,
    #[error("\"startTime.hours\" is above the maximum value.")]
    HoursMaxOver,

    #[error("\"startTime.minutes\" does not exist.")]
    MinutesNotExist,
    #[error("\"startTime.minutes\" has an invalid value.")]
    MinutesInvalidVal,
    #[error("\"startTime.minutes\" is below the minimum value.")]
    MinutesMinLess,
    #[error("\"startTime.minutes\" is above the maximum value.")]
    MinutesMaxOver,

    #[error("\"startTime.seconds\" does not exist.")]
    SecondsNotExist,
    #[error("\"startTime.seconds\" has an invalid value.")]
    SecondsInvalidVal,
    #[error("\"startTime.seconds\" is below the minimum value.")]
    SecondsMinLess,
    #[error("\"startTime.seconds\" is above the maximum value.")]
    SecondsMaxOver,
}

/// Validation codes accumulated for a single schedule record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordErrors {
    /// Index of the record within the schedule file array.
    pub index: usize,
    pub codes: Vec<ValidationCode>,
}

impl std::fmt::Display for RecordErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "schedule[{}]:", self.index)?;
        for code in &self.codes {
            writeln!(f, "  {code}")?;
        }
        Ok(())
    }
}

/// Errors decoding an already-validated schedule record into the typed model.
///
/// Hitting one of these means the caller skipped validation; it is a
/// programming error, not a runtime condition to recover from.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid value for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },
}

/// Schedule file loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read schedule file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("schedule file is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("schedule file must contain a JSON array of schedule records")]
    NotAnArray,

    #[error("{} schedule record(s) failed validation", .0.len())]
    Rejected(Vec<RecordErrors>),

    #[error("failed to decode schedule record: {0}")]
    Decode(#[from] DecodeError),
}

/// Stream-address resolution errors
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("server info request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server info response is missing the '{0}' element")]
    MalformedServerInfo(&'static str),
}

/// Recording process errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("recording process exited with {0}")]
    Failed(std::process::ExitStatus),
}

/// Job installation errors
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("failed to resolve stream source: {0}")]
    Stream(#[from] StreamError),

    #[error("computed trigger is not a valid cron expression: {0}")]
    Cron(#[from] cron::error::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_code_display_names_field() {
        assert!(ValidationCode::RecTimeMaxOver.to_string().contains("recTime"));
        assert!(ValidationCode::DayOfWeekInvalidType
            .to_string()
            .contains("startTime.dayOfWeek"));
    }

    #[test]
    fn test_record_errors_display_lists_all_codes() {
        let batch = RecordErrors {
            index: 2,
            codes: vec![
                ValidationCode::TitleNotExist,
                ValidationCode::RecTimeMinLess,
            ],
        };
        let rendered = batch.to_string();
        assert!(rendered.contains("schedule[2]"));
        assert!(rendered.contains("\"title\" does not exist."));
        assert!(rendered.contains("\"recTime\" is below the minimum value."));
    }

    #[test]
    fn test_load_error_rejected_counts_records() {
        let err = LoadError::Rejected(vec![
            RecordErrors {
                index: 0,
                codes: vec![ValidationCode::SourceInvalidVal],
            },
            RecordErrors {
                index: 3,
                codes: vec![ValidationCode::StartTimeNotExist],
            },
        ]);
        assert!(err.to_string().contains("2 schedule record(s)"));
    }
}
