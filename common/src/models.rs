// Schedule data model and field limits

use crate::errors::DecodeError;
use serde_json::Value;
use std::fmt;

/// Sentinel accepted in place of a number for the optional trigger fields.
pub const WILDCARD_CHAR: &str = "*";

/// Fallback output title when a schedule's title is empty.
pub const DEFAULT_TITLE: &str = "dump";

/// Symbolic source name for a pass-through URL source.
pub const SOURCE_TYPE_URL: &str = "url";
/// Symbolic source name for the AGQR live-stream resolver.
pub const SOURCE_TYPE_AGQR: &str = "agqr";

pub const RECTIME_RANGE_MIN: i64 = 1; // minutes
pub const RECTIME_RANGE_MAX: i64 = 1440; // =24h
pub const STARTTIME_DAYOFWEEK_RANGE_MIN: i64 = 0;
pub const STARTTIME_DAYOFWEEK_RANGE_MAX: i64 = 6;
pub const STARTTIME_MONTH_RANGE_MIN: i64 = 0;
pub const STARTTIME_MONTH_RANGE_MAX: i64 = 11;
pub const STARTTIME_DATE_RANGE_MIN: i64 = 1;
pub const STARTTIME_DATE_RANGE_MAX: i64 = 31;
pub const STARTTIME_HOURS_RANGE_MIN: i64 = 0;
pub const STARTTIME_HOURS_RANGE_MAX: i64 = 48;
pub const STARTTIME_MINUTES_RANGE_MIN: i64 = 0;
pub const STARTTIME_MINUTES_RANGE_MAX: i64 = 59;
pub const STARTTIME_SECONDS_RANGE_MIN: i64 = 0;
pub const STARTTIME_SECONDS_RANGE_MAX: i64 = 59;

/// A trigger field that is either unconstrained or pinned to one value.
///
/// Raw records duck-type these fields as numbers, numeric strings, or the
/// wildcard character; they are decoded into this variant exactly once at
/// the validation boundary and everything downstream operates on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronField {
    Wildcard,
    Value(i64),
}

impl CronField {
    pub fn is_wildcard(&self) -> bool {
        matches!(self, CronField::Wildcard)
    }

    pub fn value(&self) -> Option<i64> {
        match self {
            CronField::Wildcard => None,
            CronField::Value(n) => Some(*n),
        }
    }
}

impl fmt::Display for CronField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CronField::Wildcard => f.write_str(WILDCARD_CHAR),
            CronField::Value(n) => write!(f, "{n}"),
        }
    }
}

/// Decoded start-time specification.
///
/// `day_of_week`, `month` and `date` are optional in the record itself, so
/// absence and wildcard are distinct states. The three clock fields are
/// mandatory and never wildcarded; `hours` may exceed 23 to describe a
/// late-night slot that belongs to the previous broadcast day (up to 48).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronTime {
    pub day_of_week: Option<CronField>,
    pub month: Option<CronField>,
    pub date: Option<CronField>,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl CronTime {
    /// The concrete day-of-month, when one was specified.
    pub fn explicit_date(&self) -> Option<i64> {
        self.date.and_then(|f| f.value())
    }

    /// The concrete day-of-week, when one was specified.
    pub fn explicit_day_of_week(&self) -> Option<i64> {
        self.day_of_week.and_then(|f| f.value())
    }
}

/// Where a recording's stream comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Literal `rtmp://` URI; used as-is.
    Rtmp,
    /// Symbolic pass-through source.
    Url,
    /// Symbolic name resolved against the AGQR server-info endpoint.
    Agqr,
}

/// A schedule's source field: the raw string plus its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    raw: String,
    kind: SourceKind,
}

impl Source {
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A user-declared recurring recording job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub title: String,
    pub source: Source,
    /// Nominal recording length in minutes.
    pub rec_time: u32,
    pub start_time: CronTime,
}

impl Schedule {
    /// Decode a schedule record that already passed `validate::validate`.
    ///
    /// The record is read once here; downstream code never touches raw JSON.
    /// Errors indicate the caller skipped validation.
    pub fn from_value(raw: &Value) -> Result<Self, DecodeError> {
        let obj = raw.as_object().ok_or(DecodeError::InvalidField {
            field: "schedule",
            reason: "record is not a JSON object".to_string(),
        })?;

        let title = obj
            .get("title")
            .ok_or(DecodeError::MissingField("title"))?
            .as_str()
            .ok_or(DecodeError::InvalidField {
                field: "title",
                reason: "not a string".to_string(),
            })?
            .to_string();

        let source_str = obj
            .get("source")
            .ok_or(DecodeError::MissingField("source"))?
            .as_str()
            .ok_or(DecodeError::InvalidField {
                field: "source",
                reason: "not a string".to_string(),
            })?;
        let source = decode_source(source_str)?;

        let rec_time_raw = obj
            .get("recTime")
            .ok_or(DecodeError::MissingField("recTime"))?;
        let rec_time = coerce_integer(rec_time_raw).ok_or(DecodeError::InvalidField {
            field: "recTime",
            reason: "not an integer".to_string(),
        })?;
        let rec_time = u32::try_from(rec_time).map_err(|_| DecodeError::InvalidField {
            field: "recTime",
            reason: "out of range".to_string(),
        })?;

        let start_time_raw = obj
            .get("startTime")
            .ok_or(DecodeError::MissingField("startTime"))?;
        let start_time = decode_cron_time(start_time_raw)?;

        Ok(Schedule {
            title,
            source,
            rec_time,
            start_time,
        })
    }
}

fn decode_source(raw: &str) -> Result<Source, DecodeError> {
    let kind = if raw.starts_with("rtmp://") {
        SourceKind::Rtmp
    } else if raw == SOURCE_TYPE_URL {
        SourceKind::Url
    } else if raw == SOURCE_TYPE_AGQR {
        SourceKind::Agqr
    } else {
        return Err(DecodeError::InvalidField {
            field: "source",
            reason: format!("'{raw}' is neither an rtmp URI nor a known source name"),
        });
    };

    Ok(Source {
        raw: raw.to_string(),
        kind,
    })
}

fn decode_cron_time(raw: &Value) -> Result<CronTime, DecodeError> {
    let obj = raw.as_object().ok_or(DecodeError::InvalidField {
        field: "startTime",
        reason: "not a JSON object".to_string(),
    })?;

    Ok(CronTime {
        day_of_week: obj
            .get("dayOfWeek")
            .map(|v| decode_cron_field(v, "startTime.dayOfWeek"))
            .transpose()?,
        month: obj
            .get("month")
            .map(|v| decode_cron_field(v, "startTime.month"))
            .transpose()?,
        date: obj
            .get("date")
            .map(|v| decode_cron_field(v, "startTime.date"))
            .transpose()?,
        hours: decode_clock_field(obj.get("hours"), "startTime.hours")?,
        minutes: decode_clock_field(obj.get("minutes"), "startTime.minutes")?,
        seconds: decode_clock_field(obj.get("seconds"), "startTime.seconds")?,
    })
}

fn decode_cron_field(raw: &Value, field: &'static str) -> Result<CronField, DecodeError> {
    if raw.as_str() == Some(WILDCARD_CHAR) {
        return Ok(CronField::Wildcard);
    }

    coerce_integer(raw)
        .map(CronField::Value)
        .ok_or(DecodeError::InvalidField {
            field,
            reason: "neither the wildcard nor an integer".to_string(),
        })
}

fn decode_clock_field(raw: Option<&Value>, field: &'static str) -> Result<u32, DecodeError> {
    let raw = raw.ok_or(DecodeError::MissingField(field))?;
    let n = coerce_integer(raw).ok_or(DecodeError::InvalidField {
        field,
        reason: "not an integer".to_string(),
    })?;
    u32::try_from(n).map_err(|_| DecodeError::InvalidField {
        field,
        reason: "negative value".to_string(),
    })
}

/// Coerce a JSON value to an integer the way the schedule format allows:
/// native integers, floats with a zero fractional part, and strings holding
/// a decimal (optionally signed) integer. Everything else is `None`.
pub(crate) fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i)
            } else {
                n.as_f64().and_then(float_to_integer)
            }
        }
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(i);
            }
            trimmed.parse::<f64>().ok().and_then(float_to_integer)
        }
        _ => None,
    }
}

fn float_to_integer(f: f64) -> Option<i64> {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0; // 2^53
    if f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_EXACT {
        Some(f as i64)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_integer_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_integer(&json!(5)), Some(5));
        assert_eq!(coerce_integer(&json!(-1)), Some(-1));
        assert_eq!(coerce_integer(&json!(5.0)), Some(5));
        assert_eq!(coerce_integer(&json!("12")), Some(12));
        assert_eq!(coerce_integer(&json!("-3")), Some(-3));
        assert_eq!(coerce_integer(&json!(" 7 ")), Some(7));
    }

    #[test]
    fn test_coerce_integer_rejects_everything_else() {
        assert_eq!(coerce_integer(&json!(1.5)), None);
        assert_eq!(coerce_integer(&json!("")), None);
        assert_eq!(coerce_integer(&json!("hoge")), None);
        assert_eq!(coerce_integer(&json!("1.5")), None);
        assert_eq!(coerce_integer(&json!("*")), None);
        assert_eq!(coerce_integer(&json!(true)), None);
        assert_eq!(coerce_integer(&json!(null)), None);
        assert_eq!(coerce_integer(&json!({})), None);
    }

    #[test]
    fn test_schedule_from_value_decodes_tagged_fields() {
        let raw = json!({
            "title": "morning show",
            "source": "rtmp://example.com/live/stream",
            "recTime": "30",
            "startTime": {
                "dayOfWeek": "*",
                "hours": "8",
                "minutes": 0,
                "seconds": 0
            }
        });

        let schedule = Schedule::from_value(&raw).unwrap();
        assert_eq!(schedule.title, "morning show");
        assert_eq!(schedule.source.kind(), SourceKind::Rtmp);
        assert_eq!(schedule.rec_time, 30);
        assert_eq!(schedule.start_time.day_of_week, Some(CronField::Wildcard));
        assert_eq!(schedule.start_time.month, None);
        assert_eq!(schedule.start_time.hours, 8);
    }

    #[test]
    fn test_schedule_from_value_classifies_symbolic_sources() {
        let raw = json!({
            "title": "x",
            "source": "agqr",
            "recTime": 30,
            "startTime": {"hours": 1, "minutes": 0, "seconds": 0}
        });
        let schedule = Schedule::from_value(&raw).unwrap();
        assert_eq!(schedule.source.kind(), SourceKind::Agqr);
        assert_eq!(schedule.source.raw(), "agqr");
    }

    #[test]
    fn test_schedule_from_value_rejects_unvalidated_input() {
        let raw = json!({"title": "x"});
        assert!(Schedule::from_value(&raw).is_err());
    }

    #[test]
    fn test_cron_field_display() {
        assert_eq!(CronField::Wildcard.to_string(), "*");
        assert_eq!(CronField::Value(26).to_string(), "26");
    }
}
