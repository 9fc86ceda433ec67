// Schedule record validation
//
// Field-by-field validation of untrusted schedule records. Checks run in a
// fixed order so the returned code list is reproducible: title, source,
// recTime, then startTime (dayOfWeek, month, date, hours, minutes, seconds).
// An empty list means the record is valid. Nothing here touches I/O and
// nothing throws; every failure is a code in the returned list.

use crate::errors::ValidationCode::{self, *};
use crate::models::{self, coerce_integer, WILDCARD_CHAR};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

lazy_static! {
    static ref STREAM_URI: Regex = Regex::new(r"^rtmp://.*$").expect("stream URI pattern");
}

/// Codes a single field can contribute, by failure category.
struct FieldCodes {
    invalid_type: Option<ValidationCode>,
    invalid_val: ValidationCode,
    min_less: ValidationCode,
    max_over: ValidationCode,
}

/// Validate one schedule record, returning every applicable code in order.
pub fn validate(raw: &Value) -> Vec<ValidationCode> {
    let Some(obj) = raw.as_object() else {
        // A non-object record has none of the required fields.
        return vec![TitleNotExist, SourceNotExist, RecTimeNotExist, StartTimeNotExist];
    };

    let mut codes = Vec::new();

    match obj.get("title") {
        Some(title) => codes.extend(check_title(title)),
        None => codes.push(TitleNotExist),
    }

    match obj.get("source") {
        Some(source) => codes.extend(check_source(source)),
        None => codes.push(SourceNotExist),
    }

    match obj.get("recTime") {
        Some(rec_time) => codes.extend(check_mandatory_number(
            rec_time,
            &FieldCodes {
                invalid_type: None,
                invalid_val: RecTimeInvalidVal,
                min_less: RecTimeMinLess,
                max_over: RecTimeMaxOver,
            },
            models::RECTIME_RANGE_MIN,
            models::RECTIME_RANGE_MAX,
        )),
        None => codes.push(RecTimeNotExist),
    }

    match obj.get("startTime") {
        Some(start_time) => codes.extend(validate_cron_time(start_time)),
        None => codes.push(StartTimeNotExist),
    }

    codes
}

/// Validate a start-time specification on its own.
///
/// A non-object value is treated as an object with no fields, so only the
/// mandatory clock fields report their absence.
pub fn validate_cron_time(raw: &Value) -> Vec<ValidationCode> {
    let empty = Map::new();
    let obj = raw.as_object().unwrap_or(&empty);

    let mut codes = Vec::new();

    if let Some(day_of_week) = obj.get("dayOfWeek") {
        codes.extend(check_optional_field(
            day_of_week,
            &FieldCodes {
                invalid_type: Some(DayOfWeekInvalidType),
                invalid_val: DayOfWeekInvalidVal,
                min_less: DayOfWeekMinLess,
                max_over: DayOfWeekMaxOver,
            },
            models::STARTTIME_DAYOFWEEK_RANGE_MIN,
            models::STARTTIME_DAYOFWEEK_RANGE_MAX,
        ));
    }

    // month and date must appear together; each reports the other's absence
    // in its own position. dayOfWeek alongside month/date stays legal.
    match obj.get("month") {
        Some(month) => codes.extend(check_optional_field(
            month,
            &FieldCodes {
                invalid_type: Some(MonthInvalidType),
                invalid_val: MonthInvalidVal,
                min_less: MonthMinLess,
                max_over: MonthMaxOver,
            },
            models::STARTTIME_MONTH_RANGE_MIN,
            models::STARTTIME_MONTH_RANGE_MAX,
        )),
        None => {
            if obj.contains_key("date") {
                codes.push(MonthNotExist);
            }
        }
    }

    match obj.get("date") {
        Some(date) => codes.extend(check_optional_field(
            date,
            &FieldCodes {
                invalid_type: Some(DateInvalidType),
                invalid_val: DateInvalidVal,
                min_less: DateMinLess,
                max_over: DateMaxOver,
            },
            models::STARTTIME_DATE_RANGE_MIN,
            models::STARTTIME_DATE_RANGE_MAX,
        )),
        None => {
            if obj.contains_key("month") {
                codes.push(DateNotExist);
            }
        }
    }

    match obj.get("hours") {
        Some(hours) => codes.extend(check_mandatory_number(
            hours,
            &FieldCodes {
                invalid_type: None,
                invalid_val: HoursInvalidVal,
                min_less: HoursMinLess,
                max_over: HoursMaxOver,
            },
            models::STARTTIME_HOURS_RANGE_MIN,
            models::STARTTIME_HOURS_RANGE_MAX,
        )),
        None => codes.push(HoursNotExist),
    }

    match obj.get("minutes") {
        Some(minutes) => codes.extend(check_mandatory_number(
            minutes,
            &FieldCodes {
                invalid_type: None,
                invalid_val: MinutesInvalidVal,
                min_less: MinutesMinLess,
                max_over: MinutesMaxOver,
            },
            models::STARTTIME_MINUTES_RANGE_MIN,
            models::STARTTIME_MINUTES_RANGE_MAX,
        )),
        None => codes.push(MinutesNotExist),
    }

    match obj.get("seconds") {
        Some(seconds) => codes.extend(check_mandatory_number(
            seconds,
            &FieldCodes {
                invalid_type: None,
                invalid_val: SecondsInvalidVal,
                min_less: SecondsMinLess,
                max_over: SecondsMaxOver,
            },
            models::STARTTIME_SECONDS_RANGE_MIN,
            models::STARTTIME_SECONDS_RANGE_MAX,
        )),
        None => codes.push(SecondsNotExist),
    }

    codes
}

fn check_title(title: &Value) -> Vec<ValidationCode> {
    if title.is_string() {
        vec![]
    } else {
        vec![TitleInvalidType]
    }
}

fn check_source(source: &Value) -> Vec<ValidationCode> {
    let Some(s) = source.as_str() else {
        return vec![SourceInvalidType];
    };

    let symbolic =
        s == models::SOURCE_TYPE_URL || s == models::SOURCE_TYPE_AGQR;
    if !STREAM_URI.is_match(s) && !symbolic {
        return vec![SourceInvalidVal];
    }

    vec![]
}

/// Check an optional trigger field: wildcard allowed, type gate first.
///
/// Only strings and integer-valued numbers pass the type gate; the wildcard
/// short-circuits the rest. A failing format check short-circuits the range
/// checks, since comparing a non-number against the range is meaningless.
fn check_optional_field(value: &Value, codes: &FieldCodes, min: i64, max: i64) -> Vec<ValidationCode> {
    let integer_number = matches!(value, Value::Number(_)) && coerce_integer(value).is_some();
    if !value.is_string() && !integer_number {
        match codes.invalid_type {
            Some(code) => return vec![code],
            None => return vec![codes.invalid_val],
        }
    }

    if value.as_str() == Some(WILDCARD_CHAR) {
        return vec![];
    }

    let Some(n) = coerce_integer(value) else {
        return vec![codes.invalid_val];
    };

    range_codes(n, codes, min, max)
}

/// Check a mandatory numeric field: wildcard never accepted, no type gate.
/// Anything that does not coerce to an integer is an invalid value.
fn check_mandatory_number(value: &Value, codes: &FieldCodes, min: i64, max: i64) -> Vec<ValidationCode> {
    let Some(n) = coerce_integer(value) else {
        return vec![codes.invalid_val];
    };

    range_codes(n, codes, min, max)
}

fn range_codes(n: i64, codes: &FieldCodes, min: i64, max: i64) -> Vec<ValidationCode> {
    let mut out = Vec::new();
    if n < min {
        out.push(codes.min_less);
    }
    if n > max {
        out.push(codes.max_over);
    }
    out
}
