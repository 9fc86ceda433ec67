// Start-time normalization
//
// Turns a validated start-time specification into the concrete five-field
// trigger handed to the cron engine, minus the configured start buffer, and
// computes how long the recorder must run to cover the nominal window.
//
// Input here is the decoded model only; callers are expected to have run
// `validate::validate` first. Feeding garbage in yields garbage out.

use crate::models::{CronField, CronTime};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;

const DAY_OF_WEEK_NAMES: [&str; 7] = ["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

/// Fully-resolved trigger fields. Wildcards survive only in the three
/// calendar fields; the clock fields are always concrete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTrigger {
    /// Sunday = 0.
    pub day_of_week: CronField,
    /// 0-indexed, matching the schedule format.
    pub month: CronField,
    pub date: CronField,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl ResolvedTrigger {
    /// Render the six-field expression understood by the `cron` crate:
    /// `sec min hour day-of-month month day-of-week`. The 0-indexed month
    /// becomes 1-12 and day-of-week numbers become SUN..SAT names.
    pub fn cron_expression(&self) -> String {
        let month = match self.month {
            CronField::Wildcard => "*".to_string(),
            CronField::Value(m) => (m + 1).to_string(),
        };
        let day_of_week = match self.day_of_week {
            CronField::Wildcard => "*".to_string(),
            CronField::Value(d) => DAY_OF_WEEK_NAMES[d.rem_euclid(7) as usize].to_string(),
        };

        format!(
            "{} {} {} {} {} {}",
            self.seconds, self.minutes, self.hours, self.date, month, day_of_week
        )
    }
}

/// Result of normalizing one schedule's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized {
    pub trigger: ResolvedTrigger,
    /// How long the recorder must run: the nominal window plus the buffer
    /// consumed by starting early.
    pub effective_duration_seconds: i64,
}

/// Normalize against the current wall clock in the given time zone.
pub fn normalize(
    start: &CronTime,
    rec_time_minutes: u32,
    buffer_seconds: i64,
    tz: Tz,
) -> Normalized {
    normalize_at(
        start,
        rec_time_minutes,
        buffer_seconds,
        Utc::now().with_timezone(&tz).naive_local(),
    )
}

/// Normalize against an explicit "now" (naive local time in the zone the
/// trigger will run in).
pub fn normalize_at(
    start: &CronTime,
    rec_time_minutes: u32,
    buffer_seconds: i64,
    now: NaiveDateTime,
) -> Normalized {
    let moment = resolve_moment(start, now);
    let adjusted = moment - Duration::seconds(buffer_seconds);
    let trigger = rebuild_trigger(adjusted, start);

    Normalized {
        trigger,
        effective_duration_seconds: i64::from(rec_time_minutes) * 60 + buffer_seconds,
    }
}

/// Seconds past midnight described by the clock fields. Hours of 24 and
/// above overflow into the following calendar day here, before any buffer
/// is subtracted.
fn clock_offset(start: &CronTime) -> Duration {
    Duration::seconds(
        i64::from(start.hours) * 3600 + i64::from(start.minutes) * 60 + i64::from(start.seconds),
    )
}

/// Resolve the concrete calendar moment a specification points at.
///
/// Priority order: an explicit date wins over an explicit day-of-week, and
/// with neither the specification means "today, at this clock time".
fn resolve_moment(start: &CronTime, now: NaiveDateTime) -> NaiveDateTime {
    let offset = clock_offset(start);

    if let Some(date) = start.explicit_date() {
        // A wildcard month with a concrete date has no single calendar
        // meaning; the current month stands in for it.
        let month0 = start
            .month
            .and_then(|f| f.value())
            .unwrap_or_else(|| i64::from(now.month0()));

        let candidate = month_date_moment(now.year(), month0, date, offset, now);
        if candidate < now {
            return month_date_moment(now.year() + 1, month0, date, offset, now);
        }
        return candidate;
    }

    if let Some(day_of_week) = start.explicit_day_of_week() {
        // Next-or-today occurrence of the weekday, Sunday = 0.
        let target = day_of_week.rem_euclid(7) as u32;
        let current = now.weekday().num_days_from_sunday();
        let days_ahead = (target + 7 - current) % 7;
        let base = now.date() + Duration::days(i64::from(days_ahead));
        return base.and_time(NaiveTime::MIN) + offset;
    }

    now.date().and_time(NaiveTime::MIN) + offset
}

/// Build `year`/`month0`/`date` at the clock offset. Days past the end of
/// the month overflow into the following month, so a validated date of 31
/// stays meaningful in shorter months.
fn month_date_moment(
    year: i32,
    month0: i64,
    date: i64,
    offset: Duration,
    fallback: NaiveDateTime,
) -> NaiveDateTime {
    // month0 is validated to [0,11]; first-of-month construction cannot fail
    // for it, but a garbage value degrades to "now" rather than panicking.
    let Some(first) = NaiveDate::from_ymd_opt(year, month0 as u32 + 1, 1) else {
        return fallback;
    };
    let base = first + Duration::days(date - 1);
    base.and_time(NaiveTime::MIN) + offset
}

/// Re-derive the trigger fields from the buffer-adjusted moment.
///
/// Date-based and weekday-based triggering are mutually exclusive in the
/// output: a concrete date pins month/date and wildcards the weekday, a
/// concrete weekday does the reverse, and a fully-wildcarded spec repeats
/// daily. All derived fields come from the adjusted moment, so a buffer
/// crossing midnight moves the calendar fields with it.
fn rebuild_trigger(adjusted: NaiveDateTime, start: &CronTime) -> ResolvedTrigger {
    let (day_of_week, month, date) = if start.explicit_date().is_some() {
        (
            CronField::Wildcard,
            CronField::Value(i64::from(adjusted.month0())),
            CronField::Value(i64::from(adjusted.day())),
        )
    } else if start.explicit_day_of_week().is_some() {
        (
            CronField::Value(i64::from(adjusted.weekday().num_days_from_sunday())),
            CronField::Wildcard,
            CronField::Wildcard,
        )
    } else {
        (CronField::Wildcard, CronField::Wildcard, CronField::Wildcard)
    };

    ResolvedTrigger {
        day_of_week,
        month,
        date,
        hours: adjusted.hour(),
        minutes: adjusted.minute(),
        seconds: adjusted.second(),
    }
}
