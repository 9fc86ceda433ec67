// Property-based tests for schedule validation

use common::errors::ValidationCode;
use common::models::Schedule;
use common::validate::{validate, validate_cron_time};
use proptest::prelude::*;
use serde_json::json;

fn schedule_with_rec_time(rec_time: serde_json::Value) -> serde_json::Value {
    json!({
        "title": "x",
        "source": "rtmp://h/a",
        "recTime": rec_time,
        "startTime": {"hours": 8, "minutes": 0, "seconds": 0}
    })
}

/// *For any* recTime within [1, 1440], given as a native integer or an
/// integer string, validation emits no recTime codes.
#[test]
fn property_rec_time_in_range_is_clean() {
    proptest!(|(rec_time in 1i64..=1440i64, as_string in any::<bool>())| {
        let value = if as_string { json!(rec_time.to_string()) } else { json!(rec_time) };
        let codes = validate(&schedule_with_rec_time(value));
        prop_assert!(codes.is_empty());
    });
}

/// *For any* integer recTime outside [1, 1440], validation emits exactly one
/// of MIN_LESS / MAX_OVER, never both.
#[test]
fn property_rec_time_out_of_range_emits_one_code() {
    proptest!(|(rec_time in prop_oneof![-10_000i64..=0, 1441i64..=100_000])| {
        let codes = validate(&schedule_with_rec_time(json!(rec_time)));
        let expected = if rec_time < 1 {
            ValidationCode::RecTimeMinLess
        } else {
            ValidationCode::RecTimeMaxOver
        };
        prop_assert_eq!(codes, vec![expected]);
    });
}

/// *For any* clock values, the wildcard is rejected in each mandatory clock
/// field and accepted in each optional calendar field.
#[test]
fn property_wildcard_acceptance_splits_by_field_kind() {
    proptest!(|(hours in 0u32..=48, minutes in 0u32..=59, seconds in 0u32..=59)| {
        // Optional fields: wildcard is always fine.
        let optional = validate_cron_time(&json!({
            "dayOfWeek": "*", "month": "*", "date": "*",
            "hours": hours, "minutes": minutes, "seconds": seconds
        }));
        prop_assert!(optional.is_empty());

        // Mandatory fields: wildcard is always an invalid value.
        let mandatory = validate_cron_time(&json!({
            "hours": "*", "minutes": "*", "seconds": "*"
        }));
        prop_assert_eq!(mandatory, vec![
            ValidationCode::HoursInvalidVal,
            ValidationCode::MinutesInvalidVal,
            ValidationCode::SecondsInvalidVal,
        ]);
    });
}

/// *For any* month/date presence combination, the cross-presence codes fire
/// exactly when one of the pair is missing.
#[test]
fn property_month_date_mutual_presence() {
    proptest!(|(month in 0i64..=11, date in 1i64..=31, has_month in any::<bool>(), has_date in any::<bool>())| {
        let mut start = serde_json::Map::new();
        if has_month {
            start.insert("month".to_string(), json!(month));
        }
        if has_date {
            start.insert("date".to_string(), json!(date));
        }
        start.insert("hours".to_string(), json!(0));
        start.insert("minutes".to_string(), json!(0));
        start.insert("seconds".to_string(), json!(0));

        let codes = validate_cron_time(&serde_json::Value::Object(start));
        prop_assert_eq!(
            codes.contains(&ValidationCode::MonthNotExist),
            has_date && !has_month
        );
        prop_assert_eq!(
            codes.contains(&ValidationCode::DateNotExist),
            has_month && !has_date
        );
    });
}

/// *For any* in-range field values, the whole record validates cleanly,
/// re-validation stays empty, and the record decodes into the typed model.
#[test]
fn property_valid_records_validate_and_decode() {
    proptest!(|(
        day_of_week in 0i64..=6,
        month in 0i64..=11,
        date in 1i64..=31,
        hours in 0u32..=48,
        minutes in 0u32..=59,
        seconds in 0u32..=59,
        rec_time in 1i64..=1440,
    )| {
        let raw = json!({
            "title": "prog",
            "source": "agqr",
            "recTime": rec_time,
            "startTime": {
                "dayOfWeek": day_of_week,
                "month": month,
                "date": date,
                "hours": hours,
                "minutes": minutes,
                "seconds": seconds
            }
        });

        prop_assert!(validate(&raw).is_empty());
        prop_assert!(validate(&raw).is_empty());

        let schedule = Schedule::from_value(&raw).unwrap();
        prop_assert_eq!(schedule.rec_time as i64, rec_time);
        prop_assert_eq!(schedule.start_time.hours, hours);
    });
}

/// *For any* non-numeric junk in a clock field, the format code fires alone;
/// the range codes never accompany it.
#[test]
fn property_format_failure_short_circuits_range() {
    let junk = prop_oneof![
        Just(json!("hoge")),
        Just(json!("")),
        Just(json!("*")),
        Just(json!(true)),
        Just(json!(1.25)),
        Just(json!(null)),
        Just(json!({})),
    ];

    proptest!(|(value in junk)| {
        let codes = validate_cron_time(&json!({
            "hours": value, "minutes": 0, "seconds": 0
        }));
        prop_assert_eq!(codes, vec![ValidationCode::HoursInvalidVal]);
    });
}
