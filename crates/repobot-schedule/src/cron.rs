//! Five-field cron matching and run_at window matching.
//!
//! Implemented here rather than through a cron crate so the exact
//! edge-case behavior (step-with-range, list matching, fail-closed on
//! malformed input) stays under this crate's test suite.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};

/// Minutes before/after a `run_at` timestamp in which it is due:
/// `-1 <= (now - run_at) <= 60`, inclusive. The window is asymmetric
/// because the evaluator is driven by an hourly external trigger — a job
/// stays due for up to an hour to tolerate a missed invocation, and
/// fires up to one minute early to tolerate a slightly early one.
const RUN_AT_EARLY_MINUTES: f64 = -1.0;
const RUN_AT_LATE_MINUTES: f64 = 60.0;

/// Validate a cron expression's shape (five whitespace-separated fields).
///
/// Only the field count is validated at `add` time; per-field garbage
/// fails closed during evaluation instead.
pub fn validate_cron(expr: &str) -> Result<(), String> {
    let count = expr.split_whitespace().count();
    if count == 5 {
        Ok(())
    } else {
        Err(format!("Invalid cron expression: {expr} (expected 5 fields)"))
    }
}

/// Check whether a cron expression matches the given instant.
///
/// Malformed expressions never match (evaluation must not fail on a
/// single bad legacy job).
pub fn cron_matches(expr: &str, at: DateTime<Utc>) -> bool {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return false;
    }

    // Cron day-of-week is 0=Sunday.
    let weekday = at.weekday().num_days_from_sunday();

    field_matches(fields[0], at.minute())
        && field_matches(fields[1], at.hour())
        && field_matches(fields[2], at.day())
        && field_matches(fields[3], at.month())
        && field_matches(fields[4], weekday)
}

/// Match a single cron field against a value.
///
/// Forms, tried in order: `*`, `*/N`, `A-B`, `A-B/N`, `A,B,C`, bare
/// integer. A token that fits none of them (or mixes them, like
/// `1,3-5`) is a non-match.
fn field_matches(field: &str, value: u32) -> bool {
    if field == "*" {
        return true;
    }

    if let Some(step) = field.strip_prefix("*/") {
        return match step.parse::<u32>() {
            Ok(n) if n > 0 => value % n == 0,
            _ => false,
        };
    }

    if field.contains('-') && !field.contains('/') {
        let Some((start, end)) = field.split_once('-') else {
            return false;
        };
        return match (start.parse::<u32>(), end.parse::<u32>()) {
            (Ok(a), Ok(b)) => a <= value && value <= b,
            _ => false,
        };
    }

    if field.contains('-') && field.contains('/') {
        let Some((range, step)) = field.split_once('/') else {
            return false;
        };
        let Some((start, end)) = range.split_once('-') else {
            return false;
        };
        return match (start.parse::<u32>(), end.parse::<u32>(), step.parse::<u32>()) {
            (Ok(a), Ok(b), Ok(n)) if n > 0 => a <= value && value <= b && (value - a) % n == 0,
            _ => false,
        };
    }

    if field.contains(',') {
        let mut members = Vec::new();
        for token in field.split(',') {
            match token.parse::<u32>() {
                Ok(v) => members.push(v),
                Err(_) => return false,
            }
        }
        return members.contains(&value);
    }

    field.parse::<u32>().map(|v| v == value).unwrap_or(false)
}

/// Parse a run_at timestamp. A trailing `Z`, an explicit offset, or no
/// offset at all are accepted; a missing offset means UTC.
pub fn parse_run_at(run_at: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(run_at) {
        return Some(dt.with_timezone(&Utc));
    }
    run_at.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

/// Check whether a run_at timestamp is due at `now`.
///
/// Malformed timestamps fail closed (non-match).
pub fn run_at_matches(run_at: &str, now: DateTime<Utc>) -> bool {
    let Some(at) = parse_run_at(run_at) else {
        return false;
    };
    let diff_minutes = (now - at).num_seconds() as f64 / 60.0;
    (RUN_AT_EARLY_MINUTES..=RUN_AT_LATE_MINUTES).contains(&diff_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_wildcard_always_matches() {
        for v in 0..60 {
            assert!(field_matches("*", v));
        }
    }

    #[test]
    fn test_step_matches_modulo() {
        for v in 0..60 {
            assert_eq!(field_matches("*/15", v), v % 15 == 0);
        }
        assert!(!field_matches("*/0", 0));
    }

    #[test]
    fn test_range_matches_inclusive() {
        for v in 0..10 {
            assert_eq!(field_matches("1-5", v), (1..=5).contains(&v));
        }
    }

    #[test]
    fn test_range_with_step() {
        // 0-30/5: within range and (value - 0) % 5 == 0
        assert!(field_matches("0-30/5", 0));
        assert!(field_matches("0-30/5", 25));
        assert!(!field_matches("0-30/5", 26));
        assert!(!field_matches("0-30/5", 35));
        // offset start
        assert!(field_matches("3-30/5", 8));
        assert!(!field_matches("3-30/5", 10));
    }

    #[test]
    fn test_list_matches_membership() {
        for v in 0..8 {
            assert_eq!(field_matches("1,3,5", v), [1, 3, 5].contains(&v));
        }
    }

    #[test]
    fn test_literal_match() {
        assert!(field_matches("9", 9));
        assert!(!field_matches("9", 10));
    }

    #[test]
    fn test_malformed_field_fails_closed() {
        assert!(!field_matches("abc", 5));
        assert!(!field_matches("1,3-5", 4));
        assert!(!field_matches("5-", 5));
        assert!(!field_matches("*/x", 0));
    }

    #[test]
    fn test_cron_weekday_zero_is_sunday() {
        // 2024-01-07 was a Sunday.
        assert!(cron_matches("0 9 * * 0", at(2024, 1, 7, 9, 0)));
        assert!(!cron_matches("0 9 * * 0", at(2024, 1, 8, 9, 0)));
    }

    #[test]
    fn test_weekday_range_cron() {
        // 2024-01-10 was a Wednesday, 2024-01-13 a Saturday.
        let expr = "0 9 * * 1-5";
        assert!(cron_matches(expr, at(2024, 1, 10, 9, 0)));
        assert!(!cron_matches(expr, at(2024, 1, 13, 9, 0)));
        assert!(!cron_matches(expr, at(2024, 1, 10, 9, 1)));
    }

    #[test]
    fn test_all_five_fields_must_match() {
        assert!(cron_matches("30 14 20 1 *", at(2024, 1, 20, 14, 30)));
        assert!(!cron_matches("30 14 20 1 *", at(2024, 2, 20, 14, 30)));
    }

    #[test]
    fn test_malformed_cron_never_matches() {
        assert!(!cron_matches("0 9 * *", at(2024, 1, 10, 9, 0)));
        assert!(!cron_matches("", at(2024, 1, 10, 9, 0)));
    }

    #[test]
    fn test_validate_cron_field_count() {
        assert!(validate_cron("0 9 * * 1-5").is_ok());
        assert!(validate_cron("0 9 * *").is_err());
        assert!(validate_cron("0 9 * * * *").is_err());
    }

    #[test]
    fn test_parse_run_at_formats() {
        assert!(parse_run_at("2024-01-20T14:00:00Z").is_some());
        assert!(parse_run_at("2024-01-20T14:00:00+02:00").is_some());
        assert!(parse_run_at("2024-01-20T14:00:00").is_some());
        assert!(parse_run_at("not a time").is_none());

        // Missing offset means UTC.
        assert_eq!(
            parse_run_at("2024-01-20T14:00:00").unwrap(),
            parse_run_at("2024-01-20T14:00:00Z").unwrap()
        );
    }

    #[test]
    fn test_run_at_window_boundaries() {
        let now = at(2024, 1, 20, 14, 0);
        // Up to 60 minutes in the past stays due.
        assert!(run_at_matches("2024-01-20T13:00:00Z", now));
        assert!(!run_at_matches("2024-01-20T12:59:00Z", now));
        // Up to one minute early fires.
        assert!(run_at_matches("2024-01-20T14:01:00Z", now));
        assert!(!run_at_matches("2024-01-20T14:02:00Z", now));
    }

    #[test]
    fn test_run_at_malformed_fails_closed() {
        assert!(!run_at_matches("tomorrow-ish", at(2024, 1, 20, 14, 0)));
    }
}
