//! Per-column value providers for the warehouse tables.
//!
//! Names, versions, links and changelogs are derived from the row id and
//! carry no randomness. Enumeration picks and timestamps draw from the
//! caller's RNG, so a fixed seed and base time reproduce a dataset exactly.

use std::borrow::Cow;

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use rand::Rng;

use crate::generate::value::Value;

const SECONDS_PER_DAY: i64 = 24 * 3600;

/// Days in one lookback year.
pub const DAYS_PER_YEAR: i64 = 365;

/// Wrap a dynamically generated String into a Value::String.
#[inline]
fn owned(s: String) -> Value {
    Value::String(Cow::Owned(s))
}

/// Pick one entry uniformly from a fixed enumeration.
pub fn pick(values: &'static [&'static str], rng: &mut impl Rng) -> Value {
    Value::String(Cow::Borrowed(values[rng.random_range(0..values.len())]))
}

/// A timestamp `days` days and `seconds` seconds before `base_time`, with
/// `days` uniform in `[0, years_back * 365]` and `seconds` in `[0, 86400)`.
pub fn random_datetime_within_years(
    rng: &mut impl Rng,
    base_time: NaiveDateTime,
    years_back: u32,
) -> NaiveDateTime {
    let days = rng.random_range(0..=i64::from(years_back) * DAYS_PER_YEAR);
    let seconds = rng.random_range(0..SECONDS_PER_DAY);
    base_time - ChronoDuration::days(days) - ChronoDuration::seconds(seconds)
}

/// Earliest timestamp `random_datetime_within_years` can return.
pub fn window_start(base_time: NaiveDateTime, years_back: u32) -> NaiveDateTime {
    base_time
        - ChronoDuration::days(i64::from(years_back) * DAYS_PER_YEAR)
        - ChronoDuration::seconds(SECONDS_PER_DAY - 1)
}

pub fn login(user_id: i64) -> Value {
    owned(format!("user{}", user_id))
}

pub fn full_name(user_id: i64) -> Value {
    owned(format!("User {}", user_id))
}

/// `v{1 + id % 5}.{id % 10}.{id % 20}`
pub fn version(build_id: i64) -> Value {
    owned(format!(
        "v{}.{}.{}",
        1 + build_id % 5,
        build_id % 10,
        build_id % 20
    ))
}

pub fn link(build_id: i64) -> Value {
    owned(format!("https://repo.example.com/builds/{}", build_id))
}

pub fn changelog(build_id: i64) -> Value {
    owned(format!("Auto-generated changelog for build {}", build_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::warehouse::{ROLES, STATUSES};
    use rand::SeedableRng;

    fn test_base_time() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_derived_strings() {
        assert_eq!(login(7).to_string(), "user7");
        assert_eq!(full_name(7).to_string(), "User 7");
        assert_eq!(link(12).to_string(), "https://repo.example.com/builds/12");
        assert_eq!(
            changelog(12).to_string(),
            "Auto-generated changelog for build 12"
        );
    }

    #[test]
    fn test_version_is_modular() {
        assert_eq!(version(1).to_string(), "v2.1.1");
        assert_eq!(version(5).to_string(), "v1.5.5");
        assert_eq!(version(23).to_string(), "v4.3.3");
        assert_eq!(version(300).to_string(), "v1.0.0");
    }

    #[test]
    fn test_pick_stays_in_enumeration() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let value = pick(ROLES, &mut rng);
            assert!(ROLES.contains(&value.as_string().unwrap()));
        }
    }

    #[test]
    fn test_pick_reaches_every_status() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..300 {
            seen.insert(pick(STATUSES, &mut rng).to_string());
        }
        assert_eq!(seen.len(), STATUSES.len());
    }

    #[test]
    fn test_random_datetime_within_window() {
        let base = test_base_time();
        let mut rng = rand::rngs::StdRng::seed_from_u64(99);
        let start = window_start(base, 2);

        for _ in 0..1000 {
            let ts = random_datetime_within_years(&mut rng, base, 2);
            assert!(ts <= base, "{} is after {}", ts, base);
            assert!(ts >= start, "{} is before {}", ts, start);
        }
    }

    #[test]
    fn test_zero_years_back_stays_within_one_day() {
        let base = test_base_time();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let ts = random_datetime_within_years(&mut rng, base, 0);
            assert!(base - ts < ChronoDuration::days(1));
        }
    }

    #[test]
    fn test_temporal_determinism() {
        let bt = test_base_time();
        let mut rng1 = rand::rngs::StdRng::seed_from_u64(99);
        let mut rng2 = rand::rngs::StdRng::seed_from_u64(99);

        assert_eq!(
            random_datetime_within_years(&mut rng1, bt, 5),
            random_datetime_within_years(&mut rng2, bt, 5),
            "Same seed + same base_time must produce identical timestamps"
        );
    }
}
