use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::constants::{DEFAULT_DELIVERY_TIMEZONE, DELIVERY_HOUR};
use crate::preferences::Frequency;

/// Time between two deliveries for a frequency.
pub fn delivery_interval(frequency: Frequency) -> Duration {
    match frequency {
        Frequency::Daily => Duration::days(1),
        Frequency::Weekly => Duration::days(7),
        // Twice a week, not every two weeks.
        Frequency::Biweekly => Duration::days(3),
    }
}

/// Next fire time for `frequency`, using the UTC delivery hour.
pub fn compute_next_fire(frequency: Frequency, now: DateTime<Utc>) -> DateTime<Utc> {
    ScheduleCalculator::default().next_fire(frequency, now)
}

/// Same as [`compute_next_fire`] for an unparsed frequency. Unknown values
/// use the weekly interval.
pub fn compute_next_fire_lenient(raw_frequency: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    compute_next_fire(Frequency::parse_lenient(raw_frequency), now)
}

/// Turns a frequency and a reference instant into the next delivery time.
///
/// The result is `now + interval`, moved to the delivery hour (09:00:00.000)
/// of that day in the calculator's reference time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleCalculator {
    timezone: Tz,
}

impl Default for ScheduleCalculator {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_DELIVERY_TIMEZONE,
        }
    }
}

impl ScheduleCalculator {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn next_fire(&self, frequency: Frequency, now: DateTime<Utc>) -> DateTime<Utc> {
        let target = now + delivery_interval(frequency);
        let target_date = target.with_timezone(&self.timezone).date_naive();
        self.at_delivery_hour(target_date)
    }

    fn at_delivery_hour(&self, date: NaiveDate) -> DateTime<Utc> {
        let naive = date
            .and_hms_opt(DELIVERY_HOUR, 0, 0)
            .unwrap_or_else(|| date.and_time(NaiveTime::MIN));

        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(local) => local.with_timezone(&Utc),
            LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
            // Skipped by a DST jump: the first valid local instant after the gap.
            LocalResult::None => self
                .timezone
                .from_local_datetime(&(naive + Duration::hours(1)))
                .earliest()
                .map(|local| local.with_timezone(&Utc))
                .unwrap_or_else(|| Utc.from_utc_datetime(&naive)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use proptest::prelude::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_weekly_scenario() {
        let now = utc(2024, 1, 1, 10, 0, 0);
        assert_eq!(
            compute_next_fire(Frequency::Weekly, now),
            utc(2024, 1, 8, 9, 0, 0)
        );
    }

    #[test]
    fn test_daily_adds_one_day_then_clamps() {
        let early = utc(2024, 3, 10, 6, 15, 0);
        assert_eq!(
            compute_next_fire(Frequency::Daily, early),
            utc(2024, 3, 11, 9, 0, 0)
        );

        let late = utc(2024, 3, 10, 23, 59, 59);
        assert_eq!(
            compute_next_fire(Frequency::Daily, late),
            utc(2024, 3, 11, 9, 0, 0)
        );
    }

    #[test]
    fn test_biweekly_uses_three_day_interval() {
        let now = utc(2024, 1, 1, 10, 0, 0);
        assert_eq!(
            compute_next_fire(Frequency::Biweekly, now),
            utc(2024, 1, 4, 9, 0, 0)
        );
    }

    #[test]
    fn test_interval_crosses_month_and_year() {
        assert_eq!(
            compute_next_fire(Frequency::Weekly, utc(2023, 12, 28, 12, 0, 0)),
            utc(2024, 1, 4, 9, 0, 0)
        );
        assert_eq!(
            compute_next_fire(Frequency::Biweekly, utc(2024, 2, 27, 8, 0, 0)),
            utc(2024, 3, 1, 9, 0, 0)
        );
    }

    #[test]
    fn test_unknown_frequency_falls_back_to_weekly() {
        let now = utc(2024, 5, 17, 17, 45, 12);
        for raw in ["monthly", "", "WEEKLY", "hourly"] {
            assert_eq!(
                compute_next_fire_lenient(raw, now),
                compute_next_fire(Frequency::Weekly, now),
                "fallback for {raw:?}"
            );
        }
        assert_eq!(
            compute_next_fire_lenient("daily", now),
            compute_next_fire(Frequency::Daily, now)
        );
    }

    #[test]
    fn test_reference_timezone_shifts_delivery_hour() {
        let calculator = ScheduleCalculator::new(chrono_tz::America::New_York);
        let now = utc(2024, 1, 1, 10, 0, 0);
        // 09:00 EST is 14:00 UTC.
        assert_eq!(
            calculator.next_fire(Frequency::Weekly, now),
            utc(2024, 1, 8, 14, 0, 0)
        );

        // Summer time: 09:00 EDT is 13:00 UTC.
        let summer = utc(2024, 7, 1, 10, 0, 0);
        assert_eq!(
            calculator.next_fire(Frequency::Daily, summer),
            utc(2024, 7, 2, 13, 0, 0)
        );
    }

    #[test]
    fn test_clamp_uses_local_date_of_target() {
        // 2024-01-01 20:00 UTC is already 2024-01-02 in Tokyo.
        let calculator = ScheduleCalculator::new(chrono_tz::Asia::Tokyo);
        let now = utc(2024, 1, 1, 20, 0, 0);
        // Target is 2024-01-03 05:00 JST, delivered 2024-01-03 09:00 JST = 00:00 UTC.
        assert_eq!(
            calculator.next_fire(Frequency::Daily, now),
            utc(2024, 1, 3, 0, 0, 0)
        );
    }

    proptest! {
        #[test]
        fn prop_fire_time_is_normalized_to_delivery_hour(
            secs in 0i64..4_000_000_000i64,
            nanos in 0u32..1_000_000_000u32,
            which in 0usize..3,
        ) {
            let now = Utc.timestamp_opt(secs, nanos).unwrap();
            let frequency = Frequency::ALL[which];
            let fire = compute_next_fire(frequency, now);

            prop_assert_eq!(fire.hour(), DELIVERY_HOUR);
            prop_assert_eq!(fire.minute(), 0);
            prop_assert_eq!(fire.second(), 0);
            prop_assert_eq!(fire.nanosecond(), 0);
            prop_assert!(fire > now);
            prop_assert_eq!(
                fire.date_naive(),
                (now + delivery_interval(frequency)).date_naive()
            );
        }
    }
}
