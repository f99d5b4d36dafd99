// Period Generator - Time Bucketing for Growth Analytics
// Converts a date range plus a granularity into contiguous, non-overlapping
// buckets, or subdivides one range into N equal intervals for velocity
// estimation. Buckets use fixed step durations (a "month" is a fixed 30-day
// window, not a calendar month).

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{AnalyticsError, AnalyticsResult};

/// One aggregation bucket. Invariant: `start < end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Period {
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Bucket step size for calendar-mode generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn step(&self) -> Duration {
        match self {
            Granularity::Hourly => Duration::hours(1),
            Granularity::Daily => Duration::days(1),
            Granularity::Weekly => Duration::days(7),
            Granularity::Monthly => Duration::days(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hourly => "hourly",
            Granularity::Daily => "daily",
            Granularity::Weekly => "weekly",
            Granularity::Monthly => "monthly",
        }
    }

    fn label_for(&self, start: DateTime<Utc>) -> String {
        match self {
            Granularity::Hourly => start.format("%Y-%m-%d %H:00").to_string(),
            Granularity::Daily => start.format("%Y-%m-%d").to_string(),
            Granularity::Weekly => format!("week of {}", start.format("%Y-%m-%d")),
            Granularity::Monthly => format!("30d from {}", start.format("%Y-%m-%d")),
        }
    }
}

/// Caller-facing lookback windows, each anchored at "now"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PeriodType {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    AllTime,
}

impl PeriodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodType::Hourly => "hourly",
            PeriodType::Daily => "daily",
            PeriodType::Weekly => "weekly",
            PeriodType::Monthly => "monthly",
            PeriodType::Yearly => "yearly",
            PeriodType::AllTime => "all-time",
        }
    }

    pub fn from_str(s: &str) -> Option<PeriodType> {
        match s {
            "hourly" => Some(PeriodType::Hourly),
            "daily" => Some(PeriodType::Daily),
            "weekly" => Some(PeriodType::Weekly),
            "monthly" => Some(PeriodType::Monthly),
            "yearly" => Some(PeriodType::Yearly),
            "all-time" => Some(PeriodType::AllTime),
            _ => None,
        }
    }

    /// The `(start, end)` window this period type covers, anchored at `now`.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            PeriodType::Hourly => now - Duration::hours(1),
            PeriodType::Daily => now - Duration::hours(24),
            PeriodType::Weekly => now - Duration::days(7),
            PeriodType::Monthly => now - Duration::days(30),
            PeriodType::Yearly => now - Duration::days(365),
            PeriodType::AllTime => platform_epoch(),
        };
        (start, now)
    }

    /// The equal-length window immediately before `window(now)`, used for
    /// current-vs-prior growth. For all-time the prior window is empty and
    /// callers treat previous totals as zero.
    pub fn previous_window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let (start, end) = self.window(now);
        let len = end - start;
        match self {
            PeriodType::AllTime => (start, start),
            _ => (start - len, start),
        }
    }
}

/// Launch of the platform (2020-01-01T00:00:00Z); lower bound for
/// all-time windows.
pub fn platform_epoch() -> DateTime<Utc> {
    Utc.timestamp_opt(1_577_836_800, 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Lazily walks `start..end` in granularity steps, clipping the final
/// bucket to `end`. Deterministic for identical inputs.
pub struct CalendarPeriods {
    cursor: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Granularity,
}

impl Iterator for CalendarPeriods {
    type Item = Period;

    fn next(&mut self) -> Option<Period> {
        if self.cursor >= self.end {
            return None;
        }
        let start = self.cursor;
        let mut bucket_end = start + self.granularity.step();
        if bucket_end > self.end {
            bucket_end = self.end;
        }
        self.cursor = bucket_end;
        Some(Period {
            label: self.granularity.label_for(start),
            start,
            end: bucket_end,
        })
    }
}

pub struct PeriodGenerator;

impl PeriodGenerator {
    /// Calendar mode as a lazy, restartable iterator.
    pub fn calendar_iter(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> AnalyticsResult<CalendarPeriods> {
        if start >= end {
            return Err(AnalyticsError::invalid_range(format!(
                "start ({}) must be before end ({})",
                start, end
            )));
        }
        Ok(CalendarPeriods {
            cursor: start,
            end,
            granularity,
        })
    }

    /// Calendar mode, collected. Output is non-empty, ordered, contiguous,
    /// and the last period's `end` equals the requested `end`.
    pub fn calendar(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> AnalyticsResult<Vec<Period>> {
        Ok(Self::calendar_iter(start, end, granularity)?.collect())
    }

    /// Equal-subdivision mode: exactly `interval_count` equal-length buckets
    /// covering `start..end`. Millisecond remainders land in the final
    /// bucket so coverage stays exact.
    pub fn equal_subdivision(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        interval_count: usize,
    ) -> AnalyticsResult<Vec<Period>> {
        if start >= end {
            return Err(AnalyticsError::invalid_range(format!(
                "start ({}) must be before end ({})",
                start, end
            )));
        }
        if interval_count == 0 {
            return Err(AnalyticsError::invalid_range(
                "interval_count must be at least 1",
            ));
        }

        let total_ms = (end - start).num_milliseconds();
        let step_ms = total_ms / interval_count as i64;
        if step_ms == 0 {
            return Err(AnalyticsError::invalid_range(format!(
                "range too small to split into {} intervals",
                interval_count
            )));
        }

        let mut periods = Vec::with_capacity(interval_count);
        for i in 0..interval_count {
            let bucket_start = start + Duration::milliseconds(step_ms * i as i64);
            let bucket_end = if i == interval_count - 1 {
                end
            } else {
                start + Duration::milliseconds(step_ms * (i + 1) as i64)
            };
            periods.push(Period {
                label: format!("interval {}", i + 1),
                start: bucket_start,
                end: bucket_end,
            });
        }
        Ok(periods)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_calendar_daily_buckets_are_contiguous() {
        let start = ts(2024, 3, 1, 0);
        let end = ts(2024, 3, 5, 0);
        let periods = PeriodGenerator::calendar(start, end, Granularity::Daily).unwrap();

        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].start, start);
        assert_eq!(periods.last().unwrap().end, end);
        for pair in periods.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
            assert!(pair[0].start < pair[0].end);
        }
    }

    #[test]
    fn test_calendar_clips_final_bucket() {
        let start = ts(2024, 3, 1, 0);
        let end = ts(2024, 3, 3, 12); // 2.5 days
        let periods = PeriodGenerator::calendar(start, end, Granularity::Daily).unwrap();

        assert_eq!(periods.len(), 3);
        assert_eq!(periods[2].duration(), Duration::hours(12));
        assert_eq!(periods[2].end, end);
    }

    #[test]
    fn test_calendar_rejects_inverted_range() {
        let err = PeriodGenerator::calendar(ts(2024, 3, 5, 0), ts(2024, 3, 1, 0), Granularity::Daily)
            .unwrap_err();
        assert_eq!(err.kind, crate::utils::ErrorKind::InvalidRange);
    }

    #[test]
    fn test_calendar_iter_is_restartable() {
        let start = ts(2024, 3, 1, 0);
        let end = ts(2024, 3, 4, 0);
        let first: Vec<Period> =
            PeriodGenerator::calendar_iter(start, end, Granularity::Daily).unwrap().collect();
        let second: Vec<Period> =
            PeriodGenerator::calendar_iter(start, end, Granularity::Daily).unwrap().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_equal_subdivision_covers_range_exactly() {
        let start = ts(2024, 3, 1, 0);
        let end = ts(2024, 3, 2, 0);
        let periods = PeriodGenerator::equal_subdivision(start, end, 4).unwrap();

        assert_eq!(periods.len(), 4);
        assert_eq!(periods[0].start, start);
        assert_eq!(periods[3].end, end);
        assert_eq!(periods[0].duration(), Duration::hours(6));
        for pair in periods.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_equal_subdivision_rejects_zero_intervals() {
        let err =
            PeriodGenerator::equal_subdivision(ts(2024, 3, 1, 0), ts(2024, 3, 2, 0), 0).unwrap_err();
        assert_eq!(err.kind, crate::utils::ErrorKind::InvalidRange);
    }

    #[test]
    fn test_monthly_step_is_fixed_thirty_days() {
        assert_eq!(Granularity::Monthly.step(), Duration::days(30));
    }

    #[test]
    fn test_period_type_round_trip() {
        for pt in [
            PeriodType::Hourly,
            PeriodType::Daily,
            PeriodType::Weekly,
            PeriodType::Monthly,
            PeriodType::Yearly,
            PeriodType::AllTime,
        ] {
            assert_eq!(PeriodType::from_str(pt.as_str()), Some(pt));
        }
        assert_eq!(PeriodType::from_str("fortnightly"), None);
    }

    #[test]
    fn test_period_type_windows() {
        let now = ts(2024, 6, 15, 12);
        let (start, end) = PeriodType::Weekly.window(now);
        assert_eq!(end, now);
        assert_eq!(end - start, Duration::days(7));

        let (prev_start, prev_end) = PeriodType::Weekly.previous_window(now);
        assert_eq!(prev_end, start);
        assert_eq!(prev_end - prev_start, Duration::days(7));

        let (epoch_start, _) = PeriodType::AllTime.window(now);
        assert_eq!(epoch_start, platform_epoch());
    }
}
