//! # Timing Calculator
//!
//! Count-up, countdown and anchored-period arithmetic for timing elements.
//!
//! ## Responsibilities
//! - **Deltas**: time since or until a target instant, clamped at zero.
//! - **Fixed periods**: remaining time in a period anchored at the moment the
//!   period was (re)configured. The anchor is owned by the caller.
//! - **Formatting**: unit decomposition (`1M 30S`) and `HH:MM:SS` output.

use crate::types::Timestamp;
use chrono::{NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};
use tracing::debug;

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
const MS_PER_YEAR: i64 = 365 * MS_PER_DAY;

/// How a timing element measures time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum TimingMode {
    /// Counts up from `target`.
    SuitableTime { target: Timestamp },
    /// Counts down to `target`.
    CountDown { target: Timestamp },
    /// Counts down a period that starts when it is first seen or changed.
    FixedTime {
        period_seconds: i64,
        /// Start a new period once the current one runs out.
        #[serde(default)]
        repeat: bool,
    },
}

/// Which units appear in formatted output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingFormat {
    pub years: bool,
    pub days: bool,
    pub hours: bool,
    pub minutes: bool,
    pub seconds: bool,
    pub milliseconds: bool,
}

impl Default for TimingFormat {
    fn default() -> Self {
        Self {
            years: false,
            days: true,
            hours: true,
            minutes: true,
            seconds: true,
            milliseconds: false,
        }
    }
}

impl TimingFormat {
    /// A format with every unit switched off.
    pub const fn none() -> Self {
        Self {
            years: false,
            days: false,
            hours: false,
            minutes: false,
            seconds: false,
            milliseconds: false,
        }
    }
}

/// Complete configuration of a timing element.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingSpec {
    #[serde(flatten)]
    pub mode: TimingMode,
    #[serde(default)]
    pub format: TimingFormat,
    /// Text shown before the value, e.g. "Opening in".
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
}

/// Start of the current fixed period for one timing element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingAnchor {
    pub period_seconds: i64,
    pub anchor_start: Timestamp,
}

/// Result of evaluating a timing element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimingReading {
    /// Count-up or countdown delta, never negative.
    Delta(TimeDelta),
    /// Time left in the anchored period, never negative.
    Remaining(TimeDelta),
}

/// Stateless timing arithmetic.
pub struct TimingCalculator;

impl TimingCalculator {
    /// `max(0, now - target)`.
    pub fn count_up(target: Timestamp, now: Timestamp) -> TimeDelta {
        (now - target).max(TimeDelta::zero())
    }

    /// `max(0, target - now)`.
    pub fn count_down(target: Timestamp, now: Timestamp) -> TimeDelta {
        (target - now).max(TimeDelta::zero())
    }

    /// Time left in a fixed period, re-anchoring at `now` when the period changed.
    pub fn fixed_remaining(
        period_seconds: i64,
        repeat: bool,
        now: Timestamp,
        anchor: &mut Option<TimingAnchor>,
    ) -> TimeDelta {
        let stale = anchor
            .as_ref()
            .map_or(true, |a| a.period_seconds != period_seconds);
        if stale {
            debug!(period_seconds, "timing period changed, re-anchoring");
            *anchor = Some(TimingAnchor {
                period_seconds,
                anchor_start: now,
            });
        }
        let Some(current) = anchor.as_mut() else {
            return TimeDelta::zero();
        };

        let period = TimeDelta::try_seconds(period_seconds.max(0)).unwrap_or(TimeDelta::MAX);
        let mut elapsed = (now - current.anchor_start).max(TimeDelta::zero());
        if repeat && period > TimeDelta::zero() && elapsed >= period {
            let period_ms = period.num_milliseconds();
            let periods = elapsed.num_milliseconds() / period_ms;
            let rolled = periods
                .checked_mul(period_ms)
                .and_then(TimeDelta::try_milliseconds)
                .and_then(|delta| current.anchor_start.checked_add_signed(delta));
            if let Some(anchor_start) = rolled {
                current.anchor_start = anchor_start;
                elapsed = (now - anchor_start).max(TimeDelta::zero());
                debug!(period_seconds, periods, "timing period rolled over");
            }
        }
        period
            .checked_sub(&elapsed)
            .unwrap_or_else(TimeDelta::zero)
            .max(TimeDelta::zero())
    }

    pub fn evaluate(
        spec: &TimingSpec,
        now: Timestamp,
        anchor: &mut Option<TimingAnchor>,
    ) -> TimingReading {
        match spec.mode {
            TimingMode::SuitableTime { target } => {
                TimingReading::Delta(Self::count_up(target, now))
            }
            TimingMode::CountDown { target } => {
                TimingReading::Delta(Self::count_down(target, now))
            }
            TimingMode::FixedTime {
                period_seconds,
                repeat,
            } => {
                let remaining = Self::fixed_remaining(period_seconds, repeat, now, anchor);
                TimingReading::Remaining(remaining)
            }
        }
    }

    /// Display text for a timing element, including prefix and suffix.
    pub fn render(spec: &TimingSpec, now: Timestamp, anchor: &mut Option<TimingAnchor>) -> String {
        let value = match Self::evaluate(spec, now, anchor) {
            TimingReading::Delta(delta) => format_delta(delta, &spec.format),
            TimingReading::Remaining(remaining) => format_hms(remaining),
        };
        [spec.prefix.trim(), value.as_str(), spec.suffix.trim()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Period length for a schedule given as a day offset plus a time of day.
///
/// Saturates instead of overflowing for absurd day offsets.
pub fn fixed_period_seconds(day_offset: i64, time_of_day: NaiveTime) -> i64 {
    day_offset
        .saturating_mul(86_400)
        .saturating_add(i64::from(time_of_day.num_seconds_from_midnight()))
}

/// Decomposes `delta` into the enabled units.
///
/// Units run years (365 days), days, hours, minutes, seconds, milliseconds.
/// A disabled unit folds into the next enabled smaller one, leading zero units
/// are omitted, and the smallest enabled unit is always shown. With every unit
/// disabled the result is `"0S"`.
pub fn format_delta(delta: TimeDelta, format: &TimingFormat) -> String {
    let units = [
        (format.years, MS_PER_YEAR, "Y"),
        (format.days, MS_PER_DAY, "D"),
        (format.hours, MS_PER_HOUR, "H"),
        (format.minutes, MS_PER_MINUTE, "M"),
        (format.seconds, MS_PER_SECOND, "S"),
        (format.milliseconds, 1, "MS"),
    ];
    let enabled: Vec<(i64, &str)> = units
        .iter()
        .filter(|(on, _, _)| *on)
        .map(|(_, ms, suffix)| (*ms, *suffix))
        .collect();
    if enabled.is_empty() {
        return "0S".to_string();
    }

    let mut remaining = delta.num_milliseconds().max(0);
    let mut parts = Vec::with_capacity(enabled.len());
    for (i, (unit_ms, suffix)) in enabled.iter().enumerate() {
        let value = remaining / unit_ms;
        remaining %= unit_ms;
        let is_last = i + 1 == enabled.len();
        if value == 0 && parts.is_empty() && !is_last {
            continue;
        }
        parts.push(format!("{value}{suffix}"));
    }
    parts.join(" ")
}

/// `HH:MM:SS` where hours may exceed 24.
pub fn format_hms(delta: TimeDelta) -> String {
    let total = delta.num_seconds().max(0);
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn minutes_seconds() -> TimingFormat {
        TimingFormat {
            minutes: true,
            seconds: true,
            ..TimingFormat::none()
        }
    }

    #[test]
    fn count_modes_clamp_at_zero() {
        let t = now();
        assert_eq!(TimingCalculator::count_up(t + TimeDelta::seconds(5), t), TimeDelta::zero());
        assert_eq!(TimingCalculator::count_up(t - TimeDelta::seconds(5), t), TimeDelta::seconds(5));
        assert_eq!(TimingCalculator::count_down(t - TimeDelta::seconds(5), t), TimeDelta::zero());
    }

    #[test]
    fn larger_disabled_units_fold_into_smaller() {
        let two_hours = TimeDelta::hours(2);
        assert_eq!(format_delta(two_hours, &minutes_seconds()), "120M 0S");
        let all = TimingFormat {
            years: true,
            milliseconds: true,
            ..TimingFormat::default()
        };
        let delta = TimeDelta::days(366) + TimeDelta::milliseconds(1_250);
        assert_eq!(format_delta(delta, &all), "1Y 1D 0H 0M 1S 250MS");
    }

    #[test]
    fn all_units_disabled_yields_zero_seconds() {
        assert_eq!(format_delta(TimeDelta::hours(5), &TimingFormat::none()), "0S");
    }

    #[test]
    fn hms_allows_more_than_a_day() {
        assert_eq!(format_hms(TimeDelta::seconds(26 * 3600 + 61)), "26:01:01");
        assert_eq!(format_hms(TimeDelta::seconds(-4)), "00:00:00");
    }

    #[test]
    fn fixed_period_reanchors_on_change() {
        let t = now();
        let mut anchor = None;
        let left = TimingCalculator::fixed_remaining(3600, false, t, &mut anchor);
        assert_eq!(left, TimeDelta::hours(1));

        let later = t + TimeDelta::minutes(10);
        let left = TimingCalculator::fixed_remaining(3600, false, later, &mut anchor);
        assert_eq!(left, TimeDelta::minutes(50));

        let left = TimingCalculator::fixed_remaining(7200, false, later, &mut anchor);
        assert_eq!(left, TimeDelta::hours(2));
        assert_eq!(anchor.unwrap().anchor_start, later);
    }

    #[test]
    fn fixed_period_clamps_or_repeats() {
        let t = now();
        let mut anchor = None;
        TimingCalculator::fixed_remaining(60, false, t, &mut anchor);
        let later = t + TimeDelta::seconds(90);
        let left = TimingCalculator::fixed_remaining(60, false, later, &mut anchor);
        assert_eq!(left, TimeDelta::zero());

        let mut anchor = None;
        TimingCalculator::fixed_remaining(60, true, t, &mut anchor);
        let later = t + TimeDelta::seconds(150);
        let left = TimingCalculator::fixed_remaining(60, true, later, &mut anchor);
        assert_eq!(left, TimeDelta::seconds(30));
        assert_eq!(anchor.unwrap().anchor_start, t + TimeDelta::seconds(120));
    }

    #[test]
    fn period_from_day_offset_and_time_of_day() {
        let time = NaiveTime::from_hms_opt(1, 30, 15).unwrap();
        assert_eq!(fixed_period_seconds(2, time), 2 * 86_400 + 5_415);
    }

    #[test]
    fn render_wraps_value_with_text() {
        let t = now();
        let spec = TimingSpec {
            mode: TimingMode::CountDown {
                target: t + TimeDelta::seconds(90),
            },
            format: minutes_seconds(),
            prefix: "Doors open in".into(),
            suffix: String::new(),
        };
        assert_eq!(TimingCalculator::render(&spec, t, &mut None), "Doors open in 1M 30S");
    }

    #[test]
    fn huge_periods_saturate() {
        let t = now();
        let huge = 10_000_000_000_000_000;
        for repeat in [false, true] {
            let spec = TimingSpec {
                mode: TimingMode::FixedTime {
                    period_seconds: huge,
                    repeat,
                },
                format: TimingFormat::default(),
                prefix: "Next".into(),
                suffix: String::new(),
            };
            let mut anchor = None;
            assert!(TimingCalculator::render(&spec, t, &mut anchor).starts_with("Next "));

            let later = t + TimeDelta::days(400);
            let left = TimingCalculator::fixed_remaining(huge, repeat, later, &mut anchor);
            assert_eq!(left, TimeDelta::MAX - TimeDelta::days(400));
            assert_eq!(anchor.unwrap().anchor_start, t);
        }

        let left = TimingCalculator::fixed_remaining(i64::MAX, true, t, &mut None);
        assert_eq!(left, TimeDelta::MAX);
    }

    #[test]
    fn period_helper_saturates() {
        let midnight = NaiveTime::from_hms_opt(0, 0, 1).unwrap();
        assert_eq!(fixed_period_seconds(i64::MAX / 2, midnight), i64::MAX);
    }
}
