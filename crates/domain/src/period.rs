//! Time-range presets and custom ranges for overview filters.

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, Utc};
use warden_core::{AppError, AppResult};

use crate::{DateInput, DisplayTimezone, resolve_date};

/// Query format sent for range bounds.
pub const RANGE_QUERY_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Relative period picked from a preset list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePeriod {
    /// No bounds.
    AllTime,
    /// From the start of today to the end of today.
    Today,
    /// From the start of the day `n` days ago to the end of today.
    LastDays(u32),
}

impl TimePeriod {
    /// Returns the standard preset list.
    #[must_use]
    pub fn presets() -> &'static [Self] {
        const PRESETS: &[TimePeriod] = &[
            TimePeriod::Today,
            TimePeriod::LastDays(7),
            TimePeriod::LastDays(30),
            TimePeriod::AllTime,
        ];

        PRESETS
    }

    /// Resolves a preset value: `-1` is all time, `0` today, `n` the last `n` days.
    pub fn from_preset_value(value: i64) -> AppResult<Self> {
        match value {
            -1 => Ok(Self::AllTime),
            0 => Ok(Self::Today),
            days if days > 0 => u32::try_from(days)
                .map(Self::LastDays)
                .map_err(|_| AppError::Validation(format!("period of {days} days is too long"))),
            other => Err(AppError::Validation(format!(
                "invalid period value '{other}'"
            ))),
        }
    }

    /// Returns the preset value for this period.
    #[must_use]
    pub fn preset_value(&self) -> i64 {
        match self {
            Self::AllTime => -1,
            Self::Today => 0,
            Self::LastDays(days) => i64::from(*days),
        }
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::AllTime => "All time".to_owned(),
            Self::Today => "Today".to_owned(),
            Self::LastDays(days) => format!("Last {days} days"),
        }
    }

    /// Resolves the period against `now` in `timezone`. Each bound carries the
    /// offset in effect at that bound.
    ///
    /// Returns `None` for [`TimePeriod::AllTime`].
    pub fn resolve(
        &self,
        now: DateTime<Utc>,
        timezone: &DisplayTimezone,
    ) -> AppResult<Option<DateTimeRange>> {
        let days_back = match self {
            Self::AllTime => return Ok(None),
            Self::Today => 0,
            Self::LastDays(days) => *days,
        };

        let today = timezone.localize(now).date_naive();
        let first_day = today
            .checked_sub_days(Days::new(u64::from(days_back)))
            .ok_or_else(|| AppError::Validation("period starts before the calendar".to_owned()))?;

        let start = local_instant(timezone, first_day, NaiveTime::MIN)?;
        let end = NaiveTime::from_hms_opt(23, 59, 59)
            .ok_or_else(|| AppError::Internal("invalid end of day".to_owned()))
            .and_then(|end_of_day| local_instant(timezone, today, end_of_day))?;

        DateTimeRange::new(Some(start), Some(end)).map(Some)
    }

    /// Resolves the period against the current time in `timezone`.
    pub fn resolve_now(&self, timezone: &DisplayTimezone) -> AppResult<Option<DateTimeRange>> {
        self.resolve(Utc::now(), timezone)
    }
}

fn local_instant(
    timezone: &DisplayTimezone,
    date: NaiveDate,
    time: NaiveTime,
) -> AppResult<DateTime<FixedOffset>> {
    timezone
        .from_local(&date.and_time(time))
        .ok_or_else(|| AppError::Internal(format!("cannot place {date} {time} in {timezone}")))
}

/// Closed, ordered range of instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeRange {
    start: DateTime<FixedOffset>,
    end: DateTime<FixedOffset>,
}

impl DateTimeRange {
    /// Creates a range from picker input; both ends are required.
    pub fn new(
        start: Option<DateTime<FixedOffset>>,
        end: Option<DateTime<FixedOffset>>,
    ) -> AppResult<Self> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(AppError::Validation(
                "both start and end time are required".to_owned(),
            ));
        };

        if start > end {
            return Err(AppError::Validation(
                "start time must not be after end time".to_owned(),
            ));
        }

        Ok(Self { start, end })
    }

    /// Parses operator text such as `2024-01-01T09:30` in `timezone`.
    pub fn parse(start: &str, end: &str, timezone: &DisplayTimezone) -> AppResult<Self> {
        let parse_bound = |value: &str| -> AppResult<Option<DateTime<FixedOffset>>> {
            if value.trim().is_empty() {
                return Ok(None);
            }

            resolve_date(&DateInput::from(value), timezone)
                .map(Some)
                .ok_or_else(|| AppError::Validation(format!("invalid date '{value}'")))
        };

        Self::new(parse_bound(start)?, parse_bound(end)?)
    }

    /// Returns the inclusive start.
    #[must_use]
    pub fn start(&self) -> DateTime<FixedOffset> {
        self.start
    }

    /// Returns the inclusive end.
    #[must_use]
    pub fn end(&self) -> DateTime<FixedOffset> {
        self.end
    }

    /// Returns both bounds in [`RANGE_QUERY_FORMAT`].
    #[must_use]
    pub fn query_bounds(&self) -> (String, String) {
        (
            self.start.format(RANGE_QUERY_FORMAT).to_string(),
            self.end.format(RANGE_QUERY_FORMAT).to_string(),
        )
    }
}
