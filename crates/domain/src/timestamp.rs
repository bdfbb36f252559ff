//! Display formatting for server timestamps.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use warden_core::AppError;

/// Numbers above this are read as Unix milliseconds instead of seconds.
pub const MILLISECOND_THRESHOLD: i64 = 1_000_000_000_000;

/// Placeholder rendered for missing or unparseable timestamps.
pub const EMPTY_DATE: &str = "-";

/// Raw timestamp value as received from the server or an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// Unix time in seconds, or milliseconds above [`MILLISECOND_THRESHOLD`].
    Unix(i64),
    /// RFC 3339 or one of the naive `YYYY-MM-DD[ HH:MM]` shapes.
    Text(String),
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        Self::Unix(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Timezone used to render dates: a fixed UTC offset or an IANA zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTimezone {
    /// Fixed offset such as `+08:00`.
    Fixed(FixedOffset),
    /// IANA zone such as `Asia/Shanghai`, with its daylight-saving rules.
    Named(Tz),
}

impl DisplayTimezone {
    /// UTC.
    #[must_use]
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// Creates a timezone from a fixed offset.
    #[must_use]
    pub fn from_offset(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }

    /// Returns the UTC offset in effect at `instant`.
    #[must_use]
    pub fn offset_at(&self, instant: DateTime<Utc>) -> FixedOffset {
        match self {
            Self::Fixed(offset) => *offset,
            Self::Named(zone) => zone.offset_from_utc_datetime(&instant.naive_utc()).fix(),
        }
    }

    /// Converts an instant to wall-clock time in this timezone.
    #[must_use]
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.offset_at(instant))
    }

    /// Places a wall-clock time in this timezone.
    ///
    /// Times skipped by a daylight-saving jump resolve to `None`; repeated
    /// times resolve to the earlier instant.
    #[must_use]
    pub fn from_local(&self, local: &NaiveDateTime) -> Option<DateTime<FixedOffset>> {
        match self {
            Self::Fixed(offset) => offset.from_local_datetime(local).single(),
            Self::Named(zone) => zone
                .from_local_datetime(local)
                .earliest()
                .map(|instant| instant.fixed_offset()),
        }
    }

    /// Picks the timezone logs are rendered in.
    ///
    /// A configured system log timezone applies to every viewer; otherwise the
    /// viewer's own timezone is used, then UTC.
    #[must_use]
    pub fn effective(log_timezone: Option<Self>, user_timezone: Option<Self>) -> Self {
        log_timezone.or(user_timezone).unwrap_or_else(Self::utc)
    }
}

impl Default for DisplayTimezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for DisplayTimezone {
    type Err = AppError;

    /// Parses `UTC`, `Z`, `+08:00`, `-0530`, `+8` or an IANA name such as
    /// `America/New_York`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(Self::utc());
        }

        if trimmed.starts_with(['+', '-']) {
            return parse_offset(trimmed)
                .map(Self::Fixed)
                .ok_or_else(|| AppError::Validation(format!("invalid timezone offset '{value}'")));
        }

        trimmed
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| AppError::Validation(format!("unknown timezone '{value}'")))
    }
}

impl std::fmt::Display for DisplayTimezone {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(offset) => write!(formatter, "{offset}"),
            Self::Named(zone) => formatter.write_str(zone.name()),
        }
    }
}

fn parse_offset(value: &str) -> Option<FixedOffset> {
    let (sign, digits) = match value.split_at_checked(1)? {
        ("+", rest) => (1, rest),
        ("-", rest) => (-1, rest),
        _ => return None,
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours, minutes),
        None if digits.len() == 4 => digits.split_at(2),
        None => (digits, "0"),
    };

    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Formats a timestamp as `YYYY-MM-DD`, or `-` when absent or invalid.
#[must_use]
pub fn format_date(input: Option<&DateInput>, timezone: &DisplayTimezone) -> String {
    format_with(input, timezone, "%Y-%m-%d")
}

/// Formats a timestamp as `YYYY-MM-DD HH:mm`, or `-` when absent or invalid.
#[must_use]
pub fn format_date_time(input: Option<&DateInput>, timezone: &DisplayTimezone) -> String {
    format_with(input, timezone, "%Y-%m-%d %H:%M")
}

/// Resolves a timestamp to an instant in the display timezone.
#[must_use]
pub fn resolve_date(
    input: &DateInput,
    timezone: &DisplayTimezone,
) -> Option<DateTime<FixedOffset>> {
    match input {
        DateInput::Unix(value) if *value > MILLISECOND_THRESHOLD => {
            DateTime::from_timestamp_millis(*value).map(|instant| timezone.localize(instant))
        }
        DateInput::Unix(value) => {
            DateTime::from_timestamp(*value, 0).map(|instant| timezone.localize(instant))
        }
        DateInput::Text(value) => parse_text(value.trim(), timezone),
    }
}

fn format_with(input: Option<&DateInput>, timezone: &DisplayTimezone, pattern: &str) -> String {
    input
        .and_then(|input| resolve_date(input, timezone))
        .map_or_else(
            || EMPTY_DATE.to_owned(),
            |instant| instant.format(pattern).to_string(),
        )
}

fn parse_text(value: &str, timezone: &DisplayTimezone) -> Option<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(timezone.localize(instant.with_timezone(&Utc)));
    }

    // Naive shapes are wall-clock times in the display timezone.
    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|pattern| NaiveDateTime::parse_from_str(value, pattern).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })?;

    timezone.from_local(&naive)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn tz(value: &str) -> DisplayTimezone {
        value.parse().unwrap_or_else(|_| panic!("test"))
    }

    #[test]
    fn missing_value_renders_placeholder() {
        assert_eq!(format_date(None, &DisplayTimezone::utc()), "-");
        assert_eq!(
            format_date(Some(&DateInput::from("not a date")), &DisplayTimezone::utc()),
            "-"
        );
    }

    #[test]
    fn seconds_and_milliseconds_render_the_same_date() {
        let utc = DisplayTimezone::utc();
        assert_eq!(
            format_date(Some(&DateInput::Unix(1_704_067_200)), &utc),
            "2024-01-01"
        );
        assert_eq!(
            format_date(Some(&DateInput::Unix(1_704_067_200_000)), &utc),
            "2024-01-01"
        );
    }

    #[test]
    fn date_time_uses_display_offset() {
        let input = DateInput::from("2024-01-01T00:00:00Z");
        assert_eq!(format_date_time(Some(&input), &tz("+08:00")), "2024-01-01 08:00");
        assert_eq!(format_date(Some(&input), &tz("-05:00")), "2023-12-31");
    }

    #[test]
    fn log_timezone_overrides_user_timezone() {
        let effective = DisplayTimezone::effective(Some(tz("+09:00")), Some(tz("-03:00")));
        assert_eq!(effective, tz("+09:00"));
        assert_eq!(
            DisplayTimezone::effective(None, Some(tz("-03:00"))),
            tz("-03:00")
        );
        assert_eq!(DisplayTimezone::effective(None, None), DisplayTimezone::utc());
    }

    #[test]
    fn timezone_parsing_accepts_common_shapes() {
        let epoch = DateTime::<Utc>::UNIX_EPOCH;

        assert_eq!(tz("UTC"), DisplayTimezone::utc());
        assert_eq!(tz("+0530").offset_at(epoch).local_minus_utc(), 19_800);
        assert_eq!(tz("-8").offset_at(epoch).local_minus_utc(), -28_800);
        assert_eq!(tz("Asia/Tokyo").offset_at(epoch).local_minus_utc(), 32_400);
        assert_eq!(tz("Asia/Shanghai").to_string(), "Asia/Shanghai");
        assert!("+25:00".parse::<DisplayTimezone>().is_err());
        assert!("Mars/Olympus_Mons".parse::<DisplayTimezone>().is_err());
    }

    #[test]
    fn named_zones_follow_daylight_saving() {
        let new_york = tz("America/New_York");
        let winter = DateInput::from("2024-01-15T12:00:00Z");
        let summer = DateInput::from("2024-07-15T12:00:00Z");

        assert_eq!(format_date_time(Some(&winter), &new_york), "2024-01-15 07:00");
        assert_eq!(format_date_time(Some(&summer), &new_york), "2024-07-15 08:00");
        assert_eq!(
            format_date_time(Some(&summer), &tz("Asia/Shanghai")),
            "2024-07-15 20:00"
        );
    }

    #[test]
    fn naive_text_in_named_zone_uses_local_rules() {
        let new_york = tz("America/New_York");
        let placed = resolve_date(&DateInput::from("2024-07-01 09:30"), &new_york)
            .unwrap_or_else(|| panic!("test"));

        assert_eq!(placed.offset().local_minus_utc(), -4 * 3600);
        assert!(resolve_date(&DateInput::from("2024-03-10 02:30"), &new_york).is_none());
    }

    proptest! {
        #[test]
        fn formatting_a_formatted_date_is_stable(seconds in 0_i64..4_000_000_000, offset_hours in -12_i32..=14) {
            let timezone = DisplayTimezone::from_offset(
                FixedOffset::east_opt(offset_hours * 3600).unwrap_or_else(|| panic!("test")),
            );
            let once = format_date(Some(&DateInput::Unix(seconds)), &timezone);
            let twice = format_date(Some(&DateInput::Text(once.clone())), &timezone);
            prop_assert_eq!(&once, &twice);

            let with_time = format_date_time(Some(&DateInput::Unix(seconds)), &timezone);
            let reparsed = format_date_time(Some(&DateInput::Text(with_time.clone())), &timezone);
            prop_assert_eq!(with_time, reparsed);
        }

        #[test]
        fn milliseconds_match_seconds(seconds in 1_000_000_001_i64..4_000_000_000) {
            let utc = DisplayTimezone::utc();
            prop_assert_eq!(
                format_date(Some(&DateInput::Unix(seconds)), &utc),
                format_date(Some(&DateInput::Unix(seconds * 1000)), &utc)
            );
        }
    }
}
