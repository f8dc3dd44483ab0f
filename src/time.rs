//! Time and Timezone Utilities Module
//!
//! Clock-time parsing, minute rounding, and resolution of the zone prayer
//! times are reported in.

use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use log::warn;
use serde::{Deserialize, Serialize};
use tzf_rs::DefaultFinder;

use crate::error::PrayerError;
use crate::geo::Coordinates;

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

const MILLIS_PER_MINUTE: i64 = 60_000;

// ===================== TIME PARSING =====================

/// Parse a wall-clock time in HH:MM or HH:MM:SS format.
///
/// # Returns
/// The parsed time, or `None` if the string is not a valid clock time
pub fn parse_clock_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    ["%H:%M:%S", "%H:%M"].into_iter().find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

// ===================== ROUNDING =====================

/// How instants are snapped to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rounding {
    /// 30 seconds or more rounds up, anything less rounds down
    #[default]
    Nearest,
    /// Any seconds round up to the next minute
    Up,
}

/// Snap an instant to a whole minute.
///
/// Operates on the absolute instant, so the result does not depend on any
/// time zone.
pub fn round_to_minute(t: DateTime<Utc>, rounding: Rounding) -> DateTime<Utc> {
    let millis = t.timestamp_millis();
    let remainder = millis.rem_euclid(MILLIS_PER_MINUTE);
    let snapped = match rounding {
        Rounding::Nearest if remainder >= MILLIS_PER_MINUTE / 2 => {
            millis - remainder + MILLIS_PER_MINUTE
        }
        Rounding::Nearest => millis - remainder,
        Rounding::Up if remainder > 0 => millis - remainder + MILLIS_PER_MINUTE,
        Rounding::Up => millis,
    };
    DateTime::from_timestamp_millis(snapped).unwrap_or(t)
}

// ===================== TIMEZONE UTILITIES =====================

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    match get_timezone() {
        Ok(name) => name.parse().unwrap_or_else(|_| {
            warn!("Unknown system time zone {:?}, using UTC", name);
            Tz::UTC
        }),
        Err(err) => {
            warn!("Could not determine system time zone ({}), using UTC", err);
            Tz::UTC
        }
    }
}

/// Resolve timezone from geographic coordinates.
///
/// # Returns
/// The resolved timezone, or UTC if resolution fails
pub fn resolve_timezone(lon: f64, lat: f64) -> Tz {
    let name = TZF_FINDER.get_or_init(DefaultFinder::new).get_tz_name(lon, lat);
    // chrono-tz carries the zone's full offset history, tzf only the polygon
    name.parse::<Tz>().unwrap_or_else(|_| {
        warn!("No time zone data for {:?} at lon={}, lat={}, using UTC", name, lon, lat);
        Tz::UTC
    })
}

// ===================== OUTPUT ZONE =====================

/// Zone in which computed instants are expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputZone {
    /// The host machine's local zone
    #[default]
    System,
    /// The zone containing the observer's coordinates
    Location,
    /// A named IANA zone
    Named(Tz),
    Utc,
    /// UTC shifted by a fixed offset, ignoring any zone rules
    Fixed(FixedOffset),
}

impl OutputZone {
    /// Express a UTC instant in this zone.
    pub fn convert(&self, t: DateTime<Utc>, coordinates: &Coordinates) -> DateTime<FixedOffset> {
        match self {
            OutputZone::System => t.with_timezone(&system_timezone()).fixed_offset(),
            OutputZone::Location => t
                .with_timezone(&resolve_timezone(coordinates.longitude, coordinates.latitude))
                .fixed_offset(),
            OutputZone::Named(tz) => t.with_timezone(tz).fixed_offset(),
            OutputZone::Utc => t.fixed_offset(),
            OutputZone::Fixed(offset) => offset.from_utc_datetime(&t.naive_utc()),
        }
    }
}

impl FromStr for OutputZone {
    type Err = PrayerError;

    /// Accepts "system", "location", "utc", an IANA name or a `+HH:MM` offset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "system" => Ok(OutputZone::System),
            "location" => Ok(OutputZone::Location),
            "utc" | "UTC" => Ok(OutputZone::Utc),
            other if other.starts_with('+') || other.starts_with('-') => other
                .parse::<FixedOffset>()
                .map(OutputZone::Fixed)
                .map_err(|_| PrayerError::InvalidTimezone(other.to_string())),
            other => other
                .parse::<Tz>()
                .map(OutputZone::Named)
                .map_err(|_| PrayerError::InvalidTimezone(other.to_string())),
        }
    }
}

// ===================== TESTS =====================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Offset, Timelike};
    use chrono_tz::Asia::Kolkata;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_clock_time_parsing() {
        assert_eq!(parse_clock_time("06:26"), NaiveTime::from_hms_opt(6, 26, 0));
        assert_eq!(parse_clock_time(" 17:41 "), NaiveTime::from_hms_opt(17, 41, 0));
        assert_eq!(parse_clock_time("12:30:45"), NaiveTime::from_hms_opt(12, 30, 45));
        assert_eq!(parse_clock_time("00:00"), NaiveTime::from_hms_opt(0, 0, 0));

        assert!(parse_clock_time("a").is_none());
        assert!(parse_clock_time("21").is_none());
        assert!(parse_clock_time("25:00").is_none());
        assert!(parse_clock_time("12:60").is_none());
    }

    #[test]
    fn test_round_nearest() {
        assert_eq!(
            round_to_minute(utc("2024-01-15T05:12:29.999Z"), Rounding::Nearest),
            utc("2024-01-15T05:12:00Z")
        );
        assert_eq!(
            round_to_minute(utc("2024-01-15T05:12:30Z"), Rounding::Nearest),
            utc("2024-01-15T05:13:00Z")
        );
        assert_eq!(
            round_to_minute(utc("2024-01-15T23:59:45Z"), Rounding::Nearest),
            utc("2024-01-16T00:00:00Z")
        );
    }

    #[test]
    fn test_round_up() {
        assert_eq!(
            round_to_minute(utc("2024-01-15T05:12:00.001Z"), Rounding::Up),
            utc("2024-01-15T05:13:00Z")
        );
        assert_eq!(
            round_to_minute(utc("2024-01-15T05:12:00Z"), Rounding::Up),
            utc("2024-01-15T05:12:00Z")
        );
    }

    #[test]
    fn test_rounding_is_idempotent() {
        let t = utc("2024-06-01T03:41:37.250Z");
        for mode in [Rounding::Nearest, Rounding::Up] {
            let once = round_to_minute(t, mode);
            assert_eq!(round_to_minute(once, mode), once);
            assert_eq!(once.second(), 0);
            assert_eq!(once.nanosecond(), 0);
        }
    }

    #[test]
    fn test_rounding_before_epoch() {
        assert_eq!(
            round_to_minute(utc("1960-03-01T10:00:40Z"), Rounding::Nearest),
            utc("1960-03-01T10:01:00Z")
        );
    }

    #[test]
    fn test_fixed_offset_is_exact_shift() {
        let origin = Coordinates::new_unchecked(0.0, 0.0);
        let t = utc("2024-03-10T07:15:00Z");
        let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();

        let local = OutputZone::Fixed(offset).convert(t, &origin);
        assert_eq!(local.naive_local(), t.naive_utc() + chrono::TimeDelta::minutes(330));
        assert_eq!(local.with_timezone(&Utc), t);
    }

    #[test]
    fn test_named_zone_half_hour_offset() {
        let origin = Coordinates::new_unchecked(0.0, 0.0);
        let t = utc("2025-12-25T06:30:00Z");
        let local = OutputZone::Named(Kolkata).convert(t, &origin);

        // UTC+05:30
        assert_eq!(local.offset().fix().local_minus_utc(), 19800);
        assert_eq!(local.format("%H:%M").to_string(), "12:00");
    }

    #[test]
    fn test_named_zone_follows_dst() {
        use chrono_tz::America::New_York;
        let origin = Coordinates::new_unchecked(0.0, 0.0);
        let winter = OutputZone::Named(New_York).convert(utc("2024-01-15T12:00:00Z"), &origin);
        let summer = OutputZone::Named(New_York).convert(utc("2024-07-15T12:00:00Z"), &origin);
        assert_eq!(format!("{}", winter.format("%:z")), "-05:00");
        assert_eq!(format!("{}", summer.format("%:z")), "-04:00");
    }

    #[test]
    fn test_output_zone_parsing() {
        assert_eq!("system".parse::<OutputZone>().unwrap(), OutputZone::System);
        assert_eq!("location".parse::<OutputZone>().unwrap(), OutputZone::Location);
        assert_eq!("utc".parse::<OutputZone>().unwrap(), OutputZone::Utc);
        assert_eq!("Asia/Kolkata".parse::<OutputZone>().unwrap(), OutputZone::Named(Kolkata));
        assert_eq!(
            "+05:30".parse::<OutputZone>().unwrap(),
            OutputZone::Fixed(FixedOffset::east_opt(19800).unwrap())
        );
        assert!(matches!(
            "Mars/Olympus_Mons".parse::<OutputZone>(),
            Err(PrayerError::InvalidTimezone(_))
        ));
        assert!("+25:99".parse::<OutputZone>().is_err());
    }

    #[test]
    fn test_resolve_timezone_new_york() {
        use chrono_tz::America::New_York;
        // Manhattan
        assert_eq!(resolve_timezone(-73.9857, 40.7484), New_York);
    }

    #[test]
    fn test_location_zone_uses_coordinates() {
        let mecca = Coordinates::new_unchecked(21.4225, 39.8262);
        let local = OutputZone::Location.convert(utc("2024-05-01T09:00:00Z"), &mecca);
        assert_eq!(local.offset().fix().local_minus_utc(), 3 * 3600);
    }
}
