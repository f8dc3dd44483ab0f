//! Error Types Module
//!
//! Every failure the engine reports carries the date, the coordinates and the
//! calculation method so it can be diagnosed without looking at internals.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

use crate::geo::Coordinates;
use crate::params::Method;
use crate::prayer::Prayer;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, PrayerError>;

#[derive(Debug, Error)]
pub enum PrayerError {
    #[error("Latitude must be between -90 and 90, got {0}")]
    InvalidLatitude(f64),

    #[error("Longitude must be between -180 and 180, got {0}")]
    InvalidLongitude(f64),

    /// The lookup provider has no row for the requested date.
    #[error("No tabulated prayer times for {date} at {coordinates} (method {method:?})")]
    DataUnavailable { date: NaiveDate, coordinates: Coordinates, method: Method },

    #[error("Method {method:?} needs a lookup provider but none was configured")]
    MissingProvider { method: Method },

    #[error("Invalid tabulated {prayer} time {value:?} for {date}; expected HH:MM")]
    InvalidTabulatedTime { date: NaiveDate, prayer: Prayer, value: String },

    #[error("Local time {time} does not exist on {date} in {timezone}")]
    NonexistentLocalTime { date: NaiveDate, time: NaiveTime, timezone: String },

    /// Sunrise or sunset is undefined and the polar-circle resolution gave up.
    #[error("Sun does not rise or set on {date} at {coordinates} (method {method:?})")]
    PolarCircle { date: NaiveDate, coordinates: Coordinates, method: Method },

    #[error("{prayer} has no solution on {date} at {coordinates} (method {method:?})")]
    NoSolution { prayer: Prayer, date: NaiveDate, coordinates: Coordinates, method: Method },

    #[error("Invalid time zone {0:?}; expected system, location, utc, IANA name or +HH:MM")]
    InvalidTimezone(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid lookup table: {0}")]
    Json(#[from] serde_json::Error),
}
