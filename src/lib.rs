//! Islamic prayer times from solar-position astronomy.
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use prayertimes::{Coordinates, Madhab, Method, OutputZone, PrayerTimeEngine};
//!
//! let params = Method::NorthAmerica.parameters().with_madhab(Madhab::Hanafi);
//! let engine = PrayerTimeEngine::new(params).with_output_zone(OutputZone::Location);
//!
//! let raleigh = Coordinates::new(35.7750, -78.6336)?;
//! let date = NaiveDate::from_ymd_opt(2015, 7, 12).unwrap();
//! let times = engine.calculate(raleigh, date)?;
//! println!("Fajr {}", times.fajr.format("%H:%M"));
//! # Ok::<(), prayertimes::PrayerError>(())
//! ```

pub mod astronomy;
pub mod config;
pub mod coordinates;
pub mod error;
pub mod geo;
pub mod lookup;
pub mod params;
pub mod polar;
pub mod prayer;
pub mod safeguard;
pub mod solar;
pub mod time;

pub use config::PrayerConfig;
pub use error::{PrayerError, Result};
pub use geo::Coordinates;
pub use lookup::{LookupTable, PrayerTimeProvider, TabulatedDay};
pub use params::{
    CalculationParameters, HighLatitudeRule, IshaRule, Madhab, Method, PrayerAdjustments, Shafaq,
};
pub use polar::PolarCircleResolution;
pub use prayer::{Prayer, PrayerTimeEngine, PrayerTimes};
pub use time::{OutputZone, Rounding};
