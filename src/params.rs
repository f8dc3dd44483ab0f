//! Calculation Parameters Module
//!
//! Method presets, juristic options and the per-prayer minute adjustments
//! that together define how raw solar events become prayer times.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinates;
use crate::polar::PolarCircleResolution;
use crate::prayer::Prayer;
use crate::time::Rounding;

// ===================== ENUMS =====================

/// Named calculation conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Muslim World League
    MuslimWorldLeague,
    /// Egyptian General Authority of Survey
    Egyptian,
    /// University of Islamic Sciences, Karachi
    Karachi,
    /// Umm al-Qura University, Makkah
    UmmAlQura,
    /// UAE
    Dubai,
    /// Moonsighting Committee Worldwide; seasonal twilight safeguards
    MoonsightingCommittee,
    /// ISNA
    NorthAmerica,
    Kuwait,
    Qatar,
    /// Majlis Ugama Islam Singapura
    Singapore,
    /// Institute of Geophysics, University of Tehran
    Tehran,
    /// Diyanet İşleri Başkanlığı
    Turkey,
    /// Times come from an external lookup provider instead of astronomy
    Tabulated,
    /// Custom parameters. The preset fajr and isha angles are zero, which
    /// puts fajr and isha within minutes of sunrise and sunset; set them
    /// with `with_fajr_angle` and `with_isha_rule` before calculating.
    Other,
}

impl Method {
    /// Preset parameters for this method.
    pub fn parameters(self) -> CalculationParameters {
        let base = CalculationParameters::new(self, 0.0, IshaRule::Angle(0.0));
        match self {
            Method::MuslimWorldLeague => base
                .with_fajr_angle(18.0)
                .with_isha_rule(IshaRule::Angle(17.0))
                .with_method_adjustments(PrayerAdjustments { dhuhr: 1, ..Default::default() }),
            Method::Egyptian => base
                .with_fajr_angle(19.5)
                .with_isha_rule(IshaRule::Angle(17.5))
                .with_method_adjustments(PrayerAdjustments { dhuhr: 1, ..Default::default() }),
            Method::Karachi => base
                .with_fajr_angle(18.0)
                .with_isha_rule(IshaRule::Angle(18.0))
                .with_method_adjustments(PrayerAdjustments { dhuhr: 1, ..Default::default() }),
            Method::UmmAlQura => {
                base.with_fajr_angle(18.5).with_isha_rule(IshaRule::Interval(90))
            }
            Method::Dubai => base
                .with_fajr_angle(18.2)
                .with_isha_rule(IshaRule::Angle(18.2))
                .with_method_adjustments(PrayerAdjustments {
                    sunrise: -3,
                    dhuhr: 3,
                    asr: 3,
                    maghrib: 3,
                    ..Default::default()
                }),
            Method::MoonsightingCommittee => base
                .with_fajr_angle(18.0)
                .with_isha_rule(IshaRule::Angle(18.0))
                .with_method_adjustments(PrayerAdjustments {
                    dhuhr: 5,
                    maghrib: 3,
                    ..Default::default()
                }),
            Method::NorthAmerica => base
                .with_fajr_angle(15.0)
                .with_isha_rule(IshaRule::Angle(15.0))
                .with_method_adjustments(PrayerAdjustments { dhuhr: 1, ..Default::default() }),
            Method::Kuwait => base.with_fajr_angle(18.0).with_isha_rule(IshaRule::Angle(17.5)),
            Method::Qatar => base.with_fajr_angle(18.0).with_isha_rule(IshaRule::Interval(90)),
            Method::Singapore => base
                .with_fajr_angle(20.0)
                .with_isha_rule(IshaRule::Angle(18.0))
                .with_method_adjustments(PrayerAdjustments { dhuhr: 1, ..Default::default() })
                .with_rounding(Rounding::Up),
            Method::Tehran => base
                .with_fajr_angle(17.7)
                .with_isha_rule(IshaRule::Angle(14.0))
                .with_maghrib_angle(Some(4.5)),
            Method::Turkey => base
                .with_fajr_angle(18.0)
                .with_isha_rule(IshaRule::Angle(17.0))
                .with_method_adjustments(PrayerAdjustments {
                    sunrise: -7,
                    dhuhr: 5,
                    asr: 4,
                    maghrib: 7,
                    ..Default::default()
                }),
            Method::Tabulated | Method::Other => base,
        }
    }

    /// Whether fajr and isha are bounded by the seasonal twilight model.
    pub fn uses_seasonal_safeguard(self) -> bool {
        matches!(self, Method::MoonsightingCommittee)
    }
}

/// School of jurisprudence for the asr shadow length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Madhab {
    /// Shafi, Maliki, Hanbali: shadow equals object height
    #[default]
    Shafi,
    /// Hanafi: shadow equals twice the object height
    Hanafi,
}

impl Madhab {
    pub fn shadow_length(self) -> f64 {
        match self {
            Madhab::Shafi => 1.0,
            Madhab::Hanafi => 2.0,
        }
    }
}

/// Fraction of the night that bounds fajr and isha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighLatitudeRule {
    #[default]
    MiddleOfTheNight,
    SeventhOfTheNight,
    /// Twilight angle divided by 60 of the night
    TwilightAngle,
}

impl HighLatitudeRule {
    /// Seventh of the night above 48 degrees, middle of the night below.
    pub fn recommended(coordinates: &Coordinates) -> Self {
        if coordinates.latitude.abs() > 48.0 {
            HighLatitudeRule::SeventhOfTheNight
        } else {
            HighLatitudeRule::MiddleOfTheNight
        }
    }
}

/// Evening twilight variant for the seasonal isha model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shafaq {
    /// Blend of ahmer and abyad, lower ambiguity at high latitudes
    #[default]
    General,
    /// Disappearance of the red glow
    Ahmer,
    /// Disappearance of the white glow
    Abyad,
}

/// Isha as a depression angle or a fixed interval after sunset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IshaRule {
    /// Degrees below the horizon
    Angle(f64),
    /// Minutes after sunset
    Interval(u32),
}

// ===================== ADJUSTMENTS =====================

/// Signed minute offsets, one per prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PrayerAdjustments {
    pub fajr: i64,
    pub sunrise: i64,
    pub dhuhr: i64,
    pub asr: i64,
    pub maghrib: i64,
    pub isha: i64,
}

impl PrayerAdjustments {
    /// Component-wise sum.
    pub fn combined(&self, other: &PrayerAdjustments) -> PrayerAdjustments {
        PrayerAdjustments {
            fajr: self.fajr + other.fajr,
            sunrise: self.sunrise + other.sunrise,
            dhuhr: self.dhuhr + other.dhuhr,
            asr: self.asr + other.asr,
            maghrib: self.maghrib + other.maghrib,
            isha: self.isha + other.isha,
        }
    }

    pub fn minutes(&self, prayer: Prayer) -> i64 {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Sunrise => self.sunrise,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }
}

// ===================== PARAMETERS =====================

/// Everything a calculation needs besides location and date.
///
/// Built from [`Method::parameters`] and refined with the `with_*` builders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalculationParameters {
    pub method: Method,
    /// Fajr depression angle in degrees
    pub fajr_angle: f64,
    pub isha: IshaRule,
    /// Maghrib depression angle in degrees, if the method uses one
    pub maghrib_angle: Option<f64>,
    pub madhab: Madhab,
    pub high_latitude_rule: HighLatitudeRule,
    pub shafaq: Shafaq,
    pub rounding: Rounding,
    pub polar_circle_resolution: PolarCircleResolution,
    /// User offsets
    pub adjustments: PrayerAdjustments,
    /// Offsets baked into the method preset
    pub method_adjustments: PrayerAdjustments,
}

impl CalculationParameters {
    pub fn new(method: Method, fajr_angle: f64, isha: IshaRule) -> Self {
        Self {
            method,
            fajr_angle,
            isha,
            maghrib_angle: None,
            madhab: Madhab::default(),
            high_latitude_rule: HighLatitudeRule::default(),
            shafaq: Shafaq::default(),
            rounding: Rounding::default(),
            polar_circle_resolution: PolarCircleResolution::default(),
            adjustments: PrayerAdjustments::default(),
            method_adjustments: PrayerAdjustments::default(),
        }
    }

    pub fn with_fajr_angle(mut self, angle: f64) -> Self {
        self.fajr_angle = angle;
        self
    }

    pub fn with_isha_rule(mut self, isha: IshaRule) -> Self {
        self.isha = isha;
        self
    }

    pub fn with_maghrib_angle(mut self, angle: Option<f64>) -> Self {
        self.maghrib_angle = angle;
        self
    }

    pub fn with_madhab(mut self, madhab: Madhab) -> Self {
        self.madhab = madhab;
        self
    }

    pub fn with_high_latitude_rule(mut self, rule: HighLatitudeRule) -> Self {
        self.high_latitude_rule = rule;
        self
    }

    pub fn with_shafaq(mut self, shafaq: Shafaq) -> Self {
        self.shafaq = shafaq;
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_polar_circle_resolution(mut self, resolution: PolarCircleResolution) -> Self {
        self.polar_circle_resolution = resolution;
        self
    }

    pub fn with_adjustments(mut self, adjustments: PrayerAdjustments) -> Self {
        self.adjustments = adjustments;
        self
    }

    pub fn with_method_adjustments(mut self, adjustments: PrayerAdjustments) -> Self {
        self.method_adjustments = adjustments;
        self
    }

    /// Isha depression angle, zero for interval-based methods.
    pub fn isha_angle(&self) -> f64 {
        match self.isha {
            IshaRule::Angle(angle) => angle,
            IshaRule::Interval(_) => 0.0,
        }
    }

    /// User and method offsets added together.
    pub fn total_adjustments(&self) -> PrayerAdjustments {
        self.adjustments.combined(&self.method_adjustments)
    }
}

// ===================== TESTS =====================
