//! Astronomical Math Module
//!
//! Low-precision solar theory (Meeus, "Astronomical Algorithms", ch. 7, 12,
//! 22, 25, 28). Everything here is a pure function of its arguments. Angles
//! are in degrees unless a name says otherwise; `t` is Julian centuries since
//! J2000.0.

// ===================== CONSTANTS =====================

/// Julian day of the J2000.0 epoch
pub const J2000: f64 = 2_451_545.0;

/// Days per Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;

// ===================== ANGLE NORMALIZATION =====================

/// Reduce `value` into `[0, max)`.
pub fn normalize_to_scale(value: f64, max: f64) -> f64 {
    value - max * (value / max).floor()
}

/// Reduce an angle into `[0, 360)`.
pub fn unwind_angle(angle: f64) -> f64 {
    normalize_to_scale(angle, 360.0)
}

/// Reduce an angle into `[-180, 180]`.
pub fn quadrant_shifted_angle(angle: f64) -> f64 {
    if (-180.0..=180.0).contains(&angle) {
        return angle;
    }
    angle - 360.0 * (angle / 360.0).round()
}

// ===================== CALENDAR =====================

/// Gregorian leap year test.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Julian day for a Gregorian calendar date plus hours of the day (UT).
pub fn julian_day(year: i32, month: u32, day: u32, hours: f64) -> f64 {
    let (y, m) = if month > 2 {
        (year as i64, month as i64)
    } else {
        (year as i64 - 1, month as i64 + 12)
    };
    let d = day as f64 + hours / 24.0;

    let a = y / 100;
    let b = 2 - a + a / 4;

    let i0 = (365.25 * (y + 4716) as f64) as i64;
    let i1 = (30.6001 * (m + 1) as f64) as i64;

    (i0 + i1 + b) as f64 + d - 1524.5
}

/// Julian centuries since J2000.0.
pub fn julian_century(jd: f64) -> f64 {
    (jd - J2000) / DAYS_PER_CENTURY
}

// ===================== SOLAR THEORY =====================

/// Geometric mean longitude of the sun, L0 (Meeus 25.2).
pub fn mean_solar_longitude(t: f64) -> f64 {
    unwind_angle(280.466_456_7 + 36_000.769_83 * t + 0.000_303_2 * t * t)
}

/// Mean longitude of the moon, L'.
pub fn mean_lunar_longitude(t: f64) -> f64 {
    unwind_angle(218.3165 + 481_267.8813 * t)
}

/// Longitude of the moon's ascending node, Ω (Meeus 22).
pub fn ascending_lunar_node_longitude(t: f64) -> f64 {
    unwind_angle(125.044_52 - 1934.136_261 * t + 0.002_070_8 * t * t + t.powi(3) / 450_000.0)
}

/// Mean anomaly of the sun, M (Meeus 25.3).
pub fn mean_solar_anomaly(t: f64) -> f64 {
    unwind_angle(357.529_11 + 35_999.050_29 * t - 0.000_153_7 * t * t)
}

/// Sun's equation of the center, C.
pub fn solar_equation_of_the_center(t: f64, mean_anomaly: f64) -> f64 {
    let m = mean_anomaly.to_radians();
    let term1 = (1.914_602 - 0.004_817 * t - 0.000_014 * t * t) * m.sin();
    let term2 = (0.019_993 - 0.000_101 * t) * (2.0 * m).sin();
    let term3 = 0.000_289 * (3.0 * m).sin();
    term1 + term2 + term3
}

/// Apparent longitude of the sun, λ: true longitude corrected for nutation
/// and aberration.
pub fn apparent_solar_longitude(t: f64, mean_longitude: f64) -> f64 {
    let longitude = mean_longitude + solar_equation_of_the_center(t, mean_solar_anomaly(t));
    let omega = 125.04 - 1934.136 * t;
    unwind_angle(longitude - 0.005_69 - 0.004_78 * omega.to_radians().sin())
}

/// Mean obliquity of the ecliptic, ε0 (Meeus 22.2).
pub fn mean_obliquity_of_the_ecliptic(t: f64) -> f64 {
    23.439_291 - 0.013_004_167 * t - 0.000_000_163_9 * t * t + 0.000_000_503_6 * t.powi(3)
}

/// Obliquity corrected for the apparent position of the sun (Meeus 25.8).
pub fn apparent_obliquity_of_the_ecliptic(t: f64, mean_obliquity: f64) -> f64 {
    let omega = 125.04 - 1934.136 * t;
    mean_obliquity + 0.002_56 * omega.to_radians().cos()
}

/// Mean sidereal time at Greenwich, θ0 (Meeus 12.4).
pub fn mean_sidereal_time(t: f64) -> f64 {
    let jd = t * DAYS_PER_CENTURY + J2000;
    let theta = 280.460_618_37 + 360.985_647_366_29 * (jd - J2000) + 0.000_387_933 * t * t
        - t.powi(3) / 38_710_000.0;
    unwind_angle(theta)
}

/// Nutation in longitude, ΔΨ, in degrees (low-precision terms of Meeus 22).
pub fn nutation_in_longitude(solar_longitude: f64, lunar_longitude: f64, node: f64) -> f64 {
    let l0 = solar_longitude.to_radians();
    let lp = lunar_longitude.to_radians();
    let omega = node.to_radians();
    (-17.2 / 3600.0) * omega.sin() - (1.32 / 3600.0) * (2.0 * l0).sin()
        - (0.23 / 3600.0) * (2.0 * lp).sin()
        + (0.21 / 3600.0) * (2.0 * omega).sin()
}

/// Nutation in obliquity, Δε, in degrees.
pub fn nutation_in_obliquity(solar_longitude: f64, lunar_longitude: f64, node: f64) -> f64 {
    let l0 = solar_longitude.to_radians();
    let lp = lunar_longitude.to_radians();
    let omega = node.to_radians();
    (9.2 / 3600.0) * omega.cos() + (0.57 / 3600.0) * (2.0 * l0).cos()
        + (0.10 / 3600.0) * (2.0 * lp).cos()
        - (0.09 / 3600.0) * (2.0 * omega).cos()
}

/// Intermediate quantities of the solar theory for one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolarElements {
    /// Julian centuries since J2000.0
    pub century: f64,
    /// Geometric mean longitude L0
    pub mean_longitude: f64,
    /// Mean anomaly M
    pub mean_anomaly: f64,
    /// Apparent longitude λ
    pub apparent_longitude: f64,
    /// Mean obliquity ε0
    pub mean_obliquity: f64,
    /// Apparent obliquity used for the sun's equatorial coordinates
    pub apparent_obliquity: f64,
    /// Nutation in longitude ΔΨ
    pub nutation_longitude: f64,
    /// Nutation in obliquity Δε
    pub nutation_obliquity: f64,
    /// Mean sidereal time at Greenwich θ0
    pub mean_sidereal_time: f64,
}

/// Evaluate the solar theory at a Julian day.
pub fn solar_elements(jd: f64) -> SolarElements {
    let t = julian_century(jd);
    let mean_longitude = mean_solar_longitude(t);
    let lunar_longitude = mean_lunar_longitude(t);
    let node = ascending_lunar_node_longitude(t);
    let mean_obliquity = mean_obliquity_of_the_ecliptic(t);

    SolarElements {
        century: t,
        mean_longitude,
        mean_anomaly: mean_solar_anomaly(t),
        apparent_longitude: apparent_solar_longitude(t, mean_longitude),
        mean_obliquity,
        apparent_obliquity: apparent_obliquity_of_the_ecliptic(t, mean_obliquity),
        nutation_longitude: nutation_in_longitude(mean_longitude, lunar_longitude, node),
        nutation_obliquity: nutation_in_obliquity(mean_longitude, lunar_longitude, node),
        mean_sidereal_time: mean_sidereal_time(t),
    }
}

/// Sun's declination from apparent longitude and obliquity (Meeus 25.7).
pub fn declination(apparent_longitude: f64, obliquity: f64) -> f64 {
    let lambda = apparent_longitude.to_radians();
    let epsilon = obliquity.to_radians();
    (epsilon.sin() * lambda.sin()).asin().to_degrees()
}

/// Sun's right ascension in `[0, 360)` (Meeus 25.6).
pub fn right_ascension(apparent_longitude: f64, obliquity: f64) -> f64 {
    let lambda = apparent_longitude.to_radians();
    let epsilon = obliquity.to_radians();
    unwind_angle((epsilon.cos() * lambda.sin()).atan2(lambda.cos()).to_degrees())
}

/// Equation of time in minutes, apparent minus mean solar time (Meeus 28.3).
pub fn equation_of_time(jd: f64) -> f64 {
    let e = solar_elements(jd);
    let alpha = right_ascension(e.apparent_longitude, e.apparent_obliquity);
    let true_obliquity = (e.mean_obliquity + e.nutation_obliquity).to_radians();
    let degrees =
        e.mean_longitude - 0.005_718_3 - alpha + e.nutation_longitude * true_obliquity.cos();
    4.0 * quadrant_shifted_angle(degrees)
}

// ===================== SPHERICAL ASTRONOMY =====================

/// Altitude of a body with declination `declination` at hour angle
/// `hour_angle` for an observer at `latitude` (Meeus 13.6).
pub fn altitude_of_celestial_body(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let phi = latitude.to_radians();
    let delta = declination.to_radians();
    let h = hour_angle.to_radians();
    (phi.sin() * delta.sin() + phi.cos() * delta.cos() * h.cos()).asin().to_degrees()
}

// ===================== INTERPOLATION =====================

/// Three-point interpolation (Meeus 3.3). `y2` is the central value, `y1`
/// the previous and `y3` the next; `n` is the offset from the center.
pub fn interpolate(y2: f64, y1: f64, y3: f64, n: f64) -> f64 {
    let a = y2 - y1;
    let b = y3 - y2;
    let c = b - a;
    y2 + (n / 2.0) * (a + b + n * c)
}

/// [`interpolate`] for angles that may wrap through 0/360.
pub fn interpolate_angles(y2: f64, y1: f64, y3: f64, n: f64) -> f64 {
    let a = unwind_angle(y2 - y1);
    let b = unwind_angle(y3 - y2);
    let c = b - a;
    y2 + (n / 2.0) * (a + b + n * c)
}

// ===================== TESTS =====================
