//! Sun and new-moon positions for calendar work.
//!
//! The sun comes from the truncated VSOP87 series for the Earth with
//! nutation and aberration applied, good to about a second of arc. New
//! moons use the mean lunation plus periodic and planetary corrections,
//! good to well under a minute from 1900 to 2100. Callers pass and receive
//! Julian dates in UT; ΔT is applied here.

const J2000: f64 = 2_451_545.0;
const TROPICAL_YEAR: f64 = 365.242_2;
/// Lunations per year, for indexing new moons from 2000-01-06.
pub const LUNATIONS_PER_YEAR: f64 = 12.368_5;

/// (amplitude 1e-8 rad, phase rad, frequency rad per millennium)
type Series = &'static [(f64, f64, f64)];

#[rustfmt::skip]
const L0: Series = &[
    (175_347_046.0, 0.0, 0.0), (3_341_656.0, 4.669_256_8, 6_283.075_85), (34_894.0, 4.6261, 12_566.1517),
    (3_497.0, 2.7441, 5_753.3849), (3_418.0, 2.8289, 3.5231), (3_136.0, 3.6277, 77_713.7715),
    (2_676.0, 4.4181, 7_860.4194), (2_343.0, 6.1352, 3_930.2097), (1_324.0, 0.7425, 11_506.7698),
    (1_273.0, 2.0371, 529.691), (1_199.0, 1.1096, 1_577.3435), (990.0, 5.233, 5_884.927),
    (902.0, 2.045, 26.298), (857.0, 3.508, 398.149), (780.0, 1.179, 5_223.694),
    (753.0, 2.533, 5_507.553), (505.0, 4.583, 18_849.228), (492.0, 4.205, 775.523),
    (357.0, 2.920, 0.067), (317.0, 5.849, 11_790.629), (284.0, 1.899, 796.298),
    (271.0, 0.315, 10_977.079), (243.0, 0.345, 5_486.778), (206.0, 4.806, 2_544.314),
    (205.0, 1.869, 5_573.143), (202.0, 2.458, 6_069.777), (156.0, 0.833, 213.299),
    (132.0, 3.411, 2_942.463), (126.0, 1.083, 20.775), (115.0, 0.645, 0.980),
    (103.0, 0.636, 4_694.003), (102.0, 0.976, 15_720.839), (102.0, 4.267, 7.114),
    (99.0, 6.21, 2_146.17), (98.0, 0.68, 155.42), (86.0, 5.98, 161_000.69),
    (85.0, 1.30, 6_275.96), (85.0, 3.67, 71_430.70), (80.0, 1.81, 17_260.15),
    (79.0, 3.04, 12_036.46), (75.0, 1.76, 5_088.63), (74.0, 3.50, 3_154.69),
    (74.0, 4.68, 801.82), (70.0, 0.83, 9_437.76), (62.0, 3.98, 8_827.39),
    (61.0, 1.82, 7_084.90), (57.0, 2.78, 6_286.60), (56.0, 4.39, 14_143.50),
    (56.0, 3.47, 6_279.55), (52.0, 0.19, 12_139.55), (52.0, 1.33, 1_748.02),
    (51.0, 0.28, 5_856.48), (49.0, 0.49, 1_194.45), (41.0, 5.37, 8_429.24),
    (41.0, 2.40, 19_651.05), (39.0, 6.17, 10_447.39), (37.0, 6.04, 10_213.29),
    (37.0, 2.57, 1_059.38), (36.0, 1.71, 2_352.87), (36.0, 1.78, 6_812.77),
    (33.0, 0.59, 17_789.85), (30.0, 0.44, 83_996.85), (30.0, 2.74, 1_349.87),
    (25.0, 3.16, 4_690.48),
];

#[rustfmt::skip]
const L1: Series = &[
    (628_331_966_747.0, 0.0, 0.0), (206_059.0, 2.678_235, 6_283.075_85), (4_303.0, 2.6351, 12_566.1517),
    (425.0, 1.590, 3.523), (119.0, 5.796, 26.298), (109.0, 2.966, 1_577.344),
    (93.0, 2.59, 18_849.23), (72.0, 1.14, 529.69), (68.0, 1.87, 398.15),
    (67.0, 4.41, 5_507.55), (59.0, 2.89, 5_223.69), (56.0, 2.17, 155.42),
    (45.0, 0.40, 796.30), (36.0, 0.47, 775.52), (29.0, 2.65, 7.11),
    (21.0, 5.34, 0.98), (19.0, 1.85, 5_486.78), (19.0, 4.97, 213.30),
    (17.0, 2.99, 6_275.96), (16.0, 0.03, 2_544.31), (16.0, 1.43, 2_146.17),
    (15.0, 1.21, 10_977.08), (12.0, 2.83, 1_748.02), (12.0, 3.26, 5_088.63),
    (12.0, 5.27, 1_194.45), (12.0, 2.08, 4_694.00), (11.0, 0.77, 553.57),
    (10.0, 1.30, 6_286.60), (10.0, 4.24, 1_349.87), (9.0, 2.70, 242.73),
    (9.0, 5.64, 951.72), (8.0, 5.30, 2_352.87), (6.0, 2.65, 9_437.76),
    (6.0, 4.67, 4_690.48),
];

#[rustfmt::skip]
const L2: Series = &[
    (52_919.0, 0.0, 0.0), (8_720.0, 1.0721, 6_283.0758), (309.0, 0.867, 12_566.152),
    (27.0, 0.05, 3.52), (16.0, 5.19, 26.30), (16.0, 3.68, 155.42),
    (10.0, 0.76, 18_849.23), (9.0, 2.06, 77_713.77), (7.0, 0.83, 775.52),
    (5.0, 4.66, 1_577.34), (4.0, 1.03, 7.11), (4.0, 3.44, 5_573.14),
    (3.0, 5.14, 796.30), (3.0, 6.05, 5_507.55), (3.0, 1.19, 242.73),
    (3.0, 6.12, 529.69), (3.0, 0.31, 398.15), (3.0, 2.28, 553.57),
    (2.0, 4.38, 5_223.69), (2.0, 3.75, 0.98),
];

#[rustfmt::skip]
const L3: Series = &[
    (289.0, 5.844, 6_283.076), (35.0, 0.0, 0.0), (17.0, 5.49, 12_566.15),
    (3.0, 5.20, 155.42), (1.0, 4.72, 3.52), (1.0, 5.30, 18_849.23),
    (1.0, 5.97, 242.73),
];

const L4: Series = &[(114.0, 3.142, 0.0), (8.0, 4.13, 6_283.08), (1.0, 3.84, 12_566.15)];

const L5: Series = &[(1.0, 3.14, 0.0)];

/// Planetary corrections to new moon times: (phase deg, rate deg per lunation, amplitude days).
#[rustfmt::skip]
const PLANETARY: [(f64, f64, f64); 14] = [
    (299.77, 0.107_408, 0.000_325), (251.88, 0.016_321, 0.000_165), (251.83, 26.651_886, 0.000_164),
    (349.42, 36.412_478, 0.000_126), (84.66, 18.206_239, 0.000_110), (141.74, 53.303_771, 0.000_062),
    (207.14, 2.453_732, 0.000_060), (154.84, 7.306_860, 0.000_056), (34.52, 27.261_239, 0.000_047),
    (207.19, 0.121_824, 0.000_042), (291.34, 1.844_379, 0.000_040), (161.72, 24.198_154, 0.000_037),
    (239.56, 25.513_099, 0.000_035), (331.55, 3.592_518, 0.000_023),
];

fn decimal_year(jd: f64) -> f64 {
    2000.0 + (jd - J2000) / 365.25
}

/// TT − UT in seconds (Espenak and Meeus polynomials).
pub fn delta_t_seconds(year: f64) -> f64 {
    let y = year;
    if y < 1900.0 {
        let t = y - 1860.0;
        7.62 + 0.5737 * t - 0.251_754 * t.powi(2) + 0.016_806_68 * t.powi(3)
            - 0.000_447_362_4 * t.powi(4)
            + t.powi(5) / 233_174.0
    } else if y < 1920.0 {
        let t = y - 1900.0;
        -2.79 + 1.494_119 * t - 0.059_893_9 * t.powi(2) + 0.006_196_6 * t.powi(3) - 0.000_197 * t.powi(4)
    } else if y < 1941.0 {
        let t = y - 1920.0;
        21.20 + 0.844_93 * t - 0.076_100 * t.powi(2) + 0.002_093_6 * t.powi(3)
    } else if y < 1961.0 {
        let t = y - 1950.0;
        29.07 + 0.407 * t - t.powi(2) / 233.0 + t.powi(3) / 2547.0
    } else if y < 1986.0 {
        let t = y - 1975.0;
        45.45 + 1.067 * t - t.powi(2) / 260.0 - t.powi(3) / 718.0
    } else if y < 2005.0 {
        let t = y - 2000.0;
        63.86 + 0.3345 * t - 0.060_374 * t.powi(2) + 0.001_727_5 * t.powi(3)
            + 0.000_651_814 * t.powi(4)
            + 0.000_023_735_99 * t.powi(5)
    } else if y < 2050.0 {
        let t = y - 2000.0;
        62.92 + 0.322_17 * t + 0.005_589 * t.powi(2)
    } else {
        -20.0 + 32.0 * ((y - 1820.0) / 100.0).powi(2) - 0.5628 * (2150.0 - y)
    }
}

pub fn ut_to_tt(jd_ut: f64) -> f64 {
    jd_ut + delta_t_seconds(decimal_year(jd_ut)) / 86_400.0
}

pub fn tt_to_ut(jde: f64) -> f64 {
    jde - delta_t_seconds(decimal_year(jde)) / 86_400.0
}

fn series(terms: Series, tau: f64) -> f64 {
    terms.iter().map(|&(a, b, c)| a * (b + c * tau).cos()).sum()
}

/// Apparent geocentric longitude of the sun in degrees, for a Julian
/// ephemeris date (TT).
pub fn sun_longitude_tt(jde: f64) -> f64 {
    let tau = (jde - J2000) / 365_250.0;
    let l = [L0, L1, L2, L3, L4, L5]
        .iter()
        .enumerate()
        .map(|(power, terms)| series(terms, tau) * tau.powi(power as i32))
        .sum::<f64>()
        / 1e8;
    let t = tau * 10.0;

    let omega = (125.044_52 - 1_934.136_261 * t).to_radians();
    let sun_mean = (280.4665 + 36_000.7698 * t).to_radians();
    let moon_mean = (218.3165 + 481_267.8813 * t).to_radians();
    let nutation = -17.20 * omega.sin() - 1.32 * (2.0 * sun_mean).sin() - 0.23 * (2.0 * moon_mean).sin()
        + 0.21 * (2.0 * omega).sin();

    // Heliocentric Earth to geocentric sun, FK5 frame, then nutation and aberration (arcsec).
    let corrections = -0.090_33 + nutation - 20.4898;
    (l.to_degrees() + 180.0 + corrections / 3600.0).rem_euclid(360.0)
}

/// Instant (JD UT) at which the sun reaches `longitude` in Gregorian `year`.
///
/// The search starts from the first mean passage after 1 January, so 270°
/// is the December solstice of `year` and 285° the 소한 of early January.
pub fn solar_longitude_instant(year: i32, longitude: f64) -> f64 {
    let mut jde = J2000
        + TROPICAL_YEAR * (year - 2000) as f64
        + (longitude - 280.46).rem_euclid(360.0) / 360.0 * TROPICAL_YEAR;
    for _ in 0..20 {
        let delta = (longitude - sun_longitude_tt(jde) + 180.0).rem_euclid(360.0) - 180.0;
        jde += delta * TROPICAL_YEAR / 360.0;
        if delta.abs() < 1e-7 {
            break;
        }
    }
    tt_to_ut(jde)
}

/// Instant (JD UT) of new moon number `k`, counted from 2000-01-06.
pub fn new_moon(k: i64) -> f64 {
    let k = k as f64;
    let t = k / 1_236.85;
    let (t2, t3, t4) = (t * t, t * t * t, t * t * t * t);

    let jde = 2_451_550.097_66 + 29.530_588_861 * k + 0.000_154_37 * t2 - 0.000_000_150 * t3
        + 0.000_000_000_73 * t4;
    let e = 1.0 - 0.002_516 * t - 0.000_007_4 * t2;
    let m = (2.5534 + 29.105_356_70 * k - 0.000_001_4 * t2 - 0.000_000_11 * t3).to_radians();
    let mp = (201.5643 + 385.816_935_28 * k + 0.010_758_2 * t2 + 0.000_012_38 * t3
        - 0.000_000_058 * t4)
        .to_radians();
    let f = (160.7108 + 390.670_502_84 * k - 0.001_611_8 * t2 - 0.000_002_27 * t3
        + 0.000_000_011 * t4)
        .to_radians();
    let omega = (124.7746 - 1.563_755_88 * k + 0.002_067_2 * t2 + 0.000_002_15 * t3).to_radians();

    let periodic = -0.407_20 * mp.sin()
        + 0.172_41 * e * m.sin()
        + 0.016_08 * (2.0 * mp).sin()
        + 0.010_39 * (2.0 * f).sin()
        + 0.007_39 * e * (mp - m).sin()
        - 0.005_14 * e * (mp + m).sin()
        + 0.002_08 * e * e * (2.0 * m).sin()
        - 0.001_11 * (mp - 2.0 * f).sin()
        - 0.000_57 * (mp + 2.0 * f).sin()
        + 0.000_56 * e * (2.0 * mp + m).sin()
        - 0.000_42 * (3.0 * mp).sin()
        + 0.000_42 * e * (m + 2.0 * f).sin()
        + 0.000_38 * e * (m - 2.0 * f).sin()
        - 0.000_24 * e * (2.0 * mp - m).sin()
        - 0.000_17 * omega.sin()
        - 0.000_07 * (mp + 2.0 * m).sin()
        + 0.000_04 * (2.0 * mp - 2.0 * f).sin()
        + 0.000_04 * (3.0 * m).sin()
        + 0.000_03 * (mp + m - 2.0 * f).sin()
        + 0.000_03 * (2.0 * mp + 2.0 * f).sin()
        - 0.000_03 * (mp + m + 2.0 * f).sin()
        + 0.000_03 * (mp - m + 2.0 * f).sin()
        - 0.000_02 * (mp - m - 2.0 * f).sin()
        - 0.000_02 * (3.0 * mp + m).sin()
        + 0.000_02 * (4.0 * mp).sin();

    let planetary: f64 = PLANETARY
        .iter()
        .enumerate()
        .map(|(i, &(phase, rate, amplitude))| {
            let secular = if i == 0 { -0.009_173 * t2 } else { 0.0 };
            amplitude * (phase + rate * k + secular).to_radians().sin()
        })
        .sum();

    tt_to_ut(jde + periodic + planetary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::solar_term::julian_date;
    use chrono::NaiveDate;

    fn jd(y: i32, m: u32, d: u32, h: u32, min: u32) -> f64 {
        julian_date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap())
    }

    fn minutes_apart(a: f64, b: f64) -> f64 {
        (a - b).abs() * 1440.0
    }

    #[test]
    fn test_delta_t_is_about_a_minute_today() {
        let dt = delta_t_seconds(2010.0);
        assert!((60.0..75.0).contains(&dt), "{dt}");
        assert!(delta_t_seconds(1900.0).abs() < 5.0);
    }

    #[test]
    fn test_equinox_instant() {
        // March equinox 2024-03-20 03:06 UT.
        let instant = solar_longitude_instant(2024, 0.0);
        assert!(minutes_apart(instant, jd(2024, 3, 20, 3, 6)) < 1.5);
    }

    #[test]
    fn test_principal_term_near_midnight() {
        // 소만 2012 at 15:15 UT, a quarter past midnight in Seoul.
        let instant = solar_longitude_instant(2012, 60.0);
        assert!(minutes_apart(instant, jd(2012, 5, 20, 15, 15)) < 1.5);
    }

    #[test]
    fn test_new_moons() {
        let k = ((2024.03 - 2000.0) * LUNATIONS_PER_YEAR).round() as i64;
        assert!(minutes_apart(new_moon(k), jd(2024, 1, 11, 11, 57)) < 1.5);
        let k = ((2012.46 - 2000.0) * LUNATIONS_PER_YEAR).round() as i64;
        assert!(minutes_apart(new_moon(k), jd(2012, 6, 19, 15, 2)) < 1.5);
    }

    #[test]
    fn test_longitude_roundtrip() {
        let instant = solar_longitude_instant(1990, 315.0);
        let lon = sun_longitude_tt(ut_to_tt(instant));
        assert!((lon - 315.0).abs() < 1e-5, "{lon}");
    }
}
