//! Requirement classification
//!
//! Maps a plant's categorical requirement range plus an averaged reading to a
//! [`Verdict`]. Classification never fails: a requirement level that is not in
//! the threshold table yields [`Verdict::Unknown`] for that metric only.

use serde::{Deserialize, Serialize};

use crate::thresholds::{
    BreakpointTable, Endpoint, HARDINESS_TABLE, HUMIDITY_RANGE, LIGHT_TABLE, ThresholdRange,
    WATER_TABLE,
};

/// How a metric's average compares to the active plant's requirement range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verdict {
    #[default]
    Unknown,
    Low,
    High,
    Ok,
}

impl Verdict {
    /// Single glyph printed next to a metric on the status screen
    pub const fn indicator(self) -> char {
        match self {
            Self::Unknown => '?',
            Self::Low => 'v',
            Self::High => '^',
            Self::Ok => '-',
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Low => "low",
            Self::High => "high",
            Self::Ok => "ok",
        }
    }

    /// Swap `Low` and `High`, leaving the other verdicts untouched
    pub const fn inverted(self) -> Self {
        match self {
            Self::Low => Self::High,
            Self::High => Self::Low,
            other => other,
        }
    }
}

/// Ordered pair of categorical levels. `high == 0` denotes a single-level requirement.
///
/// Persisted as a two-element array `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct RequirementRange {
    pub low: i32,
    pub high: i32,
}

impl RequirementRange {
    pub const fn new(low: i32, high: i32) -> Self {
        Self { low, high }
    }

    /// Requirement on a single level
    pub const fn single(level: i32) -> Self {
        Self { low: level, high: 0 }
    }

    /// Expand a single-level requirement into `(level, level)`
    pub const fn normalized(self) -> (i32, i32) {
        if self.high == 0 {
            (self.low, self.low)
        } else {
            (self.low, self.high)
        }
    }

    /// Resolve both endpoints through a breakpoint table.
    ///
    /// The low bound comes from the low level's base, the high bound from the
    /// high level's base plus span. Returns `None` when either level is unknown.
    pub fn resolve(self, table: &BreakpointTable) -> Option<ThresholdRange> {
        let (low, high) = self.normalized();
        let min = table.lookup(low)?.bound(Endpoint::Low);
        let max = table.lookup(high)?.bound(Endpoint::High);
        Some(ThresholdRange::new(min, max))
    }
}

impl From<[i32; 2]> for RequirementRange {
    fn from([low, high]: [i32; 2]) -> Self {
        Self { low, high }
    }
}

impl From<RequirementRange> for [i32; 2] {
    fn from(range: RequirementRange) -> Self {
        [range.low, range.high]
    }
}

/// Compare a reading against a resolved range.
///
/// A NaN reading cannot be placed and is reported as `Unknown`.
pub fn compare(range: ThresholdRange, reading: f32) -> Verdict {
    if reading.is_nan() {
        Verdict::Unknown
    } else if range.contains(reading) {
        Verdict::Ok
    } else if reading < range.min as f32 {
        Verdict::Low
    } else {
        Verdict::High
    }
}

/// Classify a reading against a categorical requirement range
pub fn classify(requirement: RequirementRange, reading: f32, table: &BreakpointTable) -> Verdict {
    match requirement.resolve(table) {
        Some(range) => compare(range, reading),
        None => {
            log::debug!(
                "Unrecognised {} requirement {:?}",
                table.name(),
                requirement
            );
            Verdict::Unknown
        }
    }
}

/// Light verdict for an average lux reading
pub fn evaluate_light(requirement: RequirementRange, average_lux: f32) -> Verdict {
    classify(requirement, average_lux, &LIGHT_TABLE)
}

/// Water verdict for an average raw soil-moisture reading.
///
/// Lower counts mean wetter soil, so a reading below the range means too much
/// water (`High`) and one above it means too little (`Low`).
pub fn evaluate_water(requirement: RequirementRange, average_raw: f32) -> Verdict {
    classify(requirement, average_raw, &WATER_TABLE).inverted()
}

/// Temperature verdict for an average °F reading against a hardiness range
pub fn evaluate_temperature(hardiness: RequirementRange, average_f: f32) -> Verdict {
    classify(hardiness, average_f, &HARDINESS_TABLE)
}

/// Humidity verdict against the fixed [30, 60] %RH range
pub fn evaluate_humidity(average_rh: f32) -> Verdict {
    compare(HUMIDITY_RANGE, average_rh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::{LightLevel, WaterLevel};

    const INVALID_LEVEL: i32 = 99;

    #[test]
    fn test_light_single_level() {
        let full_shade = RequirementRange::single(LightLevel::FullShade.code());
        assert_eq!(evaluate_light(full_shade, 500.0), Verdict::Ok);
        assert_eq!(evaluate_light(full_shade, 2000.0), Verdict::High);
        assert_eq!(evaluate_light(full_shade, -1.0), Verdict::Low);
    }

    #[test]
    fn test_light_span_uses_low_base_and_high_top() {
        let shade_to_partial = RequirementRange::new(
            LightLevel::FullShade.code(),
            LightLevel::PartialSun.code(),
        );
        assert_eq!(
            shade_to_partial.resolve(&LIGHT_TABLE),
            Some(ThresholdRange::new(0, 10750))
        );
        assert_eq!(evaluate_light(shade_to_partial, 10750.0), Verdict::Ok);
        assert_eq!(evaluate_light(shade_to_partial, 10751.0), Verdict::High);
    }

    #[test]
    fn test_water_verdict_is_inverted() {
        let dry = RequirementRange::single(WaterLevel::Dry.code());
        assert_eq!(evaluate_water(dry, 3000.0), Verdict::Ok);
        assert_eq!(evaluate_water(dry, 500.0), Verdict::High);
        assert_eq!(evaluate_water(dry, 4000.0), Verdict::Ok);
        assert_eq!(evaluate_water(dry, 4096.0), Verdict::Low);
    }

    #[test]
    fn test_water_too_dry_for_wet_plant() {
        let wet_to_moist =
            RequirementRange::new(WaterLevel::Wet.code(), WaterLevel::Moist.code());
        assert_eq!(evaluate_water(wet_to_moist, 4000.0), Verdict::Low);
        assert_eq!(evaluate_water(wet_to_moist, 999.0), Verdict::High);
        assert_eq!(evaluate_water(wet_to_moist, 1000.0), Verdict::Ok);
        assert_eq!(evaluate_water(wet_to_moist, 2300.0), Verdict::Ok);
    }

    #[test]
    fn test_water_low_above_range() {
        // "dry" tops out at the ADC ceiling, so use "moist" to get a reading above range
        let moist = RequirementRange::single(WaterLevel::Moist.code());
        assert_eq!(evaluate_water(moist, 4000.0), Verdict::Low);
    }

    #[test]
    fn test_unknown_levels() {
        let invalid = RequirementRange::single(INVALID_LEVEL);
        for reading in [-5.0, 0.0, 500.0, 1e9] {
            assert_eq!(evaluate_light(invalid, reading), Verdict::Unknown);
            assert_eq!(evaluate_water(invalid, reading), Verdict::Unknown);
            assert_eq!(evaluate_temperature(invalid, reading), Verdict::Unknown);
        }
        // Only one endpoint invalid
        let half = RequirementRange::new(LightLevel::FullShade.code(), INVALID_LEVEL);
        assert_eq!(evaluate_light(half, 10.0), Verdict::Unknown);
        // An empty record has no requirement at all
        assert_eq!(evaluate_light(RequirementRange::default(), 10.0), Verdict::Unknown);
    }

    #[test]
    fn test_humidity_fixed_range() {
        assert_eq!(evaluate_humidity(45.0), Verdict::Ok);
        assert_eq!(evaluate_humidity(25.0), Verdict::Low);
        assert_eq!(evaluate_humidity(75.0), Verdict::High);
        assert_eq!(evaluate_humidity(60.0), Verdict::Ok);
        assert_eq!(evaluate_humidity(30.0), Verdict::Ok);
    }

    #[test]
    fn test_temperature_hardiness_span() {
        let zones_5_to_7 = RequirementRange::new(5, 7);
        assert_eq!(evaluate_temperature(zones_5_to_7, 45.0), Verdict::Ok);
        assert_eq!(evaluate_temperature(zones_5_to_7, 57.0), Verdict::Ok);
        assert_eq!(evaluate_temperature(zones_5_to_7, 44.9), Verdict::Low);
        assert_eq!(evaluate_temperature(zones_5_to_7, 57.1), Verdict::High);
        assert_eq!(
            evaluate_temperature(RequirementRange::single(13), 100.0),
            Verdict::Ok
        );
    }

    #[test]
    fn test_nan_reading_is_unknown() {
        assert_eq!(evaluate_humidity(f32::NAN), Verdict::Unknown);
        let full_sun = RequirementRange::single(LightLevel::FullSun.code());
        assert_eq!(evaluate_light(full_sun, f32::NAN), Verdict::Unknown);
    }

    #[test]
    fn test_indicators() {
        assert_eq!(Verdict::Unknown.indicator(), '?');
        assert_eq!(Verdict::Low.indicator(), 'v');
        assert_eq!(Verdict::High.indicator(), '^');
        assert_eq!(Verdict::Ok.indicator(), '-');
        assert_eq!(Verdict::Ok.inverted(), Verdict::Ok);
        assert_eq!(Verdict::Low.inverted(), Verdict::High);
    }

    #[test]
    fn test_requirement_range_persists_as_pair() {
        let range = RequirementRange::new(1, 3);
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, "[1,3]");
        let parsed: RequirementRange = serde_json::from_str("[2,0]").unwrap();
        assert_eq!(parsed, RequirementRange::single(2));
    }
}
