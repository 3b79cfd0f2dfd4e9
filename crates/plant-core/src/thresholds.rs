//! Compiled-in requirement threshold tables
//!
//! A plant record stores its light and water needs as small categorical levels
//! and its cold tolerance as hardiness zones. These tables turn each level into
//! a numeric range in the unit the matching sensor reports:
//!
//! | Table | Key | Unit |
//! |-------|-----|------|
//! | [`LIGHT_TABLE`] | [`LightLevel`] | lux |
//! | [`WATER_TABLE`] | [`WaterLevel`] | raw soil-moisture ADC counts |
//! | [`HARDINESS_TABLE`] | zone 2–13 | °F |
//!
//! Humidity has no per-plant requirement and uses [`HUMIDITY_RANGE`].
//!
//! All bounds are inclusive. The hardiness values are kept exactly as the
//! appliance has always shipped them, including zone 7 starting at zone 6's
//! upper bound and zones 12 and 13 sharing one range.

/// Numeric range with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdRange {
    pub min: i32,
    pub max: i32,
}

impl ThresholdRange {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Check whether a reading lies within the range (bounds included)
    pub fn contains(&self, reading: f32) -> bool {
        reading >= self.min as f32 && reading <= self.max as f32
    }
}

/// Which end of a requirement range a categorical level is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Low = 0,
    High = 1,
}

/// Breakpoint of one categorical level.
///
/// The level's low bound is `base` and its high bound is `base + span`, so a
/// requirement spanning two levels takes the low bound of the first and the
/// high bound of the second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Breakpoint {
    pub base: i32,
    pub span: i32,
}

impl Breakpoint {
    pub const fn new(base: i32, span: i32) -> Self {
        Self { base, span }
    }

    /// Numeric bound for the given endpoint
    pub const fn bound(self, endpoint: Endpoint) -> i32 {
        self.base + self.span * endpoint as i32
    }

    /// Full range covered by this level alone
    pub const fn range(self) -> ThresholdRange {
        ThresholdRange::new(self.bound(Endpoint::Low), self.bound(Endpoint::High))
    }
}

/// Immutable lookup table from categorical level codes to breakpoints.
#[derive(Debug)]
pub struct BreakpointTable {
    name: &'static str,
    entries: &'static [(i32, Breakpoint)],
}

impl BreakpointTable {
    pub const fn new(name: &'static str, entries: &'static [(i32, Breakpoint)]) -> Self {
        Self { name, entries }
    }

    /// Find the breakpoint for a level code, `None` if the code is not in the table
    pub fn lookup(&self, level: i32) -> Option<Breakpoint> {
        self.entries
            .iter()
            .find(|(code, _)| *code == level)
            .map(|(_, breakpoint)| *breakpoint)
    }

    /// Short name used in log output
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Level codes known to this table, in table order
    pub fn levels(&self) -> impl Iterator<Item = i32> + '_ {
        self.entries.iter().map(|(code, _)| *code)
    }
}

/// Light requirement levels as stored in plant records and the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightLevel {
    FullShade = 1,
    PartialSun = 2,
    FullSun = 3,
}

impl LightLevel {
    pub const ALL: [Self; 3] = [Self::FullShade, Self::PartialSun, Self::FullSun];

    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::FullShade),
            2 => Some(Self::PartialSun),
            3 => Some(Self::FullSun),
            _ => None,
        }
    }

    /// Lux breakpoint for this level
    pub const fn breakpoint(self) -> Breakpoint {
        match self {
            Self::FullShade => Breakpoint::new(0, 1_075),
            Self::PartialSun => Breakpoint::new(1_075, 9_675),
            // The top end is arbitrary, it only has to exceed any real reading
            Self::FullSun => Breakpoint::new(10_750, 989_999),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FullShade => "full shade",
            Self::PartialSun => "partial sun",
            Self::FullSun => "full sun",
        }
    }
}

/// Water requirement levels.
///
/// The soil probe reads lower when the substrate is wetter, so the wettest
/// level owns the lowest range of raw counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterLevel {
    Water = 1,
    Wet = 2,
    Moist = 3,
    Dry = 4,
}

impl WaterLevel {
    pub const ALL: [Self; 4] = [Self::Water, Self::Wet, Self::Moist, Self::Dry];

    pub const fn code(self) -> i32 {
        self as i32
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(Self::Water),
            2 => Some(Self::Wet),
            3 => Some(Self::Moist),
            4 => Some(Self::Dry),
            _ => None,
        }
    }

    /// Raw ADC breakpoint for this level
    pub const fn breakpoint(self) -> Breakpoint {
        match self {
            Self::Water => Breakpoint::new(0, 1_000),
            Self::Wet => Breakpoint::new(1_000, 650),
            Self::Moist => Breakpoint::new(1_650, 650),
            // 4095 is the 12-bit ADC ceiling
            Self::Dry => Breakpoint::new(2_300, 1_795),
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Water => "water",
            Self::Wet => "wet",
            Self::Moist => "moist",
            Self::Dry => "dry",
        }
    }
}

pub const MIN_HARDINESS_ZONE: i32 = 2;
pub const MAX_HARDINESS_ZONE: i32 = 13;

pub const LIGHT_TABLE: BreakpointTable = BreakpointTable::new(
    "light",
    &[
        (LightLevel::FullShade.code(), LightLevel::FullShade.breakpoint()),
        (LightLevel::PartialSun.code(), LightLevel::PartialSun.breakpoint()),
        (LightLevel::FullSun.code(), LightLevel::FullSun.breakpoint()),
    ],
);

pub const WATER_TABLE: BreakpointTable = BreakpointTable::new(
    "water",
    &[
        (WaterLevel::Water.code(), WaterLevel::Water.breakpoint()),
        (WaterLevel::Wet.code(), WaterLevel::Wet.breakpoint()),
        (WaterLevel::Moist.code(), WaterLevel::Moist.breakpoint()),
        (WaterLevel::Dry.code(), WaterLevel::Dry.breakpoint()),
    ],
);

/// Hardiness zone to survival temperature range in °F
pub const HARDINESS_TABLE: BreakpointTable = BreakpointTable::new(
    "temperature",
    &[
        (2, Breakpoint::new(26, 4)),
        (3, Breakpoint::new(32, 4)),
        (4, Breakpoint::new(39, 4)),
        (5, Breakpoint::new(45, 3)),
        (6, Breakpoint::new(50, 4)),
        (7, Breakpoint::new(54, 3)),
        (8, Breakpoint::new(61, 3)),
        (9, Breakpoint::new(64, 4)),
        (10, Breakpoint::new(68, 4)),
        (11, Breakpoint::new(75, 4)),
        (12, Breakpoint::new(80, 20)),
        (13, Breakpoint::new(80, 20)),
    ],
);

/// Relative humidity range (%) every plant is held to
pub const HUMIDITY_RANGE: ThresholdRange = ThresholdRange::new(30, 60);
