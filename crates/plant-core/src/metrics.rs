//! Monitored metrics and per-cycle readings
//!
//! The appliance tracks four metrics for the active plant. They are always
//! processed in the order of [`Metric::ALL`]: light, water, humidity,
//! temperature.

/// One monitored quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Illuminance in lux
    Light,
    /// Raw soil-moisture ADC counts (lower is wetter)
    Water,
    /// Relative humidity in percent
    Humidity,
    /// Air temperature in °F
    Temperature,
}

impl Metric {
    /// Processing order used by every cycle
    pub const ALL: [Self; 4] = [Self::Light, Self::Water, Self::Humidity, Self::Temperature];

    /// Name of the metric's history document inside a plant directory
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Light => "light.txt",
            Self::Water => "water.txt",
            Self::Humidity => "humidity.txt",
            Self::Temperature => "temp.txt",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Water => "water",
            Self::Humidity => "humidity",
            Self::Temperature => "temperature",
        }
    }

    pub const fn unit(self) -> &'static str {
        match self {
            Self::Light => "lux",
            Self::Water => "raw",
            Self::Humidity => "%RH",
            Self::Temperature => "°F",
        }
    }
}

/// One multi-sensor reading taken during a cycle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SensorReading {
    pub light: f32,
    pub water: f32,
    pub humidity: f32,
    pub temperature: f32,
}

impl SensorReading {
    pub const fn new(light: f32, water: f32, humidity: f32, temperature: f32) -> Self {
        Self {
            light,
            water,
            humidity,
            temperature,
        }
    }

    pub const fn get(&self, metric: Metric) -> f32 {
        match metric {
            Metric::Light => self.light,
            Metric::Water => self.water,
            Metric::Humidity => self.humidity,
            Metric::Temperature => self.temperature,
        }
    }
}

/// Rolling averages of the four metrics
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Averages {
    pub light: f32,
    pub water: f32,
    pub humidity: f32,
    pub temperature: f32,
}

impl Averages {
    pub const fn get(&self, metric: Metric) -> f32 {
        match metric {
            Metric::Light => self.light,
            Metric::Water => self.water,
            Metric::Humidity => self.humidity,
            Metric::Temperature => self.temperature,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f32) {
        match metric {
            Metric::Light => self.light = value,
            Metric::Water => self.water = value,
            Metric::Humidity => self.humidity = value,
            Metric::Temperature => self.temperature = value,
        }
    }
}
