use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::hex::CubeCoord;

/// The closed set of weather kinds the synthesizer can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WeatherType {
    Clear,
    Cloudy,
    Rain,
    Storm,
    Snow,
    Fog,
    Wind,
    Hot,
    Cold,
}

impl WeatherType {
    pub const ALL: [WeatherType; 9] = [
        WeatherType::Clear,
        WeatherType::Cloudy,
        WeatherType::Rain,
        WeatherType::Storm,
        WeatherType::Snow,
        WeatherType::Fog,
        WeatherType::Wind,
        WeatherType::Hot,
        WeatherType::Cold,
    ];

    /// Lowercase tag string, matching the tags used in narrative contexts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Clear => "clear",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snow => "snow",
            Self::Fog => "fog",
            Self::Wind => "wind",
            Self::Hot => "hot",
            Self::Cold => "cold",
        }
    }

    /// Position in `ALL`, used to index the fixed per-type tables.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_precipitating(&self) -> bool {
        matches!(self, Self::Rain | Self::Storm | Self::Snow)
    }
}

/// Meteorological season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];

    /// Northern-hemisphere meteorological season for a 0-based day of year.
    pub fn from_day_of_year(day: u32) -> Season {
        match day % 365 {
            59..=150 => Season::Spring,
            151..=242 => Season::Summer,
            243..=333 => Season::Autumn,
            _ => Season::Winter,
        }
    }
}

/// One weather condition: what kind, how strong, and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherCondition {
    pub weather_type: WeatherType,
    /// 0.0 (barely noticeable) ..= 1.0 (extreme).
    pub severity: f64,
    /// Expected duration in hours.
    pub duration: f64,
}

impl WeatherCondition {
    /// Short human-readable description, e.g. "heavy rain".
    pub fn describe(&self) -> String {
        let intensity = if self.severity < 0.33 {
            "light"
        } else if self.severity < 0.66 {
            "moderate"
        } else {
            "heavy"
        };
        format!("{} {}", intensity, self.weather_type.label())
    }
}

/// A hex-independent weather sample produced by the synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherSample {
    pub condition: WeatherCondition,
    /// Degrees Celsius.
    pub temperature: f64,
    /// km/h.
    pub wind_speed: f64,
    /// mm/h.
    pub precipitation: f64,
    /// Metres.
    pub visibility: f64,
}

impl WeatherSample {
    /// Stamp this sample onto a hex at a point in time.
    pub fn at(self, hex: CubeCoord, last_update: DateTime<Utc>) -> WeatherState {
        WeatherState {
            hex,
            current: self.condition,
            temperature: self.temperature,
            wind_speed: self.wind_speed,
            precipitation: self.precipitation,
            visibility: self.visibility,
            last_update,
        }
    }
}

/// Weather currently assigned to a hex.
///
/// Replaced wholesale on every advance; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherState {
    pub hex: CubeCoord,
    pub current: WeatherCondition,
    pub temperature: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    pub visibility: f64,
    pub last_update: DateTime<Utc>,
}

impl WeatherState {
    pub fn sample(&self) -> WeatherSample {
        WeatherSample {
            condition: self.current,
            temperature: self.temperature,
            wind_speed: self.wind_speed,
            precipitation: self.precipitation,
            visibility: self.visibility,
        }
    }
}

/// A past weather state for a hex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherHistoryEntry {
    pub weather: WeatherSample,
    pub date: DateTime<Utc>,
}

/// A projected weather state, not committed to any store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherForecast {
    pub weather: WeatherSample,
    pub date: DateTime<Utc>,
    /// 0.0 ..= 1.0, decreasing with look-ahead distance.
    pub confidence: f64,
}
