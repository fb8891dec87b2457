/// Climate templates — per-climate temperature and weather-probability tables.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::schema::weather::{Season, WeatherType};

/// Bundled climate definitions, embedded so lookups never touch the disk.
const BUNDLED_CLIMATES: &str = include_str!("../../climate_data/climates.ron");

/// Tolerance for a season's probabilities summing to 1.0.
pub const PROBABILITY_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum ClimateError {
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unknown climate: {0}")]
    UnknownClimate(String),
}

/// Degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

/// Ordered `(type, probability)` lists, one per season.
///
/// Order matters: the synthesizer walks the list cumulatively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalProbabilities {
    pub spring: Vec<(WeatherType, f64)>,
    pub summer: Vec<(WeatherType, f64)>,
    pub autumn: Vec<(WeatherType, f64)>,
    pub winter: Vec<(WeatherType, f64)>,
}

impl SeasonalProbabilities {
    pub fn for_season(&self, season: Season) -> &[(WeatherType, f64)] {
        match season {
            Season::Spring => &self.spring,
            Season::Summer => &self.summer,
            Season::Autumn => &self.autumn,
            Season::Winter => &self.winter,
        }
    }

    fn for_season_mut(&mut self, season: Season) -> &mut Vec<(WeatherType, f64)> {
        match season {
            Season::Spring => &mut self.spring,
            Season::Summer => &mut self.summer,
            Season::Autumn => &mut self.autumn,
            Season::Winter => &mut self.winter,
        }
    }
}

/// Static configuration of a named climate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateTemplate {
    pub name: String,
    pub base_temperature: TemperatureRange,
    /// Amplitude of the yearly temperature swing, in degrees.
    pub seasonal_variation: f64,
    /// Typical hours a weather condition persists.
    pub transition_speed: f64,
    pub weather_probabilities: SeasonalProbabilities,
}

impl ClimateTemplate {
    /// Sum of one season's probabilities.
    pub fn probability_sum(&self, season: Season) -> f64 {
        self.weather_probabilities
            .for_season(season)
            .iter()
            .map(|(_, p)| p)
            .sum()
    }

    /// Return a copy with out-of-range hand-authored values clamped.
    ///
    /// Each fix is logged as a warning; nothing here fails.
    pub fn sanitized(&self) -> ClimateTemplate {
        let mut out = self.clone();

        if !(out.transition_speed.is_finite() && out.transition_speed > 0.0) {
            tracing::warn!(
                "climate {}: transition speed {} out of range, using 1h",
                out.name,
                out.transition_speed
            );
            out.transition_speed = 1.0;
        }

        if out.base_temperature.min > out.base_temperature.max {
            tracing::warn!(
                "climate {}: base temperature bounds inverted, swapping",
                out.name
            );
            std::mem::swap(&mut out.base_temperature.min, &mut out.base_temperature.max);
        }

        if !out.seasonal_variation.is_finite() {
            tracing::warn!("climate {}: non-finite seasonal variation, using 0", out.name);
            out.seasonal_variation = 0.0;
        }

        for season in Season::ALL {
            let name = out.name.clone();
            for (weather_type, p) in out.weather_probabilities.for_season_mut(season).iter_mut() {
                if !(p.is_finite() && *p >= 0.0) {
                    tracing::warn!(
                        "climate {}: {:?} probability {} for {:?} clamped to 0",
                        name,
                        season,
                        p,
                        weather_type
                    );
                    *p = 0.0;
                }
            }
        }

        out
    }
}

/// Named lookup over climate templates.
#[derive(Debug, Clone, Default)]
pub struct ClimateRegistry {
    templates: HashMap<String, ClimateTemplate>,
}

impl ClimateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six bundled climates: Temperate, Arctic, Tropical, Desert,
    /// Mountain and Coastal.
    pub fn bundled() -> Result<ClimateRegistry, ClimateError> {
        Self::parse_ron(BUNDLED_CLIMATES)
    }

    /// Parse a RON list of climate templates.
    pub fn parse_ron(input: &str) -> Result<ClimateRegistry, ClimateError> {
        let templates: Vec<ClimateTemplate> = ron::from_str(input)?;
        let mut registry = ClimateRegistry::new();
        for template in templates {
            registry.register(template);
        }
        Ok(registry)
    }

    /// Add or replace a template under its own name.
    pub fn register(&mut self, template: ClimateTemplate) {
        self.templates.insert(template.name.clone(), template);
    }

    pub fn get(&self, name: &str) -> Result<&ClimateTemplate, ClimateError> {
        self.templates
            .get(name)
            .ok_or_else(|| ClimateError::UnknownClimate(name.to_string()))
    }

    /// Template names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
