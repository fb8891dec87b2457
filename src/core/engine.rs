/// Session engine: climates, config and a seeded generation counter.
///
/// Every call derives a fresh seed from the engine seed and the number of
/// generations so far, so a session replays identically from the same seed.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::climate::{ClimateError, ClimateRegistry};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::generator::{generate_encounter, EncounterError};
use crate::core::rng::{derive_seed, seeded};
use crate::core::synth::synthesize;
use crate::core::timeline::{MapId, TimelineError, WeatherTimeline};
use crate::schema::creature::CreatureSource;
use crate::schema::encounter::{EncounterRequest, EncounterTableData, GeneratedEncounter};
use crate::schema::hex::CubeCoord;
use crate::schema::weather::{Season, WeatherForecast, WeatherSample, WeatherState, WeatherType};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("climate error: {0}")]
    Climate(#[from] ClimateError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("encounter error: {0}")]
    Encounter(#[from] EncounterError),
    #[error("timeline error: {0}")]
    Timeline(#[from] TimelineError),
}

/// The top-level engine. Built via `Hexweave::builder()`.
pub struct Hexweave {
    climates: ClimateRegistry,
    config: EngineConfig,
    seed: u64,
    generation_count: u64,
}

/// Builder for constructing a `Hexweave` engine.
pub struct HexweaveBuilder {
    seed: u64,
    config: Option<EngineConfig>,
    config_ron: Option<String>,
    climates: Option<ClimateRegistry>,
    extra_climates_ron: Vec<String>,
}

impl Hexweave {
    pub fn builder() -> HexweaveBuilder {
        HexweaveBuilder {
            seed: 0,
            config: None,
            config_ron: None,
            climates: None,
            extra_climates_ron: Vec::new(),
        }
    }

    fn next_seed(&mut self) -> u64 {
        let seed = derive_seed(self.seed, self.generation_count);
        self.generation_count += 1;
        seed
    }

    /// Synthesize weather for a named climate. The season follows the day.
    pub fn synthesize(
        &mut self,
        climate: &str,
        day_of_year: u32,
        previous: Option<WeatherType>,
    ) -> Result<WeatherSample, EngineError> {
        let seed = self.next_seed();
        let template = self.climates.get(climate)?;
        let season = Season::from_day_of_year(day_of_year);
        Ok(synthesize(template, season, day_of_year, previous, seed))
    }

    /// Advance one hex: synthesize from its current weather and write the
    /// result to the timeline.
    pub fn advance_hex(
        &mut self,
        timeline: &mut WeatherTimeline,
        map: &MapId,
        coord: CubeCoord,
        climate: &str,
        day_of_year: u32,
        now: DateTime<Utc>,
    ) -> Result<WeatherState, EngineError> {
        if !coord.is_valid() {
            return Err(TimelineError::InvalidCoordinate(coord).into());
        }
        let previous = timeline
            .get_weather(map, coord)
            .map(|s| s.current.weather_type);
        let state = self.synthesize(climate, day_of_year, previous)?.at(coord, now);
        timeline.set_weather(map, state.clone())?;
        Ok(state)
    }

    /// Advance many hexes and write them as one batch.
    pub fn advance_map(
        &mut self,
        timeline: &mut WeatherTimeline,
        map: &MapId,
        coords: &[CubeCoord],
        climate: &str,
        day_of_year: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<WeatherState>, EngineError> {
        let mut states = Vec::with_capacity(coords.len());
        for &coord in coords {
            let previous = timeline
                .get_weather(map, coord)
                .map(|s| s.current.weather_type);
            states.push(self.synthesize(climate, day_of_year, previous)?.at(coord, now));
        }
        timeline.set_weather_batch(map, states.clone())?;
        Ok(states)
    }

    /// Forecast a stored hex. `None` when the hex has no weather yet.
    pub fn forecast(
        &mut self,
        timeline: &WeatherTimeline,
        map: &MapId,
        coord: CubeCoord,
        climate: &str,
        day_of_year: u32,
        days: u32,
    ) -> Result<Option<Vec<WeatherForecast>>, EngineError> {
        let seed = self.next_seed();
        let template = self.climates.get(climate)?;
        Ok(timeline.forecast(map, coord, template, day_of_year, days, seed))
    }

    pub fn generate_encounter<S: CreatureSource + ?Sized>(
        &mut self,
        tables: &[EncounterTableData],
        source: &S,
        request: &EncounterRequest,
    ) -> Result<GeneratedEncounter, EngineError> {
        let mut rng = seeded(self.next_seed());
        Ok(generate_encounter(tables, source, request, &self.config, &mut rng)?)
    }

    /// An empty timeline sharing this engine's config.
    pub fn new_timeline(&self) -> WeatherTimeline {
        WeatherTimeline::new(self.config.clone())
    }

    pub fn climates(&self) -> &ClimateRegistry {
        &self.climates
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl HexweaveBuilder {
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Provide a config directly.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Provide a config as RON text.
    pub fn config_ron(mut self, input: &str) -> Self {
        self.config_ron = Some(input.to_string());
        self
    }

    /// Replace the bundled climates.
    pub fn with_climates(mut self, climates: ClimateRegistry) -> Self {
        self.climates = Some(climates);
        self
    }

    /// Add climates from RON text; same-named climates override earlier ones.
    pub fn climates_ron(mut self, input: &str) -> Self {
        self.extra_climates_ron.push(input.to_string());
        self
    }

    pub fn build(self) -> Result<Hexweave, EngineError> {
        let config = match (self.config, self.config_ron) {
            (_, Some(ron_text)) => EngineConfig::parse_ron(&ron_text)?,
            (Some(config), None) => {
                config.validate()?;
                config
            }
            (None, None) => EngineConfig::default(),
        };

        let mut climates = match self.climates {
            Some(climates) => climates,
            None => ClimateRegistry::bundled()?,
        };
        for ron_text in &self.extra_climates_ron {
            let extra = ClimateRegistry::parse_ron(ron_text)?;
            for name in extra.names() {
                climates.register(extra.get(name)?.sanitized());
            }
        }

        Ok(Hexweave {
            climates,
            config,
            seed: self.seed,
            generation_count: 0,
        })
    }
}
