//! WASM bindings for hexweave — powers the browser session toolkit.

use chrono::{DateTime, Utc};
use wasm_bindgen::prelude::*;

use hexweave::core::engine::Hexweave;
use hexweave::core::scoring::rank_candidates;
use hexweave::core::timeline::{MapId, WeatherTimeline};
use hexweave::schema::context::{NarrativeContext, TagSet};
use hexweave::schema::creature::{CreatureData, CreatureLibrary};
use hexweave::schema::encounter::{CrRange, EncounterRequest, EncounterTableData, PartyProfile};
use hexweave::schema::hex::CubeCoord;

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Deserialize)]
struct HexInput {
    map: String,
    q: i32,
    r: i32,
}

impl HexInput {
    fn coord(&self) -> CubeCoord {
        CubeCoord::from_axial(self.q, self.r)
    }
}

#[derive(serde::Deserialize)]
struct SynthesizeInput {
    #[serde(flatten)]
    hex: HexInput,
    climate: String,
    day_of_year: u32,
    /// RFC 3339; the host supplies the clock.
    timestamp: DateTime<Utc>,
}

#[derive(serde::Deserialize)]
struct ForecastInput {
    #[serde(flatten)]
    hex: HexInput,
    climate: String,
    day_of_year: u32,
    days: u32,
}

#[derive(serde::Deserialize)]
struct EncounterInput {
    cr_range: Option<CrRange>,
    context: Option<NarrativeContext>,
    party: PartyProfile,
}

#[derive(serde::Deserialize)]
struct CandidateInput {
    id: String,
    tags: TagSet,
}

#[derive(serde::Deserialize)]
struct ScoreInput {
    context: NarrativeContext,
    candidates: Vec<CandidateInput>,
}

fn js_err(what: &str, e: impl std::fmt::Display) -> JsError {
    JsError::new(&format!("{what}: {e}"))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| js_err("Serialization error", e))
}

// ---------------------------------------------------------------------------
// SessionToolkit — the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct SessionToolkit {
    engine: Hexweave,
    timeline: WeatherTimeline,
    creatures: CreatureLibrary,
    tables: Vec<EncounterTableData>,
}

#[wasm_bindgen]
impl SessionToolkit {
    /// Create a toolkit with the bundled climates and an empty timeline.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<SessionToolkit, JsError> {
        let engine = Hexweave::builder()
            .seed(seed)
            .build()
            .map_err(|e| js_err("Engine build error", e))?;
        let timeline = engine.new_timeline();
        Ok(SessionToolkit {
            engine,
            timeline,
            creatures: CreatureLibrary::new(),
            tables: Vec::new(),
        })
    }

    /// Add creatures from a JSON array of creature records. Returns the
    /// library size.
    pub fn load_creatures(&mut self, creatures_json: &str) -> Result<usize, JsError> {
        let creatures: Vec<CreatureData> = serde_json::from_str(creatures_json)
            .map_err(|e| js_err("Invalid creatures JSON", e))?;
        for creature in creatures {
            self.creatures.register(creature);
        }
        Ok(self.creatures.len())
    }

    /// Replace the encounter tables with a JSON array. Returns the count.
    pub fn load_tables(&mut self, tables_json: &str) -> Result<usize, JsError> {
        self.tables = serde_json::from_str(tables_json)
            .map_err(|e| js_err("Invalid tables JSON", e))?;
        Ok(self.tables.len())
    }

    /// Synthesize and store weather for one hex.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "map": "overland",
    ///   "q": 3,
    ///   "r": -1,
    ///   "climate": "Temperate",
    ///   "day_of_year": 172,
    ///   "timestamp": "2024-06-21T08:00:00Z"
    /// }
    /// ```
    pub fn synthesize(&mut self, input_json: &str) -> Result<String, JsError> {
        let input: SynthesizeInput = serde_json::from_str(input_json)
            .map_err(|e| js_err("Invalid synthesize JSON", e))?;
        let state = self
            .engine
            .advance_hex(
                &mut self.timeline,
                &MapId::new(input.hex.map.as_str()),
                input.hex.coord(),
                &input.climate,
                input.day_of_year,
                input.timestamp,
            )
            .map_err(|e| js_err("Synthesis error", e))?;
        to_json(&state)
    }

    /// Forecast a stored hex. Returns a JSON array, or `null` for an
    /// unknown hex.
    pub fn forecast(&mut self, input_json: &str) -> Result<String, JsError> {
        let input: ForecastInput = serde_json::from_str(input_json)
            .map_err(|e| js_err("Invalid forecast JSON", e))?;
        let forecasts = self
            .engine
            .forecast(
                &self.timeline,
                &MapId::new(input.hex.map.as_str()),
                input.hex.coord(),
                &input.climate,
                input.day_of_year,
                input.days,
            )
            .map_err(|e| js_err("Forecast error", e))?;
        to_json(&forecasts)
    }

    /// Current weather of a hex as JSON, or `null`.
    pub fn weather_at(&self, map: &str, q: i32, r: i32) -> Result<String, JsError> {
        let state = self
            .timeline
            .get_weather(&MapId::new(map), CubeCoord::from_axial(q, r));
        to_json(&state)
    }

    /// Drop weather older than `days` before `now` (RFC 3339). Returns the
    /// number of hexes removed.
    pub fn prune(&mut self, days: i64, now: &str) -> Result<usize, JsError> {
        let now: DateTime<Utc> = DateTime::parse_from_rfc3339(now)
            .map_err(|e| js_err("Invalid timestamp", e))?
            .with_timezone(&Utc);
        Ok(self.timeline.prune_older_than(days, now))
    }

    /// Generate an encounter from the loaded tables and creatures.
    ///
    /// Expected JSON shape:
    /// ```json
    /// {
    ///   "cr_range": { "min": 0, "max": 2 },
    ///   "context": { "terrain": "Forest", "factions": [] },
    ///   "party": { "level": 3, "size": 4 }
    /// }
    /// ```
    pub fn generate_encounter(&mut self, request_json: &str) -> Result<String, JsError> {
        let input: EncounterInput = serde_json::from_str(request_json)
            .map_err(|e| js_err("Invalid encounter JSON", e))?;
        let request = EncounterRequest {
            cr_range: input
                .cr_range
                .unwrap_or(self.engine.config().default_cr_range),
            context: input.context,
            party: input.party,
        };
        let encounter = self
            .engine
            .generate_encounter(&self.tables, &self.creatures, &request)
            .map_err(|e| js_err("Encounter error", e))?;
        to_json(&encounter)
    }

    /// Rank tagged candidates against a context. Returns a JSON array of
    /// scored candidates, best first.
    pub fn score_context(&self, input_json: &str) -> Result<String, JsError> {
        let input: ScoreInput = serde_json::from_str(input_json)
            .map_err(|e| js_err("Invalid score JSON", e))?;
        let ranked = rank_candidates(
            input.candidates.iter().map(|c| (c.id.clone(), &c.tags)),
            &input.context,
        );
        to_json(&ranked)
    }

    /// Return JSON array of available climate names.
    pub fn climates(&self) -> String {
        serde_json::to_string(&self.engine.climates().names())
            .unwrap_or_else(|_| "[]".to_string())
    }

    /// Make `map` the active map, or clear it with an empty string.
    pub fn set_active_map(&mut self, map: &str) {
        let map = (!map.is_empty()).then(|| MapId::new(map));
        self.timeline.set_active_map(map);
    }

    /// Current weather of every hex on the active map as a JSON array.
    pub fn active_weather(&self) -> Result<String, JsError> {
        to_json(&self.timeline.active_entries())
    }

    /// Reset the session with a new seed, keeping loaded data.
    pub fn reset(&mut self, seed: u64) -> Result<(), JsError> {
        let fresh = SessionToolkit::new(seed)?;
        self.engine = fresh.engine;
        self.timeline = fresh.timeline;
        Ok(())
    }
}
