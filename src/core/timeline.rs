/// Weather timeline store — current, historical and forecast weather per hex.
///
/// Keyed by map identity and cube coordinate. The store holds no locks:
/// callers keep a single writer and prefer `set_weather_batch` as the unit
/// of atomicity. Listeners are called synchronously on every write.

use chrono::{DateTime, Duration, Utc};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

use crate::core::climate::ClimateTemplate;
use crate::core::config::EngineConfig;
use crate::core::rng::derive_seed;
use crate::core::synth::synthesize;
use crate::schema::hex::CubeCoord;
use crate::schema::weather::{
    Season, WeatherForecast, WeatherHistoryEntry, WeatherState, WeatherType,
};

#[derive(Debug, Error, PartialEq)]
pub enum TimelineError {
    #[error("cube coordinate {0} violates q + r + s = 0")]
    InvalidCoordinate(CubeCoord),
    #[error("batch rejected: entry {index} has invalid coordinate {coord}")]
    InvalidBatch { index: usize, coord: CubeCoord },
}

/// Identity of a map whose hexes carry weather.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapId(pub String);

impl MapId {
    pub fn new(id: impl Into<String>) -> Self {
        MapId(id.into())
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct HexKey {
    map: MapId,
    coord: CubeCoord,
}

#[derive(Debug, Clone)]
struct HexTimeline {
    current: WeatherState,
    /// Oldest first.
    history: VecDeque<WeatherHistoryEntry>,
}

/// Change notifications delivered to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    Updated { map: MapId, hex: CubeCoord },
    BatchUpdated { map: MapId, hexes: Vec<CubeCoord> },
    MapCleared { map: MapId, removed: usize },
    AllCleared,
    Pruned { removed: usize },
    ActiveMapChanged { map: Option<MapId> },
}

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub type Listener = Box<dyn FnMut(&TimelineEvent)>;

pub struct WeatherTimeline {
    entries: FxHashMap<HexKey, HexTimeline>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    active_map: Option<MapId>,
    config: EngineConfig,
}

impl Default for WeatherTimeline {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl WeatherTimeline {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            entries: FxHashMap::default(),
            listeners: Vec::new(),
            next_subscription: 0,
            active_map: None,
            config,
        }
    }

    /// Replace the weather of one hex; the previous state moves to history.
    pub fn set_weather(&mut self, map: &MapId, state: WeatherState) -> Result<(), TimelineError> {
        if !state.hex.is_valid() {
            return Err(TimelineError::InvalidCoordinate(state.hex));
        }
        let hex = state.hex;
        self.write(map, state);
        self.notify(&TimelineEvent::Updated {
            map: map.clone(),
            hex,
        });
        Ok(())
    }

    /// Write many hexes at once. Either every entry is written or none is,
    /// and subscribers are notified once.
    pub fn set_weather_batch(
        &mut self,
        map: &MapId,
        states: Vec<WeatherState>,
    ) -> Result<(), TimelineError> {
        if let Some((index, state)) = states.iter().enumerate().find(|(_, s)| !s.hex.is_valid()) {
            return Err(TimelineError::InvalidBatch {
                index,
                coord: state.hex,
            });
        }
        let hexes: Vec<CubeCoord> = states.iter().map(|s| s.hex).collect();
        for state in states {
            self.write(map, state);
        }
        tracing::debug!("batch wrote {} hexes on map {}", hexes.len(), map);
        self.notify(&TimelineEvent::BatchUpdated {
            map: map.clone(),
            hexes,
        });
        Ok(())
    }

    fn write(&mut self, map: &MapId, state: WeatherState) {
        let key = HexKey {
            map: map.clone(),
            coord: state.hex,
        };
        let window = self.config.history_window;
        match self.entries.get_mut(&key) {
            Some(timeline) => {
                let previous = std::mem::replace(&mut timeline.current, state);
                timeline.history.push_back(WeatherHistoryEntry {
                    weather: previous.sample(),
                    date: previous.last_update,
                });
                while timeline.history.len() > window {
                    timeline.history.pop_front();
                }
            }
            None => {
                self.entries.insert(
                    key,
                    HexTimeline {
                        current: state,
                        history: VecDeque::new(),
                    },
                );
            }
        }
    }

    pub fn get_weather(&self, map: &MapId, coord: CubeCoord) -> Option<&WeatherState> {
        self.entries
            .get(&HexKey {
                map: map.clone(),
                coord,
            })
            .map(|t| &t.current)
    }

    /// Past states of a hex, oldest first. Empty for unknown hexes.
    pub fn history(&self, map: &MapId, coord: CubeCoord) -> Vec<&WeatherHistoryEntry> {
        self.entries
            .get(&HexKey {
                map: map.clone(),
                coord,
            })
            .map(|t| t.history.iter().collect())
            .unwrap_or_default()
    }

    /// Drop every hex of one map. Returns how many were removed.
    pub fn clear_map(&mut self, map: &MapId) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| &key.map != map);
        let removed = before - self.entries.len();
        self.notify(&TimelineEvent::MapCleared {
            map: map.clone(),
            removed,
        });
        removed
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
        self.notify(&TimelineEvent::AllCleared);
    }

    /// Remove hexes whose current weather is older than `days` relative to
    /// `now`, and trim older history from the rest. Returns removed hexes.
    ///
    /// A cutoff outside the representable range prunes nothing.
    pub fn prune_older_than(&mut self, days: i64, now: DateTime<Utc>) -> usize {
        let cutoff = Duration::try_days(days)
            .and_then(|age| now.checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let before = self.entries.len();
        self.entries.retain(|_, timeline| {
            if timeline.current.last_update < cutoff {
                return false;
            }
            timeline.history.retain(|entry| entry.date >= cutoff);
            true
        });
        let removed = before - self.entries.len();
        if removed > 0 {
            tracing::debug!("pruned {} stale hexes", removed);
        }
        self.notify(&TimelineEvent::Pruned { removed });
        removed
    }

    pub fn subscribe(&mut self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: &TimelineEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn set_active_map(&mut self, map: Option<MapId>) {
        self.active_map = map.clone();
        self.notify(&TimelineEvent::ActiveMapChanged { map });
    }

    pub fn active_map(&self) -> Option<&MapId> {
        self.active_map.as_ref()
    }

    /// Current weather of every hex on the active map, ordered by `(r, q)`.
    pub fn active_entries(&self) -> Vec<&WeatherState> {
        let Some(active) = &self.active_map else {
            return Vec::new();
        };
        let mut states: Vec<&WeatherState> = self
            .entries
            .iter()
            .filter(|(key, _)| &key.map == active)
            .map(|(_, t)| &t.current)
            .collect();
        states.sort_by_key(|s| (s.hex.r, s.hex.q));
        states
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Project the weather of a stored hex forward without writing it.
    ///
    /// Returns `None` when the hex has no current weather.
    pub fn forecast(
        &self,
        map: &MapId,
        coord: CubeCoord,
        climate: &ClimateTemplate,
        day_of_year: u32,
        days: u32,
        seed: u64,
    ) -> Option<Vec<WeatherForecast>> {
        let current = self.get_weather(map, coord)?;
        Some(forecast_from(current, climate, day_of_year, days, seed, &self.config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

/// Chain synthesizer calls forward from `start`, one per day.
///
/// `days` is capped at the configured horizon. Each day's season follows
/// its own day of year, and confidence decays with distance.
pub fn forecast_from(
    start: &WeatherState,
    climate: &ClimateTemplate,
    day_of_year: u32,
    days: u32,
    seed: u64,
    config: &EngineConfig,
) -> Vec<WeatherForecast> {
    let days = days.min(config.forecast_horizon_days);
    let mut previous: WeatherType = start.current.weather_type;
    let mut forecasts = Vec::with_capacity(days as usize);

    for ahead in 1..=days {
        let day = (day_of_year % 365 + ahead % 365) % 365;
        let season = Season::from_day_of_year(day);
        let sample = synthesize(
            climate,
            season,
            day,
            Some(previous),
            derive_seed(seed, u64::from(ahead)),
        );
        previous = sample.condition.weather_type;
        forecasts.push(WeatherForecast {
            weather: sample,
            date: start
                .last_update
                .checked_add_signed(Duration::days(i64::from(ahead)))
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            confidence: config.forecast_confidence(ahead),
        });
    }

    forecasts
}
