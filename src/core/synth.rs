/// Weather synthesizer — one reproducible weather sample per call.
///
/// Picks a weather type from the climate's seasonal distribution (blended
/// with a transition-affinity matrix when the previous weather is known),
/// then derives severity, duration, temperature, wind, precipitation and
/// visibility. Output depends only on the inputs and the seed.

use rand::Rng;
use std::f64::consts::PI;

use crate::core::climate::{ClimateTemplate, PROBABILITY_TOLERANCE};
use crate::core::rng::{seeded, uniform, unit};
use crate::schema::weather::{Season, WeatherCondition, WeatherSample, WeatherType};

/// Weight of the climate baseline when blending with the previous state.
pub const BASELINE_WEIGHT: f64 = 0.6;
/// Weight of the transition-affinity row when blending.
pub const TRANSITION_WEIGHT: f64 = 0.4;
/// Clear-sky visibility in metres.
pub const BASE_VISIBILITY: f64 = 10_000.0;

/// Affinity of each previous type (row) toward each next type (column),
/// both in `WeatherType::ALL` order. Rows sum to 1.0.
const TRANSITION_AFFINITY: [[f64; 9]; 9] = [
    // Clear Cloudy Rain  Storm  Snow   Fog   Wind   Hot   Cold
    [0.40, 0.30, 0.05, 0.01, 0.02, 0.07, 0.08, 0.05, 0.02], // Clear
    [0.25, 0.30, 0.20, 0.05, 0.07, 0.08, 0.05, 0.00, 0.00], // Cloudy
    [0.10, 0.30, 0.30, 0.15, 0.03, 0.07, 0.05, 0.00, 0.00], // Rain
    [0.05, 0.25, 0.35, 0.20, 0.03, 0.02, 0.10, 0.00, 0.00], // Storm
    [0.10, 0.25, 0.03, 0.05, 0.35, 0.05, 0.07, 0.00, 0.10], // Snow
    [0.25, 0.30, 0.15, 0.02, 0.05, 0.20, 0.03, 0.00, 0.00], // Fog
    [0.25, 0.25, 0.10, 0.10, 0.05, 0.00, 0.20, 0.02, 0.03], // Wind
    [0.40, 0.10, 0.02, 0.08, 0.00, 0.00, 0.05, 0.35, 0.00], // Hot
    [0.25, 0.15, 0.02, 0.02, 0.20, 0.06, 0.10, 0.00, 0.20], // Cold
];

/// Inclusive-exclusive severity band each type is drawn from.
pub fn severity_band(weather_type: WeatherType) -> (f64, f64) {
    match weather_type {
        WeatherType::Clear => (0.0, 0.2),
        WeatherType::Cloudy => (0.1, 0.5),
        WeatherType::Rain => (0.3, 0.8),
        WeatherType::Storm => (0.7, 1.0),
        WeatherType::Snow => (0.3, 0.9),
        WeatherType::Fog => (0.3, 0.8),
        WeatherType::Wind => (0.3, 0.9),
        WeatherType::Hot => (0.4, 1.0),
        WeatherType::Cold => (0.4, 1.0),
    }
}

/// Base wind speed (km/h) before severity scaling.
fn base_wind(weather_type: WeatherType) -> f64 {
    match weather_type {
        WeatherType::Clear => 5.0,
        WeatherType::Cloudy => 10.0,
        WeatherType::Rain => 15.0,
        WeatherType::Storm => 45.0,
        WeatherType::Snow => 15.0,
        WeatherType::Fog => 3.0,
        WeatherType::Wind => 40.0,
        WeatherType::Hot => 5.0,
        WeatherType::Cold => 15.0,
    }
}

/// Base precipitation (mm/h); zero for every non-precipitating type.
fn base_precipitation(weather_type: WeatherType) -> f64 {
    match weather_type {
        WeatherType::Rain => 5.0,
        WeatherType::Storm => 20.0,
        WeatherType::Snow => 3.0,
        _ => 0.0,
    }
}

/// Fraction of `BASE_VISIBILITY` at zero severity.
fn visibility_factor(weather_type: WeatherType) -> f64 {
    match weather_type {
        WeatherType::Clear => 1.0,
        WeatherType::Cloudy => 0.9,
        WeatherType::Rain => 0.7,
        WeatherType::Storm => 0.4,
        WeatherType::Snow => 0.5,
        WeatherType::Fog => 0.2,
        WeatherType::Wind => 0.85,
        WeatherType::Hot => 0.95,
        WeatherType::Cold => 0.9,
    }
}

pub fn wind_speed(weather_type: WeatherType, severity: f64) -> f64 {
    base_wind(weather_type) * (0.5 + severity)
}

pub fn precipitation(weather_type: WeatherType, severity: f64) -> f64 {
    base_precipitation(weather_type) * (0.2 + severity)
}

pub fn visibility(weather_type: WeatherType, severity: f64) -> f64 {
    BASE_VISIBILITY * visibility_factor(weather_type) * (1.0 - 0.4 * severity)
}

/// Seasonal temperature curve without noise: coldest at day 0,
/// warmest half a year later.
pub fn seasonal_temperature(climate: &ClimateTemplate, day_of_year: u32) -> f64 {
    let mid = (climate.base_temperature.min + climate.base_temperature.max) / 2.0;
    let phase = 2.0 * PI * f64::from(day_of_year) / 365.0 - PI / 2.0;
    mid + climate.seasonal_variation * phase.sin()
}

/// The distribution the next weather type is drawn from.
///
/// Returns `None` when the climate's table is empty or corrupt, in which
/// case callers fall back to clear skies. Only types present in the
/// climate's table are candidates; negative or non-finite probabilities
/// count as zero.
pub fn transition_distribution(
    climate: &ClimateTemplate,
    season: Season,
    previous: Option<WeatherType>,
) -> Option<Vec<(WeatherType, f64)>> {
    let table = climate.weather_probabilities.for_season(season);
    let baseline: Vec<(WeatherType, f64)> = table
        .iter()
        .map(|(t, p)| (*t, if p.is_finite() && *p > 0.0 { *p } else { 0.0 }))
        .collect();

    let baseline = normalize(baseline)?;

    let blended = match previous {
        None => baseline,
        Some(prev) => {
            let row = &TRANSITION_AFFINITY[prev.index()];
            let row_sum: f64 = baseline.iter().map(|(t, _)| row[t.index()]).sum();
            if row_sum > 0.0 {
                let mixed = baseline
                    .iter()
                    .map(|(t, p)| {
                        let affinity = row[t.index()] / row_sum;
                        (*t, BASELINE_WEIGHT * p + TRANSITION_WEIGHT * affinity)
                    })
                    .collect();
                normalize(mixed)?
            } else {
                baseline
            }
        }
    };

    let total: f64 = blended.iter().map(|(_, p)| p).sum();
    if (total - 1.0).abs() > PROBABILITY_TOLERANCE {
        return None;
    }
    Some(blended)
}

fn normalize(dist: Vec<(WeatherType, f64)>) -> Option<Vec<(WeatherType, f64)>> {
    let total: f64 = dist.iter().map(|(_, p)| p).sum();
    if dist.is_empty() || !total.is_finite() || total <= 0.0 {
        return None;
    }
    Some(dist.into_iter().map(|(t, p)| (t, p / total)).collect())
}

/// Walk the cumulative distribution; float drift past the end picks the
/// last entry.
fn pick_weather_type(dist: &[(WeatherType, f64)], roll: f64) -> WeatherType {
    let mut cumulative = 0.0;
    for (weather_type, p) in dist {
        cumulative += p;
        if roll < cumulative {
            return *weather_type;
        }
    }
    dist.last().map(|(t, _)| *t).unwrap_or(WeatherType::Clear)
}

/// Synthesize weather from an integer seed.
pub fn synthesize(
    climate: &ClimateTemplate,
    season: Season,
    day_of_year: u32,
    previous: Option<WeatherType>,
    seed: u64,
) -> WeatherSample {
    let mut rng = seeded(seed);
    synthesize_with(climate, season, day_of_year, previous, &mut rng)
}

/// Synthesize weather drawing from a caller-threaded generator.
///
/// Draw order is fixed: type, severity, duration, temperature noise.
pub fn synthesize_with<R: Rng + ?Sized>(
    climate: &ClimateTemplate,
    season: Season,
    day_of_year: u32,
    previous: Option<WeatherType>,
    rng: &mut R,
) -> WeatherSample {
    let roll = unit(rng);
    let weather_type = match transition_distribution(climate, season, previous) {
        Some(dist) => pick_weather_type(&dist, roll),
        None => {
            tracing::warn!(
                "climate {}: unusable {:?} weather table, defaulting to clear",
                climate.name,
                season
            );
            WeatherType::Clear
        }
    };

    let (lo, hi) = severity_band(weather_type);
    let severity = uniform(rng, lo, hi);

    let transition_speed = if climate.transition_speed.is_finite() && climate.transition_speed > 0.0 {
        climate.transition_speed
    } else {
        1.0
    };
    let duration = transition_speed * uniform(rng, 0.5, 1.5);

    let temperature = seasonal_temperature(climate, day_of_year) + uniform(rng, -5.0, 5.0);

    tracing::debug!(
        "synthesized {:?} (severity {:.2}) for {} on day {}",
        weather_type,
        severity,
        climate.name,
        day_of_year
    );

    WeatherSample {
        condition: WeatherCondition {
            weather_type,
            severity,
            duration,
        },
        temperature,
        wind_speed: wind_speed(weather_type, severity),
        precipitation: precipitation(weather_type, severity),
        visibility: visibility(weather_type, severity),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::climate::{ClimateRegistry, SeasonalProbabilities, TemperatureRange};

    fn temperate() -> ClimateTemplate {
        ClimateRegistry::bundled()
            .unwrap()
            .get("Temperate")
            .unwrap()
            .clone()
    }

    fn single_type_climate(weather_type: WeatherType) -> ClimateTemplate {
        let table = vec![(weather_type, 1.0)];
        ClimateTemplate {
            name: "Test".to_string(),
            base_temperature: TemperatureRange { min: 0.0, max: 20.0 },
            seasonal_variation: 10.0,
            transition_speed: 10.0,
            weather_probabilities: SeasonalProbabilities {
                spring: table.clone(),
                summer: table.clone(),
                autumn: table.clone(),
                winter: table,
            },
        }
    }

    #[test]
    fn affinity_rows_sum_to_one() {
        for row in TRANSITION_AFFINITY.iter() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "row sums to {}", sum);
        }
    }

    #[test]
    fn same_seed_same_weather() {
        let climate = temperate();
        let a = synthesize(&climate, Season::Summer, 200, None, 12345);
        let b = synthesize(&climate, Season::Summer, 200, None, 12345);
        assert_eq!(a, b);
        assert_eq!(ron::to_string(&a).unwrap(), ron::to_string(&b).unwrap());
    }

    #[test]
    fn seeds_produce_spread() {
        let climate = temperate();
        let samples: Vec<WeatherSample> = (0..50)
            .map(|seed| synthesize(&climate, Season::Summer, 200, None, seed))
            .collect();
        let mut temps: Vec<u64> = samples.iter().map(|s| s.temperature.to_bits()).collect();
        temps.sort_unstable();
        temps.dedup();
        assert!(temps.len() > 25);

        let mut types: Vec<WeatherType> = samples.iter().map(|s| s.condition.weather_type).collect();
        types.sort();
        types.dedup();
        assert!(types.len() > 1);
    }

    #[test]
    fn severity_within_band() {
        let registry = ClimateRegistry::bundled().unwrap();
        for name in registry.names() {
            let climate = registry.get(name).unwrap();
            for seed in 0..100 {
                let s = synthesize(climate, Season::Winter, 10, Some(WeatherType::Rain), seed);
                let (lo, hi) = severity_band(s.condition.weather_type);
                assert!(s.condition.severity >= lo && s.condition.severity <= hi);
            }
        }
    }

    #[test]
    fn precipitation_only_for_wet_types() {
        for weather_type in WeatherType::ALL {
            let climate = single_type_climate(weather_type);
            for seed in 0..20 {
                let s = synthesize(&climate, Season::Spring, 100, None, seed);
                assert_eq!(s.condition.weather_type, weather_type);
                assert_eq!(s.precipitation > 0.0, weather_type.is_precipitating());
            }
        }
    }

    #[test]
    fn low_visibility_types() {
        for weather_type in [WeatherType::Fog, WeatherType::Storm, WeatherType::Snow] {
            let climate = single_type_climate(weather_type);
            for seed in 0..20 {
                let s = synthesize(&climate, Season::Autumn, 280, None, seed);
                assert!(s.visibility < 0.6 * BASE_VISIBILITY);
            }
        }
    }

    #[test]
    fn duration_scales_with_transition_speed() {
        let climate = single_type_climate(WeatherType::Cloudy);
        for seed in 0..50 {
            let s = synthesize(&climate, Season::Summer, 180, None, seed);
            assert!(s.condition.duration >= 5.0 && s.condition.duration < 15.0);
        }
    }

    #[test]
    fn temperature_follows_season_curve() {
        let climate = single_type_climate(WeatherType::Clear);
        // Coldest at day 0, warmest around day 182.
        assert!((seasonal_temperature(&climate, 0) - 0.0).abs() < 1e-9);
        assert!(seasonal_temperature(&climate, 182) > 19.9);
        for seed in 0..20 {
            let s = synthesize(&climate, Season::Winter, 0, None, seed);
            assert!(s.temperature >= -5.0 && s.temperature < 5.0);
        }
    }

    #[test]
    fn empty_table_falls_back_to_clear() {
        let mut climate = temperate();
        climate.weather_probabilities.summer.clear();
        let s = synthesize(&climate, Season::Summer, 200, None, 1);
        assert_eq!(s.condition.weather_type, WeatherType::Clear);
    }

    #[test]
    fn corrupt_table_falls_back_to_clear() {
        let mut climate = temperate();
        climate.weather_probabilities.summer = vec![(WeatherType::Storm, f64::NAN), (WeatherType::Rain, -1.0)];
        let s = synthesize(&climate, Season::Summer, 200, None, 3);
        assert_eq!(s.condition.weather_type, WeatherType::Clear);
    }

    #[test]
    fn unnormalized_table_is_renormalized() {
        let mut climate = temperate();
        climate.weather_probabilities.summer = vec![(WeatherType::Rain, 3.0), (WeatherType::Fog, 1.0)];
        let dist = transition_distribution(&climate, Season::Summer, None).unwrap();
        assert!((dist[0].1 - 0.75).abs() < 1e-9);
        assert!((dist[1].1 - 0.25).abs() < 1e-9);
    }

    #[test]
    fn previous_weather_shifts_distribution() {
        let climate = temperate();
        let base = transition_distribution(&climate, Season::Summer, None).unwrap();
        let after_storm =
            transition_distribution(&climate, Season::Summer, Some(WeatherType::Storm)).unwrap();
        let rain = |d: &[(WeatherType, f64)]| {
            d.iter()
                .find(|(t, _)| *t == WeatherType::Rain)
                .map(|(_, p)| *p)
                .unwrap()
        };
        assert!(rain(&after_storm[..]) > rain(&base[..]));
        let total: f64 = after_storm.iter().map(|(_, p)| p).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn blend_never_introduces_foreign_types() {
        let registry = ClimateRegistry::bundled().unwrap();
        let desert = registry.get("Desert").unwrap();
        let dist = transition_distribution(desert, Season::Summer, Some(WeatherType::Snow)).unwrap();
        assert!(dist.iter().all(|(t, _)| *t != WeatherType::Snow));
    }
}
