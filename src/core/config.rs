/// Engine tuning knobs, loadable from RON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::encounter::CrRange;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Past states kept per hex.
    pub history_window: usize,
    /// Furthest a forecast may look ahead, in days.
    pub forecast_horizon_days: u32,
    /// Confidence lost per forecast day.
    pub forecast_confidence_decay: f64,
    /// Floor for forecast confidence.
    pub min_forecast_confidence: f64,
    /// Upper bound on resolved encounter quantity.
    pub max_combatants: u32,
    pub default_cr_range: CrRange,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_window: 7,
            forecast_horizon_days: 7,
            forecast_confidence_decay: 0.12,
            min_forecast_confidence: 0.1,
            max_combatants: 20,
            default_cr_range: CrRange::FULL,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a config from RON. Missing fields take defaults.
    pub fn parse_ron(input: &str) -> Result<EngineConfig, ConfigError> {
        let config: EngineConfig = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_window == 0 {
            return Err(ConfigError::Invalid {
                field: "history_window",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.max_combatants == 0 {
            return Err(ConfigError::Invalid {
                field: "max_combatants",
                reason: "must be at least 1".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.forecast_confidence_decay) {
            return Err(ConfigError::Invalid {
                field: "forecast_confidence_decay",
                reason: format!("{} is outside 0..=1", self.forecast_confidence_decay),
            });
        }
        if !(0.0..=1.0).contains(&self.min_forecast_confidence) {
            return Err(ConfigError::Invalid {
                field: "min_forecast_confidence",
                reason: format!("{} is outside 0..=1", self.min_forecast_confidence),
            });
        }
        Ok(())
    }

    /// Confidence for a forecast `days_ahead` days out (1-based).
    pub fn forecast_confidence(&self, days_ahead: u32) -> f64 {
        (1.0 - self.forecast_confidence_decay * f64::from(days_ahead))
            .max(self.min_forecast_confidence)
    }
}
