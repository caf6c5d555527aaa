//! Policy knobs for the trip progression engine.
//!
//! The two historical front-end variants disagreed on the arrival threshold
//! and the free-roam step model; both are unified here behind one validated
//! configuration structure.
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::Coordinate;

/// Place-name sentinel used when reverse geocoding degrades.
pub const UNKNOWN_PLACE: &str = "Unknown place";

/// Description recorded on the arrival stop.
pub const ARRIVAL_DESCRIPTION: &str = "Destination reached";

/// Default starting coordinate when no device position is available (Gävle).
pub const DEFAULT_START: Coordinate = Coordinate::new(60.674, 17.141);

/// Built-in photo challenge catalog used when the config supplies none.
static DEFAULT_CHALLENGES: Lazy<Vec<String>> = Lazy::new(|| {
    [
        "Photograph a road sign with the local place name",
        "Capture the most unusual building in sight",
        "Find something the same color as your car",
        "Take a picture of the local landscape",
        "Snap a photo of food you could buy here",
        "Photograph something older than you",
        "Capture a body of water, however small",
        "Find a local animal, wild or otherwise",
    ]
    .into_iter()
    .map(String::from)
    .collect()
});

/// Tunable policy values for one engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripConfig {
    /// Distance below which the destination counts as reached.
    #[serde(default = "TripConfig::default_arrival_threshold_km")]
    pub arrival_threshold_km: f64,
    /// Upper bound on the free-roam step length, in step units.
    #[serde(default = "TripConfig::default_random_step_max_units")]
    pub random_step_max_units: u32,
    /// A routed path is advanced by `len / route_advance_divisor` points.
    #[serde(default = "TripConfig::default_route_advance_divisor")]
    pub route_advance_divisor: usize,
    /// Fallback starting coordinate when location acquisition fails.
    #[serde(default = "TripConfig::default_start")]
    pub default_start: Coordinate,
    /// Bounded timeout for device location acquisition.
    #[serde(default = "TripConfig::default_location_timeout_ms")]
    pub location_timeout_ms: u32,
    /// Photo challenge catalog; one entry is assigned per stop.
    #[serde(default = "TripConfig::default_challenges")]
    pub challenges: Vec<String>,
}

impl Default for TripConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl TripConfig {
    /// The built-in configuration.
    #[must_use]
    pub fn default_config() -> Self {
        Self {
            arrival_threshold_km: Self::default_arrival_threshold_km(),
            random_step_max_units: Self::default_random_step_max_units(),
            route_advance_divisor: Self::default_route_advance_divisor(),
            default_start: Self::default_start(),
            location_timeout_ms: Self::default_location_timeout_ms(),
            challenges: Self::default_challenges(),
        }
    }

    /// One free-roam step unit is ~10 km of ground, so the threshold stays
    /// at 1 km rather than the older 0.5 km to avoid orbiting a destination
    /// that routing keeps overshooting.
    #[must_use]
    pub const fn default_arrival_threshold_km() -> f64 {
        1.0
    }

    #[must_use]
    pub const fn default_random_step_max_units() -> u32 {
        10
    }

    #[must_use]
    pub const fn default_route_advance_divisor() -> usize {
        10
    }

    #[must_use]
    pub const fn default_start() -> Coordinate {
        DEFAULT_START
    }

    #[must_use]
    pub const fn default_location_timeout_ms() -> u32 {
        10_000
    }

    #[must_use]
    pub fn default_challenges() -> Vec<String> {
        DEFAULT_CHALLENGES.clone()
    }

    /// Parse a configuration from JSON and validate it.
    ///
    /// Missing fields fall back to their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or a field violates the
    /// documented bounds.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates the documented bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.1..=50.0).contains(&self.arrival_threshold_km) {
            return Err(ConfigError::ArrivalThreshold(self.arrival_threshold_km));
        }
        if !(1..=100).contains(&self.random_step_max_units) {
            return Err(ConfigError::RandomStepMaxUnits(self.random_step_max_units));
        }
        if self.route_advance_divisor == 0 {
            return Err(ConfigError::RouteAdvanceDivisor);
        }
        if self.challenges.is_empty() {
            return Err(ConfigError::EmptyChallengeCatalog);
        }
        if !(-90.0..=90.0).contains(&self.default_start.lat)
            || !(-180.0..=180.0).contains(&self.default_start.lon)
        {
            return Err(ConfigError::DefaultStartOutOfRange);
        }
        Ok(())
    }
}

/// Violations of the documented configuration bounds.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("arrival threshold {0} km outside 0.1..=50.0")]
    ArrivalThreshold(f64),
    #[error("random step max {0} units outside 1..=100")]
    RandomStepMaxUnits(u32),
    #[error("route advance divisor must be non-zero")]
    RouteAdvanceDivisor,
    #[error("challenge catalog must not be empty")]
    EmptyChallengeCatalog,
    #[error("default start coordinate outside valid lat/lon range")]
    DefaultStartOutOfRange,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = TripConfig::default_config();
        cfg.validate().unwrap();
        assert!(!cfg.challenges.is_empty());
        assert!((cfg.arrival_threshold_km - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_fills_missing_fields_with_defaults() {
        let cfg: TripConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, TripConfig::default_config());

        let cfg: TripConfig =
            serde_json::from_str(r#"{"arrival_threshold_km": 0.5}"#).unwrap();
        assert!((cfg.arrival_threshold_km - 0.5).abs() < f64::EPSILON);
        assert_eq!(cfg.random_step_max_units, 10);
    }

    #[test]
    fn from_json_parses_and_validates() {
        let cfg = TripConfig::from_json(r#"{"random_step_max_units": 5}"#).unwrap();
        assert_eq!(cfg.random_step_max_units, 5);

        assert!(TripConfig::from_json("not json").is_err());
        assert!(TripConfig::from_json(r#"{"arrival_threshold_km": 999.0}"#).is_err());
    }

    #[test]
    fn validation_rejects_out_of_bounds_values() {
        let mut cfg = TripConfig::default_config();
        cfg.arrival_threshold_km = 0.0;
        assert_eq!(cfg.validate(), Err(ConfigError::ArrivalThreshold(0.0)));

        let mut cfg = TripConfig::default_config();
        cfg.random_step_max_units = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::RandomStepMaxUnits(0)));

        let mut cfg = TripConfig::default_config();
        cfg.route_advance_divisor = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::RouteAdvanceDivisor));

        let mut cfg = TripConfig::default_config();
        cfg.challenges.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyChallengeCatalog));

        let mut cfg = TripConfig::default_config();
        cfg.default_start = Coordinate::new(91.0, 0.0);
        assert_eq!(cfg.validate(), Err(ConfigError::DefaultStartOutOfRange));
    }
}
