//! Roadtrip Core Engine
//!
//! Platform-agnostic trip-progression logic for the virtual roadtrip
//! simulator. This crate provides the state machine, geo math, and trip log
//! model without UI or browser-specific dependencies; frontends supply the
//! storage, geocoding/routing, and location collaborators through the traits
//! defined here.

pub mod config;
pub mod engine;
pub mod gateway;
pub mod geo;
pub mod trip_log;

// Re-export commonly used types
pub use config::{ARRIVAL_DESCRIPTION, ConfigError, DEFAULT_START, TripConfig, UNKNOWN_PLACE};
pub use engine::{
    AdvanceOutcome, EngineError, MovementKind, StartFix, StartOutcome, TripEngine, TripPhase,
};
pub use gateway::{GeoGateway, RoutePath};
pub use geo::{Coordinate, distance_km, interpolate_towards, random_step};
pub use trip_log::{ImagePayload, Stop, TripLog};

/// Trait for abstracting trip log persistence.
/// Platform-specific implementations should provide this.
pub trait TripStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Persist the full serialized trip log under the well-known key.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be written (store unavailable,
    /// quota exceeded). The engine reports this distinctly and continues
    /// with the in-memory log.
    fn save_log(&self, log: &TripLog) -> Result<(), Self::Error>;

    /// Load the persisted trip log, `None` when no log is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored log exists but cannot be read or parsed.
    fn load_log(&self) -> Result<Option<TripLog>, Self::Error>;

    /// Erase the persisted trip log.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the deletion.
    fn clear_log(&self) -> Result<(), Self::Error>;
}

/// Trait for acquiring the device position at trip start.
///
/// Implementations apply the bounded timeout themselves and report any
/// failure or expiry as `None`; the engine then falls back to its configured
/// default start coordinate.
#[allow(async_fn_in_trait)] // consumed single-threaded in wasm, no Send bound wanted
pub trait LocationSource {
    async fn current_position(&self, timeout_ms: u32) -> Option<Coordinate>;
}
