//! Trip progression engine: the state machine that advances the simulated
//! journey one stop at a time.
//!
//! The engine owns the trip log and in-memory trip state exclusively;
//! presentation layers consume returned outcomes and read-only snapshots.
use thiserror::Error;

use crate::geo::Coordinate;
use crate::trip_log::Stop;

mod progression;

pub use progression::TripEngine;

/// Phase of the trip state machine.
///
/// Arrival is transient: it is detected and collapses back to `Idle` within
/// the same `advance` call, so it never appears as a resting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripPhase {
    /// No trip in progress (startup with an empty log, post-reset, or
    /// post-arrival).
    Idle,
    /// A current position is set and the trip can be advanced.
    InProgress,
}

/// How the next position of a movement stop was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementKind {
    /// Partway along a routed path towards the destination.
    Routed,
    /// Straight-line interpolation towards the destination (routing
    /// unavailable).
    StraightLine,
    /// Random step, snapped to the end of a routed path (road-following
    /// free-roam).
    FreeRoamRouted,
    /// Raw random step (free-roam with routing unavailable).
    FreeRoam,
}

/// Result of one `advance` call.
///
/// Flat outcome struct in the style of a daily tick report: the appended
/// stop plus flags describing which fallbacks fired on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceOutcome {
    /// The stop appended to the trip log by this call.
    pub stop: Stop,
    /// True when the destination was reached and the trip returned to Idle.
    pub arrived: bool,
    /// Movement policy used; `None` for an arrival stop, which never moves.
    pub movement: Option<MovementKind>,
    /// False when reverse geocoding degraded to the unknown-place sentinel.
    pub place_resolved: bool,
    /// True when a pending destination query was looked up this call and the
    /// geocoder found nothing; the trip continues in free-roam mode.
    pub destination_lookup_failed: bool,
    /// False when the storage write failed and the log lives on in memory
    /// only for this session.
    pub persisted: bool,
}

/// Where the starting position of a trip came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartFix {
    /// The device location source supplied a position within its timeout.
    Device,
    /// Location acquisition failed; the configured default start was used.
    Fallback,
}

/// Result of a `start` call: the resolved starting fix plus the outcome of
/// the first advance.
#[derive(Debug, Clone, PartialEq)]
pub struct StartOutcome {
    pub fix: StartFix,
    pub position: Coordinate,
    pub advance: AdvanceOutcome,
}

/// Caller-contract violations. External-service failure is never an error;
/// these fire only on misuse of the engine's sequencing rules.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// `start` was called while a trip is already in progress.
    #[error("trip already in progress; advance it or reset first")]
    AlreadyInProgress,
    /// `advance` was called before `start` resolved a position.
    #[error("no trip in progress; call start first")]
    NotStarted,
    /// `attach_photo` was called with an empty trip log.
    #[error("trip log is empty; no stop to attach a photo to")]
    EmptyLog,
}
