use log::{info, warn};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha20Rng;

use crate::config::{ARRIVAL_DESCRIPTION, ConfigError, TripConfig, UNKNOWN_PLACE};
use crate::engine::{
    AdvanceOutcome, EngineError, MovementKind, StartFix, StartOutcome, TripPhase,
};
use crate::gateway::GeoGateway;
use crate::geo::{Coordinate, distance_km, interpolate_towards, random_step};
use crate::trip_log::{ImagePayload, Stop, TripLog};
use crate::{LocationSource, TripStorage};

/// The trip progression engine.
///
/// Generic over its three collaborators: the geocoding/routing gateway, the
/// persistent log store, and the device location source. One `start` or
/// `advance` call runs to completion (including the service awaits it makes)
/// before another can begin; `&mut self` enforces that no two calls overlap.
#[derive(Debug)]
pub struct TripEngine<G, S, L>
where
    G: GeoGateway,
    S: TripStorage,
    L: LocationSource,
{
    gateway: G,
    storage: S,
    location: L,
    config: TripConfig,
    log: TripLog,
    current_position: Option<Coordinate>,
    destination: Option<Coordinate>,
    pending_destination: Option<String>,
    rng: ChaCha20Rng,
}

impl<G, S, L> TripEngine<G, S, L>
where
    G: GeoGateway,
    S: TripStorage,
    L: LocationSource,
{
    /// Construct an engine, reloading any persisted trip log.
    ///
    /// A non-empty stored log resumes the trip in progress at its last
    /// stop's coordinates; a storage read failure is reported and treated as
    /// an absent log.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the configuration violates its documented
    /// bounds.
    pub fn new(
        gateway: G,
        storage: S,
        location: L,
        config: TripConfig,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let log = match storage.load_log() {
            Ok(Some(log)) => log,
            Ok(None) => TripLog::new(),
            Err(err) => {
                warn!("stored trip log unreadable, starting empty: {err}");
                TripLog::new()
            }
        };
        let current_position = log.last().map(|stop| stop.coords);
        if current_position.is_some() {
            info!("resuming trip with {} recorded stops", log.len());
        }
        Ok(Self {
            gateway,
            storage,
            location,
            config,
            log,
            current_position,
            destination: None,
            pending_destination: None,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    /// Begin a trip from Idle: resolve a starting position and take the
    /// first step.
    ///
    /// Location acquisition is bounded by the configured timeout; on failure
    /// the default start coordinate is used.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::AlreadyInProgress` when a trip is in progress.
    pub async fn start(&mut self) -> Result<StartOutcome, EngineError> {
        if self.current_position.is_some() {
            return Err(EngineError::AlreadyInProgress);
        }
        let (position, fix) = match self
            .location
            .current_position(self.config.location_timeout_ms)
            .await
        {
            Some(coord) => (coord, StartFix::Device),
            None => {
                warn!("location unavailable, starting from default coordinate");
                (self.config.default_start, StartFix::Fallback)
            }
        };
        self.current_position = Some(position);
        let advance = self.advance().await?;
        Ok(StartOutcome {
            fix,
            position,
            advance,
        })
    }

    /// Advance the simulated journey by one stop.
    ///
    /// Resolves a pending destination query (at most once per call), checks
    /// for arrival before any movement, computes the next position with the
    /// routed/interpolated/random policies, reverse-geocodes it, assigns a
    /// challenge, appends the stop, and persists the full log.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::NotStarted` when no trip is in progress.
    pub async fn advance(&mut self) -> Result<AdvanceOutcome, EngineError> {
        let current = self.current_position.ok_or(EngineError::NotStarted)?;

        let mut destination_lookup_failed = false;
        if self.destination.is_none()
            && let Some(query) = self.pending_destination.clone()
        {
            match self.gateway.forward_geocode(&query).await {
                Some(coord) => {
                    info!("destination '{query}' resolved to {coord:?}");
                    self.destination = Some(coord);
                    self.pending_destination = None;
                }
                None => {
                    // Not fatal: the trip continues in free-roam mode and the
                    // query is retried on the next call.
                    info!("destination '{query}' not found, continuing in free-roam");
                    destination_lookup_failed = true;
                }
            }
        }

        // Arrival check happens before movement: a call that lands within
        // the threshold never also moves.
        if let Some(dest) = self.destination
            && distance_km(current, dest) < self.config.arrival_threshold_km
        {
            let stop = Stop::new(dest, ARRIVAL_DESCRIPTION.to_string(), None);
            self.log.push(stop.clone());
            let persisted = self.persist();
            self.current_position = None;
            self.destination = None;
            self.pending_destination = None;
            info!("destination reached after {} stops", self.log.len());
            return Ok(AdvanceOutcome {
                stop,
                arrived: true,
                movement: None,
                place_resolved: true,
                destination_lookup_failed,
                persisted,
            });
        }

        let (next, movement) = if let Some(dest) = self.destination {
            match self.gateway.route(current, dest).await {
                Some(path) => (
                    path.waypoint(self.config.route_advance_divisor),
                    MovementKind::Routed,
                ),
                None => {
                    warn!("routing unavailable, interpolating towards destination");
                    (
                        interpolate_towards(current, dest, 0.1),
                        MovementKind::StraightLine,
                    )
                }
            }
        } else {
            let candidate = random_step(current, self.config.random_step_max_units, &mut self.rng);
            // Best effort: snap the wander target onto the road network so
            // free-roam movement stays roughly drivable.
            match self.gateway.route(current, candidate).await {
                Some(path) => (path.end(), MovementKind::FreeRoamRouted),
                None => (candidate, MovementKind::FreeRoam),
            }
        };

        let (description, place_resolved) = match self.gateway.reverse_geocode(next).await {
            Some(name) => (name, true),
            None => {
                warn!("reverse geocoding unavailable for {next:?}");
                (UNKNOWN_PLACE.to_string(), false)
            }
        };

        // Assigned exactly once, at stop creation; never reassigned.
        let challenge = self.config.challenges.choose(&mut self.rng).cloned();

        let stop = Stop::new(next, description, challenge);
        self.log.push(stop.clone());
        let persisted = self.persist();
        self.current_position = Some(next);

        Ok(AdvanceOutcome {
            stop,
            arrived: false,
            movement: Some(movement),
            place_resolved,
            destination_lookup_failed,
            persisted,
        })
    }

    /// Attach a photo to the most recently added stop and persist the log.
    ///
    /// Returns whether the persistence write succeeded.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::EmptyLog` when there is no stop to attach to.
    pub fn attach_photo(&mut self, photo: ImagePayload) -> Result<bool, EngineError> {
        if !self.log.attach_photo_to_last(photo) {
            return Err(EngineError::EmptyLog);
        }
        Ok(self.persist())
    }

    /// Clear the trip: erase the persisted log and return to Idle.
    pub fn reset(&mut self) {
        if let Err(err) = self.storage.clear_log() {
            warn!("stored trip log not cleared: {err}");
        }
        self.log.clear();
        self.current_position = None;
        self.destination = None;
        self.pending_destination = None;
        info!("trip reset");
    }

    /// Record a destination address query for resolution on the next
    /// advance. An empty query clears it; a new query discards any
    /// previously resolved destination coordinate.
    pub fn set_destination(&mut self, query: &str) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            self.pending_destination = None;
        } else {
            self.pending_destination = Some(trimmed.to_string());
            self.destination = None;
        }
    }

    /// Deterministically reseed the engine's random streams.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha20Rng::seed_from_u64(seed);
    }

    /// Read-only snapshot of the full trip log.
    #[must_use]
    pub const fn log(&self) -> &TripLog {
        &self.log
    }

    /// The simulated position, `None` iff no trip is in progress.
    #[must_use]
    pub const fn current_position(&self) -> Option<Coordinate> {
        self.current_position
    }

    /// The resolved destination coordinate, if any.
    #[must_use]
    pub const fn destination(&self) -> Option<Coordinate> {
        self.destination
    }

    /// The unresolved destination query, if any.
    #[must_use]
    pub fn pending_destination(&self) -> Option<&str> {
        self.pending_destination.as_deref()
    }

    /// Current phase of the state machine.
    #[must_use]
    pub const fn phase(&self) -> TripPhase {
        if self.current_position.is_some() {
            TripPhase::InProgress
        } else {
            TripPhase::Idle
        }
    }

    /// Whether no trip is in progress.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase(), TripPhase::Idle)
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &TripConfig {
        &self.config
    }

    fn persist(&mut self) -> bool {
        match self.storage.save_log(&self.log) {
            Ok(()) => true,
            Err(err) => {
                // Durability is threatened but the session continues with the
                // in-memory log.
                warn!("trip log not persisted: {err}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::RoutePath;
    use futures::executor::block_on;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use thiserror::Error;

    const GAVLE: Coordinate = Coordinate::new(60.674, 17.141);

    #[derive(Debug, Error)]
    #[error("store offline")]
    struct StoreOffline;

    /// In-memory log store; can be flipped into a failing mode.
    #[derive(Debug, Clone, Default)]
    struct MemoryStore {
        saved: Rc<RefCell<Option<TripLog>>>,
        fail_writes: Rc<Cell<bool>>,
    }

    impl TripStorage for MemoryStore {
        type Error = StoreOffline;

        fn save_log(&self, log: &TripLog) -> Result<(), Self::Error> {
            if self.fail_writes.get() {
                return Err(StoreOffline);
            }
            *self.saved.borrow_mut() = Some(log.clone());
            Ok(())
        }

        fn load_log(&self) -> Result<Option<TripLog>, Self::Error> {
            Ok(self.saved.borrow().clone())
        }

        fn clear_log(&self) -> Result<(), Self::Error> {
            *self.saved.borrow_mut() = None;
            Ok(())
        }
    }

    /// Scripted gateway with call counting.
    #[derive(Debug, Default)]
    struct StubGateway {
        place: Option<String>,
        forward: Option<Coordinate>,
        route: Option<Vec<Coordinate>>,
        reverse_calls: Cell<usize>,
        forward_calls: Cell<usize>,
        route_calls: Cell<usize>,
    }

    impl GeoGateway for StubGateway {
        async fn reverse_geocode(&self, _coord: Coordinate) -> Option<String> {
            self.reverse_calls.set(self.reverse_calls.get() + 1);
            self.place.clone()
        }

        async fn forward_geocode(&self, _query: &str) -> Option<Coordinate> {
            self.forward_calls.set(self.forward_calls.get() + 1);
            self.forward
        }

        async fn route(&self, _start: Coordinate, _end: Coordinate) -> Option<RoutePath> {
            self.route_calls.set(self.route_calls.get() + 1);
            self.route.clone().and_then(RoutePath::new)
        }
    }

    #[derive(Debug)]
    struct FixedLocation(Coordinate);

    impl LocationSource for FixedLocation {
        async fn current_position(&self, _timeout_ms: u32) -> Option<Coordinate> {
            Some(self.0)
        }
    }

    #[derive(Debug)]
    struct NoLocation;

    impl LocationSource for NoLocation {
        async fn current_position(&self, _timeout_ms: u32) -> Option<Coordinate> {
            None
        }
    }

    fn engine(
        gateway: StubGateway,
        store: MemoryStore,
    ) -> TripEngine<StubGateway, MemoryStore, NoLocation> {
        TripEngine::new(gateway, store, NoLocation, TripConfig::default_config(), 42).unwrap()
    }

    #[test]
    fn start_falls_back_to_default_coordinate_without_location() {
        let mut engine = engine(
            StubGateway {
                place: Some("Gävle".to_string()),
                ..StubGateway::default()
            },
            MemoryStore::default(),
        );
        let outcome = block_on(engine.start()).unwrap();
        assert_eq!(outcome.fix, StartFix::Fallback);
        assert_eq!(outcome.position, TripConfig::default_start());
        assert!(!outcome.advance.arrived);
        assert_eq!(engine.phase(), TripPhase::InProgress);
    }

    #[test]
    fn advance_requires_a_started_trip() {
        let mut engine = engine(StubGateway::default(), MemoryStore::default());
        assert_eq!(block_on(engine.advance()), Err(EngineError::NotStarted));
    }

    #[test]
    fn start_rejected_while_in_progress() {
        let mut engine = engine(StubGateway::default(), MemoryStore::default());
        block_on(engine.start()).unwrap();
        assert_eq!(
            block_on(engine.start()).unwrap_err(),
            EngineError::AlreadyInProgress
        );
    }

    #[test]
    fn identical_position_and_destination_arrives_immediately() {
        // Forward geocoding resolves to the exact starting point, so the
        // first advance (inside start) must detect arrival without any
        // intermediate movement stop.
        let spot = Coordinate::new(60.0, 17.0);
        let gateway = StubGateway {
            forward: Some(spot),
            place: Some("should not be used".to_string()),
            ..StubGateway::default()
        };
        let store = MemoryStore::default();
        let mut engine = TripEngine::new(
            gateway,
            store.clone(),
            FixedLocation(spot),
            TripConfig::default_config(),
            1,
        )
        .unwrap();
        engine.set_destination("Gävle central");

        let outcome = block_on(engine.start()).unwrap();
        assert!(outcome.advance.arrived);
        assert_eq!(outcome.advance.movement, None);
        assert_eq!(outcome.advance.stop.description, ARRIVAL_DESCRIPTION);
        assert_eq!(outcome.advance.stop.coords, spot);
        assert!(outcome.advance.stop.challenge.is_none());

        assert!(engine.is_idle());
        assert_eq!(engine.current_position(), None);
        assert_eq!(engine.destination(), None);
        assert_eq!(engine.log().len(), 1, "exactly one arrival stop");
        assert_eq!(store.saved.borrow().as_ref().unwrap().len(), 1);
    }

    #[test]
    fn arrival_check_precedes_movement_computation() {
        let spot = Coordinate::new(60.0, 17.0);
        // Within threshold but not identical.
        let near = Coordinate::new(60.001, 17.0);
        let gateway = StubGateway {
            forward: Some(near),
            route: Some(vec![spot, near]),
            ..StubGateway::default()
        };
        let mut engine = TripEngine::new(
            gateway,
            MemoryStore::default(),
            FixedLocation(spot),
            TripConfig::default_config(),
            1,
        )
        .unwrap();
        engine.set_destination("next door");

        let outcome = block_on(engine.start()).unwrap();
        assert!(outcome.advance.arrived);
        assert_eq!(engine.gateway.route_calls.get(), 0, "no movement computed");
        assert_eq!(engine.gateway.reverse_calls.get(), 0);
    }

    #[test]
    fn advances_append_in_call_order() {
        let gateway = StubGateway {
            place: Some("Somewhere".to_string()),
            ..StubGateway::default()
        };
        let store = MemoryStore::default();
        let mut engine = engine(gateway, store.clone());
        block_on(engine.start()).unwrap();
        let before = engine.log().len();

        for _ in 0..4 {
            let outcome = block_on(engine.advance()).unwrap();
            assert!(!outcome.arrived);
            assert_eq!(engine.log().last().unwrap(), &outcome.stop);
        }
        assert_eq!(engine.log().len(), before + 4);
        // Persisted log mirrors the in-memory one after every mutation.
        assert_eq!(store.saved.borrow().as_ref().unwrap().len(), before + 4);
    }

    #[test]
    fn routed_advance_takes_waypoint_at_a_tenth() {
        let start = Coordinate::new(60.0, 17.0);
        let dest = Coordinate::new(61.0, 17.0);
        let path: Vec<Coordinate> = (0..=100)
            .map(|i| Coordinate::new(60.0 + f64::from(i) * 0.01, 17.0))
            .collect();
        let expected = path[10];
        let gateway = StubGateway {
            forward: Some(dest),
            route: Some(path),
            place: Some("En route".to_string()),
            ..StubGateway::default()
        };
        let mut engine = TripEngine::new(
            gateway,
            MemoryStore::default(),
            FixedLocation(start),
            TripConfig::default_config(),
            1,
        )
        .unwrap();
        engine.set_destination("north");

        let outcome = block_on(engine.start()).unwrap().advance;
        assert_eq!(outcome.movement, Some(MovementKind::Routed));
        // 101 points / 10 = index 10.
        assert_eq!(outcome.stop.coords, expected);
        assert_eq!(engine.current_position(), Some(expected));
    }

    #[test]
    fn service_failure_degrades_to_interpolation_and_sentinel() {
        // Routing and reverse geocoding both stubbed to fail: the advance
        // still completes with a straight-line stop and the sentinel name.
        let start = Coordinate::new(60.0, 17.0);
        let dest = Coordinate::new(61.0, 18.0);
        let gateway = StubGateway {
            forward: Some(dest),
            ..StubGateway::default()
        };
        let mut engine = TripEngine::new(
            gateway,
            MemoryStore::default(),
            FixedLocation(start),
            TripConfig::default_config(),
            1,
        )
        .unwrap();
        engine.set_destination("northeast");

        let outcome = block_on(engine.start()).unwrap().advance;
        assert_eq!(outcome.movement, Some(MovementKind::StraightLine));
        assert!(!outcome.place_resolved);
        assert_eq!(outcome.stop.description, UNKNOWN_PLACE);
        assert_eq!(outcome.stop.coords, interpolate_towards(start, dest, 0.1));
        assert!(outcome.persisted);
    }

    #[test]
    fn free_roam_routes_to_candidate_and_takes_path_end() {
        // Deterministic free-roam scenario: the routing stub pins the step
        // endpoint, so the appended stop and the new position are exact.
        let target = Coordinate::new(60.7, 17.2);
        let gateway = StubGateway {
            route: Some(vec![GAVLE, target]),
            place: Some("Norrsundet".to_string()),
            ..StubGateway::default()
        };
        let mut engine = TripEngine::new(
            gateway,
            MemoryStore::default(),
            FixedLocation(GAVLE),
            TripConfig::default_config(),
            7,
        )
        .unwrap();

        let outcome = block_on(engine.start()).unwrap().advance;
        assert_eq!(outcome.movement, Some(MovementKind::FreeRoamRouted));
        assert_eq!(outcome.stop.coords, target);
        assert_eq!(engine.current_position(), Some(target));
        assert_eq!(outcome.stop.description, "Norrsundet");
    }

    #[test]
    fn free_roam_without_routing_uses_the_random_step_directly() {
        let mut engine = engine(StubGateway::default(), MemoryStore::default());
        let outcome = block_on(engine.start()).unwrap().advance;
        assert_eq!(outcome.movement, Some(MovementKind::FreeRoam));
        // The raw candidate becomes both the stop and the new position.
        assert_eq!(engine.current_position(), Some(outcome.stop.coords));
        let stepped = distance_km(TripConfig::default_start(), outcome.stop.coords);
        assert!(stepped > 0.0 && stepped < 110.0, "step of {stepped} km");
    }

    #[test]
    fn destination_lookup_attempted_once_per_call_until_resolved() {
        // Geocoder finds nothing: one attempt per advance, free-roam continues.
        let mut engine = engine(StubGateway::default(), MemoryStore::default());
        engine.set_destination("nowhere in particular");
        let first = block_on(engine.start()).unwrap().advance;
        assert!(first.destination_lookup_failed);
        assert_eq!(first.movement, Some(MovementKind::FreeRoam));
        assert_eq!(engine.gateway.forward_calls.get(), 1);

        let second = block_on(engine.advance()).unwrap();
        assert!(second.destination_lookup_failed);
        assert_eq!(engine.gateway.forward_calls.get(), 2);
    }

    #[test]
    fn destination_lookup_stops_after_resolution() {
        let dest = Coordinate::new(62.0, 17.5);
        let gateway = StubGateway {
            forward: Some(dest),
            place: Some("On the way".to_string()),
            ..StubGateway::default()
        };
        let mut engine = engine(gateway, MemoryStore::default());
        engine.set_destination("up north");
        block_on(engine.start()).unwrap();
        assert_eq!(engine.destination(), Some(dest));
        assert_eq!(engine.pending_destination(), None);

        block_on(engine.advance()).unwrap();
        assert_eq!(engine.gateway.forward_calls.get(), 1, "resolved once only");
    }

    #[test]
    fn challenges_assigned_at_creation_from_catalog() {
        let gateway = StubGateway {
            place: Some("Somewhere".to_string()),
            ..StubGateway::default()
        };
        let mut engine = engine(gateway, MemoryStore::default());
        block_on(engine.start()).unwrap();
        block_on(engine.advance()).unwrap();

        let catalog = engine.config().challenges.clone();
        for stop in engine.log() {
            let challenge = stop.challenge.as_ref().expect("movement stop challenge");
            assert!(catalog.contains(challenge));
        }
    }

    #[test]
    fn photo_attaches_to_last_stop_only() {
        let mut engine = engine(StubGateway::default(), MemoryStore::default());
        assert_eq!(
            engine.attach_photo(ImagePayload::new("data:x")),
            Err(EngineError::EmptyLog)
        );

        block_on(engine.start()).unwrap();
        block_on(engine.advance()).unwrap();
        let persisted = engine.attach_photo(ImagePayload::new("data:image/jpeg;base64,zz"));
        assert_eq!(persisted, Ok(true));

        let stops = engine.log().stops();
        assert!(stops[0].photo.is_none());
        assert_eq!(stops[1].photo.as_ref().unwrap().as_str(), "data:image/jpeg;base64,zz");
    }

    #[test]
    fn persistence_failure_is_reported_and_session_continues() {
        let store = MemoryStore::default();
        store.fail_writes.set(true);
        let mut engine = engine(StubGateway::default(), store.clone());

        let outcome = block_on(engine.start()).unwrap().advance;
        assert!(!outcome.persisted);
        assert_eq!(engine.log().len(), 1, "in-memory log still grows");
        assert!(store.saved.borrow().is_none());
    }

    #[test]
    fn reset_clears_durable_and_in_memory_state() {
        let store = MemoryStore::default();
        let mut engine = engine(StubGateway::default(), store.clone());
        engine.set_destination("somewhere");
        block_on(engine.start()).unwrap();
        assert!(store.saved.borrow().is_some());

        engine.reset();
        assert!(store.saved.borrow().is_none());
        assert!(engine.is_idle());
        assert_eq!(engine.current_position(), None);
        assert_eq!(engine.destination(), None);
        assert_eq!(engine.pending_destination(), None);
        assert!(engine.log().is_empty());
    }

    #[test]
    fn non_empty_stored_log_resumes_in_progress() {
        let store = MemoryStore::default();
        let mut prior = TripLog::new();
        prior.push(Stop::new(GAVLE, "Gävle".to_string(), None));
        prior.push(Stop::new(
            Coordinate::new(60.7, 17.2),
            "Norrsundet".to_string(),
            None,
        ));
        *store.saved.borrow_mut() = Some(prior);

        let mut engine = engine(StubGateway::default(), store);
        assert_eq!(engine.phase(), TripPhase::InProgress);
        assert_eq!(engine.current_position(), Some(Coordinate::new(60.7, 17.2)));
        // The resumed trip advances without a start call.
        let outcome = block_on(engine.advance()).unwrap();
        assert_eq!(engine.log().len(), 3);
        assert!(!outcome.arrived);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let mut cfg = TripConfig::default_config();
        cfg.challenges.clear();
        let err = TripEngine::new(
            StubGateway::default(),
            MemoryStore::default(),
            NoLocation,
            cfg,
            0,
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::EmptyChallengeCatalog);
    }
}
