//! Pure coordinate math: great-circle distance, random displacement, and
//! straight-line interpolation. No I/O and no engine state.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres used by the haversine distance.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Degrees of latitude covered by one random-step unit (~10 km of ground).
pub const STEP_UNIT_DEG: f64 = 0.09;

/// A latitude/longitude pair in degrees, WGS84-style semantics assumed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    /// Construct a coordinate from degrees.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Great-circle distance between two coordinates via the haversine formula.
///
/// Symmetric in its arguments and zero for identical points.
#[must_use]
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    EARTH_RADIUS_KM * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Displace `origin` by a random distance of `1..=max_step_units` step units
/// in a uniformly random direction.
///
/// The longitude delta is divided by `cos(lat)` so a step covers roughly the
/// same ground distance at all latitudes. Intentionally non-deterministic for
/// a fresh RNG; callers needing reproducibility pass a seeded generator.
#[must_use]
pub fn random_step<R: Rng + ?Sized>(
    origin: Coordinate,
    max_step_units: u32,
    rng: &mut R,
) -> Coordinate {
    let units = f64::from(rng.gen_range(1..=max_step_units.max(1)));
    let direction = rng.gen_range(0.0..std::f64::consts::TAU);
    let d_lat = direction.cos() * units * STEP_UNIT_DEG;
    let d_lon = direction.sin() * units * STEP_UNIT_DEG / origin.lat.to_radians().cos();
    Coordinate::new(origin.lat + d_lat, origin.lon + d_lon)
}

/// Linear interpolation in coordinate space for `fraction` in `(0, 1]`.
///
/// Cheap "move part-way" fallback when no routed path is available; not a
/// geodesic, which is acceptable at the step sizes the engine uses.
#[must_use]
pub fn interpolate_towards(
    origin: Coordinate,
    destination: Coordinate,
    fraction: f64,
) -> Coordinate {
    Coordinate::new(
        origin.lat + (destination.lat - origin.lat) * fraction,
        origin.lon + (destination.lon - origin.lon) * fraction,
    )
}
