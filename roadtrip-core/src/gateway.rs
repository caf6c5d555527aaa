//! Fault-isolating contract for the external geocoding and routing services.
//!
//! All three operations degrade to a value instead of propagating an error:
//! the engine must keep advancing when a third-party service is flaky, worst
//! case via straight-line interpolation and an unknown-place label.
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// Asynchronous gateway to reverse/forward geocoding and routing.
///
/// Implementations swallow network, HTTP, and parse failures and report them
/// as `None`; they never panic or return a transport error to the engine.
#[allow(async_fn_in_trait)] // consumed single-threaded in wasm, no Send bound wanted
pub trait GeoGateway {
    /// Resolve a human-readable place name for a coordinate.
    ///
    /// `None` means the service failed or returned nothing usable; the
    /// engine substitutes its unknown-place sentinel.
    async fn reverse_geocode(&self, coord: Coordinate) -> Option<String>;

    /// Resolve a free-form address query to a coordinate.
    ///
    /// `None` covers both "no result" and service failure.
    async fn forward_geocode(&self, query: &str) -> Option<Coordinate>;

    /// Request a drivable path from `start` to `end`.
    ///
    /// `None` signals the routing service is unavailable or its response was
    /// malformed.
    async fn route(&self, start: Coordinate, end: Coordinate) -> Option<RoutePath>;
}

/// A non-empty ordered sequence of coordinates describing a drivable line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutePath {
    points: Vec<Coordinate>,
}

impl RoutePath {
    /// Wrap a path, rejecting empty sequences.
    #[must_use]
    pub fn new(points: Vec<Coordinate>) -> Option<Self> {
        if points.is_empty() {
            None
        } else {
            Some(Self { points })
        }
    }

    /// All points along the path.
    #[must_use]
    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    /// Number of points along the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false`; retained for API symmetry with collection types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The point at index `len / divisor`, clamped to the last index.
    ///
    /// Short paths yield their first point and a one-point path its only
    /// point. Advancing by fractions produces gradual multi-step progress
    /// instead of teleporting.
    #[must_use]
    pub fn waypoint(&self, divisor: usize) -> Coordinate {
        let idx = (self.points.len() / divisor.max(1)).min(self.points.len() - 1);
        self.points[idx]
    }

    /// The point roughly one-tenth of the way along the path.
    #[must_use]
    pub fn tenth_waypoint(&self) -> Coordinate {
        self.waypoint(10)
    }

    /// The final point of the path.
    #[must_use]
    pub fn end(&self) -> Coordinate {
        *self
            .points
            .last()
            .expect("RoutePath is non-empty by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_of(n: usize) -> RoutePath {
        #[allow(clippy::cast_precision_loss)]
        let points = (0..n)
            .map(|i| Coordinate::new(60.0 + i as f64 * 0.01, 17.0))
            .collect();
        RoutePath::new(points).unwrap()
    }

    #[test]
    fn empty_paths_are_rejected() {
        assert!(RoutePath::new(Vec::new()).is_none());
    }

    #[test]
    fn tenth_waypoint_clamps_to_last_index() {
        // One point: index 0.
        let single = path_of(1);
        assert_eq!(single.tenth_waypoint(), single.points()[0]);
        // Fewer than ten points: len/10 == 0, first point.
        let short = path_of(9);
        assert_eq!(short.tenth_waypoint(), short.points()[0]);
        // Fifty points: index 5.
        let long = path_of(50);
        assert_eq!(long.tenth_waypoint(), long.points()[5]);
        // A zero divisor is treated as 1 and still clamps to the last index.
        let quad = path_of(4);
        assert_eq!(quad.waypoint(0), quad.points()[3]);
    }

    #[test]
    fn end_returns_final_point() {
        let p = path_of(3);
        assert_eq!(p.end(), p.points()[2]);
        assert_eq!(p.len(), 3);
        assert!(!p.is_empty());
    }
}
