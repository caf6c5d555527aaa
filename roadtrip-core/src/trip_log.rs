//! Persisted trip log model: ordered stops, append-only in normal operation.
use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;

/// An embeddable image encoding (data URL), opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImagePayload(pub String);

impl ImagePayload {
    /// Wrap an already-encoded image string.
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// The raw encoded payload.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One recorded point in the simulated trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub coords: Coordinate,
    /// Reverse-geocoded place name, or the unknown-place sentinel.
    pub description: String,
    /// Photo challenge assigned at creation; never reassigned.
    #[serde(default)]
    pub challenge: Option<String>,
    /// User-attached image, settable after the stop exists.
    #[serde(default)]
    pub photo: Option<ImagePayload>,
}

impl Stop {
    /// Create a stop with no photo attached yet.
    #[must_use]
    pub fn new(coords: Coordinate, description: String, challenge: Option<String>) -> Self {
        Self {
            coords,
            description,
            challenge,
            photo: None,
        }
    }

    /// Google Maps search link for this stop's coordinate.
    #[must_use]
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps/search/?api=1&query={lat},{lon}",
            lat = self.coords.lat,
            lon = self.coords.lon
        )
    }

    /// Waze navigation link for this stop's coordinate.
    #[must_use]
    pub fn waze_url(&self) -> String {
        format!(
            "https://waze.com/ul?ll={lat},{lon}&navigate=yes",
            lat = self.coords.lat,
            lon = self.coords.lon
        )
    }
}

/// The full ordered history of stops for the current trip.
///
/// Index 0 is the trip start, the last index the current position. Appended
/// to in call order; only a reset clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripLog {
    stops: Vec<Stop>,
}

impl TripLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stop, preserving call order.
    pub fn push(&mut self, stop: Stop) {
        self.stops.push(stop);
    }

    /// Number of recorded stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    /// Whether the trip has no recorded stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// The most recently appended stop.
    #[must_use]
    pub fn last(&self) -> Option<&Stop> {
        self.stops.last()
    }

    /// Iterate over stops in traversal order.
    pub fn iter(&self) -> std::slice::Iter<'_, Stop> {
        self.stops.iter()
    }

    /// All stops in traversal order.
    #[must_use]
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    /// Attach a photo to the most recently added stop.
    ///
    /// Returns `false` when the log is empty and there is nothing to attach
    /// to; earlier stops are never touched.
    pub fn attach_photo_to_last(&mut self, photo: ImagePayload) -> bool {
        match self.stops.last_mut() {
            Some(stop) => {
                stop.photo = Some(photo);
                true
            }
            None => false,
        }
    }

    /// Remove all stops.
    pub fn clear(&mut self) {
        self.stops.clear();
    }
}

impl<'a> IntoIterator for &'a TripLog {
    type Item = &'a Stop;
    type IntoIter = std::slice::Iter<'a, Stop>;

    fn into_iter(self) -> Self::IntoIter {
        self.stops.iter()
    }
}
