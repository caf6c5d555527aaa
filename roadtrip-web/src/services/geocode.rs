//! Nominatim reverse/forward geocoding and OpenRouteService routing.
//!
//! Every network failure degrades to `None`; the engine substitutes its
//! placeholder name or falls back to straight-line movement, so a flaky
//! service never aborts a trip.
use log::warn;
use roadtrip_core::{Coordinate, GeoGateway, RoutePath};
use serde::Deserialize;

use crate::dom;

const NOMINATIM_REVERSE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const NOMINATIM_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
const ORS_DIRECTIONS_URL: &str =
    "https://api.openrouteservice.org/v2/directions/driving-car/geojson";

/// Free-tier OpenRouteService key used when no key is supplied.
pub const DEFAULT_ORS_API_KEY: &str =
    "5b3ce3597851110001cf624836bf313777364123b8266f2b3c09e17e";

/// Address block of a Nominatim `jsonv2` reverse response. Only the fields
/// used for naming a stop are kept; all are optional in practice.
#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    hamlet: Option<String>,
    #[serde(default)]
    county: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl NominatimAddress {
    /// Pick the most specific populated-place name available, widening to
    /// administrative areas when no settlement is nearby.
    #[must_use]
    pub fn best_name(&self) -> Option<String> {
        [
            &self.village,
            &self.town,
            &self.city,
            &self.hamlet,
            &self.county,
            &self.state,
            &self.country,
        ]
        .into_iter()
        .find_map(|field| field.clone())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReverseResponse {
    #[serde(default)]
    address: NominatimAddress,
}

/// A single forward-search hit. Nominatim serializes coordinates as strings.
#[derive(Debug, Deserialize)]
pub struct SearchHit {
    lat: String,
    lon: String,
}

impl SearchHit {
    fn coordinate(&self) -> Option<Coordinate> {
        let lat = self.lat.parse().ok()?;
        let lon = self.lon.parse().ok()?;
        Some(Coordinate::new(lat, lon))
    }
}

#[derive(Debug, Deserialize)]
struct OrsResponse {
    features: Vec<OrsFeature>,
}

#[derive(Debug, Deserialize)]
struct OrsFeature {
    geometry: OrsGeometry,
}

/// GeoJSON `LineString` geometry; positions arrive in `[lon, lat]` order.
#[derive(Debug, Deserialize)]
struct OrsGeometry {
    coordinates: Vec<[f64; 2]>,
}

impl OrsResponse {
    fn into_path(self) -> Option<RoutePath> {
        let feature = self.features.into_iter().next()?;
        let points = feature
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| Coordinate::new(lat, lon))
            .collect();
        RoutePath::new(points)
    }
}

/// Geocoding and routing over the public Nominatim and OpenRouteService APIs.
#[derive(Debug, Clone)]
pub struct NominatimOrsGateway {
    ors_api_key: String,
}

impl NominatimOrsGateway {
    #[must_use]
    pub fn new(ors_api_key: impl Into<String>) -> Self {
        Self {
            ors_api_key: ors_api_key.into(),
        }
    }
}

impl Default for NominatimOrsGateway {
    fn default() -> Self {
        Self::new(DEFAULT_ORS_API_KEY)
    }
}

#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
impl GeoGateway for NominatimOrsGateway {
    async fn reverse_geocode(&self, coord: Coordinate) -> Option<String> {
        let url = format!(
            "{NOMINATIM_REVERSE_URL}?format=jsonv2&lat={lat}&lon={lon}",
            lat = coord.lat,
            lon = coord.lon
        );
        let resp = match dom::fetch_response(&url).await {
            Ok(resp) => resp,
            Err(err) => {
                warn!("reverse geocode failed: {}", dom::js_error_message(&err));
                return None;
            }
        };
        let parsed: ReverseResponse = match dom::response_json(&resp).await {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    "reverse geocode response invalid: {}",
                    dom::js_error_message(&err)
                );
                return None;
            }
        };
        parsed.address.best_name()
    }

    async fn forward_geocode(&self, query: &str) -> Option<Coordinate> {
        let encoded = js_sys::encode_uri_component(query);
        let url = format!("{NOMINATIM_SEARCH_URL}?format=json&q={encoded}");
        let resp = match dom::fetch_response(&url).await {
            Ok(resp) => resp,
            Err(err) => {
                warn!("destination lookup failed: {}", dom::js_error_message(&err));
                return None;
            }
        };
        let hits: Vec<SearchHit> = match dom::response_json(&resp).await {
            Ok(hits) => hits,
            Err(err) => {
                warn!(
                    "destination lookup response invalid: {}",
                    dom::js_error_message(&err)
                );
                return None;
            }
        };
        hits.first().and_then(SearchHit::coordinate)
    }

    async fn route(&self, start: Coordinate, end: Coordinate) -> Option<RoutePath> {
        let body = format!(
            "{{\"coordinates\":[[{},{}],[{},{}]]}}",
            start.lon, start.lat, end.lon, end.lat
        );
        let resp = match dom::fetch_post_json(ORS_DIRECTIONS_URL, &self.ors_api_key, &body).await {
            Ok(resp) => resp,
            Err(err) => {
                warn!("routing request failed: {}", dom::js_error_message(&err));
                return None;
            }
        };
        let parsed: OrsResponse = match dom::response_json(&resp).await {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(
                    "routing response invalid: {}",
                    dom::js_error_message(&err)
                );
                return None;
            }
        };
        parsed.into_path()
    }
}
