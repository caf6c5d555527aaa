//! Browser-backed collaborators for the trip engine: geocoding and routing
//! over public HTTP services, and device geolocation.
pub mod geocode;
pub mod location;

pub use geocode::NominatimOrsGateway;
pub use location::BrowserLocation;
