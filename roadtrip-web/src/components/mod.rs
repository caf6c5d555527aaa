//! Presentational components. All are prop-driven and render on native
//! targets, so they are covered by server-side rendering tests.
pub mod controls;
pub mod photo_upload;
pub mod trail_map;
pub mod trip_log_panel;

pub use controls::Controls;
pub use photo_upload::PhotoUpload;
pub use trail_map::TrailMap;
pub use trip_log_panel::TripLogPanel;
