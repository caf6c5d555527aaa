use futures::executor::block_on;
use roadtrip_core::{Coordinate, ImagePayload, Stop};
use yew::{Callback, LocalServerRenderer};

use roadtrip_web::components::controls::{self, Controls};
use roadtrip_web::components::photo_upload::{self, PhotoUpload};
use roadtrip_web::components::trail_map::{self, TrailMap};
use roadtrip_web::components::trip_log_panel::{self, TripLogPanel};

fn controls_props(busy: bool, in_progress: bool, has_log: bool) -> controls::Props {
    controls::Props {
        busy,
        in_progress,
        has_log,
        on_advance: Callback::noop(),
        on_reset: Callback::noop(),
        on_export: Callback::noop(),
        on_destination_change: Callback::noop(),
    }
}

#[test]
fn controls_offer_start_before_a_trip_begins() {
    let props = controls_props(false, false, false);
    let html = block_on(LocalServerRenderer::<Controls>::with_props(props).render());
    assert!(html.contains("Start trip"));
    assert!(!html.contains("Next stop"));
}

#[test]
fn controls_offer_next_stop_mid_trip() {
    let props = controls_props(false, true, true);
    let html = block_on(LocalServerRenderer::<Controls>::with_props(props).render());
    assert!(html.contains("Next stop"));
    assert!(html.contains("Export itinerary"));
    assert!(html.contains("Reset trip"));
}

#[test]
fn controls_disable_actions_while_busy() {
    let idle = controls_props(false, true, true);
    let html = block_on(LocalServerRenderer::<Controls>::with_props(idle).render());
    assert!(!html.contains("disabled"));

    let busy = controls_props(true, true, true);
    let html = block_on(LocalServerRenderer::<Controls>::with_props(busy).render());
    assert!(html.contains("disabled"));
}

#[test]
fn trip_log_panel_shows_placeholder_when_empty() {
    let props = trip_log_panel::Props { stops: Vec::new() };
    let html = block_on(LocalServerRenderer::<TripLogPanel>::with_props(props).render());
    assert!(html.contains("No stops yet"));
    assert!(!html.contains("<ol"));
}

#[test]
fn trip_log_panel_lists_stops_with_links_and_challenge() {
    let mut stop = Stop::new(
        Coordinate::new(60.674, 17.141),
        "Gävle".to_string(),
        Some("Photograph a road sign".to_string()),
    );
    stop.photo = Some(ImagePayload::new("data:image/png;base64,abc"));
    let props = trip_log_panel::Props { stops: vec![stop] };
    let html = block_on(LocalServerRenderer::<TripLogPanel>::with_props(props).render());
    assert!(html.contains("Gävle"));
    assert!(html.contains("Photograph a road sign"));
    assert!(html.contains("google.com/maps"));
    assert!(html.contains("waze.com"));
    assert!(html.contains("data:image/png;base64,abc"));
}

#[test]
fn trail_map_draws_a_polyline_for_the_trail() {
    let props = trail_map::Props {
        trail: vec![
            Coordinate::new(60.0, 17.0),
            Coordinate::new(60.5, 17.5),
            Coordinate::new(61.0, 18.0),
        ],
    };
    let html = block_on(LocalServerRenderer::<TrailMap>::with_props(props).render());
    assert!(html.contains("<polyline"));
    assert_eq!(html.matches("<circle").count(), 3);
}

#[test]
fn trail_map_renders_nothing_without_stops() {
    let props = trail_map::Props { trail: Vec::new() };
    let html = block_on(LocalServerRenderer::<TrailMap>::with_props(props).render());
    assert!(!html.contains("<svg"));
}

#[test]
fn photo_upload_is_disabled_until_enabled() {
    let disabled = photo_upload::Props {
        enabled: false,
        on_photo: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<PhotoUpload>::with_props(disabled).render());
    assert!(html.contains("disabled"));

    let enabled = photo_upload::Props {
        enabled: true,
        on_photo: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<PhotoUpload>::with_props(enabled).render());
    assert!(!html.contains("disabled"));
}
