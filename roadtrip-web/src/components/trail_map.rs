//! Minimal SVG trail view: the visited stops as a polyline over a blank
//! canvas, newest stop highlighted.
use roadtrip_core::Coordinate;
use yew::prelude::*;

const VIEW_WIDTH: f64 = 320.0;
const VIEW_HEIGHT: f64 = 200.0;
const MARGIN: f64 = 12.0;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    /// Coordinates in traversal order.
    pub trail: Vec<Coordinate>,
}

/// Fit the trail's bounding box into the SVG viewport, preserving order.
/// A single point lands in the center.
#[must_use]
pub fn project(trail: &[Coordinate]) -> Vec<(f64, f64)> {
    if trail.is_empty() {
        return Vec::new();
    }
    let (mut min_lat, mut max_lat) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_lon, mut max_lon) = (f64::INFINITY, f64::NEG_INFINITY);
    for coord in trail {
        min_lat = min_lat.min(coord.lat);
        max_lat = max_lat.max(coord.lat);
        min_lon = min_lon.min(coord.lon);
        max_lon = max_lon.max(coord.lon);
    }
    let lat_span = (max_lat - min_lat).max(f64::EPSILON);
    let lon_span = (max_lon - min_lon).max(f64::EPSILON);
    let usable_w = VIEW_WIDTH - 2.0 * MARGIN;
    let usable_h = VIEW_HEIGHT - 2.0 * MARGIN;

    trail
        .iter()
        .map(|coord| {
            let x = if max_lon > min_lon {
                MARGIN + (coord.lon - min_lon) / lon_span * usable_w
            } else {
                VIEW_WIDTH / 2.0
            };
            // SVG y grows downward; latitude grows upward.
            let y = if max_lat > min_lat {
                MARGIN + (max_lat - coord.lat) / lat_span * usable_h
            } else {
                VIEW_HEIGHT / 2.0
            };
            (x, y)
        })
        .collect()
}

#[function_component(TrailMap)]
pub fn trail_map(props: &Props) -> Html {
    let points = project(&props.trail);
    if points.is_empty() {
        return Html::default();
    }

    let polyline: String = points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");
    let last_index = points.len() - 1;

    html! {
        <svg
            class="trail-map"
            viewBox={format!("0 0 {VIEW_WIDTH} {VIEW_HEIGHT}")}
            role="img"
            aria-label="Trail map"
        >
            <polyline
                points={polyline}
                fill="none"
                stroke="currentColor"
                stroke-width="2"
            />
            { for points.iter().enumerate().map(|(i, (x, y))| html! {
                <circle
                    cx={format!("{x:.1}")}
                    cy={format!("{y:.1}")}
                    r={if i == last_index { "5" } else { "3" }}
                    class={if i == last_index { "trail-map__current" } else { "trail-map__stop" }}
                />
            }) }
        </svg>
    }
}
