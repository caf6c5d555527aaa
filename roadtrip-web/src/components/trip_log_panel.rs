use roadtrip_core::Stop;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    /// Stops in traversal order; index 0 is the trip start.
    pub stops: Vec<Stop>,
}

#[function_component(TripLogPanel)]
pub fn trip_log_panel(props: &Props) -> Html {
    if props.stops.is_empty() {
        return html! {
            <p class="trip-log trip-log--empty">{ "No stops yet. Start a trip to begin." }</p>
        };
    }

    html! {
        <ol class="trip-log">
            { for props.stops.iter().map(render_stop) }
        </ol>
    }
}

fn render_stop(stop: &Stop) -> Html {
    html! {
        <li class="trip-log__stop">
            <span class="trip-log__name">{ &stop.description }</span>
            <span class="trip-log__coords">
                { format!(" ({:.3}, {:.3})", stop.coords.lat, stop.coords.lon) }
            </span>
            { stop.challenge.as_ref().map(|challenge| html! {
                <p class="trip-log__challenge">{ challenge }</p>
            }).unwrap_or_default() }
            { stop.photo.as_ref().map(|photo| html! {
                <img class="trip-log__photo" src={photo.as_str().to_string()} alt="Stop photo" />
            }).unwrap_or_default() }
            <span class="trip-log__links">
                <a href={stop.maps_url()} target="_blank" rel="noopener">{ "Maps" }</a>
                { " " }
                <a href={stop.waze_url()} target="_blank" rel="noopener">{ "Waze" }</a>
            </span>
        </li>
    }
}
