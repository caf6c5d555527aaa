use web_sys::HtmlInputElement;
use yew::html::TargetCast;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    /// True while an engine call is in flight; all actions are disabled.
    pub busy: bool,
    /// Whether a trip is currently in progress.
    pub in_progress: bool,
    /// Whether the log holds at least one stop.
    pub has_log: bool,
    pub on_advance: Callback<()>,
    pub on_reset: Callback<()>,
    pub on_export: Callback<()>,
    pub on_destination_change: Callback<String>,
}

#[function_component(Controls)]
pub fn controls(props: &Props) -> Html {
    let advance_label = if props.in_progress {
        "Next stop"
    } else {
        "Start trip"
    };

    let on_advance = {
        let cb = props.on_advance.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_reset = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_export = {
        let cb = props.on_export.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let on_destination_input = {
        let cb = props.on_destination_change.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            cb.emit(input.value());
        })
    };

    html! {
        <section class="controls">
            <button
                type="button"
                class="controls__advance"
                disabled={props.busy}
                onclick={on_advance}
            >
                { advance_label }
            </button>
            <input
                type="text"
                class="controls__destination"
                placeholder="Destination (optional)"
                aria-label="Destination"
                disabled={props.busy}
                oninput={on_destination_input}
            />
            <button
                type="button"
                class="controls__export"
                disabled={props.busy || !props.has_log}
                onclick={on_export}
            >
                { "Export itinerary" }
            </button>
            <button
                type="button"
                class="controls__reset"
                disabled={props.busy || (!props.in_progress && !props.has_log)}
                onclick={on_reset}
            >
                { "Reset trip" }
            </button>
        </section>
    }
}
