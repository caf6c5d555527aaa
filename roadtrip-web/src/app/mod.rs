//! Application shell: owns the engine, wires component callbacks, and maps
//! engine outcomes onto the status feed.
pub mod messages;
pub mod state;

pub use state::{AppState, WebEngine, use_app_state};

#[cfg(target_arch = "wasm32")]
use roadtrip_core::ImagePayload;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::spawn_local;
#[cfg(target_arch = "wasm32")]
use yew::prelude::*;

#[cfg(target_arch = "wasm32")]
use crate::components::{Controls, PhotoUpload, TrailMap, TripLogPanel};
#[cfg(target_arch = "wasm32")]
use crate::{dom, export};

#[cfg(target_arch = "wasm32")]
const EXPORT_TITLE: &str = "Virtual roadtrip";

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
pub fn app() -> Html {
    let app_state = use_app_state();

    let on_advance = {
        let state = app_state.clone();
        Callback::from(move |()| {
            if *state.busy {
                return;
            }
            state.busy.set(true);
            let state = state.clone();
            spawn_local(async move {
                // The borrow is held across the awaits inside; the busy flag
                // keeps every other engine entry point out until it drops.
                let result = {
                    let mut engine = state.engine.borrow_mut();
                    if engine.is_idle() {
                        engine
                            .start()
                            .await
                            .map(|outcome| messages::start_messages(&outcome))
                    } else {
                        engine
                            .advance()
                            .await
                            .map(|outcome| messages::advance_messages(&outcome))
                    }
                };
                match result {
                    Ok(lines) => {
                        state.sync_from_engine();
                        state.announce(lines);
                    }
                    Err(err) => state.announce(vec![err.to_string()]),
                }
                state.busy.set(false);
            });
        })
    };

    let on_reset = {
        let state = app_state.clone();
        Callback::from(move |()| {
            if *state.busy {
                return;
            }
            state.engine.borrow_mut().reset();
            state.sync_from_engine();
            state.messages.set(vec!["Trip reset.".to_string()]);
        })
    };

    let on_export = {
        let state = app_state.clone();
        Callback::from(move |()| {
            if *state.busy {
                return;
            }
            let engine = state.engine.borrow();
            if let Err(err) = export::download_document(engine.log(), EXPORT_TITLE) {
                dom::console_error(&dom::js_error_message(&err));
            }
        })
    };

    let on_destination_change = {
        let state = app_state.clone();
        Callback::from(move |query: String| {
            state.engine.borrow_mut().set_destination(&query);
        })
    };

    let on_photo = {
        let state = app_state.clone();
        Callback::from(move |payload: ImagePayload| {
            if *state.busy {
                return;
            }
            // A FileReader onload can land after a later engine call has
            // begun; never contend for the borrow it holds.
            let Ok(mut engine) = state.engine.try_borrow_mut() else {
                return;
            };
            let result = engine.attach_photo(payload);
            drop(engine);
            match result {
                Ok(persisted) => {
                    state.sync_from_engine();
                    if !persisted {
                        state.announce(vec![
                            "Saving failed; this trip is kept in memory for this session only."
                                .to_string(),
                        ]);
                    }
                }
                Err(err) => state.announce(vec![err.to_string()]),
            }
        })
    };

    let trail: Vec<_> = app_state.stops.iter().map(|stop| stop.coords).collect();

    html! {
        <main class="app">
            <h1>{ "Virtual Roadtrip" }</h1>
            <Controls
                busy={*app_state.busy}
                in_progress={*app_state.in_progress}
                has_log={!app_state.stops.is_empty()}
                {on_advance}
                {on_reset}
                {on_export}
                {on_destination_change}
            />
            <PhotoUpload
                enabled={!app_state.stops.is_empty() && !*app_state.busy}
                {on_photo}
            />
            <TrailMap trail={trail} />
            <TripLogPanel stops={(*app_state.stops).clone()} />
            <ul class="status-feed" aria-live="polite">
                { for app_state.messages.iter().map(|line| html! {
                    <li>{ line }</li>
                }) }
            </ul>
        </main>
    }
}
