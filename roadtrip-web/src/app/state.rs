use std::cell::RefCell;
use std::rc::Rc;

use roadtrip_core::{Stop, TripConfig, TripEngine, TripPhase};
use yew::prelude::*;

use crate::services::{BrowserLocation, NominatimOrsGateway};
use crate::storage::LocalTripStore;

/// The engine wired to its browser collaborators.
pub type WebEngine = TripEngine<NominatimOrsGateway, LocalTripStore, BrowserLocation>;

#[derive(Clone)]
pub struct AppState {
    /// Single engine instance for the tab. The busy flag below guarantees at
    /// most one borrow is live across an await point.
    pub engine: Rc<RefCell<WebEngine>>,
    pub stops: UseStateHandle<Vec<Stop>>,
    pub busy: UseStateHandle<bool>,
    pub in_progress: UseStateHandle<bool>,
    pub messages: UseStateHandle<Vec<String>>,
}

fn new_engine() -> WebEngine {
    let seed = js_sys::Date::now() as u64;
    TripEngine::new(
        NominatimOrsGateway::default(),
        LocalTripStore,
        BrowserLocation,
        TripConfig::default_config(),
        seed,
    )
    .expect("default configuration should be valid")
}

#[hook]
pub fn use_app_state() -> AppState {
    let engine = use_mut_ref(new_engine);
    // A stored log resumes the previous trip; seed the view from it.
    let (initial_stops, initial_in_progress) = {
        let engine = engine.borrow();
        (
            engine.log().stops().to_vec(),
            engine.phase() == TripPhase::InProgress,
        )
    };
    AppState {
        engine,
        stops: use_state(|| initial_stops),
        busy: use_state(|| false),
        in_progress: use_state(|| initial_in_progress),
        messages: use_state(Vec::new),
    }
}

impl AppState {
    /// Refresh the view snapshots from the engine after a mutation.
    pub fn sync_from_engine(&self) {
        let engine = self.engine.borrow();
        self.stops.set(engine.log().stops().to_vec());
        self.in_progress
            .set(engine.phase() == TripPhase::InProgress);
    }

    /// Append status lines to the message feed.
    pub fn announce(&self, lines: Vec<String>) {
        if lines.is_empty() {
            return;
        }
        let mut messages = (*self.messages).clone();
        messages.extend(lines);
        self.messages.set(messages);
    }
}
