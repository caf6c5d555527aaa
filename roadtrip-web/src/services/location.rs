//! Device position via the browser Geolocation API.
use js_sys::{Promise, Reflect};
use log::warn;
use roadtrip_core::{Coordinate, LocationSource};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::PositionOptions;

use crate::dom;

/// Location source backed by `navigator.geolocation`.
///
/// Denied permission, a missing device fix, or an expired timeout all yield
/// `None`; the engine then starts from its configured fallback position.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserLocation;

#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
impl LocationSource for BrowserLocation {
    async fn current_position(&self, timeout_ms: u32) -> Option<Coordinate> {
        match geolocate(timeout_ms).await {
            Ok(coord) => Some(coord),
            Err(err) => {
                warn!("geolocation unavailable: {}", dom::js_error_message(&err));
                None
            }
        }
    }
}

/// Read `coords.latitude`/`coords.longitude` out of a GeolocationPosition
/// object. The position crosses the boundary as a plain `JsValue`; the typed
/// web-sys wrappers for it are not on the stable API surface.
///
/// # Errors
/// Returns an error when the object has no `coords` member or its latitude or
/// longitude is not a number.
pub fn coordinate_from_position(position: &JsValue) -> Result<Coordinate, JsValue> {
    let coords = Reflect::get(position, &JsValue::from_str("coords"))?;
    let lat = Reflect::get(&coords, &JsValue::from_str("latitude"))?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("latitude missing from position"))?;
    let lon = Reflect::get(&coords, &JsValue::from_str("longitude"))?
        .as_f64()
        .ok_or_else(|| JsValue::from_str("longitude missing from position"))?;
    Ok(Coordinate::new(lat, lon))
}

/// Wrap the callback-based Geolocation API in a future resolving to a
/// coordinate.
#[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
async fn geolocate(timeout_ms: u32) -> Result<Coordinate, JsValue> {
    let geolocation = dom::window().navigator().geolocation()?;

    let promise = Promise::new(&mut |resolve, reject| {
        let success = Closure::once(move |position: JsValue| {
            let _ = resolve.call1(&JsValue::NULL, &position);
        });
        let failure = Closure::once(move |err: JsValue| {
            let message = Reflect::get(&err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
                .unwrap_or_else(|| "position unavailable".to_string());
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str(&message));
        });

        let options = PositionOptions::new();
        options.set_enable_high_accuracy(true);
        options.set_timeout(timeout_ms);

        if let Err(err) = geolocation.get_current_position_with_error_callback_and_options(
            success.as_ref().unchecked_ref(),
            Some(failure.as_ref().unchecked_ref()),
            &options,
        ) {
            dom::console_error(&dom::js_error_message(&err));
        }

        // The browser owns the callbacks from here; leak them to the JS side.
        success.forget();
        failure.forget();
    });

    let position = JsFuture::from(promise).await?;
    coordinate_from_position(&position)
}
