use roadtrip_core::ImagePayload;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{FileReader, HtmlInputElement};
use yew::html::TargetCast;
use yew::prelude::*;

use crate::dom;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    /// Disabled until the log has a stop to attach to.
    pub enabled: bool,
    pub on_photo: Callback<ImagePayload>,
}

#[function_component(PhotoUpload)]
pub fn photo_upload(props: &Props) -> Html {
    let on_change = {
        let cb = props.on_photo.clone();
        Callback::from(move |e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            let Some(file) = input.files().and_then(|files| files.get(0)) else {
                return;
            };
            read_as_data_url(&file, cb.clone());
            // Allow re-selecting the same file for the next stop.
            input.set_value("");
        })
    };

    html! {
        <label class="photo-upload">
            { "Attach photo" }
            <input
                type="file"
                accept="image/*"
                disabled={!props.enabled}
                onchange={on_change}
            />
        </label>
    }
}

/// Read the selected file through a `FileReader` and hand the resulting
/// data URL to `on_loaded`.
fn read_as_data_url(file: &web_sys::File, on_loaded: Callback<ImagePayload>) {
    let reader = match FileReader::new() {
        Ok(reader) => reader,
        Err(err) => {
            dom::console_error(&dom::js_error_message(&err));
            return;
        }
    };
    let handle = reader.clone();
    let onload = Closure::once(move |_event: web_sys::Event| {
        if let Ok(value) = handle.result()
            && let Some(data_url) = value.as_string()
        {
            on_loaded.emit(ImagePayload::new(data_url));
        }
    });
    reader.set_onload(Some(onload.as_ref().unchecked_ref()));
    onload.forget();
    if let Err(err) = reader.read_as_data_url(file) {
        dom::console_error(&dom::js_error_message(&err));
    }
}
