//! Itinerary export as a downloadable text document.
//!
//! Line rendering is pure so it can be tested natively; only the download
//! itself touches the browser.
use roadtrip_core::TripLog;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url};

use crate::dom;

/// Filename offered by the browser download dialog.
pub const EXPORT_FILENAME: &str = "roadtrip.txt";

/// Render one numbered line per stop, in log order, with any challenge
/// indented beneath its stop.
#[must_use]
pub fn render_lines(log: &TripLog) -> Vec<String> {
    let mut lines = Vec::with_capacity(log.len());
    for (index, stop) in log.iter().enumerate() {
        lines.push(format!(
            "{n}. {description} ({lat:.3}, {lon:.3})",
            n = index + 1,
            description = stop.description,
            lat = stop.coords.lat,
            lon = stop.coords.lon,
        ));
        if let Some(challenge) = &stop.challenge {
            lines.push(format!("    Challenge: {challenge}"));
        }
    }
    lines
}

/// Render the full document: a title, the itinerary lines, and an appendix
/// of attached photos (as data URLs) keyed by stop number.
#[must_use]
pub fn render_document(log: &TripLog, title: &str) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push_str("\n\n");
    for line in render_lines(log) {
        out.push_str(&line);
        out.push('\n');
    }
    let photos: Vec<(usize, &str)> = log
        .iter()
        .enumerate()
        .filter_map(|(index, stop)| stop.photo.as_ref().map(|p| (index + 1, p.as_str())))
        .collect();
    if !photos.is_empty() {
        out.push_str("\nPhotos\n");
        for (number, data_url) in photos {
            out.push_str(&format!("Stop {number}: {data_url}\n"));
        }
    }
    out
}

/// Trigger a browser download of the rendered itinerary.
///
/// # Errors
/// Returns an error when the blob or object URL cannot be created, or when
/// the anchor element used to trigger the download cannot be built.
pub fn download_document(log: &TripLog, title: &str) -> Result<(), JsValue> {
    let content = render_document(log, title);
    let parts = js_sys::Array::of1(&JsValue::from_str(&content));
    let options = BlobPropertyBag::new();
    options.set_type("text/plain;charset=utf-8");
    let blob = Blob::new_with_str_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = dom::document().create_element("a")?.unchecked_into();
    anchor.set_href(&url);
    anchor.set_download(EXPORT_FILENAME);
    anchor.click();
    Url::revoke_object_url(&url)
}
