//! localStorage-backed implementation of the trip log store.
use roadtrip_core::{TripLog, TripStorage};
use thiserror::Error;

use crate::dom;

/// Well-known localStorage key holding the serialized trip log.
pub const LOG_STORAGE_KEY: &str = "roadtrip.log";

/// Failures of the browser storage collaborator.
///
/// These are surfaced to the engine distinctly from service degradation:
/// a failed write threatens durability, so the engine reports it and keeps
/// the session's log in memory.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("localStorage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write rejected: {0}")]
    Write(String),
    #[error("stored trip log is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Trip log persistence backed by `window.localStorage`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalTripStore;

impl TripStorage for LocalTripStore {
    type Error = StorageError;

    fn save_log(&self, log: &TripLog) -> Result<(), Self::Error> {
        let storage = dom::local_storage()
            .map_err(|err| StorageError::Unavailable(dom::js_error_message(&err)))?;
        let json = serde_json::to_string(log)?;
        storage
            .set_item(LOG_STORAGE_KEY, &json)
            .map_err(|err| StorageError::Write(dom::js_error_message(&err)))
    }

    fn load_log(&self) -> Result<Option<TripLog>, Self::Error> {
        let storage = dom::local_storage()
            .map_err(|err| StorageError::Unavailable(dom::js_error_message(&err)))?;
        let Some(json) = storage
            .get_item(LOG_STORAGE_KEY)
            .map_err(|err| StorageError::Unavailable(dom::js_error_message(&err)))?
        else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn clear_log(&self) -> Result<(), Self::Error> {
        let storage = dom::local_storage()
            .map_err(|err| StorageError::Unavailable(dom::js_error_message(&err)))?;
        storage
            .remove_item(LOG_STORAGE_KEY)
            .map_err(|err| StorageError::Write(dom::js_error_message(&err)))
    }
}
