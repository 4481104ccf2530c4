pub mod config;
pub mod help;
pub mod history;
pub mod list;
pub mod task;
pub mod timer;

use hyprpomo_core::JsonFileStore;

/// Open the progression store in the data directory.
pub(crate) fn open_store() -> Result<JsonFileStore, Box<dyn std::error::Error>> {
    Ok(JsonFileStore::open()?)
}
