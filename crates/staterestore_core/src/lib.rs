//! Core state persistence and restoration for the item editor.
//! UI layers call into this crate; it owns every data and lifecycle invariant.

pub mod activity;
pub mod config;
pub mod logging;
pub mod model;
pub mod restoration;
pub mod store;

pub use activity::codec::{ActivityCodec, CodecError, DEFAULT_ACTIVITY_TITLE};
pub use activity::{ActivityRecord, EditContext};
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::Item;
pub use restoration::{
    EditContextView, FileRestorationStorage, LaunchSource, MemoryRestorationStorage,
    PendingRestoration, RestorationCoordinator, RestorationError, RestorationHost,
    RestorationPhase, RestorationResult, RestorationStorage, RestoreOutcome, SuspendOutcome,
    RESTORE_ACTIVITY_KEY,
};
pub use store::{ItemStore, StoreError, StoreResult, COLLECTION_ARCHIVE_FILE_NAME};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
