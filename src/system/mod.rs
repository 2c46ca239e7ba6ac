mod autostart;
mod prefs;

pub use autostart::{
    create_autostart, AutostartService, DesktopAutostart, DryrunAutostart, DEFAULT_DESKTOP_FILE,
    DEFAULT_RESOURCE,
};
pub use prefs::{
    create_store, FileStore, KeyValueStore, MemoryStore, Preferences, ToggleOutcome,
    LAUNCH_AT_STARTUP_KEY,
};
