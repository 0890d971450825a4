//! Configuration: persisted options, typed settings and startup wiring.

pub mod dependencies;
pub mod options;
pub mod settings;

pub use dependencies::{AppConfig, Dependencies, Extensions};
pub use options::{JsonFileOptionStore, MemoryOptionStore, OptionStore};
pub use settings::{
    MainSettings, Settings, DEFAULT_ENABLED_ENTITIES, ENABLED_ENTITIES_OPTION,
    MAIN_SETTINGS_OPTION,
};
