//! Typed access to the persisted plugin settings.

use std::sync::Arc;

use merchant_search_repository::{settings_option_name, ProviderSettings, LOCAL_PROVIDER_SLUG};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::options::OptionStore;
use crate::errors::SettingsError;

/// Option key of the main settings object.
pub const MAIN_SETTINGS_OPTION: &str = "merchant_buddy_main_settings";

/// Option key of the enabled entity list.
pub const ENABLED_ENTITIES_OPTION: &str = "merchant_buddy_enabled_entities";

/// Entities enabled when nothing has been saved yet.
pub const DEFAULT_ENABLED_ENTITIES: [&str; 3] = ["orders", "products", "customers"];

/// The main settings object.
///
/// Flags are stored as `"yes"`/`"no"` strings, matching what the settings
/// screen writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MainSettings {
    pub enabled: String,
    pub provider: String,
    pub shortcut: String,
    pub frontend: String,
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            enabled: "yes".to_string(),
            provider: LOCAL_PROVIDER_SLUG.to_string(),
            shortcut: "meta+k".to_string(),
            frontend: "no".to_string(),
        }
    }
}

impl MainSettings {
    pub fn is_enabled(&self) -> bool {
        self.enabled == "yes"
    }

    pub fn frontend_enabled(&self) -> bool {
        self.frontend == "yes"
    }
}

/// Reads and writes settings through an [`OptionStore`].
///
/// Unreadable or malformed values fall back to defaults with a warning, so a
/// corrupt option never stops the service from loading.
#[derive(Clone)]
pub struct Settings {
    store: Arc<dyn OptionStore>,
}

impl Settings {
    pub fn new(store: Arc<dyn OptionStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn OptionStore> {
        &self.store
    }

    fn read(&self, key: &str) -> Option<Value> {
        match self.store.get_option(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(option = key, error = %e, "Failed to read option, using defaults");
                None
            }
        }
    }

    pub fn main_settings(&self) -> MainSettings {
        self.read(MAIN_SETTINGS_OPTION)
            .and_then(|value| match serde_json::from_value(value) {
                Ok(settings) => Some(settings),
                Err(e) => {
                    warn!(option = MAIN_SETTINGS_OPTION, error = %e, "Malformed main settings");
                    None
                }
            })
            .unwrap_or_default()
    }

    /// Persist a new active provider.
    ///
    /// Only the `provider` key changes; every other stored key, including
    /// unknown ones, is kept as is.
    pub fn set_provider(&self, provider: &str) -> Result<(), SettingsError> {
        let mut object = match self.read(MAIN_SETTINGS_OPTION) {
            Some(Value::Object(object)) => object,
            _ => match serde_json::to_value(MainSettings::default())? {
                Value::Object(object) => object,
                _ => Map::new(),
            },
        };
        object.insert("provider".to_string(), Value::String(provider.to_string()));
        self.store
            .update_option(MAIN_SETTINGS_OPTION, Value::Object(object))
    }

    pub fn enabled_entities(&self) -> Vec<String> {
        match self.read(ENABLED_ENTITIES_OPTION) {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            Some(other) => {
                warn!(option = ENABLED_ENTITIES_OPTION, value = %other, "Malformed enabled entities");
                Self::default_enabled_entities()
            }
            None => Self::default_enabled_entities(),
        }
    }

    fn default_enabled_entities() -> Vec<String> {
        DEFAULT_ENABLED_ENTITIES
            .iter()
            .map(|slug| slug.to_string())
            .collect()
    }

    pub fn set_enabled_entities(&self, slugs: &[String]) -> Result<(), SettingsError> {
        self.store
            .update_option(ENABLED_ENTITIES_OPTION, serde_json::to_value(slugs)?)
    }

    /// Remove one entity from the enabled list.
    pub fn disable_entity(&self, slug: &str) -> Result<(), SettingsError> {
        let remaining: Vec<String> = self
            .enabled_entities()
            .into_iter()
            .filter(|enabled| enabled != slug)
            .collect();
        self.set_enabled_entities(&remaining)
    }

    /// Settings saved for a provider. Non-string values are stringified.
    pub fn provider_settings(&self, provider: &str) -> ProviderSettings {
        let key = settings_option_name(provider);
        match self.read(&key) {
            Some(Value::Object(object)) => object
                .into_iter()
                .map(|(name, value)| {
                    let value = match value {
                        Value::String(s) => s,
                        Value::Null => String::new(),
                        other => other.to_string(),
                    };
                    (name, value)
                })
                .collect(),
            _ => ProviderSettings::new(),
        }
    }

    pub fn save_provider_settings(
        &self,
        provider: &str,
        settings: &ProviderSettings,
    ) -> Result<(), SettingsError> {
        self.store
            .update_option(&settings_option_name(provider), serde_json::to_value(settings)?)
    }
}
