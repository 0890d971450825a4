use crate::types::{settings_option_name, ProviderDescription, ProviderSettings, SettingsField};

/// Configuration capability for providers that need credentials.
///
/// The settings screen renders `settings_fields`; values are persisted under
/// [`settings_option_name`] and handed back to the provider factory.
pub trait SettingsCapable: Send + Sync {
    /// Provider slug the settings belong to.
    fn settings_slug(&self) -> &str;

    fn settings_fields(&self) -> Vec<SettingsField>;

    fn settings_description(&self) -> ProviderDescription;

    /// Current settings values.
    fn settings(&self) -> &ProviderSettings;

    /// Option key the settings are stored under.
    fn option_name(&self) -> String {
        settings_option_name(self.settings_slug())
    }

    /// Values of fields flagged public, falling back to field defaults.
    ///
    /// Private fields (admin keys, passwords) are never included.
    fn public_settings(&self) -> ProviderSettings {
        let values = self.settings();
        self.settings_fields()
            .into_iter()
            .filter(|field| field.public)
            .map(|field| {
                let value = values
                    .get(&field.name)
                    .cloned()
                    .or(field.default)
                    .unwrap_or_default();
                (field.name, value)
            })
            .collect()
    }
}
