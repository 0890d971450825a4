//! Settings and bulk-result types shared by index providers.

use std::collections::BTreeMap;

use merchant_search_shared::RecordId;
use serde::{Deserialize, Serialize};

use crate::errors::SearchIndexError;

/// Persisted key/value settings for one provider.
pub type ProviderSettings = BTreeMap<String, String>;

/// Option key holding a provider's settings.
///
/// # Example
///
/// ```
/// use merchant_search_repository::types::settings_option_name;
/// assert_eq!(
///     settings_option_name("opensearch"),
///     "merchant_buddy_opensearch_provider_settings"
/// );
/// ```
pub fn settings_option_name(provider_slug: &str) -> String {
    format!("merchant_buddy_{}_provider_settings", provider_slug)
}

/// Input kind rendered by the settings screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Password,
}

/// One configurable provider setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsField {
    /// Key inside [`ProviderSettings`].
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    pub description: String,
    /// Whether the value may be sent to the browser.
    pub public: bool,
    pub default: Option<String>,
}

impl SettingsField {
    pub fn new(name: impl Into<String>, title: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            kind,
            description: String::new(),
            public: false,
            default: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn public(mut self) -> Self {
        self.public = true;
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Link shown next to a provider description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpLink {
    pub label: String,
    pub url: String,
}

/// Text shown above a provider's settings form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescription {
    pub text: String,
    pub link: Option<HelpLink>,
}

/// Result of a bulk operation for a single record.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    pub id: RecordId,
    pub success: bool,
    /// Error if the operation failed.
    pub error: Option<SearchIndexError>,
}

/// Aggregate outcome of one bulk request.
///
/// Providers reduce this to a single boolean for the batch contract, but keep
/// the per-record results around so failures can be logged with their ids.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    pub fn push(&mut self, result: BatchOperationResult) {
        self.total += 1;
        if result.success {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.results.push(result);
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Ids of the records that failed.
    pub fn failed_ids(&self) -> Vec<String> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| r.id.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut summary = BatchOperationSummary::default();
        summary.push(BatchOperationResult {
            id: RecordId::from(1),
            success: true,
            error: None,
        });
        summary.push(BatchOperationResult {
            id: RecordId::from(2),
            success: false,
            error: Some(SearchIndexError::bulk_index("mapper_parsing_exception")),
        });

        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_success());
        assert_eq!(summary.failed_ids(), vec!["2".to_string()]);
    }

    #[test]
    fn test_empty_summary_is_success() {
        assert!(BatchOperationSummary::default().is_success());
    }

    #[test]
    fn test_settings_field_serializes_kind_as_type() {
        let field = SettingsField::new("password", "Password", FieldKind::Password);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(value["type"], "password");
        assert_eq!(value["public"], false);
    }
}
