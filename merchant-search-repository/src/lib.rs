//! # Merchant Search Repository
//!
//! This crate provides the index provider contract and its implementations:
//! the built-in local provider, which keeps no index, and a hosted provider
//! backed by OpenSearch. It also defines the optional provider capabilities
//! (batch writes, entity-aware deletes, settings) and the provider registry.

pub mod errors;
pub mod interfaces;
pub mod local;
pub mod opensearch;
pub mod registry;
pub mod types;

pub use errors::SearchIndexError;
pub use interfaces::{BatchIndexProvider, EntityDeleter, IndexProvider, SettingsCapable};
pub use local::{LocalProvider, LOCAL_PROVIDER_SLUG};
pub use opensearch::{OpenSearchProvider, OPENSEARCH_PROVIDER_SLUG};
pub use registry::{ProviderFactory, ProviderRegistry, RegisteredProvider};
pub use types::{
    settings_option_name, BatchOperationResult, BatchOperationSummary, FieldKind, HelpLink,
    ProviderDescription, ProviderSettings, SettingsField,
};
