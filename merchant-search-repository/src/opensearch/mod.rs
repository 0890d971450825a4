//! OpenSearch implementation of the hosted index provider.
//!
//! Each entity collection lives in its own index, named
//! `<index_prefix><collection>`.

mod index_config;
mod provider;

pub use index_config::{IndexConfig, OBJECT_ID_FIELD};
pub use provider::{OpenSearchProvider, OPENSEARCH_PROVIDER_SLUG};
