//! Interface definitions for index providers.
//!
//! `IndexProvider` is the contract every backend must satisfy. The remaining
//! traits are optional capabilities a provider exposes through the
//! `as_*` accessors on `IndexProvider`.

mod batch_index_provider;
mod entity_deleter;
mod index_provider;
mod settings_capable;

pub use batch_index_provider::BatchIndexProvider;
pub use entity_deleter::EntityDeleter;
pub use index_provider::IndexProvider;
pub use settings_capable::SettingsCapable;
