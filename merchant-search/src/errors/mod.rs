//! Error types for the merchant search service.

use std::any::Any;

use thiserror::Error;

/// Errors from reading or writing persisted options.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Option file could not be read or written.
    #[error("Settings I/O error: {0}")]
    IoError(String),

    /// Option value could not be (de)serialized.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
}

impl SettingsError {
    /// Create an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Errors from the commerce store port.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    /// The store cannot answer right now.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Snapshot file could not be read.
    #[error("Store I/O error: {0}")]
    IoError(String),

    /// Snapshot could not be parsed.
    #[error("Store serialization error: {0}")]
    SerializationError(String),
}

impl StoreError {
    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create an I/O error.
    pub fn io(msg: impl Into<String>) -> Self {
        Self::IoError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}

/// Reasons an explicit provider switch is refused.
///
/// Load-time resolution uses the same checks but falls back silently; this
/// type is only raised on the manual switch path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderSwitchError {
    #[error("Provider {0} not found.")]
    NotFound(String),

    #[error("Provider {0} does not implement the index provider contract.")]
    InvalidContract(String),

    #[error("Provider {provider} could not be constructed: {message}")]
    ConstructionFailed { provider: String, message: String },

    #[error("Provider {0} is not ready.")]
    NotReady(String),
}

/// Errors that abort a batch reconciliation run.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Error switching provider: {0}")]
    ProviderSwitch(#[from] ProviderSwitchError),

    #[error("Provider {0} does not support batch operations.")]
    NotBatchable(String),
}

/// Errors raised by an entity type that fails to load.
#[derive(Error, Debug, Clone)]
#[error("Entity {slug} failed to load: {message}")]
pub struct EntityLoadError {
    pub slug: String,
    pub message: String,
}

impl EntityLoadError {
    pub fn new(slug: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            message: message.into(),
        }
    }
}

/// Errors returned by the search API.
#[derive(Error, Debug)]
pub enum SearchApiError {
    /// No credentials were supplied.
    #[error("Authentication required.")]
    Unauthorized,

    /// Caller lacks the admin capability.
    #[error("Sorry, you cannot list resources.")]
    Forbidden,

    /// Entity slug is not registered or not enabled.
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    /// No loaded entity listens to the hook.
    #[error("Unknown hook: {0}")]
    UnknownHook(String),

    /// The commerce store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return message.to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    "unknown panic".to_string()
}
