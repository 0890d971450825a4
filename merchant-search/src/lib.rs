//! # Merchant Search
//!
//! Keeps a search index in sync with a store's orders, products and
//! customers, and serves the command palette that queries it.
//!
//! ## Architecture
//!
//! 1. **Entities**: map commerce objects to flat indexable records
//! 2. **Synchronizers**: turn lifecycle hooks into index provider writes
//! 3. **Selector**: resolves the configured provider, falling back to the
//!    local one when it is unusable
//! 4. **Batch**: pages through an entity and pushes it through the provider's
//!    batch capability
//! 5. **API**: admin-only search and bootstrap endpoints
//!
//! ## Modules
//!
//! - [`config`]: option storage, settings and dependency wiring
//! - [`entities`]: entity types, record mapping and synchronizers
//! - [`hooks`]: lifecycle hook dispatch and the filter registry
//! - [`store`]: the commerce store port
//! - [`selector`]: active provider resolution
//! - [`batch`]: batch reconciliation
//! - [`api`]: REST surface
//! - [`notices`]: admin notices
//! - [`errors`]: error types

pub mod api;
pub mod batch;
pub mod config;
pub mod entities;
pub mod errors;
pub mod hooks;
pub mod notices;
pub mod selector;
pub mod store;

pub use config::{AppConfig, Dependencies};

use thiserror::Error;

use crate::errors::{BatchError, SettingsError};

/// Errors that can occur during startup or a command run.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Settings could not be read or written.
    #[error("Settings error: {0}")]
    SettingsError(#[from] SettingsError),

    /// Batch run aborted.
    #[error("Batch error: {0}")]
    BatchError(#[from] BatchError),

    /// HTTP server error.
    #[error("Server error: {0}")]
    ServerError(String),
}

impl AppError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a server error.
    pub fn server(msg: impl Into<String>) -> Self {
        Self::ServerError(msg.into())
    }
}
