//! Error types for the merchant search repository.
//!
//! This module provides a unified error type for all index provider operations.

mod search_index_error;

pub use search_index_error::SearchIndexError;
