//! Built-in provider that keeps no index of its own.

mod provider;

pub use provider::{LocalProvider, LOCAL_PROVIDER_SLUG};
