//! Active provider resolution.
//!
//! The configured provider goes through four checks, first failure wins:
//! registered, valid factory entry, constructed without error or panic, ready.
//! At load time a failure falls back to the local provider, persists
//! `provider = "default"` and raises an admin notice. The manual switch path
//! runs the same checks and hands the failure back to the caller instead.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, OnceLock};

use merchant_search_repository::{
    IndexProvider, LocalProvider, ProviderRegistry, LOCAL_PROVIDER_SLUG,
};
use tracing::{error, info, instrument, warn};

use crate::config::Settings;
use crate::errors::{panic_message, ProviderSwitchError};
use crate::notices::AdminNotices;

/// How the active provider was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderState {
    Ready,
    Fallback(ProviderSwitchError),
}

/// The provider resolved at load time.
#[derive(Clone)]
pub struct ActiveProvider {
    pub provider: Arc<dyn IndexProvider>,
    pub state: ProviderState,
}

impl std::fmt::Debug for ActiveProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveProvider")
            .field("provider", &self.provider.slug())
            .field("state", &self.state)
            .finish()
    }
}

pub struct ProviderSelector {
    registry: Arc<ProviderRegistry>,
    settings: Settings,
    notices: Arc<AdminNotices>,
    active: OnceLock<ActiveProvider>,
}

impl ProviderSelector {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        settings: Settings,
        notices: Arc<AdminNotices>,
    ) -> Self {
        Self {
            registry,
            settings,
            notices,
            active: OnceLock::new(),
        }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// The active provider, resolved on first call and cached afterwards.
    pub fn active(&self) -> &ActiveProvider {
        self.active.get_or_init(|| self.resolve())
    }

    pub fn provider(&self) -> Arc<dyn IndexProvider> {
        self.active().provider.clone()
    }

    /// Build and check a provider without touching persisted settings.
    #[instrument(skip(self))]
    pub fn switch_provider(&self, name: &str) -> Result<Arc<dyn IndexProvider>, ProviderSwitchError> {
        let provider = self.try_provider(name)?;
        info!(provider = name, "Switched provider");
        Ok(provider)
    }

    fn resolve(&self) -> ActiveProvider {
        let name = self.settings.main_settings().provider;

        if name == LOCAL_PROVIDER_SLUG {
            return ActiveProvider {
                provider: self.local_provider(),
                state: ProviderState::Ready,
            };
        }

        match self.try_provider(&name) {
            Ok(provider) => {
                info!(provider = %name, "Loaded index provider");
                ActiveProvider {
                    provider,
                    state: ProviderState::Ready,
                }
            }
            Err(reason) => {
                warn!(provider = %name, reason = %reason, "Falling back to default provider");
                self.notices.error(fallback_notice(&name, &reason));
                if let Err(e) = self.settings.set_provider(LOCAL_PROVIDER_SLUG) {
                    error!(error = %e, "Failed to persist provider fallback");
                }
                ActiveProvider {
                    provider: self.local_provider(),
                    state: ProviderState::Fallback(reason),
                }
            }
        }
    }

    fn try_provider(&self, name: &str) -> Result<Arc<dyn IndexProvider>, ProviderSwitchError> {
        if !self.registry.contains(name) {
            return Err(ProviderSwitchError::NotFound(name.to_string()));
        }

        let factory = self
            .registry
            .factory(name)
            .ok_or_else(|| ProviderSwitchError::InvalidContract(name.to_string()))?;

        let settings = self.settings.provider_settings(name);
        let provider = match catch_unwind(AssertUnwindSafe(|| factory.build(&settings))) {
            Ok(Ok(provider)) => provider,
            Ok(Err(e)) => {
                return Err(ProviderSwitchError::ConstructionFailed {
                    provider: name.to_string(),
                    message: e.to_string(),
                })
            }
            Err(payload) => {
                return Err(ProviderSwitchError::ConstructionFailed {
                    provider: name.to_string(),
                    message: panic_message(payload.as_ref()),
                })
            }
        };

        if !provider.is_ready() {
            return Err(ProviderSwitchError::NotReady(name.to_string()));
        }

        Ok(provider)
    }

    /// The registered default provider, or the built-in one if that entry is
    /// unusable.
    fn local_provider(&self) -> Arc<dyn IndexProvider> {
        match self.try_provider(LOCAL_PROVIDER_SLUG) {
            Ok(provider) => provider,
            Err(e) => {
                warn!(error = %e, "Default provider entry unusable, using built-in");
                Arc::new(LocalProvider::new())
            }
        }
    }
}

/// Admin notice text for a load-time fallback.
pub fn fallback_notice(name: &str, reason: &ProviderSwitchError) -> String {
    match reason {
        ProviderSwitchError::NotFound(_) => {
            format!("WooBuddy: {} provider not found, fallback to default", name)
        }
        ProviderSwitchError::InvalidContract(_) => format!(
            "WooBuddy: {} provider does not implement the provider contract, fallback to default",
            name
        ),
        ProviderSwitchError::ConstructionFailed { message, .. } => format!(
            "WooBuddy: Initiating {} provider failed with error: {}, fallback to default",
            name, message
        ),
        ProviderSwitchError::NotReady(_) => {
            format!("WooBuddy: {} provider is not ready, fallback to default", name)
        }
    }
}
