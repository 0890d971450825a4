//! Dependency initialization and wiring for the merchant search service.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use merchant_search_repository::ProviderRegistry;
use tracing::{error, info, warn};

use crate::api::SearchService;
use crate::batch::BatchReconciler;
use crate::config::{JsonFileOptionStore, Settings};
use crate::entities::{
    EntityCatalog, EntityContext, EntitySynchronizer, MapContext, DEFAULT_DATE_FORMAT,
};
use crate::hooks::filters::{AVAILABLE_ENTITIES_FILTER, AVAILABLE_PROVIDERS_FILTER};
use crate::hooks::{FilterRegistry, HookDispatcher};
use crate::notices::AdminNotices;
use crate::selector::ProviderSelector;
use crate::store::{CommerceStore, InMemoryStore};
use crate::AppError;

/// Default option file.
const DEFAULT_OPTIONS_PATH: &str = "options.json";

/// Default store snapshot file.
const DEFAULT_STORE_PATH: &str = "store.json";

/// Default HTTP bind address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default admin base URL used in record links.
const DEFAULT_ADMIN_URL: &str = "http://localhost/wp-admin/";

/// Process configuration read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub options_path: PathBuf,
    pub store_path: PathBuf,
    pub bind_addr: String,
    pub admin_token: Option<String>,
    pub admin_url: String,
    pub date_format: String,
}

impl AppConfig {
    /// Read configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MERCHANT_SEARCH_OPTIONS_PATH`: JSON option file (default: options.json)
    /// - `MERCHANT_SEARCH_STORE_PATH`: JSON store snapshot (default: store.json)
    /// - `MERCHANT_SEARCH_BIND_ADDR`: HTTP bind address (default: 127.0.0.1:8080)
    /// - `MERCHANT_SEARCH_ADMIN_TOKEN`: bearer token granting admin access (unset: API closed)
    /// - `MERCHANT_SEARCH_ADMIN_URL`: admin base URL for links (default: http://localhost/wp-admin/)
    /// - `MERCHANT_SEARCH_DATE_FORMAT`: chrono date format (default: `%B %-d, %Y`)
    pub fn from_env() -> Self {
        Self {
            options_path: env::var("MERCHANT_SEARCH_OPTIONS_PATH")
                .unwrap_or_else(|_| DEFAULT_OPTIONS_PATH.to_string())
                .into(),
            store_path: env::var("MERCHANT_SEARCH_STORE_PATH")
                .unwrap_or_else(|_| DEFAULT_STORE_PATH.to_string())
                .into(),
            bind_addr: env::var("MERCHANT_SEARCH_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            admin_token: env::var("MERCHANT_SEARCH_ADMIN_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
            admin_url: env::var("MERCHANT_SEARCH_ADMIN_URL")
                .unwrap_or_else(|_| DEFAULT_ADMIN_URL.to_string()),
            date_format: env::var("MERCHANT_SEARCH_DATE_FORMAT")
                .unwrap_or_else(|_| DEFAULT_DATE_FORMAT.to_string()),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        self.bind_addr.parse().map_err(|e| {
            AppError::config(format!("Invalid bind address {}: {}", self.bind_addr, e))
        })
    }
}

/// Extension points and registries handed to [`Dependencies::build`].
pub struct Extensions {
    pub filters: FilterRegistry,
    pub providers: ProviderRegistry,
    pub entities: EntityCatalog,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            filters: FilterRegistry::new(),
            providers: ProviderRegistry::with_builtin(),
            entities: EntityCatalog::builtin(),
        }
    }
}

/// Container for all initialized dependencies.
pub struct Dependencies {
    pub settings: Settings,
    pub notices: Arc<AdminNotices>,
    pub filters: Arc<FilterRegistry>,
    pub selector: Arc<ProviderSelector>,
    pub store: Arc<dyn CommerceStore>,
    /// Loaded entities, in catalog order.
    pub synchronizers: Vec<Arc<EntitySynchronizer>>,
    pub dispatcher: HookDispatcher,
    pub search: Arc<SearchService>,
    pub admin_token: Option<String>,
}

impl Dependencies {
    /// Initialize all dependencies from the process configuration.
    pub fn new(config: &AppConfig) -> Result<Self, AppError> {
        info!(
            options_path = %config.options_path.display(),
            store_path = %config.store_path.display(),
            admin_url = %config.admin_url,
            admin_token_set = config.admin_token.is_some(),
            "Initializing dependencies"
        );

        let options = JsonFileOptionStore::open(&config.options_path)?;
        let settings = Settings::new(Arc::new(options));
        let store = Self::load_store(&config.store_path)?;
        let map = MapContext::new(config.admin_url.clone(), config.date_format.clone());

        let mut deps = Self::build(settings, store, Extensions::default(), map);
        deps.admin_token = config.admin_token.clone();
        Ok(deps)
    }

    /// Wire everything from explicit parts.
    ///
    /// Resolves the active provider, then loads every registered entity that
    /// is enabled in settings. An entity that fails to load is dropped from
    /// the enabled list and reported as a notice; the rest keep loading.
    pub fn build(
        settings: Settings,
        store: Arc<dyn CommerceStore>,
        extensions: Extensions,
        map: MapContext,
    ) -> Self {
        let Extensions {
            filters,
            providers,
            entities,
        } = extensions;

        let providers = filters.apply_filters(AVAILABLE_PROVIDERS_FILTER, providers);
        let catalog = filters.apply_filters(AVAILABLE_ENTITIES_FILTER, entities);
        let filters = Arc::new(filters);
        let notices = Arc::new(AdminNotices::new());

        let selector = Arc::new(ProviderSelector::new(
            Arc::new(providers),
            settings.clone(),
            notices.clone(),
        ));
        let provider = selector.provider();

        let context = EntityContext::new(filters.clone(), map);
        let enabled = settings.enabled_entities();
        let mut synchronizers = Vec::new();
        let mut dispatcher = HookDispatcher::new();

        for (slug, factory) in catalog.iter() {
            if !enabled.iter().any(|enabled| enabled == slug) {
                continue;
            }

            match factory(&context) {
                Ok(entity) => {
                    let synchronizer = Arc::new(EntitySynchronizer::new(
                        entity,
                        store.clone(),
                        provider.clone(),
                    ));
                    dispatcher.subscribe(synchronizer.clone());
                    synchronizers.push(synchronizer);
                }
                Err(e) => {
                    warn!(entity = slug, error = %e, "Entity failed to load, disabling it");
                    notices.error(format!(
                        "WooBuddy: Initiating {} entity failed with error: {}, disabling it.",
                        slug, e.message
                    ));
                    if let Err(e) = settings.disable_entity(slug) {
                        error!(entity = slug, error = %e, "Failed to persist disabled entity");
                    }
                }
            }
        }

        info!(
            provider = provider.slug(),
            entities = ?synchronizers.iter().map(|s| s.slug()).collect::<Vec<_>>(),
            "Dependencies initialized"
        );

        let search = Arc::new(SearchService::new(synchronizers.clone()));

        Self {
            settings,
            notices,
            filters,
            selector,
            store,
            synchronizers,
            dispatcher,
            search,
            admin_token: None,
        }
    }

    /// Batch driver over the loaded entities.
    pub fn batch_reconciler(&self) -> BatchReconciler {
        BatchReconciler::new(self.synchronizers.clone(), self.selector.clone())
    }

    /// Load the store snapshot. A missing file yields an empty store.
    fn load_store(path: &Path) -> Result<Arc<dyn CommerceStore>, AppError> {
        if !path.exists() {
            warn!(path = %path.display(), "Store snapshot not found, starting empty");
            return Ok(Arc::new(InMemoryStore::new()));
        }

        let store = InMemoryStore::load(path)
            .map_err(|e| AppError::config(format!("Failed to load store snapshot: {}", e)))?;
        Ok(Arc::new(store))
    }
}
