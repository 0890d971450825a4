//! Data the palette front end is started with.

use std::collections::BTreeMap;

use merchant_search_repository::ProviderSettings;
use merchant_search_shared::Binding;
use serde::Serialize;

use crate::config::Dependencies;
use crate::hooks::filters::INTERNAL_DIALOG_FILTER;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityBootstrap {
    pub template: &'static str,
    pub bindings: BTreeMap<String, Binding>,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MainBootstrap {
    pub provider: String,
    pub enabled: bool,
    pub shortcut: String,
    /// Whether the palette also loads outside the admin.
    pub frontend: bool,
    pub initial_entries: Vec<String>,
    pub initial_index: usize,
    pub dialog: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootstrapData {
    pub entities: BTreeMap<String, EntityBootstrap>,
    pub main: MainBootstrap,
    /// Public settings of the active provider, when it is configurable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderSettings>,
}

impl BootstrapData {
    pub fn collect(deps: &Dependencies) -> Self {
        let entities = deps
            .synchronizers
            .iter()
            .map(|sync| {
                let descriptor = sync.entity().descriptor();
                (
                    descriptor.slug.to_string(),
                    EntityBootstrap {
                        template: descriptor.layout.template().slug(),
                        bindings: descriptor.layout.bindings().clone(),
                        label: descriptor.label,
                    },
                )
            })
            .collect();

        let settings = deps.settings.main_settings();
        let provider = deps.selector.provider();

        Self {
            entities,
            main: MainBootstrap {
                provider: provider.slug().to_string(),
                enabled: settings.is_enabled(),
                frontend: settings.frontend_enabled(),
                shortcut: settings.shortcut,
                initial_entries: vec!["/".to_string()],
                initial_index: 0,
                dialog: deps.filters.apply_filters(INTERNAL_DIALOG_FILTER, true),
            },
            provider: provider.as_settings().map(|s| s.public_settings()),
        }
    }
}
