//! Lifecycle hook ingress.
//!
//! The host posts each hook it fires as `{id, object?}`. Create and update
//! hooks save the object to the store before the synchronizers run; delete
//! hooks drop it afterwards, since delete handlers check ownership against the
//! store.

use merchant_search_shared::DomainObject;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::config::Dependencies;
use crate::entities::SyncOutcome;
use crate::errors::SearchApiError;
use crate::hooks::HookKind;

#[derive(Debug, Clone, Deserialize)]
pub struct HookPayload {
    pub id: u64,
    #[serde(default)]
    pub object: Option<DomainObject>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HookOutcome {
    pub entity: &'static str,
    pub outcome: SyncOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HookResponse {
    pub hook: String,
    pub outcomes: Vec<HookOutcome>,
}

/// Apply a host hook to the store and fan it out to the synchronizers.
#[instrument(skip(deps, payload), fields(id = payload.id))]
pub async fn ingest(
    deps: &Dependencies,
    hook: &str,
    payload: HookPayload,
) -> Result<HookResponse, SearchApiError> {
    let kind = deps
        .dispatcher
        .kind(hook)
        .ok_or_else(|| SearchApiError::UnknownHook(hook.to_string()))?;
    let object = payload.object.as_ref();

    if kind != HookKind::Delete {
        if let Some(object) = object {
            deps.store.save(object).await?;
        }
    }

    let outcomes = deps.dispatcher.dispatch(hook, payload.id, object).await;

    if kind == HookKind::Delete {
        for (slug, outcome) in &outcomes {
            if *outcome == SyncOutcome::Skipped {
                continue;
            }
            let stored = deps
                .synchronizers
                .iter()
                .find(|sync| sync.slug() == *slug)
                .and_then(|sync| sync.entity().stored_kind());
            if let Some(stored) = stored {
                deps.store.remove(stored, payload.id).await?;
            }
        }
    }

    info!(hook, outcomes = ?outcomes, "Hook ingested");

    Ok(HookResponse {
        hook: hook.to_string(),
        outcomes: outcomes
            .into_iter()
            .map(|(entity, outcome)| HookOutcome { entity, outcome })
            .collect(),
    })
}
