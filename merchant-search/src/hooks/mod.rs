//! Host hook plumbing.
//!
//! - [`filters`]: keyed transform chains used as extension points
//! - [`dispatcher`]: routes lifecycle hooks to entity synchronizers

pub mod dispatcher;
pub mod filters;

pub use dispatcher::HookDispatcher;
pub use filters::FilterRegistry;

/// What a lifecycle hook means for the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    Create,
    Update,
    Delete,
}

/// A host hook an entity subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookBinding {
    pub hook: &'static str,
    pub kind: HookKind,
}

impl HookBinding {
    pub const fn create(hook: &'static str) -> Self {
        Self {
            hook,
            kind: HookKind::Create,
        }
    }

    pub const fn update(hook: &'static str) -> Self {
        Self {
            hook,
            kind: HookKind::Update,
        }
    }

    pub const fn delete(hook: &'static str) -> Self {
        Self {
            hook,
            kind: HookKind::Delete,
        }
    }
}
