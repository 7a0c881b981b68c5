//! Reactive view of a form store
//!
//! Views read the store directly; a [`StoreVersion`] makes those reads
//! reactive by bumping a signal after every dispatched action.

use leptos::prelude::*;
use schemaform::{FormAction, FormStore};
use std::sync::Arc;

/// A counter signal advanced by every store action
#[derive(Clone, Copy)]
pub struct StoreVersion(RwSignal<u64>);

impl StoreVersion {
    /// Subscribe to `store` for the lifetime of the current owner
    pub fn subscribe(store: Arc<dyn FormStore>) -> Self {
        let version = RwSignal::new(0u64);
        let id = store.subscribe(Arc::new(move |action: &FormAction| {
            log::trace!("store action for form {}", action.form());
            // The view may already be gone when the store outlives it
            version.try_update(|v| *v += 1);
        }));
        on_cleanup(move || store.unsubscribe(id));
        Self(version)
    }

    /// Register the current reactive scope as dependent on the store
    pub fn track(&self) {
        self.0.track();
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}
