//! Application state shared across handlers.

use std::sync::Arc;

use maxfood_core::Catalog;

use crate::config::StorefrontConfig;
use crate::content::ContentStore;

/// Application state shared across all handlers.
///
/// Cloning is cheap: everything lives behind one `Arc`. The content store is
/// read-only after startup, so handlers need no locking.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    content: ContentStore,
}

impl AppState {
    /// Create a new application state from configuration and loaded content.
    #[must_use]
    pub fn new(config: StorefrontConfig, content: ContentStore) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, content }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the blog catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.inner.content.catalog()
    }
}
