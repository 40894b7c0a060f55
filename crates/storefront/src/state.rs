//! Application state shared across front-end commands.

use std::sync::Arc;

use tracing::debug;

use storefront_core::UserId;

use crate::backend::{BackendClient, BackendError};
use crate::cart::{CartStore, FileStorage, RemoteWishlistSync, StorageError};
use crate::catalog::{CachedCatalog, CatalogSource, RemoteCatalog, StaticCatalog};
use crate::checkout::{OrderSubmitter, RemoteOrderSubmitter};
use crate::config::{CatalogMode, StorefrontConfig};

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configured catalog, backend client and local cart state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Arc<dyn CatalogSource>,
    backend: Option<BackendClient>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("backend", &self.inner.backend)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::InvalidUrl` if the backend URL cannot be used.
    pub fn new(config: StorefrontConfig) -> Result<Self, BackendError> {
        let backend = config
            .backend
            .as_ref()
            .map(BackendClient::new)
            .transpose()?;

        let catalog: Arc<dyn CatalogSource> = match (&config.catalog, &backend) {
            (CatalogMode::Remote, Some(client)) => {
                let remote = Arc::new(RemoteCatalog::new(client.clone()));
                Arc::new(CachedCatalog::new(remote, config.catalog_cache_ttl))
            }
            _ => Arc::new(StaticCatalog::seed()),
        };

        Ok(Self::with_catalog(config, catalog, backend))
    }

    /// Build state around an explicit catalog source.
    #[must_use]
    pub fn with_catalog(
        config: StorefrontConfig,
        catalog: Arc<dyn CatalogSource>,
        backend: Option<BackendClient>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                backend,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The configured catalog source.
    #[must_use]
    pub fn catalog(&self) -> &dyn CatalogSource {
        self.inner.catalog.as_ref()
    }

    /// The signed-in shopper, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.inner.config.identity.as_ref().map(|i| i.user_id)
    }

    /// Open the persisted cart in the configured state directory.
    ///
    /// With a backend and a signed-in shopper, wishlist changes are mirrored
    /// remotely.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the state directory cannot be created.
    pub fn open_cart_store(&self) -> Result<CartStore, StorageError> {
        let storage = FileStorage::open(&self.inner.config.state_dir)?;
        let store = CartStore::open(storage);

        match (self.user_client(), self.user_id()) {
            (Some(client), Some(user)) => {
                debug!(user_id = %user, "Mirroring wishlist to backend");
                Ok(store.with_wishlist_sync(user, Arc::new(RemoteWishlistSync::new(client))))
            }
            _ => Ok(store),
        }
    }

    /// Order submission for the signed-in shopper. `None` without a backend
    /// or identity.
    #[must_use]
    pub fn order_submitter(&self) -> Option<Arc<dyn OrderSubmitter>> {
        self.user_client()
            .map(|client| Arc::new(RemoteOrderSubmitter::new(client)) as Arc<dyn OrderSubmitter>)
    }

    /// Backend client authenticated as the shopper.
    fn user_client(&self) -> Option<BackendClient> {
        let backend = self.inner.backend.as_ref()?;
        let identity = self.inner.config.identity.as_ref()?;
        Some(backend.with_access_token(identity.access_token.clone()))
    }
}
