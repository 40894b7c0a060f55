//! Cart, saved-for-later and wishlist state.
//!
//! [`CartStore`] is the single owner of what the shopper intends to buy or
//! keep. It is an explicit value handed to whoever needs it; there is no
//! global instance.
//!
//! # Persistence
//!
//! Every mutating operation ends in one `commit`, which writes the whole
//! [`CartState`] as JSON under three keys:
//!
//! | Key          | Contents                         |
//! |--------------|----------------------------------|
//! | `cart`       | `[{"product": .., "quantity": n}]` |
//! | `savedItems` | `[{"product": ..}]`              |
//! | `wishlist`   | `[Product]`                      |
//!
//! A missing or unreadable key starts that collection empty.
//!
//! # Wishlist mirroring
//!
//! With [`CartStore::with_wishlist_sync`], wishlist changes are also sent to
//! a [`WishlistSync`]. A failed remote add rolls the local add back; a failed
//! remote remove is logged and the local removal stands.
//!
//! # Example
//!
//! ```
//! use storefront::cart::{CartStore, MemoryStorage};
//! use storefront::catalog::StaticCatalog;
//!
//! let catalog = StaticCatalog::seed();
//! let mat = &catalog.products()[6];
//!
//! let mut store = CartStore::open(MemoryStorage::new());
//! store.add_to_cart(mat, 2)?;
//! store.add_to_cart(mat, 1)?;
//!
//! assert_eq!(store.lines().len(), 1);
//! assert_eq!(store.total_items(), 3);
//! # Ok::<(), storefront::cart::StoreError>(())
//! ```

mod events;
mod storage;
mod wishlist_sync;

pub use events::CartEvent;
pub use storage::{FileStorage, MemoryStorage, StateStorage, StorageError};
pub use wishlist_sync::{MockWishlistSync, RemoteWishlistSync, WishlistSync};

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use storefront_core::{Price, Product, ProductId, UserId};

use crate::backend::BackendError;

/// Storage key for cart lines.
pub const CART_KEY: &str = "cart";
/// Storage key for saved-for-later items.
pub const SAVED_KEY: &str = "savedItems";
/// Storage key for the wishlist.
pub const WISHLIST_KEY: &str = "wishlist";

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The request was refused and state is unchanged.
    #[error("rejected: {0}")]
    ValidationRejected(String),

    /// State changed in memory but could not be persisted.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// State could not be encoded for persistence.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The remote wishlist mirror failed and the local change was undone.
    #[error("wishlist sync failed: {0}")]
    Transport(#[from] BackendError),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// State
// =============================================================================

/// One product in the cart with its quantity (always at least 1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// A product set aside for later. Quantity is not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLine {
    pub product: Product,
}

/// Everything the store persists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    pub cart: Vec<CartLine>,
    pub saved: Vec<SavedLine>,
    pub wishlist: Vec<Product>,
}

impl CartState {
    /// Sum of line quantities. Wider than a line quantity so the sum of
    /// many full lines is exact.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.cart.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Sum of price times quantity over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.cart.iter().map(CartLine::line_total).sum()
    }

    /// Re-establish the invariants on loaded data: duplicate lines merge,
    /// zero-quantity lines go, duplicate saved and wishlist entries collapse.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mut cart: Vec<CartLine> = Vec::with_capacity(self.cart.len());
        for line in self.cart.into_iter().filter(|l| l.quantity > 0) {
            match cart.iter_mut().find(|l| l.product.id == line.product.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(line.quantity);
                }
                None => cart.push(line),
            }
        }

        let mut seen = HashSet::new();
        let saved = self
            .saved
            .into_iter()
            .filter(|s| seen.insert(s.product.id.clone()))
            .collect();

        let mut seen = HashSet::new();
        let wishlist = self
            .wishlist
            .into_iter()
            .filter(|p| seen.insert(p.id.clone()))
            .collect();

        Self {
            cart,
            saved,
            wishlist,
        }
    }
}

/// What a wishlist toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WishlistChange {
    Added,
    Removed,
}

#[derive(Clone)]
struct WishlistMirror {
    user: UserId,
    sync: Arc<dyn WishlistSync>,
}

// =============================================================================
// Store
// =============================================================================

/// The cart/wishlist state container.
pub struct CartStore {
    state: CartState,
    storage: Box<dyn StateStorage>,
    mirror: Option<WishlistMirror>,
    events: Vec<CartEvent>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("state", &self.state)
            .field("mirror_user", &self.mirror.as_ref().map(|m| m.user))
            .field("pending_events", &self.events.len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load state from `storage`.
    ///
    /// Never fails: anything missing or unreadable starts empty and is logged.
    pub fn open(storage: impl StateStorage + 'static) -> Self {
        let state = CartState {
            cart: load_key(&storage, CART_KEY),
            saved: load_key(&storage, SAVED_KEY),
            wishlist: load_key(&storage, WISHLIST_KEY),
        }
        .normalized();

        debug!(
            lines = state.cart.len(),
            saved = state.saved.len(),
            wishlist = state.wishlist.len(),
            "Loaded cart state"
        );

        Self {
            state,
            storage: Box::new(storage),
            mirror: None,
            events: Vec::new(),
        }
    }

    /// Mirror wishlist membership for `user` through `sync`.
    #[must_use]
    pub fn with_wishlist_sync(mut self, user: UserId, sync: Arc<dyn WishlistSync>) -> Self {
        self.mirror = Some(WishlistMirror { user, sync });
        self
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    /// Add `quantity` of `product`, merging into an existing line.
    ///
    /// # Errors
    ///
    /// `ValidationRejected` if `quantity` is zero or the line would overflow;
    /// nothing changes in that case. `Storage`/`Serialize` if the commit fails.
    pub fn add_to_cart(&mut self, product: &Product, quantity: u32) -> StoreResult<()> {
        self.check_add(&product.id, quantity)?;

        match self.line_mut(&product.id) {
            Some(line) => line.quantity += quantity,
            None => self.state.cart.push(CartLine {
                product: product.clone(),
                quantity,
            }),
        }

        debug!(product_id = %product.id, quantity, "Added to cart");
        self.events.push(CartEvent::AddedToCart {
            product_id: product.id.clone(),
            name: product.name.clone(),
            quantity,
        });
        self.commit()
    }

    /// Remove the line for `product_id`, if any.
    ///
    /// # Errors
    ///
    /// `Storage`/`Serialize` if the commit fails.
    pub fn remove_from_cart(&mut self, product_id: &ProductId) -> StoreResult<()> {
        self.state.cart.retain(|line| &line.product.id != product_id);

        debug!(product_id = %product_id, "Removed from cart");
        self.events.push(CartEvent::RemovedFromCart {
            product_id: product_id.clone(),
        });
        self.commit()
    }

    /// Set the quantity of an existing line. Absent lines are left alone.
    ///
    /// # Errors
    ///
    /// `ValidationRejected` if `quantity` is zero. `Storage`/`Serialize` if
    /// the commit fails.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) -> StoreResult<()> {
        if quantity < 1 {
            return Err(StoreError::ValidationRejected(format!(
                "quantity for product {product_id} must be at least 1"
            )));
        }

        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
            debug!(product_id = %product_id, quantity, "Updated quantity");
        }
        self.commit()
    }

    /// Move a cart line to the saved list. No-op if it is not in the cart.
    ///
    /// # Errors
    ///
    /// `Storage`/`Serialize` if the commit fails.
    pub fn save_for_later(&mut self, product_id: &ProductId) -> StoreResult<()> {
        let Some(index) = self
            .state
            .cart
            .iter()
            .position(|line| &line.product.id == product_id)
        else {
            return Ok(());
        };

        let line = self.state.cart.remove(index);
        if !self.is_in_saved(product_id) {
            self.state.saved.push(SavedLine {
                product: line.product,
            });
        }

        debug!(product_id = %product_id, "Saved for later");
        self.events.push(CartEvent::SavedForLater {
            product_id: product_id.clone(),
        });
        self.commit()
    }

    /// Move a saved item back into the cart with quantity 1. No-op if it is
    /// not saved.
    ///
    /// # Errors
    ///
    /// `ValidationRejected` if the existing cart line is already at the
    /// maximum quantity. `Storage`/`Serialize` if the commit fails.
    pub fn move_to_cart(&mut self, product_id: &ProductId) -> StoreResult<()> {
        let Some(index) = self
            .state
            .saved
            .iter()
            .position(|saved| &saved.product.id == product_id)
        else {
            return Ok(());
        };

        self.check_add(product_id, 1)?;
        let saved = self.state.saved.remove(index);
        self.add_to_cart(&saved.product, 1)?;

        self.events.push(CartEvent::MovedToCart {
            product_id: product_id.clone(),
        });
        Ok(())
    }

    /// Empty the cart. Saved items and the wishlist are kept.
    ///
    /// # Errors
    ///
    /// `Storage`/`Serialize` if the commit fails.
    pub fn clear_cart(&mut self) -> StoreResult<()> {
        self.state.cart.clear();

        debug!("Cleared cart");
        self.events.push(CartEvent::CartCleared);
        self.commit()
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    /// Toggle wishlist membership.
    ///
    /// **Adding a product that is already wishlisted removes it.** The return
    /// value says which of the two happened.
    ///
    /// # Errors
    ///
    /// `Transport` if the remote mirror rejects the add (the local add is
    /// rolled back). A duplicate-key conflict from the mirror counts as
    /// success. `Storage`/`Serialize` if a commit fails; a failed first
    /// commit also rolls the local add back and queues no event.
    pub async fn add_to_wishlist(&mut self, product: &Product) -> StoreResult<WishlistChange> {
        if self.is_in_wishlist(&product.id) {
            self.remove_from_wishlist(&product.id).await?;
            return Ok(WishlistChange::Removed);
        }

        self.state.wishlist.push(product.clone());
        if let Err(e) = self.commit() {
            self.state.wishlist.retain(|p| p.id != product.id);
            return Err(e);
        }

        if let Some(mirror) = self.mirror.clone() {
            match mirror.sync.add(&mirror.user, &product.id).await {
                Ok(()) => {}
                Err(e) if e.is_conflict() => {
                    debug!(product_id = %product.id, "Wishlist row already exists");
                }
                Err(e) => {
                    warn!(product_id = %product.id, error = %e, "Wishlist sync failed, rolling back");
                    self.state.wishlist.retain(|p| p.id != product.id);
                    self.commit()?;
                    return Err(StoreError::Transport(e));
                }
            }
        }

        debug!(product_id = %product.id, "Added to wishlist");
        self.events.push(CartEvent::AddedToWishlist {
            product_id: product.id.clone(),
            name: product.name.clone(),
        });
        Ok(WishlistChange::Added)
    }

    /// Remove a product from the wishlist, if present.
    ///
    /// A failing remote mirror is logged; the local removal stands.
    ///
    /// # Errors
    ///
    /// `Storage`/`Serialize` if the commit fails.
    pub async fn remove_from_wishlist(&mut self, product_id: &ProductId) -> StoreResult<()> {
        self.state.wishlist.retain(|p| &p.id != product_id);

        debug!(product_id = %product_id, "Removed from wishlist");
        self.events.push(CartEvent::RemovedFromWishlist {
            product_id: product_id.clone(),
        });
        self.commit()?;

        if let Some(mirror) = self.mirror.clone()
            && let Err(e) = mirror.sync.remove(&mirror.user, product_id).await
        {
            warn!(product_id = %product_id, error = %e, "Wishlist sync failed, keeping local removal");
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn is_in_cart(&self, product_id: &ProductId) -> bool {
        self.state.cart.iter().any(|l| &l.product.id == product_id)
    }

    #[must_use]
    pub fn is_in_saved(&self, product_id: &ProductId) -> bool {
        self.state.saved.iter().any(|s| &s.product.id == product_id)
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: &ProductId) -> bool {
        self.state.wishlist.iter().any(|p| &p.id == product_id)
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_items(&self) -> u64 {
        self.state.total_items()
    }

    /// Sum of price times quantity, before shipping and tax.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.state.subtotal()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.state.cart
    }

    #[must_use]
    pub fn saved(&self) -> &[SavedLine] {
        &self.state.saved
    }

    #[must_use]
    pub fn wishlist(&self) -> &[Product] {
        &self.state.wishlist
    }

    #[must_use]
    pub const fn state(&self) -> &CartState {
        &self.state
    }

    /// Take the events queued since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<CartEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn push_event(&mut self, event: CartEvent) {
        self.events.push(event);
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.state
            .cart
            .iter_mut()
            .find(|l| &l.product.id == product_id)
    }

    fn check_add(&self, product_id: &ProductId, quantity: u32) -> StoreResult<()> {
        if quantity == 0 {
            return Err(StoreError::ValidationRejected(format!(
                "cannot add zero of product {product_id}"
            )));
        }
        let current = self
            .state
            .cart
            .iter()
            .find(|l| &l.product.id == product_id)
            .map_or(0, |l| l.quantity);
        if current.checked_add(quantity).is_none() {
            return Err(StoreError::ValidationRejected(format!(
                "quantity for product {product_id} is too large"
            )));
        }
        Ok(())
    }

    /// Persist the whole state.
    fn commit(&self) -> StoreResult<()> {
        let cart = serde_json::to_string(&self.state.cart)?;
        let saved = serde_json::to_string(&self.state.saved)?;
        let wishlist = serde_json::to_string(&self.state.wishlist)?;

        self.storage.write(CART_KEY, &cart)?;
        self.storage.write(SAVED_KEY, &saved)?;
        self.storage.write(WISHLIST_KEY, &wishlist)?;
        Ok(())
    }
}

fn load_key<T: DeserializeOwned>(storage: &dyn StateStorage, key: &str) -> Vec<T> {
    let raw = match storage.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "Could not read stored state, starting empty");
            return Vec::new();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!(key, error = %e, "Stored state is unreadable, starting empty");
        Vec::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::test_support::product;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn conflict() -> BackendError {
        BackendError::Conflict("duplicate key value".to_string())
    }

    fn unavailable() -> BackendError {
        BackendError::Api {
            status: 503,
            code: None,
            message: "unavailable".to_string(),
        }
    }

    fn synced_store(sync: MockWishlistSync) -> CartStore {
        CartStore::open(MemoryStorage::new()).with_wishlist_sync(UserId::random(), Arc::new(sync))
    }

    /// Storage whose writes always fail.
    struct BrokenStorage;

    impl StateStorage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Poisoned)
        }
    }

    // -------------------------------------------------------------------------
    // Cart
    // -------------------------------------------------------------------------

    #[test]
    fn test_add_merges_quantities() {
        let mut store = CartStore::open(MemoryStorage::new());
        let p = product("1", 1000, "Books");

        store.add_to_cart(&p, 2).unwrap();
        store.add_to_cart(&p, 3).unwrap();

        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, 5);
    }

    #[test]
    fn test_add_zero_is_rejected_and_not_persisted() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());

        let err = store.add_to_cart(&product("1", 1000, "Books"), 0);
        assert!(matches!(err, Err(StoreError::ValidationRejected(_))));
        assert!(store.lines().is_empty());
        assert!(store.drain_events().is_empty());
        assert_eq!(storage.read(CART_KEY).unwrap(), None);
    }

    #[test]
    fn test_add_overflow_is_rejected() {
        let mut store = CartStore::open(MemoryStorage::new());
        let p = product("1", 1000, "Books");
        store.add_to_cart(&p, u32::MAX).unwrap();

        assert!(matches!(
            store.add_to_cart(&p, 1),
            Err(StoreError::ValidationRejected(_))
        ));
        assert_eq!(store.lines()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_total_items_is_exact_past_line_maximum() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add_to_cart(&product("a", 100, "X"), u32::MAX).unwrap();
        store.add_to_cart(&product("b", 100, "X"), 5).unwrap();

        let sum: u64 = store.lines().iter().map(|l| u64::from(l.quantity)).sum();
        assert_eq!(store.total_items(), sum);
        assert_eq!(store.total_items(), u64::from(u32::MAX) + 5);
    }

    #[test]
    fn test_update_quantity_zero_leaves_line_unchanged() {
        let mut store = CartStore::open(MemoryStorage::new());
        let p = product("1", 1000, "Books");
        store.add_to_cart(&p, 4).unwrap();

        assert!(matches!(
            store.update_quantity(&p.id, 0),
            Err(StoreError::ValidationRejected(_))
        ));
        assert_eq!(store.lines()[0].quantity, 4);

        store.update_quantity(&p.id, 2).unwrap();
        assert_eq!(store.lines()[0].quantity, 2);
    }

    #[test]
    fn test_update_quantity_absent_is_noop() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.update_quantity(&ProductId::new("9"), 3).unwrap();
        assert!(store.lines().is_empty());
    }

    #[test]
    fn test_remove_absent_is_not_an_error() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.remove_from_cart(&ProductId::new("9")).unwrap();
        assert_eq!(
            store.drain_events(),
            [CartEvent::RemovedFromCart {
                product_id: ProductId::new("9")
            }]
        );
    }

    #[test]
    fn test_save_then_move_restores_quantity_one() {
        let mut store = CartStore::open(MemoryStorage::new());
        let p = product("1", 1000, "Books");
        store.add_to_cart(&p, 3).unwrap();

        store.save_for_later(&p.id).unwrap();
        assert!(!store.is_in_cart(&p.id));
        assert!(store.is_in_saved(&p.id));

        store.move_to_cart(&p.id).unwrap();
        assert!(!store.is_in_saved(&p.id));
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, 1);
    }

    #[test]
    fn test_save_for_later_does_not_duplicate() {
        let mut store = CartStore::open(MemoryStorage::new());
        let p = product("1", 1000, "Books");

        store.add_to_cart(&p, 1).unwrap();
        store.save_for_later(&p.id).unwrap();
        store.add_to_cart(&p, 1).unwrap();
        store.save_for_later(&p.id).unwrap();

        assert_eq!(store.saved().len(), 1);
    }

    #[test]
    fn test_save_and_move_absent_are_noops() {
        let mut store = CartStore::open(MemoryStorage::new());
        let id = ProductId::new("9");
        store.save_for_later(&id).unwrap();
        store.move_to_cart(&id).unwrap();
        assert!(store.drain_events().is_empty());
    }

    #[test]
    fn test_move_to_cart_emits_add_then_move() {
        let mut store = CartStore::open(MemoryStorage::new());
        let p = product("1", 1000, "Books");
        store.add_to_cart(&p, 1).unwrap();
        store.save_for_later(&p.id).unwrap();
        store.drain_events();

        store.move_to_cart(&p.id).unwrap();
        let titles: Vec<String> = store.drain_events().iter().map(CartEvent::title).collect();
        assert_eq!(titles, ["Product 1 added to cart", "Item moved to cart"]);
    }

    #[test]
    fn test_clear_cart_keeps_saved_and_wishlist() {
        let mut store = CartStore::open(MemoryStorage::new());
        let a = product("a", 1000, "Books");
        let b = product("b", 2000, "Books");
        store.add_to_cart(&a, 1).unwrap();
        store.add_to_cart(&b, 1).unwrap();
        store.save_for_later(&b.id).unwrap();

        store.clear_cart().unwrap();
        assert!(store.lines().is_empty());
        assert!(store.is_in_saved(&b.id));
    }

    #[test]
    fn test_aggregates() {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add_to_cart(&product("a", 1999, "X"), 3).unwrap();
        store.add_to_cart(&product("b", 500, "X"), 2).unwrap();

        assert_eq!(store.total_items(), 5);
        assert_eq!(store.subtotal(), Price::from_cents(6997));
    }

    #[test]
    fn test_failed_commit_is_reported() {
        let mut store = CartStore::open(BrokenStorage);
        let result = store.add_to_cart(&product("a", 1000, "X"), 1);
        assert!(matches!(result, Err(StoreError::Storage(_))));
        // In-memory state stays authoritative for the session.
        assert!(store.is_in_cart(&ProductId::new("a")));
    }

    #[tokio::test]
    async fn test_failed_wishlist_commit_rolls_back_add() {
        let mut sync = MockWishlistSync::new();
        sync.expect_add().never();
        let mut store = CartStore::open(BrokenStorage)
            .with_wishlist_sync(UserId::random(), Arc::new(sync));

        let result = store.add_to_wishlist(&product("a", 1000, "X")).await;

        assert!(matches!(result, Err(StoreError::Storage(_))));
        assert!(!store.is_in_wishlist(&ProductId::new("a")));
        assert!(store.drain_events().is_empty());
    }

    // -------------------------------------------------------------------------
    // Persistence
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_state_survives_reopen() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());

        store.add_to_cart(&product("a", 1000, "Books"), 2).unwrap();
        store.add_to_cart(&product("b", 2500, "Clothing"), 1).unwrap();
        store.add_to_cart(&product("c", 300, "Books"), 1).unwrap();
        store.save_for_later(&ProductId::new("c")).unwrap();
        store
            .add_to_wishlist(&product("d", 4000, "Electronics"))
            .await
            .unwrap();

        let reopened = CartStore::open(storage);
        assert_eq!(reopened.state(), store.state());
    }

    #[test]
    fn test_file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = CartStore::open(FileStorage::open(dir.path()).unwrap());
        store.add_to_cart(&product("a", 1000, "Books"), 2).unwrap();

        let reopened = CartStore::open(FileStorage::open(dir.path()).unwrap());
        assert_eq!(reopened.state(), store.state());
    }

    #[test]
    fn test_persisted_shape() {
        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone());
        store.add_to_cart(&product("a", 1000, "Books"), 2).unwrap();

        let cart: serde_json::Value =
            serde_json::from_str(&storage.read(CART_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(cart[0]["quantity"], 2);
        assert_eq!(cart[0]["product"]["id"], "a");
        assert_eq!(cart[0]["product"]["inStock"], true);
        assert_eq!(storage.read(SAVED_KEY).unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.read(WISHLIST_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_unreadable_key_starts_empty() {
        let storage = MemoryStorage::new();
        let line = serde_json::to_string(&[CartLine {
            product: product("a", 1000, "Books"),
            quantity: 1,
        }])
        .unwrap();
        storage.write(CART_KEY, &line).unwrap();
        storage.write(WISHLIST_KEY, "{not json").unwrap();

        let store = CartStore::open(storage);
        assert_eq!(store.lines().len(), 1);
        assert!(store.wishlist().is_empty());
    }

    #[test]
    fn test_load_merges_duplicates_and_drops_empty_lines() {
        let a = product("a", 1000, "Books");
        let b = product("b", 1000, "Books");
        let lines = vec![
            CartLine {
                product: a.clone(),
                quantity: 2,
            },
            CartLine {
                product: b.clone(),
                quantity: 0,
            },
            CartLine {
                product: a.clone(),
                quantity: 3,
            },
        ];
        let storage = MemoryStorage::new();
        storage
            .write(CART_KEY, &serde_json::to_string(&lines).unwrap())
            .unwrap();
        storage
            .write(WISHLIST_KEY, &serde_json::to_string(&[&a, &a, &b]).unwrap())
            .unwrap();

        let store = CartStore::open(storage);
        assert_eq!(store.lines().len(), 1);
        assert_eq!(store.lines()[0].quantity, 5);
        assert_eq!(store.wishlist().len(), 2);
    }

    // -------------------------------------------------------------------------
    // Wishlist
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_wishlist_toggle_twice_restores_membership() {
        let mut store = CartStore::open(MemoryStorage::new());
        let p = product("1", 1000, "Books");

        assert_eq!(
            store.add_to_wishlist(&p).await.unwrap(),
            WishlistChange::Added
        );
        assert!(store.is_in_wishlist(&p.id));
        assert_eq!(
            store.add_to_wishlist(&p).await.unwrap(),
            WishlistChange::Removed
        );
        assert!(!store.is_in_wishlist(&p.id));

        let titles: Vec<String> = store.drain_events().iter().map(CartEvent::title).collect();
        assert_eq!(
            titles,
            ["Product 1 added to wishlist", "Item removed from wishlist"]
        );
    }

    #[tokio::test]
    async fn test_wishlist_sync_failure_rolls_back() {
        let mut sync = MockWishlistSync::new();
        sync.expect_add().once().returning(|_, _| Err(unavailable()));

        let storage = MemoryStorage::new();
        let mut store = CartStore::open(storage.clone())
            .with_wishlist_sync(UserId::random(), Arc::new(sync));
        let p = product("1", 1000, "Books");

        let result = store.add_to_wishlist(&p).await;
        assert!(matches!(result, Err(StoreError::Transport(_))));
        assert!(!store.is_in_wishlist(&p.id));
        assert_eq!(storage.read(WISHLIST_KEY).unwrap().as_deref(), Some("[]"));
        assert!(store.drain_events().is_empty());
    }

    #[tokio::test]
    async fn test_wishlist_sync_conflict_is_success() {
        let mut sync = MockWishlistSync::new();
        sync.expect_add().once().returning(|_, _| Err(conflict()));

        let mut store = synced_store(sync);
        let p = product("1", 1000, "Books");

        assert_eq!(
            store.add_to_wishlist(&p).await.unwrap(),
            WishlistChange::Added
        );
        assert!(store.is_in_wishlist(&p.id));
    }

    #[tokio::test]
    async fn test_wishlist_remove_keeps_local_removal_on_sync_failure() {
        let mut sync = MockWishlistSync::new();
        sync.expect_add().once().returning(|_, _| Ok(()));
        sync.expect_remove()
            .once()
            .returning(|_, _| Err(unavailable()));

        let mut store = synced_store(sync);
        let p = product("1", 1000, "Books");
        store.add_to_wishlist(&p).await.unwrap();

        store.remove_from_wishlist(&p.id).await.unwrap();
        assert!(!store.is_in_wishlist(&p.id));
    }

    #[tokio::test]
    async fn test_wishlist_sync_receives_user_and_product() {
        let user = UserId::random();
        let mut sync = MockWishlistSync::new();
        sync.expect_add()
            .withf(move |u, p| *u == user && p.as_str() == "7")
            .once()
            .returning(|_, _| Ok(()));

        let mut store =
            CartStore::open(MemoryStorage::new()).with_wishlist_sync(user, Arc::new(sync));
        store
            .add_to_wishlist(&product("7", 4599, "Sports & Fitness"))
            .await
            .unwrap();
    }

    // -------------------------------------------------------------------------
    // Randomized sequences
    // -------------------------------------------------------------------------

    #[test]
    fn test_aggregates_hold_over_random_sequences() {
        let catalog: Vec<Product> = (0..6)
            .map(|i| product(&i.to_string(), 199 + i * 350, "X"))
            .collect();

        for seed in 0..32 {
            let mut rng = StdRng::seed_from_u64(seed);
            let storage = MemoryStorage::new();
            let mut store = CartStore::open(storage.clone());

            for _ in 0..200 {
                let p = &catalog[rng.random_range(0..catalog.len())];
                let quantity = rng.random_range(0..5);
                match rng.random_range(0..5) {
                    0 | 1 => {
                        let before = store.state().clone();
                        if store.add_to_cart(p, quantity).is_err() {
                            assert_eq!(quantity, 0);
                            assert_eq!(store.state(), &before);
                        }
                    }
                    2 => store.remove_from_cart(&p.id).unwrap(),
                    3 => {
                        let _ = store.update_quantity(&p.id, quantity);
                    }
                    _ => {
                        if rng.random_bool(0.5) {
                            store.save_for_later(&p.id).unwrap();
                        } else {
                            store.move_to_cart(&p.id).unwrap();
                        }
                    }
                }

                let lines = store.lines();
                let items: u64 = lines.iter().map(|l| u64::from(l.quantity)).sum();
                let subtotal: Price = lines.iter().map(|l| l.product.price * l.quantity).sum();
                assert_eq!(store.total_items(), items);
                assert_eq!(store.subtotal(), subtotal);
                assert!(lines.iter().all(|l| l.quantity >= 1));

                let mut ids: Vec<&ProductId> = lines.iter().map(|l| &l.product.id).collect();
                ids.sort();
                ids.dedup();
                assert_eq!(ids.len(), lines.len());
            }

            assert_eq!(CartStore::open(storage).state(), store.state());
        }
    }
}
