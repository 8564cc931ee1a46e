//! Client-side shopping cart.
//!
//! The cart is owned by the caller through a [`CartStore`], which writes a
//! full snapshot to an injected [`CartPersistence`] backend after every
//! mutation and rehydrates from it on open.
//!
//! # Invariants
//!
//! - `product_id` is unique across items; adding an existing product merges
//!   into the existing row by incrementing its quantity.
//! - Every stored item has `quantity >= 1`. Updating a quantity to zero or
//!   below removes the row.
//! - Items keep insertion order, which is also display order.
//!
//! # Quantity policy
//!
//! [`CartStore::add_item`] rejects a zero quantity with
//! [`CartError::InvalidQuantity`] instead of clamping it, so a caller bug
//! never silently turns into a line of one.
//!
//! # Amounts
//!
//! The store never holds a cart whose total price overflows [`Decimal`]. An
//! add that would push it past the limit fails with
//! [`CartError::AmountOverflow`], and a quantity update saturates at the
//! largest quantity that still fits.
//!
//! # Persistence
//!
//! Storage failures never reach the caller. A snapshot that cannot be read or
//! decoded is discarded in favour of an empty cart, and a failed save is
//! logged while the in-memory cart stays authoritative for the session.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::pricing::{CartTotals, CheckoutOptions, PricingError};
use crate::types::ProductId;

/// Well-known key the cart snapshot is stored under.
pub const CART_STORAGE_KEY: &str = "maxfood-cart";

/// Current snapshot format version.
const SNAPSHOT_VERSION: u32 = 1;

/// Validation errors for cart input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CartError {
    /// Quantity on add must be at least one.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// Unit price must not be negative.
    #[error("unit price must not be negative (got {0})")]
    NegativePrice(Decimal),

    /// Product id is empty.
    #[error("product id cannot be empty")]
    InvalidProductId,

    /// Merging would push the line quantity past the representable maximum.
    #[error("quantity for {0} would exceed the maximum")]
    QuantityOverflow(ProductId),

    /// The cart total would not fit in a decimal amount.
    #[error("cart total would exceed the maximum amount")]
    AmountOverflow,

    /// Two rows share a product id.
    #[error("duplicate cart line for {0}")]
    DuplicateProduct(ProductId),
}

/// Errors reported by a [`CartPersistence`] backend.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    /// Storage is unavailable or the read/write failed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl CartItem {
    /// Create a line item.
    #[must_use]
    pub fn new(
        product_id: impl Into<ProductId>,
        name: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            name: name.into(),
            unit_price,
            quantity,
            image: None,
        }
    }

    /// Attach an image reference.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// `unit_price × quantity`, or `None` if it overflows.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// Check the item could be stored as-is.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), CartError> {
        if self.product_id.is_blank() {
            return Err(CartError::InvalidProductId);
        }
        if self.quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(CartError::NegativePrice(self.unit_price));
        }
        Ok(())
    }
}

/// The shopping list plus the time it was last changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    pub last_modified: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    /// Create an empty cart stamped with the current time.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            last_modified: Utc::now(),
        }
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `unit_price × quantity` over all items, or `None` if it
    /// overflows.
    #[must_use]
    pub fn total_price(&self) -> Option<Decimal> {
        self.items.iter().try_fold(Decimal::ZERO, |total, item| {
            total.checked_add(item.line_total()?)
        })
    }

    /// Check every item and the uniqueness of product ids.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), CartError> {
        let mut seen = std::collections::HashSet::with_capacity(self.items.len());
        for item in &self.items {
            item.validate()?;
            if !seen.insert(&item.product_id) {
                return Err(CartError::DuplicateProduct(item.product_id.clone()));
            }
        }
        if self.total_price().is_none() {
            return Err(CartError::AmountOverflow);
        }
        Ok(())
    }

    fn position(&self, product_id: &ProductId) -> Option<usize> {
        self.items
            .iter()
            .position(|item| &item.product_id == product_id)
    }

    fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// On-disk/in-storage representation of a cart.
#[derive(Debug, Deserialize)]
struct CartSnapshot {
    version: u32,
    cart: Cart,
}

#[derive(Serialize)]
struct CartSnapshotRef<'a> {
    version: u32,
    cart: &'a Cart,
}

/// Encode a cart as snapshot text.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_snapshot(cart: &Cart) -> Result<String, serde_json::Error> {
    serde_json::to_string(&CartSnapshotRef {
        version: SNAPSHOT_VERSION,
        cart,
    })
}

/// Decode snapshot text, returning `None` if it is malformed, from an unknown
/// version, or describes a cart that violates an invariant.
#[must_use]
pub fn decode_snapshot(text: &str) -> Option<Cart> {
    let snapshot: CartSnapshot = match serde_json::from_str(text) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Cart snapshot is not valid JSON");
            return None;
        }
    };

    if snapshot.version != SNAPSHOT_VERSION {
        warn!(version = snapshot.version, "Unsupported cart snapshot version");
        return None;
    }

    if let Err(e) = snapshot.cart.validate() {
        warn!(error = %e, "Cart snapshot violates cart invariants");
        return None;
    }

    Some(snapshot.cart)
}

/// Durable storage for a single cart snapshot.
///
/// Implementations store opaque text under one key; the store owns the
/// encoding.
pub trait CartPersistence {
    /// Read the stored snapshot, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    fn load(&self) -> Result<Option<String>, PersistenceError>;

    /// Replace the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be written.
    fn save(&self, snapshot: &str) -> Result<(), PersistenceError>;
}

impl<P: CartPersistence + ?Sized> CartPersistence for &P {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, snapshot: &str) -> Result<(), PersistenceError> {
        (**self).save(snapshot)
    }
}

/// In-memory persistence, for tests and for transient carts built from
/// request payloads.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: Mutex<Option<String>>,
}

impl MemoryPersistence {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with snapshot text.
    #[must_use]
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(snapshot.into())),
        }
    }

    /// The last saved snapshot, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl CartPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<String>, PersistenceError> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| PersistenceError::Unavailable("lock poisoned".to_string()))
    }

    fn save(&self, snapshot: &str) -> Result<(), PersistenceError> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| PersistenceError::Unavailable("lock poisoned".to_string()))?;
        *slot = Some(snapshot.to_owned());
        Ok(())
    }
}

/// The authoritative cart for one browsing session.
///
/// Single writer: the store is owned by its caller and needs no locking.
#[derive(Debug)]
pub struct CartStore<P: CartPersistence> {
    cart: Cart,
    persistence: P,
}

impl<P: CartPersistence> CartStore<P> {
    /// Open the store, rehydrating from any prior snapshot.
    ///
    /// Never fails: a missing, unreadable, or corrupt snapshot yields an empty
    /// cart.
    pub fn open(persistence: P) -> Self {
        let cart = match persistence.load() {
            Ok(Some(text)) => decode_snapshot(&text).unwrap_or_else(|| {
                warn!(key = CART_STORAGE_KEY, "Discarding unreadable cart snapshot");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                warn!(
                    key = CART_STORAGE_KEY,
                    error = %e,
                    "Cart storage unavailable, starting empty"
                );
                Cart::new()
            }
        };

        debug!(items = cart.items.len(), "Cart opened");
        Self { cart, persistence }
    }

    /// Add an item, merging into an existing row with the same product id.
    ///
    /// When merging, only the quantity changes; the stored name, price and
    /// image are kept. The product id is trimmed before matching.
    ///
    /// # Errors
    ///
    /// Returns a [`CartError`] if the item fails validation, or if the merged
    /// quantity or the cart total would overflow. The cart is unchanged in
    /// that case.
    pub fn add_item(&mut self, mut item: CartItem) -> Result<(), CartError> {
        item.product_id =
            ProductId::parse(item.product_id.as_str()).map_err(|_| CartError::InvalidProductId)?;
        item.validate()?;

        let current = self.total_price();
        if let Some(existing) = self
            .cart
            .items
            .iter_mut()
            .find(|existing| existing.product_id == item.product_id)
        {
            let quantity = existing
                .quantity
                .checked_add(item.quantity)
                .ok_or_else(|| CartError::QuantityOverflow(item.product_id.clone()))?;
            existing
                .unit_price
                .checked_mul(Decimal::from(item.quantity))
                .and_then(|added| current.checked_add(added))
                .ok_or(CartError::AmountOverflow)?;
            existing.quantity = quantity;
        } else {
            item.line_total()
                .and_then(|line| current.checked_add(line))
                .ok_or(CartError::AmountOverflow)?;
            self.cart.items.push(item);
        }

        self.commit();
        Ok(())
    }

    /// Remove the item with `product_id`. Absent ids are ignored.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        if let Some(index) = self.cart.position(product_id) {
            self.cart.items.remove(index);
            self.commit();
        }
    }

    /// Replace an item's quantity.
    ///
    /// A quantity of zero or less removes the item. Quantities beyond
    /// `u32::MAX`, or large enough to overflow the cart total, saturate at
    /// the largest quantity that fits. Absent ids are ignored.
    pub fn update_quantity(&mut self, product_id: &ProductId, new_quantity: i64) {
        if new_quantity <= 0 {
            self.remove_item(product_id);
            return;
        }

        let Some(index) = self.cart.position(product_id) else {
            return;
        };
        let requested = u32::try_from(new_quantity).unwrap_or(u32::MAX);
        let quantity = requested.min(self.max_quantity_at(index));
        if quantity < requested {
            warn!(
                %product_id,
                requested,
                quantity,
                "Quantity capped to keep the cart total representable"
            );
        }

        if let Some(item) = self.cart.items.get_mut(index) {
            item.quantity = quantity;
            self.commit();
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.cart.items.clear();
        self.commit();
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.cart.total_item_count()
    }

    /// Sum of `unit_price × quantity` over all items.
    #[must_use]
    pub fn total_price(&self) -> Decimal {
        // Every mutation keeps the sum representable.
        self.cart.total_price().unwrap_or(Decimal::MAX)
    }

    /// Order totals with tax, shipping and coupon applied.
    ///
    /// # Errors
    ///
    /// Propagates shipping validation errors.
    pub fn totals(&self, options: &CheckoutOptions) -> Result<CartTotals, PricingError> {
        CartTotals::compute(
            self.total_item_count(),
            self.total_price(),
            options,
            Utc::now(),
        )
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.cart.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.items.is_empty()
    }

    /// Look up the line for `product_id`.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.cart
            .items
            .iter()
            .find(|item| &item.product_id == product_id)
    }

    /// The persistence backend.
    #[must_use]
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    /// Largest quantity the line at `index` can hold without the cart total
    /// overflowing.
    fn max_quantity_at(&self, index: usize) -> u32 {
        let mut others = Decimal::ZERO;
        let mut unit_price = Decimal::ZERO;
        for (i, item) in self.cart.items.iter().enumerate() {
            if i == index {
                unit_price = item.unit_price;
            } else {
                others = item
                    .line_total()
                    .and_then(|line| others.checked_add(line))
                    .unwrap_or(Decimal::MAX);
            }
        }

        if unit_price.is_zero() {
            return u32::MAX;
        }
        (Decimal::MAX - others)
            .checked_div(unit_price)
            .and_then(|quantity| quantity.floor().to_u32())
            .unwrap_or(u32::MAX)
    }

    /// Stamp the cart and persist a snapshot, logging any failure.
    fn commit(&mut self) {
        self.cart.touch();

        let snapshot = match encode_snapshot(&self.cart) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(error = %e, "Failed to encode cart snapshot");
                return;
            }
        };

        if let Err(e) = self.persistence.save(&snapshot) {
            error!(key = CART_STORAGE_KEY, error = %e, "Failed to persist cart snapshot");
        }
    }
}
