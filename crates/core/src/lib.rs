//! MaxFood Core - Domain logic for the MaxFood storefront.
//!
//! This crate is shared by every MaxFood component:
//! - `storefront` - JSON API serving the blog catalog and price quotes
//! - `cli` - Local client holding a cart snapshot on disk
//!
//! # Architecture
//!
//! The core crate performs no I/O. Anything that touches durable storage goes
//! through the [`cart::CartPersistence`] trait, which callers implement for
//! their backend (memory, file, browser storage bridge).
//!
//! # Modules
//!
//! - [`types`] - Locales, prices, and string-backed identifiers
//! - [`cart`] - Cart data model and the persisted [`cart::CartStore`]
//! - [`pricing`] - Shipping rates, tax, coupons, and cart totals
//! - [`catalog`] - Read-only blog post catalog with search and filtering

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod pricing;
pub mod types;

pub use cart::{
    CART_STORAGE_KEY, Cart, CartError, CartItem, CartPersistence, CartStore, MemoryPersistence,
    PersistenceError,
};
pub use catalog::{Catalog, CatalogError, ContentItem, SearchQuery};
pub use pricing::{CartTotals, CheckoutOptions, Coupon, CouponKind, PricingError, ShippingMethod};
pub use types::*;
