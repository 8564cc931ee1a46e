//! Cart commands against a snapshot file.
//!
//! # Usage
//!
//! ```bash
//! maxfood cart add --id oat-1kg --name "Oat flakes 1kg" --price 2.50 --quantity 2
//! maxfood cart update --id oat-1kg --quantity 5
//! maxfood cart total --shipping express --weight 12 --coupon-percent 10
//! maxfood cart clear
//! ```

use std::io::Write;

use clap::Subcommand;
use maxfood_core::{
    CartError, CartItem, CartPersistence, CartStore, CheckoutOptions, Coupon, CouponKind,
    CurrencyCode, Price, ProductId, ShippingMethod,
};
use rust_decimal::Decimal;

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum CartAction {
    /// List cart lines
    Show,
    /// Add a product, merging with an existing line
    Add {
        /// Product id
        #[arg(long)]
        id: String,

        /// Display name
        #[arg(long)]
        name: String,

        /// Unit price
        #[arg(long)]
        price: Decimal,

        /// Quantity to add
        #[arg(long, default_value_t = 1)]
        quantity: u32,

        /// Image reference
        #[arg(long)]
        image: Option<String>,
    },
    /// Remove a product line
    Remove {
        #[arg(long)]
        id: String,
    },
    /// Set a line's quantity (zero or less removes it)
    Update {
        #[arg(long)]
        id: String,

        #[arg(long, allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every line
    Clear,
    /// Print totals with tax, shipping and discount
    Total {
        /// Shipping method (`standard`, `express`, `overnight`)
        #[arg(long)]
        shipping: Option<ShippingMethod>,

        /// Parcel weight in kilograms
        #[arg(long, requires = "shipping")]
        weight: Option<Decimal>,

        /// Percentage discount to apply
        #[arg(long)]
        coupon_percent: Option<Decimal>,
    },
}

/// Run a cart action, writing human-readable output to `out`.
///
/// # Errors
///
/// Returns an error if the input is rejected, the product is not in the cart,
/// or output cannot be written.
pub fn run<P: CartPersistence>(
    action: CartAction,
    store: &mut CartStore<P>,
    currency: CurrencyCode,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let money = |amount: Decimal| Price::new(amount, currency).display();

    match action {
        CartAction::Show => {
            if store.is_empty() {
                writeln!(out, "Cart is empty")?;
                return Ok(());
            }
            for item in store.items() {
                let line_total = item.line_total().ok_or(CartError::AmountOverflow)?;
                writeln!(
                    out,
                    "{:<16} {:<32} {:>4} x {:>10} = {:>10}",
                    item.product_id.as_str(),
                    item.name,
                    item.quantity,
                    money(item.unit_price),
                    money(line_total),
                )?;
            }
            writeln!(
                out,
                "{} items, {}",
                store.total_item_count(),
                money(store.total_price())
            )?;
        }
        CartAction::Add {
            id,
            name,
            price,
            quantity,
            image,
        } => {
            let mut item = CartItem::new(id.trim(), name, price, quantity);
            if let Some(image) = image {
                item = item.with_image(image);
            }
            let product_id = item.product_id.clone();
            store.add_item(item)?;

            let quantity = store.get(&product_id).map_or(0, |line| line.quantity);
            tracing::info!(%product_id, quantity, "Added to cart");
            writeln!(out, "{product_id}: {quantity} in cart")?;
        }
        CartAction::Remove { id } => {
            let product_id = existing(store, &id)?;
            store.remove_item(&product_id);
            writeln!(out, "Removed {product_id}")?;
        }
        CartAction::Update { id, quantity } => {
            let product_id = existing(store, &id)?;
            store.update_quantity(&product_id, quantity);
            match store.get(&product_id) {
                Some(line) => writeln!(out, "{product_id}: {} in cart", line.quantity)?,
                None => writeln!(out, "Removed {product_id}")?,
            }
        }
        CartAction::Clear => {
            store.clear();
            writeln!(out, "Cart cleared")?;
        }
        CartAction::Total {
            shipping,
            weight,
            coupon_percent,
        } => {
            let options = CheckoutOptions {
                shipping: shipping.map(|method| (method, weight)),
                coupon: coupon_percent.map(|value| Coupon {
                    code: "CLI".to_string(),
                    kind: CouponKind::Percentage,
                    value,
                    min_subtotal: None,
                    expires_at: None,
                    active: true,
                }),
            };
            let totals = store.totals(&options)?;

            writeln!(out, "Items:    {}", totals.item_count)?;
            writeln!(out, "Subtotal: {}", money(totals.subtotal))?;
            writeln!(out, "Tax:      {}", money(totals.tax))?;
            writeln!(out, "Shipping: {}", money(totals.shipping))?;
            if !totals.discount.is_zero() {
                writeln!(out, "Discount: -{}", money(totals.discount))?;
            }
            writeln!(out, "Total:    {}", money(totals.total))?;
        }
    }

    Ok(())
}

/// Resolve `id` to a product id that is in the cart.
fn existing<P: CartPersistence>(store: &CartStore<P>, id: &str) -> Result<ProductId, CliError> {
    let product_id = ProductId::from(id.trim());
    if store.get(&product_id).is_none() {
        return Err(CliError::NotInCart(product_id));
    }
    Ok(product_id)
}
