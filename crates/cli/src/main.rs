//! MaxFood CLI - Local cart, shipping and blog tools.
//!
//! # Usage
//!
//! ```bash
//! # Add to the local cart (stored in ./maxfood-cart.json by default)
//! maxfood cart add --id oat-1kg --name "Oat flakes 1kg" --price 2.50 --quantity 2
//!
//! # Show totals with express shipping for a 12 kg parcel
//! maxfood cart total --shipping express --weight 12
//!
//! # Shipping quote in Swedish kronor
//! maxfood --locale sv shipping --method standard --weight 4
//!
//! # Search the Swedish blog
//! maxfood blog search --locale sv --query kvalitet
//! ```
//!
//! # Commands
//!
//! - `cart` - Manage the cart snapshot file
//! - `shipping` - Quote shipping for a method and weight
//! - `blog search` - Search posts in a content directory

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use maxfood_core::{CartStore, Locale};
use rust_decimal::Decimal;

mod commands;
mod error;
mod storage;

use commands::{blog::BlogAction, cart::CartAction};
use error::CliError;
use storage::FilePersistence;

#[derive(Parser)]
#[command(name = "maxfood")]
#[command(author, version, about = "MaxFood cart, shipping and blog tools")]
struct Cli {
    /// Cart snapshot file
    #[arg(
        long,
        global = true,
        env = "MAXFOOD_CART_FILE",
        default_value = "maxfood-cart.json"
    )]
    cart_file: PathBuf,

    /// Locale code (es, sv, en, fr, de, ar, zh, ja); sets the price currency
    #[arg(long, global = true, env = "MAXFOOD_LOCALE", default_value = "en")]
    locale: Locale,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Quote shipping
    Shipping {
        /// Shipping method (`standard`, `express`, `overnight`)
        #[arg(long)]
        method: String,

        /// Parcel weight in kilograms
        #[arg(long)]
        weight: Option<Decimal>,
    },
    /// Query blog content
    Blog {
        #[command(subcommand)]
        action: BlogAction,
    },
}

fn main() -> ExitCode {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let currency = cli.locale.currency();

    match cli.command {
        Commands::Cart { action } => {
            let mut store = CartStore::open(FilePersistence::new(cli.cart_file));
            tracing::debug!(path = %store.persistence().path().display(), "Cart opened");
            commands::cart::run(action, &mut store, currency, &mut out)?;
        }
        Commands::Shipping { method, weight } => {
            commands::shipping::quote(&method, weight, currency, &mut out)?;
        }
        Commands::Blog { action } => commands::blog::run(action, cli.locale, &mut out)?,
    }

    out.flush()?;
    Ok(())
}
