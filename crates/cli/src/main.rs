//! Pocketshop CLI - browse the catalog and manage a persistent cart.
//!
//! # Usage
//!
//! ```bash
//! # List categories
//! pocketshop categories
//!
//! # Browse two pages of a category
//! pocketshop browse --category electronics --pages 2
//!
//! # Put two of item 9 in the cart, then open its detail view and set 5
//! pocketshop cart add 9 -q 2
//! pocketshop detail 9 --quantity 5
//!
//! # Favorites
//! pocketshop fav add 3
//! pocketshop fav list
//! ```
//!
//! # Environment Variables
//!
//! - `POCKETSHOP_API_URL` - Catalog API base URL
//! - `POCKETSHOP_DATA_DIR` - Where the cart snapshot is stored
//! - `SENTRY_DSN` - Optional error reporting

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use pocketshop_client::ItemId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CommandError, Context};

#[derive(Parser)]
#[command(name = "pocketshop")]
#[command(author, version, about = "Browse the Pocketshop catalog and manage your cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog categories
    Categories,
    /// Page through the catalog
    Browse {
        /// Only show items in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: usize,
    },
    /// Show one item with its cart quantity
    Show {
        /// Item ID
        id: ItemId,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage favorites
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },
    /// Open an item's detail view, set a quantity and confirm
    Detail {
        /// Item ID
        id: ItemId,

        /// Quantity to confirm
        #[arg(short, long)]
        quantity: u32,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and totals
    Show,
    /// Add an item, merging with an existing line
    Add {
        id: ItemId,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity (0 or less removes it)
    Set {
        id: ItemId,

        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a line
    Remove { id: ItemId },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum FavAction {
    /// List favorites
    List,
    /// Add an item to favorites
    Add { id: ItemId },
    /// Remove an item from favorites
    Remove { id: ItemId },
    /// Remove all favorites
    Clear,
}

/// Initialize Sentry when `SENTRY_DSN` is set; the guard must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let _sentry_guard = init_sentry();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocketshop_client=info,pocketshop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CommandError> {
    let ctx = Context::from_env()?;

    match cli.command {
        Commands::Categories => commands::catalog::categories(&ctx).await?,
        Commands::Browse { category, pages } => {
            commands::catalog::browse(&ctx, category, pages).await?;
        }
        Commands::Show { id } => commands::catalog::show(&ctx, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id, quantity } => commands::cart::add(&ctx, id, quantity).await?,
            CartAction::Set { id, quantity } => commands::cart::set(&ctx, id, quantity),
            CartAction::Remove { id } => commands::cart::remove(&ctx, id),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Fav { action } => match action {
            FavAction::List => commands::favorites::list(&ctx),
            FavAction::Add { id } => commands::favorites::add(&ctx, id).await?,
            FavAction::Remove { id } => commands::favorites::remove(&ctx, id),
            FavAction::Clear => commands::favorites::clear(&ctx),
        },
        Commands::Detail { id, quantity } => commands::detail::confirm(&ctx, id, quantity).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cart_set_accepts_negative_quantity() {
        let cli = Cli::try_parse_from(["pocketshop", "cart", "set", "4", "-1"]).unwrap();
        match cli.command {
            Commands::Cart {
                action: CartAction::Set { id, quantity },
            } => {
                assert_eq!(id, ItemId::new(4));
                assert_eq!(quantity, -1);
            }
            _ => panic!("expected cart set"),
        }
    }

    #[test]
    fn test_browse_defaults_to_one_page() {
        let cli = Cli::try_parse_from(["pocketshop", "browse"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Browse {
                category: None,
                pages: 1
            }
        ));
    }
}
