//! Akario CLI - Drive the storefront from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! akario products --category kitchen --sort price-low
//!
//! # Sign in and shop
//! akario login -e asha@example.com
//! akario cart add 64f0c2 -q 2
//! akario checkout --phone 9876543210 --address "12 MG Road" --city Pune --state MH --zip 411001
//!
//! # Admin dashboard
//! akario admin users
//! ```
//!
//! # Commands
//!
//! - `login`, `register`, `logout`, `whoami`, `profile` - Session
//! - `products`, `product` - Catalog browsing and management
//! - `cart`, `wishlist` - Per-user stores
//! - `checkout` - Pay for the cart
//! - `admin`, `contact` - Dashboards
//!
//! The session persists in `$AKARIO_STATE_DIR/session.json` between runs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use akario_core::Role;
use akario_storefront::catalog::SortKey;
use akario_storefront::{Storefront, StorefrontConfig};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::CliError;

#[derive(Parser)]
#[command(name = "akario")]
#[command(author, version, about = "Akario Mart storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in
    Login {
        #[arg(short, long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short, long, default_value = "user")]
        role: Role,
    },
    /// Create an account and sign in
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
        #[arg(short, long, default_value = "user")]
        role: Role,
    },
    /// Sign out
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Update the signed-in account
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// List products
    Products {
        #[arg(short, long, default_value = "all")]
        category: String,
        #[arg(short, long, default_value = "")]
        search: String,
        /// name, price-low, price-high, discount or newest
        #[arg(long, default_value = "name")]
        sort: SortKey,
    },
    /// Show or manage one product
    Product {
        #[command(subcommand)]
        action: commands::catalog::ProductAction,
    },
    /// Show or change the cart
    Cart {
        #[command(subcommand)]
        action: Option<commands::shop::CartAction>,
    },
    /// Show or change the wishlist
    Wishlist {
        #[command(subcommand)]
        action: Option<commands::shop::WishlistAction>,
    },
    /// Pay for the cart
    Checkout(commands::checkout::CheckoutArgs),
    /// Admin dashboard
    Admin {
        #[command(subcommand)]
        action: commands::admin::AdminAction,
    },
    /// Contact messages
    Contact {
        #[command(subcommand)]
        action: commands::contact::ContactAction,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Configuration is needed before tracing so Sentry can be wired in
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "akario_storefront=info,akario_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let cli = Cli::parse();
    let storefront = Storefront::with_file_storage(config);
    storefront.start().await;

    match run(&storefront, cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(storefront: &Storefront, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Login {
            email,
            password,
            role,
        } => commands::account::login(storefront, &email, password, role).await,
        Commands::Register {
            name,
            email,
            password,
            role,
        } => commands::account::register(storefront, &name, &email, password, role).await,
        Commands::Logout => commands::account::logout(storefront),
        Commands::Whoami => {
            commands::account::whoami(storefront);
            Ok(())
        }
        Commands::Profile { name, email } => {
            commands::account::profile(storefront, name, email).await
        }
        Commands::Products {
            category,
            search,
            sort,
        } => {
            commands::catalog::list(storefront, category, search, sort).await;
            Ok(())
        }
        Commands::Product { action } => commands::catalog::run(storefront, action).await,
        Commands::Cart { action } => commands::shop::cart(storefront, action).await,
        Commands::Wishlist { action } => commands::shop::wishlist(storefront, action).await,
        Commands::Checkout(args) => commands::checkout::run(storefront, args).await,
        Commands::Admin { action } => commands::admin::run(storefront, action).await,
        Commands::Contact { action } => commands::contact::run(storefront, action).await,
    }
}
