//! Bozor CLI - Search, list and seed the marketplace store.
//!
//! # Usage
//!
//! ```bash
//! # Search listings, local city first
//! bozor search --term iphone --city Ташкент --delivery only
//!
//! # Listings of one shop held in the warehouse
//! bozor products --shop <uid> --status "На складе"
//!
//! # Discounted picks
//! bozor recommended
//!
//! # Create shops and products from a fixture
//! bozor seed fixtures/demo.yaml
//!
//! # Try it without a backend
//! bozor --memory --fixture fixtures/demo.yaml search --term galaxy
//! ```
//!
//! # Commands
//!
//! - `search` - Run the search composer against the store
//! - `products` - Equality-filtered listing
//! - `recommended` - Discounted picks
//! - `seed` - Create shops and products from YAML

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bozor_core::search::{Availability, DeliveryFilter};
use bozor_storefront::config::StorefrontConfig;
use bozor_storefront::state::AppState;

mod commands;

#[derive(Parser)]
#[command(name = "bozor")]
#[command(author, version, about = "Bozor marketplace CLI tools")]
struct Cli {
    /// Use an in-memory store instead of the hosted backend
    #[arg(long, global = true)]
    memory: bool,

    /// Seed this YAML fixture before running the command (with --memory)
    #[arg(long, global = true, requires = "memory")]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search listings
    Search {
        /// Free-text term matched against name, model, category and shop
        #[arg(short, long, default_value = "")]
        term: String,

        /// Exact category ("Все категории" means any)
        #[arg(short, long)]
        category: Option<String>,

        /// Buyer's city; listings there come first
        #[arg(long)]
        city: Option<String>,

        /// Search the whole country (ignore city ordering)
        #[arg(long)]
        country_wide: bool,

        /// Delivery restriction
        #[arg(long, value_enum, default_value_t = DeliveryArg::Any)]
        delivery: DeliveryArg,

        /// Stock restriction
        #[arg(long, value_enum, default_value_t = StockArg::Any)]
        stock: StockArg,
    },
    /// List listings matching exact fields
    Products {
        /// Owning shop (the owner's uid)
        #[arg(short, long)]
        shop: Option<String>,

        /// Status label, e.g. "На витрине" or "На складе"
        #[arg(long)]
        status: Option<String>,

        /// Exact category
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show discounted picks
    Recommended,
    /// Create shops and products from a YAML fixture
    Seed {
        /// Fixture file
        file: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum DeliveryArg {
    Any,
    Only,
    #[value(name = "none")]
    Excluded,
}

impl From<DeliveryArg> for DeliveryFilter {
    fn from(arg: DeliveryArg) -> Self {
        match arg {
            DeliveryArg::Any => Self::Any,
            DeliveryArg::Only => Self::Only,
            DeliveryArg::Excluded => Self::Excluded,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum StockArg {
    Any,
    In,
    Out,
}

impl From<StockArg> for Availability {
    fn from(arg: StockArg) -> Self {
        match arg {
            StockArg::Any => Self::Any,
            StockArg::In => Self::InStock,
            StockArg::Out => Self::OutOfStock,
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

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

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bozor_storefront=info,bozor_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Sentry must be initialized before the tracing subscriber
    let config = if cli.memory {
        None
    } else {
        match StorefrontConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                init_tracing();
                tracing::error!("Failed to load configuration: {e}");
                std::process::exit(1);
            }
        }
    };
    let _sentry_guard = config.as_ref().and_then(init_sentry);
    init_tracing();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli, config).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: Option<StorefrontConfig>) -> Result<(), Box<dyn std::error::Error>> {
    let state = match &config {
        Some(config) => AppState::from_config(config)?,
        None => AppState::in_memory(),
    };
    if let Some(fixture) = &cli.fixture {
        commands::seed::from_file(&state, fixture).await?;
    }

    match cli.command {
        Commands::Search {
            term,
            category,
            city,
            country_wide,
            delivery,
            stock,
        } => {
            let args = commands::search::SearchArgs {
                term,
                category,
                city,
                country_wide,
                delivery: delivery.into(),
                availability: stock.into(),
            };
            commands::search::run(&state, args).await?;
        }
        Commands::Products {
            shop,
            status,
            category,
        } => commands::products::list(&state, shop, status, category).await?,
        Commands::Recommended => commands::products::recommended(&state).await?,
        Commands::Seed { file } => {
            let summary = commands::seed::from_file(&state, &file).await?;
            tracing::info!(
                shops = summary.shops,
                products = summary.products,
                skipped = summary.skipped,
                "Seeding complete"
            );
        }
    }
    Ok(())
}
