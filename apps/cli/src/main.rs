//! # shopsync CLI
//!
//! Thin orchestration over shopsync-sync: every command builds the same
//! stack and talks to it the way an embedding application would, through
//! dispatched actions whose completions come back on a callback queue.
//!
//! ## Wiring
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SyncConfig::load ──► Database (SQLite, migrations applied)            │
//! │        │                   │                                            │
//! │        ▼                   ▼                                            │
//! │  HttpRemote ──────► StoreSet ──register──► Dispatcher                  │
//! │                        │                       ▲                        │
//! │                        │ completions           │ dispatch(Action)       │
//! │                        ▼                       │                        │
//! │                   CallbackRunner  ◄── main task drains it              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! # Synchronize every kind for the configured sites
//! shopsync sync
//!
//! # Out-of-stock products of site 7, newest first (merge, no deletes)
//! shopsync sync --site 7 --resource products --stock-status outofstock --sort date_desc
//!
//! # Print cached coupons
//! shopsync list --site 7 --resource coupons
//!
//! # Forget the cached catalog of a site
//! shopsync reset-products --site 7
//! ```

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use shopsync_core::{
    ProductFilter, ProductSortOrder, ProductStatus, ProductType, ReconcileSummary, ResourceKind,
    SiteId, StockStatus,
};
use shopsync_db::{Database, DbConfig};
use shopsync_sync::{
    Action, CallbackQueue, CallbackRunner, Completion, CouponAction, Dispatcher, HttpRemote,
    NoOpEmitter, ProductAction, SitePluginAction, StoreSet, SyncConfig, SyncResult,
};

/// Mirror a store's plugins, products and coupons into a local cache.
#[derive(Parser)]
#[command(name = "shopsync", version, about)]
struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (default: platform config dir / shopsync.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch resources from the remote and reconcile the local cache
    Sync {
        /// Site to synchronize (repeatable; default: sync.site_ids)
        #[arg(short, long)]
        site: Vec<i64>,

        /// Only this kind (plugins, products, coupons)
        #[arg(short, long)]
        resource: Option<ResourceKind>,

        /// Only products with this stock status
        #[arg(long)]
        stock_status: Option<StockStatus>,

        /// Only products with this publication status
        #[arg(long)]
        status: Option<ProductStatus>,

        /// Only products of this type
        #[arg(long = "type")]
        product_type: Option<ProductType>,

        /// Product sort order (name_asc, name_desc, date_asc, date_desc)
        #[arg(long, default_value_t = ProductSortOrder::NameAscending)]
        sort: ProductSortOrder,
    },

    /// Print cached rows
    List {
        #[arg(short, long)]
        site: i64,

        #[arg(short, long)]
        resource: ResourceKind,
    },

    /// Delete every cached product of a site
    ResetProducts {
        #[arg(short, long)]
        site: i64,
    },

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = SyncConfig::load(cli.config.clone()).context("loading configuration")?;
    if let Some(path) = cli.db.clone() {
        config.database.path = Some(path);
    }

    match cli.command {
        Commands::Sync {
            site,
            resource,
            stock_status,
            status,
            product_type,
            sort,
        } => {
            let filter = ProductFilter {
                stock_status,
                product_status: status,
                product_type,
            };
            run_sync(&config, site, resource, filter, sort).await
        }
        Commands::List { site, resource } => run_list(&config, SiteId::new(site), resource).await,
        Commands::ResetProducts { site } => run_reset(&config, SiteId::new(site)).await,
        Commands::Config => {
            if let Some(path) = cli.config.or_else(SyncConfig::default_config_path) {
                println!("# {}", path.display());
            }
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Initializes the tracing subscriber; logs go to stderr.
///
/// `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "info,shopsync=debug,sqlx=warn",
        1 => "debug,sqlx=info",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// Wiring
// =============================================================================

struct App {
    db: Arc<Database>,
    dispatcher: Dispatcher,
    runner: CallbackRunner,
    stores: StoreSet,
}

impl App {
    /// Drops every completion sender held outside the spawned work, then
    /// runs completions until that work has finished.
    ///
    /// A task that dies without completing closes its sender too, so the
    /// drain never waits on a completion that cannot arrive.
    async fn finish(self, outcomes: &Outcomes, expected: usize) -> Result<()> {
        let App {
            db,
            dispatcher,
            mut runner,
            stores,
        } = self;
        drop(dispatcher);
        drop(stores);

        while runner.run_next().await {}
        db.close().await;

        report(outcomes, expected)
    }
}

async fn open_database(config: &SyncConfig) -> Result<Arc<Database>> {
    let path = config.database_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }

    debug!(path = %path.display(), "Opening database");
    let db = Database::new(DbConfig::new(&path))
        .await
        .with_context(|| format!("opening {}", path.display()))?;
    Ok(Arc::new(db))
}

async fn build_app(config: &SyncConfig) -> Result<App> {
    let db = open_database(config).await?;
    let remote = HttpRemote::from_config(&config.api)?;
    let (callbacks, runner) = CallbackQueue::spawn();

    let stores = StoreSet::new(
        db.clone(),
        remote,
        config.sync.paging(),
        callbacks,
        Arc::new(NoOpEmitter),
    );
    let dispatcher = Dispatcher::new();
    stores.register(&dispatcher)?;

    Ok(App {
        db,
        dispatcher,
        runner,
        stores,
    })
}

/// Result of one dispatched action.
struct Outcome {
    kind: ResourceKind,
    site_id: SiteId,
    result: SyncResult<ReconcileSummary>,
}

type Outcomes = Arc<Mutex<Vec<Outcome>>>;

fn record_into(outcomes: &Outcomes, kind: ResourceKind, site_id: SiteId) -> Completion {
    let outcomes = outcomes.clone();
    Box::new(move |result| {
        outcomes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Outcome {
                kind,
                site_id,
                result,
            });
    })
}

/// Prints every outcome; fails if any operation failed or never reported.
fn report(outcomes: &Outcomes, expected: usize) -> Result<()> {
    let outcomes = std::mem::take(&mut *outcomes.lock().unwrap_or_else(PoisonError::into_inner));
    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(summary) => println!(
                "site {:<8} {:<12} {}",
                outcome.site_id.get(),
                outcome.kind.as_str(),
                summary
            ),
            Err(e) => {
                failed += 1;
                println!(
                    "site {:<8} {:<12} FAILED: {}{}",
                    outcome.site_id.get(),
                    outcome.kind.as_str(),
                    e,
                    if e.is_retryable() { " (retryable)" } else { "" }
                );
            }
        }
    }

    let missing = expected.saturating_sub(outcomes.len());
    if missing > 0 {
        bail!("{missing} of {expected} operations ended without reporting a result");
    }
    if failed > 0 {
        bail!("{failed} of {expected} operations failed");
    }
    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

async fn run_sync(
    config: &SyncConfig,
    sites: Vec<i64>,
    resource: Option<ResourceKind>,
    filter: ProductFilter,
    sort_order: ProductSortOrder,
) -> Result<()> {
    let sites: Vec<SiteId> = if sites.is_empty() {
        config.site_ids()
    } else {
        sites.into_iter().map(SiteId::new).collect()
    };
    if sites.is_empty() {
        bail!("no site to synchronize; pass --site or set sync.site_ids");
    }

    let kinds: Vec<ResourceKind> = match resource {
        Some(kind) => vec![kind],
        None => ResourceKind::ALL.to_vec(),
    };

    let app = build_app(config).await?;
    let outcomes = Outcomes::default();

    info!(sites = sites.len(), kinds = kinds.len(), "Starting synchronization");
    for &site_id in &sites {
        for &kind in &kinds {
            let on_completion = record_into(&outcomes, kind, site_id);
            let action = match kind {
                ResourceKind::SitePlugin => {
                    Action::SitePlugin(SitePluginAction::SynchronizeSitePlugins {
                        site_id,
                        on_completion,
                    })
                }
                ResourceKind::Product => Action::Product(ProductAction::SynchronizeProducts {
                    site_id,
                    filter,
                    sort_order,
                    on_completion,
                }),
                ResourceKind::Coupon => Action::Coupon(CouponAction::SynchronizeCoupons {
                    site_id,
                    on_completion,
                }),
            };
            app.dispatcher.dispatch(action);
        }
    }

    app.finish(&outcomes, sites.len() * kinds.len()).await
}

async fn run_reset(config: &SyncConfig, site_id: SiteId) -> Result<()> {
    let app = build_app(config).await?;
    let outcomes = Outcomes::default();

    app.dispatcher
        .dispatch(Action::Product(ProductAction::ResetStoredProducts {
            site_id,
            on_completion: record_into(&outcomes, ResourceKind::Product, site_id),
        }));

    app.finish(&outcomes, 1).await
}

async fn run_list(config: &SyncConfig, site_id: SiteId, resource: ResourceKind) -> Result<()> {
    let db = open_database(config).await?;

    match resource {
        ResourceKind::SitePlugin => {
            for plugin in db.site_plugins().list(site_id).await? {
                println!(
                    "{:<40} {:<10} {:<14} {}",
                    plugin.name,
                    plugin.version,
                    if plugin.status.is_active() { "active" } else { "inactive" },
                    plugin.plugin
                );
            }
        }
        ResourceKind::Product => {
            for product in db.products().list(site_id).await? {
                println!(
                    "{:>8} {:<40} {:>10} {:<12} {:<9} {}",
                    product.product_id,
                    product.name,
                    product.price,
                    product.stock_status.as_str(),
                    product.product_type.as_str(),
                    product.sku.as_deref().unwrap_or("-")
                );
            }
        }
        ResourceKind::Coupon => {
            for coupon in db.coupons().list(site_id).await? {
                let expires = coupon
                    .date_expires
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{:>8} {:<20} {:>8} {:<14} used {}/{} expires {}",
                    coupon.coupon_id,
                    coupon.code,
                    coupon.amount,
                    format!("{:?}", coupon.discount_type).to_lowercase(),
                    coupon.usage_count,
                    coupon
                        .usage_limit
                        .map_or_else(|| "-".to_string(), |l| l.to_string()),
                    expires
                );
            }
        }
    }

    db.close().await;
    Ok(())
}
