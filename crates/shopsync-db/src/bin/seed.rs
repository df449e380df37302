//! # Seed Data Generator
//!
//! Populates a local store with sample rows for development.
//!
//! ## Usage
//! ```bash
//! # Seed site 1 with 200 products (default)
//! cargo run -p shopsync-db --bin seed
//!
//! # Custom site, count and database path
//! cargo run -p shopsync-db --bin seed -- --site 7 --count 1000 --db ./data/shopsync.db
//! ```
//!
//! Seeding goes through the same write session a sync uses, so re-running
//! it updates rows in place instead of duplicating them.

use std::env;

use shopsync_core::{
    Coupon, DiscountType, PluginStatus, Product, ProductType, ReconcileMode, ReconcilePlan, SiteId,
    SitePlugin, StockStatus,
};
use shopsync_db::{Database, DbConfig};

const PLUGINS: &[(&str, &str, &str)] = &[
    ("woocommerce/woocommerce.php", "WooCommerce", "8.1.0"),
    ("jetpack/jetpack.php", "Jetpack", "12.6"),
    ("akismet/akismet.php", "Akismet Anti-Spam", "5.3"),
    ("woocommerce-payments/woocommerce-payments.php", "WooPayments", "6.5.1"),
];

const PRODUCT_NAMES: &[&str] = &[
    "Hoodie", "Beanie", "Belt", "Cap", "Sunglasses", "T-Shirt", "Polo", "Album", "Single",
    "Long Sleeve Tee", "Hoodie with Logo", "Hoodie with Zipper",
];

const COUPON_CODES: &[(&str, DiscountType, &str)] = &[
    ("WELCOME10", DiscountType::Percent, "10"),
    ("FREESHIP", DiscountType::FixedCart, "0"),
    ("FIVEOFF", DiscountType::FixedProduct, "5.00"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut site_id: i64 = 1;
    let mut db_path = String::from("./shopsync_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--site" | "-s" => {
                if i + 1 < args.len() {
                    site_id = args[i + 1].parse().unwrap_or(site_id);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("shopsync Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -s, --site <ID>    Site id to seed (default: 1)");
                println!("  -d, --db <PATH>    Database file path (default: ./shopsync_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let site = SiteId::new(site_id);

    println!("shopsync Seed Data Generator");
    println!("============================");
    println!("Database: {}", db_path);
    println!("Site:     {}", site);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database, migrations applied");

    let start = std::time::Instant::now();
    let mut session = db.begin_write().await?;

    let plugins: Vec<SitePlugin> = PLUGINS
        .iter()
        .enumerate()
        .map(|(idx, (file, name, version))| {
            let status = if idx % 3 == 2 {
                PluginStatus::Inactive
            } else {
                PluginStatus::Active
            };
            SitePlugin::new(site, *file, *name, status).with_version(*version)
        })
        .collect();
    let plugin_summary = session
        .apply(&ReconcilePlan::build(site, plugins, ReconcileMode::Merge))
        .await?;

    let products: Vec<Product> = (0..count).map(|seed| generate_product(site, seed)).collect();
    let product_summary = session
        .apply(&ReconcilePlan::build(site, products, ReconcileMode::Merge))
        .await?;

    let coupons: Vec<Coupon> = COUPON_CODES
        .iter()
        .enumerate()
        .map(|(idx, (code, discount_type, amount))| {
            let mut coupon = Coupon::new(site, 500 + idx as i64, *code);
            coupon.discount_type = *discount_type;
            coupon.amount = amount.to_string();
            coupon.free_shipping = *code == "FREESHIP";
            coupon
        })
        .collect();
    let coupon_summary = session
        .apply(&ReconcilePlan::build(site, coupons, ReconcileMode::Merge))
        .await?;

    session.commit().await?;

    println!();
    println!("✓ Plugins:  {}", plugin_summary);
    println!("✓ Products: {}", product_summary);
    println!("✓ Coupons:  {}", coupon_summary);
    println!("  Elapsed: {:?}", start.elapsed());

    println!();
    println!(
        "Site {} now caches {} plugins, {} products, {} coupons",
        site,
        db.site_plugins().count(site).await?,
        db.products().count(site).await?,
        db.coupons().count(site).await?
    );

    Ok(())
}

/// Generates a single product with deterministic data.
fn generate_product(site: SiteId, seed: usize) -> Product {
    let base = PRODUCT_NAMES[seed % PRODUCT_NAMES.len()];
    let product_id = 1000 + seed as i64;
    let name = format!("{} #{}", base, seed / PRODUCT_NAMES.len() + 1);

    let mut product = Product::new(site, product_id, name);
    product.slug = format!("{}-{}", base.to_lowercase().replace(' ', "-"), product_id);
    product.sku = Some(format!("SKU-{:05}", product_id));

    let price_cents = 500 + (seed * 37) % 9500;
    product.price = format!("{}.{:02}", price_cents / 100, price_cents % 100);
    product.regular_price = Some(product.price.clone());

    product.product_type = if seed % 5 == 0 {
        ProductType::Variable
    } else {
        ProductType::Simple
    };
    product.stock_status = match seed % 10 {
        0 => StockStatus::OutOfStock,
        1 => StockStatus::OnBackorder,
        _ => StockStatus::InStock,
    };
    product.manage_stock = seed % 2 == 0;
    product.stock_quantity = product.manage_stock.then_some((seed % 50) as i64);

    product
}
