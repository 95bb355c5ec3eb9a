//! # Seed Data Generator
//!
//! Populates the database with a demo catalog for development.
//!
//! ## Usage
//! ```bash
//! # Seed ./printwise_dev.db
//! cargo run -p printwise-db --bin seed
//!
//! # Specify database path and also create a demo quote
//! cargo run -p printwise-db --bin seed -- --db ./data/printwise.db --with-quote
//! ```
//!
//! ## Generated Records
//! - Clients: a few local businesses
//! - Products: small format (price per unit) and large format (price per m²)
//! - Finishings: multipliers and flat surcharges for each applicability
//!
//! Records are upserted by id, so running the seed twice is harmless.

use printwise_core::{
    Applicability, Client, ClientId, Finishing, FinishingId, Money, PriceRequest, PrintJob,
    Product, ProductFormat, ProductId, RequestContext,
};
use printwise_db::{Database, DbConfig, QuoteDraft, QuoteService};
use rust_decimal::Decimal;
use std::env;

const CLIENTS: &[(i64, &str, &str)] = &[
    (1, "Panadería Sol", "pedidos@panaderiasol.example"),
    (2, "Taller Ruiz", "info@tallerruiz.example"),
    (3, "Club Deportivo Norte", "secretaria@cdnorte.example"),
];

/// (id, name, format, base price in cents)
const PRODUCTS: &[(i64, &str, ProductFormat, i64)] = &[
    (1, "Flyer A5", ProductFormat::Small, 45),
    (2, "Business cards", ProductFormat::Small, 12),
    (3, "Poster A3", ProductFormat::Small, 180),
    (4, "Vinyl banner", ProductFormat::Large, 1800),
    (5, "Roll-up canvas", ProductFormat::Large, 3200),
];

/// (id, name, is_multiplier, factor as (mantissa, scale), applicability)
const FINISHINGS: &[(i64, &str, bool, (i64, u32), Applicability)] = &[
    (1, "Matte lamination", true, (120, 2), Applicability::Both),
    (2, "Spot UV", true, (135, 2), Applicability::Small),
    (3, "Rounded corners", false, (5, 2), Applicability::Small),
    (4, "Eyelets every 50cm", false, (350, 2), Applicability::Large),
    (5, "Welded hem", false, (600, 2), Applicability::Large),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./printwise_dev.db");
    let mut with_quote = false;
    let mut app_url = String::from("http://localhost:8080");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--app-url" => {
                if i + 1 < args.len() {
                    app_url = args[i + 1].trim_end_matches('/').to_string();
                    i += 1;
                }
            }
            "--with-quote" | "-q" => with_quote = true,
            "--help" | "-h" => {
                println!("PrintWise Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (default: ./printwise_dev.db)");
                println!("  -q, --with-quote     Also create a demo quote and print its share link");
                println!("      --app-url <URL>  Base URL for the share link (default: http://localhost:8080)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 PrintWise Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let catalog = db.catalog();

    for (id, name, email) in CLIENTS {
        catalog
            .upsert_client(&Client {
                id: ClientId(*id),
                name: name.to_string(),
                email: Some(email.to_string()),
            })
            .await?;
    }
    println!("✓ {} clients", CLIENTS.len());

    for (id, name, format, cents) in PRODUCTS {
        catalog
            .upsert_product(&Product {
                id: ProductId(*id),
                name: name.to_string(),
                format: *format,
                base_price: Money::from_cents(*cents),
                active: true,
            })
            .await?;
    }
    println!("✓ {} products", PRODUCTS.len());

    for (id, name, is_multiplier, (mantissa, scale), applicability) in FINISHINGS {
        catalog
            .upsert_finishing(&Finishing {
                id: FinishingId(*id),
                name: name.to_string(),
                is_multiplier: *is_multiplier,
                price_factor: Decimal::new(*mantissa, *scale),
                applicability: *applicability,
                active: true,
            })
            .await?;
    }
    println!("✓ {} finishings", FINISHINGS.len());

    if with_quote {
        let service = QuoteService::new(db.clone());
        let draft = QuoteDraft {
            client_id: ClientId(1),
            title: "Spring opening flyers".to_string(),
            description: Some("A5, 4/4, matte lamination".to_string()),
            pricing: PriceRequest {
                product_id: ProductId(1),
                job: PrintJob::Small {
                    quantity: 500,
                    colors: 4,
                },
                finishing_ids: vec![FinishingId(1)],
            },
        };

        let created = service.create_quote(&RequestContext::staff(0), &draft).await?;
        println!();
        println!(
            "✓ Demo quote #{}: {} total",
            created.quote.id,
            created.quote.total_price.format_eur()
        );
        println!(
            "  Share link: {}/quotes/view/{}",
            app_url,
            created.quote.token.as_str()
        );
    }

    db.close().await;

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
