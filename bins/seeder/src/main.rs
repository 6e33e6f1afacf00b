//! Database seeder for RentDesk development and testing.
//!
//! Applies a catalog preset, then seeds demo accounts, inventory, parties and
//! one active booking. Prints the demo sign-in names and password.
//!
//! Usage: cargo run --bin seeder [preset]

use anyhow::{Context, bail};
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use sea_orm_migration::MigratorTrait;

use rentdesk_core::booking::BookingRequest;
use rentdesk_core::inventory::{InventoryItem, ItemFilter, NewItem};
use rentdesk_core::party::{NewParty, Party, PartyFilter, PartyKind};
use rentdesk_core::settings::{CatalogSettings, Preset};
use rentdesk_core::user::{NewUser, UserFilter};
use rentdesk_db::{Migrator, RentalRepository, connect};
use rentdesk_shared::{AppConfig, Role};

/// Password shared by the demo accounts.
const DEMO_PASSWORD: &str = "rentdesk-demo";

/// Items seeded per category.
const ITEMS_PER_CATEGORY: usize = 2;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let Some(database_url) = config.database.url.as_deref().filter(|_| config.uses_database())
    else {
        bail!("RENTDESK__DATABASE__URL must be set to seed a database");
    };
    let preset_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config.catalog.preset.clone());
    let preset = Preset::parse(&preset_name)?;

    println!("Connecting to database...");
    let db = connect(database_url)
        .await
        .context("Failed to connect to database")?;
    Migrator::up(&db, None).await?;
    let repo = RentalRepository::new(db);

    println!("Applying {preset} preset...");
    let mut settings = CatalogSettings::from_preset(preset);
    if let Some(currency) = &config.catalog.currency {
        settings = settings.with_currency(currency.clone());
    }
    let settings = repo.save_settings(settings).await?;

    println!("Seeding users...");
    seed_users(&repo).await?;

    println!("Seeding inventory...");
    let items = seed_items(&repo, &settings).await?;

    println!("Seeding parties...");
    let parties = seed_parties(&repo).await?;

    println!("Seeding demo booking...");
    seed_booking(&repo, &items, &parties).await?;

    println!("Seeding complete!");
    Ok(())
}

/// Seeds a few items per category unless the inventory already has some.
async fn seed_items(
    repo: &RentalRepository,
    settings: &CatalogSettings,
) -> anyhow::Result<Vec<InventoryItem>> {
    let existing = repo.list_items(&ItemFilter::default()).await?;
    if !existing.is_empty() {
        println!("  Inventory already has {} items, skipping...", existing.len());
        return Ok(existing);
    }

    let mut items = Vec::new();
    for (index, category) in settings.categories.iter().enumerate() {
        for copy in 1..=ITEMS_PER_CATEGORY {
            let serial = index * ITEMS_PER_CATEGORY + copy;
            let rate = Decimal::from(100 * (index + 1)) + Decimal::from(25 * copy);
            let input = NewItem::new(format!("{} {serial:02}", settings.item_name), rate)
                .with_category(category.clone())
                .with_identifier(format!("RD-{serial:04}"));
            items.push(repo.create_item(input).await?);
        }
    }
    println!("  Inserted {} items", items.len());
    Ok(items)
}

/// Seeds three clients and one supplier unless parties already exist.
async fn seed_parties(repo: &RentalRepository) -> anyhow::Result<Vec<Party>> {
    let existing = repo.list_parties(&PartyFilter::default()).await?;
    if !existing.is_empty() {
        println!("  {} parties already exist, skipping...", existing.len());
        return Ok(existing);
    }

    let inputs = [
        NewParty::client("Al Noor Contracting").with_credit_limit(Decimal::from(50_000)),
        NewParty::client("Desert Line Logistics"),
        NewParty::client("Walk-in Customer"),
        NewParty {
            kind: PartyKind::Supplier,
            ..NewParty::client("Gulf Equipment Supply")
        },
    ];

    let mut parties = Vec::new();
    for input in inputs {
        parties.push(repo.create_party(input).await?);
    }
    println!("  Inserted {} parties", parties.len());
    Ok(parties)
}

/// Books the first item to the first client for three days starting today.
async fn seed_booking(
    repo: &RentalRepository,
    items: &[InventoryItem],
    parties: &[Party],
) -> anyhow::Result<()> {
    let client = parties.iter().find(|party| party.kind == PartyKind::Client);
    let (Some(client), Some(item)) = (client, items.first()) else {
        println!("  Nothing to book, skipping...");
        return Ok(());
    };

    let today = Utc::now().date_naive();
    let request = BookingRequest {
        party_id: client.id,
        item_ids: vec![item.id],
        start_date: today,
        end_date: today + Duration::days(2),
        notes: Some("Demo booking".to_string()),
    };
    match repo.create_booking(request).await {
        Ok(booking) => println!(
            "  Booked {} to {} for {}",
            item.name, client.name, booking.total_amount
        ),
        Err(e) => eprintln!("  Skipped demo booking: {e}"),
    }
    Ok(())
}

/// Seeds an admin and an employee unless accounts already exist.
async fn seed_users(repo: &RentalRepository) -> anyhow::Result<()> {
    let existing = repo.list_users(&UserFilter::default()).await?;
    if !existing.is_empty() {
        println!("  {} users already exist, skipping...", existing.len());
        return Ok(());
    }

    let inputs = [
        NewUser::new("Admin", "admin", DEMO_PASSWORD, Role::Admin),
        NewUser::new("Desk Employee", "desk", DEMO_PASSWORD, Role::Employee),
    ];
    for input in inputs {
        let user = repo.create_user(input).await?;
        println!("  {} ({}) / {DEMO_PASSWORD}", user.username, user.role);
    }
    Ok(())
}
