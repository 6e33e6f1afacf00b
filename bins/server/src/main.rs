//! RentDesk API Server
//!
//! Main entry point for the RentDesk backend service.

use anyhow::Context;
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentdesk_api::{AppState, DatabaseBackend, MemoryBackend, create_router};
use rentdesk_core::settings::{CatalogSettings, Preset};
use rentdesk_core::user::{NewUser, UserFilter};
use rentdesk_db::{Migrator, RentalRepository, connect_with};
use rentdesk_shared::{AdminConfig, AppConfig, JwtService, Role};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let preset = Preset::parse(&config.catalog.preset)?;
    let mut defaults = CatalogSettings::from_preset(preset);
    if let Some(currency) = &config.catalog.currency {
        defaults = defaults.with_currency(currency.clone());
    }
    info!(preset = %preset, currency = %defaults.currency, "Catalog configured");

    let jwt_service = JwtService::new(&config.jwt);

    let state = match config.database.url.as_deref().filter(|_| config.uses_database()) {
        Some(url) => {
            let db = connect_with(
                url,
                config.database.max_connections,
                config.database.min_connections,
            )
            .await
            .context("Failed to connect to database")?;
            info!("Connected to database");

            if config.database.auto_migrate {
                Migrator::up(&db, None)
                    .await
                    .context("Failed to run migrations")?;
                info!("Migrations applied");
            }

            AppState::new(
                DatabaseBackend::new(RentalRepository::new(db), defaults),
                jwt_service,
            )
        }
        None => {
            warn!("No database configured; state is kept in memory and lost on shutdown");
            AppState::new(MemoryBackend::new(defaults), jwt_service)
        }
    };

    bootstrap_admin(&state, &config.admin).await?;

    let app = create_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Creates the configured administrator when there are no accounts yet.
async fn bootstrap_admin(state: &AppState, admin: &AdminConfig) -> anyhow::Result<()> {
    let existing = state
        .backend
        .list_users(&UserFilter::default())
        .await
        .map_err(|e: rentdesk_shared::AppError| e)?;
    if !existing.is_empty() {
        return Ok(());
    }

    let Some(password) = &admin.password else {
        warn!("No user accounts exist; set RENTDESK__ADMIN__PASSWORD to create the first admin");
        return Ok(());
    };
    let user = state
        .backend
        .create_user(NewUser::new(&admin.name, &admin.username, password, Role::Admin))
        .await
        .map_err(|e: rentdesk_shared::AppError| e)
        .context("Failed to create the first admin")?;
    info!(user_id = %user.id, username = %user.username, "First admin created");
    Ok(())
}
