//! Catalog settings storage: a single row keyed by `SETTINGS_ROW`.

use rentdesk_core::settings::CatalogSettings;
use sea_orm::{ActiveModelTrait, EntityTrait, TransactionTrait};
use tracing::info;

use super::{RentalRepository, RepositoryResult};
use crate::entities::catalog_settings::{self, SETTINGS_ROW};

impl RentalRepository {
    /// Returns the stored settings, or `fallback` when none were saved yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is malformed.
    pub async fn get_settings(&self, fallback: &CatalogSettings) -> RepositoryResult<CatalogSettings> {
        let model = catalog_settings::Entity::find_by_id(SETTINGS_ROW)
            .one(&self.db)
            .await?;
        match model {
            Some(model) => Ok(model.into_domain()?),
            None => Ok(fallback.clone()),
        }
    }

    /// Validates and stores the settings, replacing any previous row.
    ///
    /// # Errors
    ///
    /// Returns an error if a required label is blank or the write fails.
    pub async fn save_settings(&self, settings: CatalogSettings) -> RepositoryResult<CatalogSettings> {
        settings.validate()?;
        let txn = self.db.begin().await?;

        let existing = catalog_settings::Entity::find_by_id(SETTINGS_ROW)
            .one(&txn)
            .await?;
        let active = catalog_settings::ActiveModel::from(&settings);
        if existing.is_some() {
            active.update(&txn).await?;
        } else {
            active.insert(&txn).await?;
        }

        txn.commit().await?;
        info!(app_name = %settings.app_name, currency = %settings.currency, "Catalog settings saved");
        Ok(settings)
    }
}
