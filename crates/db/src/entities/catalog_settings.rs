//! `SeaORM` Entity for catalog_settings table (a single row, id 1).

use rentdesk_core::settings::CatalogSettings;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Primary key of the only settings row.
pub const SETTINGS_ROW: i32 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "catalog_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub app_name: String,
    pub item_name: String,
    pub items_name: String,
    pub category_label: String,
    pub identifier_label: String,
    pub currency: String,
    pub categories: Json,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain settings.
    pub fn into_domain(self) -> Result<CatalogSettings, DbErr> {
        let categories = serde_json::from_value(self.categories)
            .map_err(|err| DbErr::Type(format!("invalid categories value: {err}")))?;
        Ok(CatalogSettings {
            app_name: self.app_name,
            item_name: self.item_name,
            items_name: self.items_name,
            category_label: self.category_label,
            identifier_label: self.identifier_label,
            currency: self.currency,
            categories,
        })
    }
}

impl From<&CatalogSettings> for ActiveModel {
    fn from(settings: &CatalogSettings) -> Self {
        Self {
            id: Set(SETTINGS_ROW),
            app_name: Set(settings.app_name.clone()),
            item_name: Set(settings.item_name.clone()),
            items_name: Set(settings.items_name.clone()),
            category_label: Set(settings.category_label.clone()),
            identifier_label: Set(settings.identifier_label.clone()),
            currency: Set(settings.currency.clone()),
            categories: Set(serde_json::Value::from(settings.categories.clone())),
            updated_at: Set(chrono::Utc::now().into()),
        }
    }
}
