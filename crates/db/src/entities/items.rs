//! `SeaORM` Entity for items table.

use chrono::Utc;
use rentdesk_core::inventory::{InventoryItem, ItemCondition, ItemStatus, Ownership};
use rentdesk_shared::types::ItemId;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::decode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub identifier: String,
    pub category: String,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub condition: String,
    pub ownership: String,
    pub supplier_name: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub supplier_cost: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub daily_rate: Decimal,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::booking_lines::Entity")]
    BookingLines,
}

impl Related<super::booking_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain item.
    pub fn into_domain(self) -> Result<InventoryItem, DbErr> {
        Ok(InventoryItem {
            id: ItemId::from_uuid(self.id),
            condition: decode(ItemCondition::parse(&self.condition), "condition", &self.condition)?,
            ownership: decode(Ownership::parse(&self.ownership), "ownership", &self.ownership)?,
            status: decode(ItemStatus::parse(&self.status), "status", &self.status)?,
            name: self.name,
            identifier: self.identifier,
            category: self.category,
            brand: self.brand,
            model: self.model,
            supplier_name: self.supplier_name,
            supplier_cost: self.supplier_cost,
            daily_rate: self.daily_rate,
            created_at: self.created_at.with_timezone(&Utc),
            updated_at: self.updated_at.with_timezone(&Utc),
            deleted_at: self.deleted_at.map(|at| at.with_timezone(&Utc)),
        })
    }
}

impl From<&InventoryItem> for ActiveModel {
    fn from(item: &InventoryItem) -> Self {
        Self {
            id: Set(item.id.into_inner()),
            name: Set(item.name.clone()),
            identifier: Set(item.identifier.clone()),
            category: Set(item.category.clone()),
            brand: Set(item.brand.clone()),
            model: Set(item.model.clone()),
            condition: Set(item.condition.as_str().to_string()),
            ownership: Set(item.ownership.as_str().to_string()),
            supplier_name: Set(item.supplier_name.clone()),
            supplier_cost: Set(item.supplier_cost),
            daily_rate: Set(item.daily_rate),
            status: Set(item.status.as_str().to_string()),
            created_at: Set(item.created_at.into()),
            updated_at: Set(item.updated_at.into()),
            deleted_at: Set(item.deleted_at.map(Into::into)),
        }
    }
}
