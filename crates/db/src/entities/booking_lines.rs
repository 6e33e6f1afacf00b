//! `SeaORM` Entity for booking_lines table.

use rentdesk_core::booking::BookingLine;
use rentdesk_shared::types::{BookingId, ItemId};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "booking_lines")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub booking_id: Uuid,
    pub position: i32,
    pub item_id: Uuid,
    pub item_name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub daily_rate: Decimal,
    pub days: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub line_total: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id",
        on_delete = "Cascade"
    )]
    Bookings,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::ItemId",
        to = "super::items::Column::Id"
    )]
    Items,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain line.
    pub fn into_domain(self) -> Result<BookingLine, DbErr> {
        let days = u32::try_from(self.days)
            .map_err(|_| DbErr::Type(format!("invalid days value: {}", self.days)))?;
        Ok(BookingLine {
            item_id: ItemId::from_uuid(self.item_id),
            item_name: self.item_name,
            daily_rate: self.daily_rate,
            days,
            line_total: self.line_total,
        })
    }
}

/// Builds the row for the line at `position` of a booking.
pub fn active_model(booking_id: BookingId, position: usize, line: &BookingLine) -> ActiveModel {
    ActiveModel {
        id: Set(Uuid::now_v7()),
        booking_id: Set(booking_id.into_inner()),
        position: Set(i32::try_from(position).unwrap_or(i32::MAX)),
        item_id: Set(line.item_id.into_inner()),
        item_name: Set(line.item_name.clone()),
        daily_rate: Set(line.daily_rate),
        days: Set(i32::try_from(line.days).unwrap_or(i32::MAX)),
        line_total: Set(line.line_total),
    }
}
