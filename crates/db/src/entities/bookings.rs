//! `SeaORM` Entity for bookings table.

use chrono::Utc;
use rentdesk_core::booking::{Booking, BookingStatus};
use rentdesk_shared::types::{BookingId, PartyId};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::decode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub party_id: Uuid,
    pub party_name: String,
    pub start_date: Date,
    pub end_date: Date,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub total_amount: Decimal,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parties::Entity",
        from = "Column::PartyId",
        to = "super::parties::Column::Id"
    )]
    Parties,
    #[sea_orm(has_many = "super::booking_lines::Entity")]
    BookingLines,
}

impl Related<super::parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl Related<super::booking_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookingLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row and its lines (in position order) into the domain booking.
    pub fn into_domain(self, lines: Vec<super::booking_lines::Model>) -> Result<Booking, DbErr> {
        Ok(Booking {
            id: BookingId::from_uuid(self.id),
            party_id: PartyId::from_uuid(self.party_id),
            status: decode(BookingStatus::parse(&self.status), "status", &self.status)?,
            party_name: self.party_name,
            lines: lines
                .into_iter()
                .map(super::booking_lines::Model::into_domain)
                .collect::<Result<_, _>>()?,
            start_date: self.start_date,
            end_date: self.end_date,
            total_amount: self.total_amount,
            notes: self.notes,
            created_at: self.created_at.with_timezone(&Utc),
            updated_at: self.updated_at.with_timezone(&Utc),
        })
    }
}

impl From<&Booking> for ActiveModel {
    fn from(booking: &Booking) -> Self {
        Self {
            id: Set(booking.id.into_inner()),
            party_id: Set(booking.party_id.into_inner()),
            party_name: Set(booking.party_name.clone()),
            start_date: Set(booking.start_date),
            end_date: Set(booking.end_date),
            total_amount: Set(booking.total_amount),
            status: Set(booking.status.as_str().to_string()),
            notes: Set(booking.notes.clone()),
            created_at: Set(booking.created_at.into()),
            updated_at: Set(booking.updated_at.into()),
        }
    }
}
