//! `SeaORM` Entity for ledger_entries table.

use chrono::Utc;
use rentdesk_core::ledger::{Direction, EntryKind, LedgerEntry, PaymentMethod};
use rentdesk_shared::types::{BookingId, LedgerEntryId, PartyId};
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::decode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub party_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub entry_date: Date,
    pub kind: String,
    pub direction: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub method: Option<String>,
    pub description: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::parties::Entity",
        from = "Column::PartyId",
        to = "super::parties::Column::Id"
    )]
    Parties,
    #[sea_orm(
        belongs_to = "super::bookings::Entity",
        from = "Column::BookingId",
        to = "super::bookings::Column::Id"
    )]
    Bookings,
}

impl Related<super::parties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Parties.def()
    }
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain entry.
    pub fn into_domain(self) -> Result<LedgerEntry, DbErr> {
        let method = match self.method.as_deref() {
            Some(raw) => Some(decode(PaymentMethod::parse(raw), "method", raw)?),
            None => None,
        };
        Ok(LedgerEntry {
            id: LedgerEntryId::from_uuid(self.id),
            party_id: PartyId::from_uuid(self.party_id),
            booking_id: self.booking_id.map(BookingId::from_uuid),
            date: self.entry_date,
            kind: decode(EntryKind::parse(&self.kind), "kind", &self.kind)?,
            direction: decode(Direction::parse(&self.direction), "direction", &self.direction)?,
            amount: self.amount,
            method,
            description: self.description,
            created_at: self.created_at.with_timezone(&Utc),
        })
    }
}

impl From<&LedgerEntry> for ActiveModel {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            id: Set(entry.id.into_inner()),
            party_id: Set(entry.party_id.into_inner()),
            booking_id: Set(entry.booking_id.map(BookingId::into_inner)),
            entry_date: Set(entry.date),
            kind: Set(entry.kind.as_str().to_string()),
            direction: Set(entry.direction.as_str().to_string()),
            amount: Set(entry.amount),
            method: Set(entry.method.map(|method| method.as_str().to_string())),
            description: Set(entry.description.clone()),
            created_at: Set(entry.created_at.into()),
        }
    }
}
