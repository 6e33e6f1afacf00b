//! `SeaORM` Entity for parties table.

use chrono::Utc;
use rentdesk_core::party::{Party, PartyKind, PartyStatus};
use rentdesk_shared::types::PartyId;
use sea_orm::Set;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::decode;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "parties")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub id_number: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub status: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub credit_limit: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub balance: Decimal,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::bookings::Entity")]
    Bookings,
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
}

impl Related<super::bookings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the row into the domain party.
    pub fn into_domain(self) -> Result<Party, DbErr> {
        Ok(Party {
            id: PartyId::from_uuid(self.id),
            kind: decode(PartyKind::parse(&self.kind), "kind", &self.kind)?,
            status: decode(PartyStatus::parse(&self.status), "status", &self.status)?,
            name: self.name,
            id_number: self.id_number,
            phone: self.phone,
            email: self.email,
            address: self.address,
            contact_person: self.contact_person,
            notes: self.notes,
            credit_limit: self.credit_limit,
            balance: self.balance,
            created_at: self.created_at.with_timezone(&Utc),
            updated_at: self.updated_at.with_timezone(&Utc),
            deleted_at: self.deleted_at.map(|at| at.with_timezone(&Utc)),
        })
    }
}

impl From<&Party> for ActiveModel {
    fn from(party: &Party) -> Self {
        Self {
            id: Set(party.id.into_inner()),
            name: Set(party.name.clone()),
            kind: Set(party.kind.as_str().to_string()),
            id_number: Set(party.id_number.clone()),
            phone: Set(party.phone.clone()),
            email: Set(party.email.clone()),
            address: Set(party.address.clone()),
            contact_person: Set(party.contact_person.clone()),
            notes: Set(party.notes.clone()),
            status: Set(party.status.as_str().to_string()),
            credit_limit: Set(party.credit_limit),
            balance: Set(party.balance),
            created_at: Set(party.created_at.into()),
            updated_at: Set(party.updated_at.into()),
            deleted_at: Set(party.deleted_at.map(Into::into)),
        }
    }
}
