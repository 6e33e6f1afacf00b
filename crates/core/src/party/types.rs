//! Party domain types.

use chrono::{DateTime, Utc};
use rentdesk_shared::types::PartyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RentalError, RentalResult};
use crate::ledger::balance::ensure_within_max;

/// Whether a party rents from the business or supplies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    /// Customer renting items.
    #[default]
    Client,
    /// Supplier of external items.
    Supplier,
}

impl PartyKind {
    /// Returns the string representation of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Supplier => "supplier",
        }
    }

    /// Parses a kind from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "client" => Some(Self::Client),
            "supplier" => Some(Self::Supplier),
            _ => None,
        }
    }
}

/// Account standing of a party.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    /// In good standing.
    #[default]
    Active,
    /// Dormant; may still book.
    Inactive,
    /// Refused service; cannot book.
    Blacklisted,
}

impl PartyStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Blacklisted => "blacklisted",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "blacklisted" => Some(Self::Blacklisted),
            _ => None,
        }
    }
}

impl fmt::Display for PartyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer or supplier with a running balance.
///
/// A positive balance means the party owes the business.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Unique identifier.
    pub id: PartyId,
    /// Display name.
    pub name: String,
    /// Client or supplier.
    pub kind: PartyKind,
    /// National id or commercial registration number.
    pub id_number: String,
    /// Phone number.
    pub phone: String,
    /// Email address.
    pub email: Option<String>,
    /// Postal address.
    pub address: Option<String>,
    /// Contact person for companies.
    pub contact_person: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Account standing.
    pub status: PartyStatus,
    /// Maximum balance the party may reach through bookings.
    pub credit_limit: Option<Decimal>,
    /// Sum of the signed amounts of the party's ledger entries.
    pub balance: Decimal,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Party {
    /// Returns true if the party has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for registering a new party.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewParty {
    /// Display name.
    pub name: String,
    /// Client or supplier.
    #[serde(default)]
    pub kind: PartyKind,
    /// National id or commercial registration number.
    #[serde(default)]
    pub id_number: String,
    /// Phone number.
    #[serde(default)]
    pub phone: String,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Postal address.
    #[serde(default)]
    pub address: Option<String>,
    /// Contact person.
    #[serde(default)]
    pub contact_person: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// Initial standing.
    #[serde(default)]
    pub status: PartyStatus,
    /// Credit limit.
    #[serde(default)]
    pub credit_limit: Option<Decimal>,
}

impl NewParty {
    /// Creates the minimal input for a client.
    #[must_use]
    pub fn client(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PartyKind::Client,
            id_number: String::new(),
            phone: String::new(),
            email: None,
            address: None,
            contact_person: None,
            notes: None,
            status: PartyStatus::Active,
            credit_limit: None,
        }
    }

    /// Sets the credit limit.
    #[must_use]
    pub const fn with_credit_limit(mut self, limit: Decimal) -> Self {
        self.credit_limit = Some(limit);
        self
    }

    /// Validates the input.
    pub fn validate(&self) -> RentalResult<()> {
        validate_party_fields(&self.name, self.credit_limit)
    }

    /// Validates the input and builds a party with a zero balance.
    pub fn into_party(self) -> RentalResult<Party> {
        self.validate()?;
        let now = Utc::now();
        Ok(Party {
            id: PartyId::new(),
            name: self.name.trim().to_string(),
            kind: self.kind,
            id_number: self.id_number,
            phone: self.phone,
            email: self.email,
            address: self.address,
            contact_person: self.contact_person,
            notes: self.notes,
            status: self.status,
            credit_limit: self.credit_limit,
            balance: Decimal::ZERO,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }
}

/// Partial update for a party. The balance is never patched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyPatch {
    /// New name.
    pub name: Option<String>,
    /// New kind.
    pub kind: Option<PartyKind>,
    /// New id number.
    pub id_number: Option<String>,
    /// New phone.
    pub phone: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New contact person.
    pub contact_person: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// New standing.
    pub status: Option<PartyStatus>,
    /// New credit limit.
    pub credit_limit: Option<Decimal>,
}

impl PartyPatch {
    /// Applies the patch to a party and validates the result.
    pub fn apply(self, party: &mut Party) -> RentalResult<()> {
        let mut next = party.clone();
        if let Some(name) = self.name {
            next.name = name;
        }
        if let Some(kind) = self.kind {
            next.kind = kind;
        }
        if let Some(id_number) = self.id_number {
            next.id_number = id_number;
        }
        if let Some(phone) = self.phone {
            next.phone = phone;
        }
        if self.email.is_some() {
            next.email = self.email;
        }
        if self.address.is_some() {
            next.address = self.address;
        }
        if self.contact_person.is_some() {
            next.contact_person = self.contact_person;
        }
        if self.notes.is_some() {
            next.notes = self.notes;
        }
        if let Some(status) = self.status {
            next.status = status;
        }
        if self.credit_limit.is_some() {
            next.credit_limit = self.credit_limit;
        }
        validate_party_fields(&next.name, next.credit_limit)?;
        *party = next;
        Ok(())
    }
}

/// Filter for party listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PartyFilter {
    /// Only parties of this kind.
    pub kind: Option<PartyKind>,
    /// Only parties with this standing.
    pub status: Option<PartyStatus>,
    /// Include soft-deleted parties.
    pub include_deleted: bool,
}

impl PartyFilter {
    /// Returns true if the party passes the filter.
    #[must_use]
    pub fn matches(&self, party: &Party) -> bool {
        (self.include_deleted || !party.is_deleted())
            && self.kind.is_none_or(|kind| party.kind == kind)
            && self.status.is_none_or(|status| party.status == status)
    }
}

/// Checks the fields shared by creation and update.
pub fn validate_party_fields(name: &str, credit_limit: Option<Decimal>) -> RentalResult<()> {
    if name.trim().is_empty() {
        return Err(RentalError::MissingField("name"));
    }
    if let Some(limit) = credit_limit {
        if limit < Decimal::ZERO {
            return Err(RentalError::NegativeCreditLimit(limit));
        }
        ensure_within_max(limit)?;
    }
    Ok(())
}
