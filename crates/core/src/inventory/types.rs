//! Inventory domain types.

use chrono::{DateTime, Utc};
use rentdesk_shared::types::ItemId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RentalError, RentalResult};
use crate::ledger::balance::ensure_within_max;

/// Availability state of a rentable item.
///
/// `Rented` is owned by the booking engine: an item is rented exactly when
/// at least one active booking lists it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Free to be booked.
    Available,
    /// Out with a customer under an active booking.
    Rented,
    /// Temporarily out of service.
    Maintenance,
    /// Permanently out of service.
    Retired,
}

impl ItemStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Rented => "rented",
            Self::Maintenance => "maintenance",
            Self::Retired => "retired",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "available" => Some(Self::Available),
            "rented" => Some(Self::Rented),
            "maintenance" => Some(Self::Maintenance),
            "retired" => Some(Self::Retired),
            _ => None,
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical condition of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemCondition {
    /// Never rented out.
    #[default]
    New,
    /// Shows wear.
    Used,
    /// Used but in excellent shape.
    Excellent,
}

impl ItemCondition {
    /// Returns the string representation of the condition.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
            Self::Excellent => "excellent",
        }
    }

    /// Parses a condition from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "new" => Some(Self::New),
            "used" => Some(Self::Used),
            "excellent" => Some(Self::Excellent),
            _ => None,
        }
    }
}

/// Whether the business owns the item or sub-rents it from a supplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    /// Owned by the business.
    #[default]
    Owned,
    /// Sub-rented from an external supplier.
    External,
}

impl Ownership {
    /// Returns the string representation of the ownership.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Owned => "owned",
            Self::External => "external",
        }
    }

    /// Parses an ownership from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "owned" => Some(Self::Owned),
            "external" => Some(Self::External),
            _ => None,
        }
    }
}

/// A rentable unit: a piece of equipment, a vehicle, a property unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Unique identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Serial number, plate or unit number.
    pub identifier: String,
    /// Catalog category.
    pub category: String,
    /// Brand or make.
    pub brand: Option<String>,
    /// Model.
    pub model: Option<String>,
    /// Physical condition.
    pub condition: ItemCondition,
    /// Owned or sub-rented.
    pub ownership: Ownership,
    /// Supplier name for external items.
    pub supplier_name: Option<String>,
    /// What the supplier charges per day for external items.
    pub supplier_cost: Option<Decimal>,
    /// Price per rental day.
    pub daily_rate: Decimal,
    /// Availability state.
    pub status: ItemStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// Returns true if the item has been soft-deleted.
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for registering a new item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    /// Display name.
    pub name: String,
    /// Serial number, plate or unit number.
    #[serde(default)]
    pub identifier: String,
    /// Catalog category.
    #[serde(default)]
    pub category: String,
    /// Brand or make.
    #[serde(default)]
    pub brand: Option<String>,
    /// Model.
    #[serde(default)]
    pub model: Option<String>,
    /// Physical condition.
    #[serde(default)]
    pub condition: ItemCondition,
    /// Owned or sub-rented.
    #[serde(default)]
    pub ownership: Ownership,
    /// Supplier name for external items.
    #[serde(default)]
    pub supplier_name: Option<String>,
    /// Supplier cost for external items.
    #[serde(default)]
    pub supplier_cost: Option<Decimal>,
    /// Price per rental day.
    pub daily_rate: Decimal,
}

impl NewItem {
    /// Creates the minimal input for an item.
    #[must_use]
    pub fn new(name: impl Into<String>, daily_rate: Decimal) -> Self {
        Self {
            name: name.into(),
            identifier: String::new(),
            category: String::new(),
            brand: None,
            model: None,
            condition: ItemCondition::default(),
            ownership: Ownership::default(),
            supplier_name: None,
            supplier_cost: None,
            daily_rate,
        }
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = identifier.into();
        self
    }

    /// Validates the input.
    pub fn validate(&self) -> RentalResult<()> {
        validate_item_fields(&self.name, self.daily_rate, self.supplier_cost)
    }

    /// Validates the input and builds an `Available` item with a fresh id.
    pub fn into_item(self) -> RentalResult<InventoryItem> {
        self.validate()?;
        let now = Utc::now();
        Ok(InventoryItem {
            id: ItemId::new(),
            name: self.name.trim().to_string(),
            identifier: self.identifier,
            category: self.category,
            brand: self.brand,
            model: self.model,
            condition: self.condition,
            ownership: self.ownership,
            supplier_name: self.supplier_name,
            supplier_cost: self.supplier_cost,
            daily_rate: self.daily_rate,
            status: ItemStatus::Available,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        })
    }
}

/// Partial update for an item. Status is changed through its own path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemPatch {
    /// New name.
    pub name: Option<String>,
    /// New identifier.
    pub identifier: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New brand.
    pub brand: Option<String>,
    /// New model.
    pub model: Option<String>,
    /// New condition.
    pub condition: Option<ItemCondition>,
    /// New ownership.
    pub ownership: Option<Ownership>,
    /// New supplier name.
    pub supplier_name: Option<String>,
    /// New supplier cost.
    pub supplier_cost: Option<Decimal>,
    /// New daily rate. Existing bookings keep their frozen rate.
    pub daily_rate: Option<Decimal>,
}

impl ItemPatch {
    /// Applies the patch to an item and validates the result.
    pub fn apply(self, item: &mut InventoryItem) -> RentalResult<()> {
        let mut next = item.clone();
        if let Some(name) = self.name {
            next.name = name;
        }
        if let Some(identifier) = self.identifier {
            next.identifier = identifier;
        }
        if let Some(category) = self.category {
            next.category = category;
        }
        if self.brand.is_some() {
            next.brand = self.brand;
        }
        if self.model.is_some() {
            next.model = self.model;
        }
        if let Some(condition) = self.condition {
            next.condition = condition;
        }
        if let Some(ownership) = self.ownership {
            next.ownership = ownership;
        }
        if self.supplier_name.is_some() {
            next.supplier_name = self.supplier_name;
        }
        if self.supplier_cost.is_some() {
            next.supplier_cost = self.supplier_cost;
        }
        if let Some(rate) = self.daily_rate {
            next.daily_rate = rate;
        }
        validate_item_fields(&next.name, next.daily_rate, next.supplier_cost)?;
        *item = next;
        Ok(())
    }
}

/// Filter for item listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemFilter {
    /// Only items in this category.
    pub category: Option<String>,
    /// Only items with this status.
    pub status: Option<ItemStatus>,
    /// Include soft-deleted items.
    pub include_deleted: bool,
}

impl ItemFilter {
    /// Returns true if the item passes the filter.
    #[must_use]
    pub fn matches(&self, item: &InventoryItem) -> bool {
        (self.include_deleted || !item.is_deleted())
            && self
                .category
                .as_deref()
                .is_none_or(|category| item.category == category)
            && self.status.is_none_or(|status| item.status == status)
    }
}

/// Item counts per status, excluding deleted items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    /// All live items.
    pub total: usize,
    /// Available items.
    pub available: usize,
    /// Rented items.
    pub rented: usize,
    /// Items in maintenance.
    pub maintenance: usize,
    /// Retired items.
    pub retired: usize,
}

impl InventoryStats {
    /// Tallies live items.
    pub fn tally<'a>(items: impl IntoIterator<Item = &'a InventoryItem>) -> Self {
        let mut stats = Self::default();
        for item in items.into_iter().filter(|item| !item.is_deleted()) {
            stats.total += 1;
            match item.status {
                ItemStatus::Available => stats.available += 1,
                ItemStatus::Rented => stats.rented += 1,
                ItemStatus::Maintenance => stats.maintenance += 1,
                ItemStatus::Retired => stats.retired += 1,
            }
        }
        stats
    }
}

/// Checks the fields shared by creation and update.
pub fn validate_item_fields(
    name: &str,
    daily_rate: Decimal,
    supplier_cost: Option<Decimal>,
) -> RentalResult<()> {
    if name.trim().is_empty() {
        return Err(RentalError::MissingField("name"));
    }
    if daily_rate < Decimal::ZERO {
        return Err(RentalError::NegativeDailyRate(daily_rate));
    }
    ensure_within_max(daily_rate)?;
    if let Some(cost) = supplier_cost {
        if cost < Decimal::ZERO {
            return Err(RentalError::NegativeSupplierCost(cost));
        }
        ensure_within_max(cost)?;
    }
    Ok(())
}
