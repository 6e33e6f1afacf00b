//! Catalog settings: the labels and categories that shape the rental domain.
//!
//! Settings carry no business rules. A preset fills them in for a typical
//! rental business and the operator may edit any field afterwards.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RentalError, RentalResult};

/// Ready-made catalog configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Construction and industrial equipment.
    #[default]
    Equipment,
    /// Car rental.
    Cars,
    /// Property units.
    Properties,
    /// Event supplies.
    Events,
    /// Photography and film gear.
    Photography,
}

impl Preset {
    /// All presets in display order.
    pub const ALL: [Self; 5] = [
        Self::Equipment,
        Self::Cars,
        Self::Properties,
        Self::Events,
        Self::Photography,
    ];

    /// Returns the string representation of the preset.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Equipment => "equipment",
            Self::Cars => "cars",
            Self::Properties => "properties",
            Self::Events => "events",
            Self::Photography => "photography",
        }
    }

    /// Parses a preset name.
    ///
    /// # Errors
    ///
    /// Returns `RentalError::UnknownPreset` for names that match no preset.
    pub fn parse(s: &str) -> RentalResult<Self> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| RentalError::UnknownPreset(s.to_string()))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Labels, currency and categories shown throughout the application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Application title.
    pub app_name: String,
    /// Singular name of a rentable item.
    pub item_name: String,
    /// Plural name of rentable items.
    pub items_name: String,
    /// Label of the category field.
    pub category_label: String,
    /// Label of the identifier field.
    pub identifier_label: String,
    /// Currency symbol or code used for display.
    pub currency: String,
    /// Category choices for items.
    pub categories: Vec<String>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self::from_preset(Preset::default())
    }
}

impl CatalogSettings {
    /// Builds the settings of a preset.
    #[must_use]
    pub fn from_preset(preset: Preset) -> Self {
        let (app_name, item_name, items_name, category_label, identifier_label, currency, categories): (
            &str,
            &str,
            &str,
            &str,
            &str,
            &str,
            &[&str],
        ) = match preset {
            Preset::Equipment => (
                "Rent Pro",
                "Equipment",
                "Equipment",
                "Category",
                "Serial number",
                "SAR",
                &["Heavy equipment", "Generators", "Cranes", "Hand tools"],
            ),
            Preset::Cars => (
                "Car Rental",
                "Car",
                "Cars",
                "Class",
                "Plate number",
                "SAR",
                &["Sedan", "SUV", "Luxury", "Transport"],
            ),
            Preset::Properties => (
                "My Properties",
                "Unit",
                "Units",
                "Property type",
                "Deed/unit number",
                "SAR",
                &["Apartment", "Villa", "Office", "Warehouse"],
            ),
            Preset::Events => (
                "Event Master",
                "Item",
                "Items",
                "Section",
                "Item code",
                "SAR",
                &["Lighting", "Audio", "Chairs & tables", "Decor"],
            ),
            Preset::Photography => (
                "Zoom Rental",
                "Piece",
                "Gear",
                "Section",
                "Serial",
                "EGP",
                &[
                    "Cameras",
                    "Lenses",
                    "Lighting",
                    "Backdrops",
                    "Audio",
                    "Drones",
                    "Accessories",
                ],
            ),
        };

        Self {
            app_name: app_name.to_string(),
            item_name: item_name.to_string(),
            items_name: items_name.to_string(),
            category_label: category_label.to_string(),
            identifier_label: identifier_label.to_string(),
            currency: currency.to_string(),
            categories: categories.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replaces the display currency.
    #[must_use]
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Replaces the category list, dropping blanks and repeats.
    pub fn set_categories(&mut self, categories: Vec<String>) {
        let mut cleaned: Vec<String> = Vec::with_capacity(categories.len());
        for category in categories {
            let category = category.trim().to_string();
            if !category.is_empty() && !cleaned.contains(&category) {
                cleaned.push(category);
            }
        }
        self.categories = cleaned;
    }

    /// Checks that the required labels are present.
    pub fn validate(&self) -> RentalResult<()> {
        let required = [
            ("app_name", &self.app_name),
            ("item_name", &self.item_name),
            ("items_name", &self.items_name),
            ("currency", &self.currency),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(RentalError::MissingField(field));
            }
        }
        Ok(())
    }
}
