//! In-memory inventory registry.

use std::collections::BTreeMap;

use chrono::Utc;
use rentdesk_shared::types::ItemId;

use crate::error::{RentalError, RentalResult};
use crate::inventory::types::{
    InventoryItem, InventoryStats, ItemFilter, ItemPatch, ItemStatus, NewItem,
};

/// Holds every rentable item, keyed by id (creation order).
///
/// Status writes here are unconditional. The booking engine decides when an
/// item may become `Rented` or be released.
#[derive(Debug, Clone, Default)]
pub struct InventoryRegistry {
    items: BTreeMap<ItemId, InventoryItem>,
}

impl InventoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an item, including soft-deleted ones.
    pub fn get(&self, id: ItemId) -> RentalResult<&InventoryItem> {
        self.items.get(&id).ok_or(RentalError::ItemNotFound(id))
    }

    /// Lists items matching the filter.
    #[must_use]
    pub fn list(&self, filter: &ItemFilter) -> Vec<InventoryItem> {
        self.items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect()
    }

    /// Registers a new item as `Available`.
    pub fn create(&mut self, input: NewItem) -> RentalResult<InventoryItem> {
        let item = input.into_item()?;
        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    /// Inserts an item as-is. Used when loading persisted state.
    pub fn insert(&mut self, item: InventoryItem) {
        self.items.insert(item.id, item);
    }

    /// Applies a patch to a live item.
    pub fn update(&mut self, id: ItemId, patch: ItemPatch) -> RentalResult<InventoryItem> {
        let item = self.live_mut(id)?;
        patch.apply(item)?;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    /// Sets the status of one item.
    pub fn set_status(&mut self, id: ItemId, status: ItemStatus) -> RentalResult<()> {
        self.bulk_set_status(&[id], status)
    }

    /// Sets the status of several items. Either all are written or none.
    pub fn bulk_set_status(&mut self, ids: &[ItemId], status: ItemStatus) -> RentalResult<()> {
        if let Some(missing) = ids.iter().find(|id| !self.items.contains_key(id)) {
            return Err(RentalError::ItemNotFound(*missing));
        }
        let now = Utc::now();
        for id in ids {
            if let Some(item) = self.items.get_mut(id) {
                item.status = status;
                item.updated_at = now;
            }
        }
        Ok(())
    }

    /// Soft-deletes an item. Deleting twice is a no-op.
    pub fn delete(&mut self, id: ItemId) -> RentalResult<()> {
        let item = self.items.get_mut(&id).ok_or(RentalError::ItemNotFound(id))?;
        if item.deleted_at.is_none() {
            let now = Utc::now();
            item.deleted_at = Some(now);
            item.updated_at = now;
        }
        Ok(())
    }

    /// Counts live items per status.
    #[must_use]
    pub fn stats(&self) -> InventoryStats {
        InventoryStats::tally(self.items.values())
    }

    /// Iterates over all items, including deleted ones.
    pub fn iter(&self) -> impl Iterator<Item = &InventoryItem> {
        self.items.values()
    }

    fn live_mut(&mut self, id: ItemId) -> RentalResult<&mut InventoryItem> {
        let item = self.items.get_mut(&id).ok_or(RentalError::ItemNotFound(id))?;
        if item.is_deleted() {
            return Err(RentalError::ItemDeleted(id));
        }
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn registry_with(names: &[&str]) -> (InventoryRegistry, Vec<ItemId>) {
        let mut registry = InventoryRegistry::new();
        let ids = names
            .iter()
            .map(|name| {
                registry
                    .create(NewItem::new(*name, dec!(100)).with_category("Generators"))
                    .unwrap()
                    .id
            })
            .collect();
        (registry, ids)
    }

    #[test]
    fn test_create_starts_available() {
        let (registry, ids) = registry_with(&["Generator 5kW"]);
        let item = registry.get(ids[0]).unwrap();
        assert_eq!(item.status, ItemStatus::Available);
        assert_eq!(item.name, "Generator 5kW");
        assert!(!item.is_deleted());
    }

    #[test]
    fn test_create_rejects_invalid_input() {
        let mut registry = InventoryRegistry::new();
        let result = registry.create(NewItem::new("Crane", dec!(-10)));
        assert_eq!(result, Err(RentalError::NegativeDailyRate(dec!(-10))));
        assert!(registry.list(&ItemFilter::default()).is_empty());
    }

    #[test]
    fn test_bulk_set_status_is_all_or_nothing() {
        let (mut registry, ids) = registry_with(&["A", "B"]);
        let unknown = ItemId::new();

        let result = registry.bulk_set_status(&[ids[0], unknown, ids[1]], ItemStatus::Rented);

        assert_eq!(result, Err(RentalError::ItemNotFound(unknown)));
        assert_eq!(registry.get(ids[0]).unwrap().status, ItemStatus::Available);
        assert_eq!(registry.get(ids[1]).unwrap().status, ItemStatus::Available);

        registry.bulk_set_status(&ids, ItemStatus::Rented).unwrap();
        assert_eq!(registry.stats().rented, 2);
    }

    #[test]
    fn test_delete_hides_from_list_by_default() {
        let (mut registry, ids) = registry_with(&["A", "B"]);
        registry.delete(ids[0]).unwrap();

        assert_eq!(registry.list(&ItemFilter::default()).len(), 1);
        let all = registry.list(&ItemFilter {
            include_deleted: true,
            ..ItemFilter::default()
        });
        assert_eq!(all.len(), 2);
        assert!(registry.get(ids[0]).unwrap().is_deleted());
        assert_eq!(registry.stats().total, 1);
    }

    #[test]
    fn test_update_deleted_item_fails() {
        let (mut registry, ids) = registry_with(&["A"]);
        registry.delete(ids[0]).unwrap();
        let result = registry.update(ids[0], ItemPatch::default());
        assert_eq!(result, Err(RentalError::ItemDeleted(ids[0])));
    }

    #[test]
    fn test_update_validates_merged_fields() {
        let (mut registry, ids) = registry_with(&["A"]);
        let patch = ItemPatch {
            daily_rate: Some(dec!(-1)),
            ..ItemPatch::default()
        };
        assert!(registry.update(ids[0], patch).is_err());
        assert_eq!(registry.get(ids[0]).unwrap().daily_rate, dec!(100));

        let patch = ItemPatch {
            name: Some("Renamed".to_string()),
            daily_rate: Some(dec!(120)),
            ..ItemPatch::default()
        };
        let updated = registry.update(ids[0], patch).unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.daily_rate, dec!(120));
    }

    #[test]
    fn test_list_filters_by_status_and_category() {
        let (mut registry, ids) = registry_with(&["A", "B", "C"]);
        registry
            .create(NewItem::new("Ladder", dec!(5)).with_category("Hand tools"))
            .unwrap();
        registry.set_status(ids[1], ItemStatus::Maintenance).unwrap();

        let maintenance = registry.list(&ItemFilter {
            status: Some(ItemStatus::Maintenance),
            ..ItemFilter::default()
        });
        assert_eq!(maintenance.len(), 1);
        assert_eq!(maintenance[0].id, ids[1]);

        let generators = registry.list(&ItemFilter {
            category: Some("Generators".to_string()),
            ..ItemFilter::default()
        });
        assert_eq!(generators.len(), 3);
    }
}
