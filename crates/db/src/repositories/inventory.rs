//! Inventory operations of the rental repository.

use chrono::Utc;
use rentdesk_core::booking::{BookingStatus, rules};
use rentdesk_core::inventory::{
    InventoryItem, InventoryStats, ItemFilter, ItemPatch, ItemStatus, NewItem,
};
use rentdesk_core::RentalError;
use rentdesk_shared::types::ItemId;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::info;

use super::store::{find_holder, load_item, save_item};
use super::{RentalRepository, RepositoryResult};
use crate::entities::items;

impl RentalRepository {
    /// Registers a new item as available.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or the insert fails.
    pub async fn create_item(&self, input: NewItem) -> RepositoryResult<InventoryItem> {
        let item = input.into_item()?;
        items::ActiveModel::from(&item).insert(&self.db).await?;
        info!(item_id = %item.id, name = %item.name, "Item created");
        Ok(item)
    }

    /// Updates an item's descriptive fields and rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or deleted, the merged item is
    /// invalid, or the database operation fails.
    pub async fn update_item(&self, id: ItemId, patch: ItemPatch) -> RepositoryResult<InventoryItem> {
        let txn = self.db.begin().await?;

        let mut item = load_item(&txn, id, true).await?;
        if item.is_deleted() {
            return Err(RentalError::ItemDeleted(id).into());
        }
        patch.apply(&mut item)?;
        item.updated_at = Utc::now();
        save_item(&txn, &item).await?;

        txn.commit().await?;
        info!(item_id = %id, "Item updated");
        Ok(item)
    }

    /// Looks up an item, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or the query fails.
    pub async fn get_item(&self, id: ItemId) -> RepositoryResult<InventoryItem> {
        load_item(&self.db, id, false).await
    }

    /// Lists items in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_items(&self, filter: &ItemFilter) -> RepositoryResult<Vec<InventoryItem>> {
        let mut query = items::Entity::find();
        if !filter.include_deleted {
            query = query.filter(items::Column::DeletedAt.is_null());
        }
        if let Some(category) = &filter.category {
            query = query.filter(items::Column::Category.eq(category.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(items::Column::Status.eq(status.as_str()));
        }

        let models = query
            .order_by_asc(items::Column::CreatedAt)
            .order_by_asc(items::Column::Id)
            .all(&self.db)
            .await?;
        let items = models
            .into_iter()
            .map(items::Model::into_domain)
            .collect::<Result<_, _>>()?;
        Ok(items)
    }

    /// Operator status change: `Available`, `Maintenance` or `Retired`.
    ///
    /// # Errors
    ///
    /// Returns an error if the target is `Rented`, the item is out on an
    /// active booking, or the database operation fails.
    pub async fn set_item_status(
        &self,
        id: ItemId,
        status: ItemStatus,
    ) -> RepositoryResult<InventoryItem> {
        let txn = self.db.begin().await?;

        let mut item = load_item(&txn, id, true).await?;
        let holder = find_holder(&txn, id, &[BookingStatus::Active], None).await?;
        rules::ensure_status_settable(&item, status, holder)?;
        item.status = status;
        item.updated_at = Utc::now();
        save_item(&txn, &item).await?;

        txn.commit().await?;
        info!(item_id = %id, status = %status, "Item status changed");
        Ok(item)
    }

    /// Soft-deletes an item that no pending or active booking lists.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is missing or booked, or the database
    /// operation fails.
    pub async fn delete_item(&self, id: ItemId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;

        let mut item = load_item(&txn, id, true).await?;
        let live = [BookingStatus::Pending, BookingStatus::Active];
        if let Some(booking_id) = find_holder(&txn, id, &live, None).await? {
            return Err(RentalError::ItemInUse {
                item_id: id,
                booking_id,
            }
            .into());
        }
        if item.deleted_at.is_none() {
            let now = Utc::now();
            item.deleted_at = Some(now);
            item.updated_at = now;
            save_item(&txn, &item).await?;
        }

        txn.commit().await?;
        info!(item_id = %id, "Item deleted");
        Ok(())
    }

    /// Counts live items per status.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn inventory_stats(&self) -> RepositoryResult<InventoryStats> {
        let items = self.list_items(&ItemFilter::default()).await?;
        Ok(InventoryStats::tally(&items))
    }
}
