//! Party operations of the rental repository.

use chrono::Utc;
use rentdesk_core::party::{NewParty, Party, PartyFilter, PartyPatch};
use rentdesk_core::RentalError;
use rentdesk_shared::types::PartyId;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::info;

use super::store::{load_party, save_party};
use super::{RentalRepository, RepositoryResult};
use crate::entities::parties;

impl RentalRepository {
    /// Registers a new party with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is invalid or the insert fails.
    pub async fn create_party(&self, input: NewParty) -> RepositoryResult<Party> {
        let party = input.into_party()?;
        parties::ActiveModel::from(&party).insert(&self.db).await?;
        info!(party_id = %party.id, kind = party.kind.as_str(), "Party created");
        Ok(party)
    }

    /// Updates a party's details. The balance is untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the party is missing or deleted, the merged party
    /// is invalid, or the database operation fails.
    pub async fn update_party(&self, id: PartyId, patch: PartyPatch) -> RepositoryResult<Party> {
        let txn = self.db.begin().await?;

        let mut party = load_party(&txn, id, true).await?;
        if party.is_deleted() {
            return Err(RentalError::PartyDeleted(id).into());
        }
        patch.apply(&mut party)?;
        party.updated_at = Utc::now();
        save_party(&txn, &party).await?;

        txn.commit().await?;
        info!(party_id = %id, "Party updated");
        Ok(party)
    }

    /// Looks up a party, deleted or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the party is missing or the query fails.
    pub async fn get_party(&self, id: PartyId) -> RepositoryResult<Party> {
        load_party(&self.db, id, false).await
    }

    /// Lists parties in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_parties(&self, filter: &PartyFilter) -> RepositoryResult<Vec<Party>> {
        let mut query = parties::Entity::find();
        if !filter.include_deleted {
            query = query.filter(parties::Column::DeletedAt.is_null());
        }
        if let Some(kind) = filter.kind {
            query = query.filter(parties::Column::Kind.eq(kind.as_str()));
        }
        if let Some(status) = filter.status {
            query = query.filter(parties::Column::Status.eq(status.as_str()));
        }

        let models = query
            .order_by_asc(parties::Column::CreatedAt)
            .order_by_asc(parties::Column::Id)
            .all(&self.db)
            .await?;
        let parties = models
            .into_iter()
            .map(parties::Model::into_domain)
            .collect::<Result<_, _>>()?;
        Ok(parties)
    }

    /// Soft-deletes a party, keeping its bookings and entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the party is missing or the update fails.
    pub async fn delete_party(&self, id: PartyId) -> RepositoryResult<()> {
        let txn = self.db.begin().await?;

        let mut party = load_party(&txn, id, true).await?;
        if party.deleted_at.is_none() {
            let now = Utc::now();
            party.deleted_at = Some(now);
            party.updated_at = now;
            save_party(&txn, &party).await?;
        }

        txn.commit().await?;
        info!(party_id = %id, "Party deleted");
        Ok(())
    }
}
