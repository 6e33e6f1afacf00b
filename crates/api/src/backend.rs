//! Storage backends behind the HTTP handlers.
//!
//! Handlers only see [`RentalBackend`]. The server picks the in-memory
//! engine when no database is configured and the repository otherwise.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::NaiveDate;
use rentdesk_core::RentalError;
use rentdesk_core::booking::{
    Booking, BookingEngine, BookingFilter, BookingRequest, RevenueSummary,
};
use rentdesk_core::inventory::{
    InventoryItem, InventoryStats, ItemFilter, ItemPatch, ItemStatus, NewItem,
};
use rentdesk_core::ledger::{
    LedgerEntry, PaymentRequest, ReconciliationReport, RefundRequest, Statement,
};
use rentdesk_core::party::{NewParty, Party, PartyFilter, PartyPatch};
use rentdesk_core::settings::CatalogSettings;
use rentdesk_core::user::{NewUser, User, UserFilter, UserPatch};
use rentdesk_db::RentalRepository;
use rentdesk_shared::AppResult;
use rentdesk_shared::types::{BookingId, ItemId, LedgerEntryId, PartyId, UserId};
use rust_decimal::Decimal;

/// Every operation the API exposes, independent of where records live.
#[async_trait]
pub trait RentalBackend: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    // ========== Settings ==========

    /// Current catalog settings.
    async fn settings(&self) -> AppResult<CatalogSettings>;
    /// Replaces the catalog settings.
    async fn save_settings(&self, settings: CatalogSettings) -> AppResult<CatalogSettings>;

    // ========== Inventory ==========

    /// Registers a new item.
    async fn create_item(&self, input: NewItem) -> AppResult<InventoryItem>;
    /// Updates an item's descriptive fields and rate.
    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> AppResult<InventoryItem>;
    /// Looks up an item.
    async fn get_item(&self, id: ItemId) -> AppResult<InventoryItem>;
    /// Lists items.
    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<InventoryItem>>;
    /// Operator status change.
    async fn set_item_status(&self, id: ItemId, status: ItemStatus) -> AppResult<InventoryItem>;
    /// Soft-deletes an item.
    async fn delete_item(&self, id: ItemId) -> AppResult<()>;
    /// Counts live items per status.
    async fn inventory_stats(&self) -> AppResult<InventoryStats>;

    // ========== Parties ==========

    /// Registers a new party.
    async fn create_party(&self, input: NewParty) -> AppResult<Party>;
    /// Updates a party's details.
    async fn update_party(&self, id: PartyId, patch: PartyPatch) -> AppResult<Party>;
    /// Looks up a party.
    async fn get_party(&self, id: PartyId) -> AppResult<Party>;
    /// Lists parties.
    async fn list_parties(&self, filter: &PartyFilter) -> AppResult<Vec<Party>>;
    /// Soft-deletes a party.
    async fn delete_party(&self, id: PartyId) -> AppResult<()>;

    // ========== Bookings ==========

    /// Creates an active booking.
    async fn create_booking(&self, request: BookingRequest) -> AppResult<Booking>;
    /// Holds a booking as pending.
    async fn reserve_booking(&self, request: BookingRequest) -> AppResult<Booking>;
    /// Turns a pending booking into an active one.
    async fn activate_booking(&self, id: BookingId) -> AppResult<Booking>;
    /// Replaces a booking's contents.
    async fn edit_booking(&self, id: BookingId, request: BookingRequest) -> AppResult<Booking>;
    /// Completes an active booking.
    async fn return_booking(&self, id: BookingId) -> AppResult<Booking>;
    /// Cancels a pending or active booking.
    async fn cancel_booking(&self, id: BookingId) -> AppResult<Booking>;
    /// Removes a booking and every effect it had.
    async fn delete_booking(&self, id: BookingId) -> AppResult<Booking>;
    /// Looks up a booking.
    async fn get_booking(&self, id: BookingId) -> AppResult<Booking>;
    /// Lists bookings, newest first.
    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>>;
    /// Booking value per lifecycle stage.
    async fn revenue(&self) -> AppResult<RevenueSummary>;

    // ========== Ledger ==========

    /// Records a payment.
    async fn add_payment(&self, party_id: PartyId, request: PaymentRequest) -> AppResult<LedgerEntry>;
    /// Records a refund.
    async fn add_refund(&self, party_id: PartyId, request: RefundRequest) -> AppResult<LedgerEntry>;
    /// Deletes an entry and reverses its balance effect.
    async fn delete_entry(&self, id: LedgerEntryId) -> AppResult<LedgerEntry>;
    /// A party's entries by date.
    async fn entries_for_party(&self, party_id: PartyId) -> AppResult<Vec<LedgerEntry>>;
    /// A booking's entries by date.
    async fn entries_for_booking(&self, booking_id: BookingId) -> AppResult<Vec<LedgerEntry>>;
    /// Party statement over an optional date range.
    async fn statement(
        &self,
        party_id: PartyId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Statement>;
    /// Sum of a party's entries.
    async fn recompute_balance(&self, party_id: PartyId) -> AppResult<Decimal>;
    /// Stored balances compared with the ledger.
    async fn verify_balances(&self) -> AppResult<ReconciliationReport>;

    // ========== Users ==========

    /// Creates an operator account.
    async fn create_user(&self, input: NewUser) -> AppResult<User>;
    /// Looks up a user, deleted or not.
    async fn get_user(&self, id: UserId) -> AppResult<User>;
    /// Lists users, newest first.
    async fn list_users(&self, filter: &UserFilter) -> AppResult<Vec<User>>;
    /// Updates a live user.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> AppResult<User>;
    /// Enables or disables a live user.
    async fn set_user_active(&self, id: UserId, active: bool) -> AppResult<User>;
    /// Soft-deletes a user.
    async fn delete_user(&self, id: UserId) -> AppResult<()>;
    /// Checks a username and password.
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User>;
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Keeps every record in a [`BookingEngine`]. Nothing survives a restart.
#[derive(Debug)]
pub struct MemoryBackend {
    engine: BookingEngine,
    settings: RwLock<CatalogSettings>,
}

impl MemoryBackend {
    /// Creates an empty backend with the given catalog settings.
    #[must_use]
    pub fn new(settings: CatalogSettings) -> Self {
        Self::with_engine(BookingEngine::new(), settings)
    }

    /// Wraps an existing engine.
    #[must_use]
    pub fn with_engine(engine: BookingEngine, settings: CatalogSettings) -> Self {
        Self {
            engine,
            settings: RwLock::new(settings),
        }
    }

    /// The underlying engine.
    #[must_use]
    pub const fn engine(&self) -> &BookingEngine {
        &self.engine
    }
}

#[async_trait]
impl RentalBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn settings(&self) -> AppResult<CatalogSettings> {
        let guard = self
            .settings
            .read()
            .map_err(|_| RentalError::StateUnavailable)?;
        Ok(guard.clone())
    }

    async fn save_settings(&self, settings: CatalogSettings) -> AppResult<CatalogSettings> {
        settings.validate()?;
        let mut guard = self
            .settings
            .write()
            .map_err(|_| RentalError::StateUnavailable)?;
        *guard = settings.clone();
        Ok(settings)
    }

    async fn create_item(&self, input: NewItem) -> AppResult<InventoryItem> {
        Ok(self.engine.create_item(input)?)
    }

    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> AppResult<InventoryItem> {
        Ok(self.engine.update_item(id, patch)?)
    }

    async fn get_item(&self, id: ItemId) -> AppResult<InventoryItem> {
        Ok(self.engine.get_item(id)?)
    }

    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<InventoryItem>> {
        Ok(self.engine.list_items(filter)?)
    }

    async fn set_item_status(&self, id: ItemId, status: ItemStatus) -> AppResult<InventoryItem> {
        Ok(self.engine.set_item_status(id, status)?)
    }

    async fn delete_item(&self, id: ItemId) -> AppResult<()> {
        Ok(self.engine.delete_item(id)?)
    }

    async fn inventory_stats(&self) -> AppResult<InventoryStats> {
        Ok(self.engine.inventory_stats()?)
    }

    async fn create_party(&self, input: NewParty) -> AppResult<Party> {
        Ok(self.engine.create_party(input)?)
    }

    async fn update_party(&self, id: PartyId, patch: PartyPatch) -> AppResult<Party> {
        Ok(self.engine.update_party(id, patch)?)
    }

    async fn get_party(&self, id: PartyId) -> AppResult<Party> {
        Ok(self.engine.get_party(id)?)
    }

    async fn list_parties(&self, filter: &PartyFilter) -> AppResult<Vec<Party>> {
        Ok(self.engine.list_parties(filter)?)
    }

    async fn delete_party(&self, id: PartyId) -> AppResult<()> {
        Ok(self.engine.delete_party(id)?)
    }

    async fn create_booking(&self, request: BookingRequest) -> AppResult<Booking> {
        Ok(self.engine.create_booking(request)?)
    }

    async fn reserve_booking(&self, request: BookingRequest) -> AppResult<Booking> {
        Ok(self.engine.reserve_booking(request)?)
    }

    async fn activate_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.engine.activate_booking(id)?)
    }

    async fn edit_booking(&self, id: BookingId, request: BookingRequest) -> AppResult<Booking> {
        Ok(self.engine.edit_booking(id, request)?)
    }

    async fn return_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.engine.return_booking(id)?)
    }

    async fn cancel_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.engine.cancel_booking(id)?)
    }

    async fn delete_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.engine.delete_booking(id)?)
    }

    async fn get_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.engine.get_booking(id)?)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        Ok(self.engine.list_bookings(filter)?)
    }

    async fn revenue(&self) -> AppResult<RevenueSummary> {
        Ok(self.engine.revenue()?)
    }

    async fn add_payment(&self, party_id: PartyId, request: PaymentRequest) -> AppResult<LedgerEntry> {
        Ok(self.engine.add_payment(party_id, request)?)
    }

    async fn add_refund(&self, party_id: PartyId, request: RefundRequest) -> AppResult<LedgerEntry> {
        Ok(self.engine.add_refund(party_id, request)?)
    }

    async fn delete_entry(&self, id: LedgerEntryId) -> AppResult<LedgerEntry> {
        Ok(self.engine.delete_entry(id)?)
    }

    async fn entries_for_party(&self, party_id: PartyId) -> AppResult<Vec<LedgerEntry>> {
        Ok(self.engine.entries_for_party(party_id)?)
    }

    async fn entries_for_booking(&self, booking_id: BookingId) -> AppResult<Vec<LedgerEntry>> {
        Ok(self.engine.entries_for_booking(booking_id)?)
    }

    async fn statement(
        &self,
        party_id: PartyId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Statement> {
        Ok(self.engine.statement(party_id, from, to)?)
    }

    async fn recompute_balance(&self, party_id: PartyId) -> AppResult<Decimal> {
        Ok(self.engine.recompute_balance(party_id)?)
    }

    async fn verify_balances(&self) -> AppResult<ReconciliationReport> {
        Ok(self.engine.verify_balances()?)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        Ok(self.engine.create_user(input)?)
    }

    async fn get_user(&self, id: UserId) -> AppResult<User> {
        Ok(self.engine.get_user(id)?)
    }

    async fn list_users(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        Ok(self.engine.list_users(filter)?)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> AppResult<User> {
        Ok(self.engine.update_user(id, patch)?)
    }

    async fn set_user_active(&self, id: UserId, active: bool) -> AppResult<User> {
        Ok(self.engine.set_user_active(id, active)?)
    }

    async fn delete_user(&self, id: UserId) -> AppResult<()> {
        Ok(self.engine.delete_user(id)?)
    }

    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        Ok(self.engine.authenticate(username, password)?)
    }
}

// ============================================================================
// Database backend
// ============================================================================

/// Persists records through a [`RentalRepository`].
#[derive(Debug, Clone)]
pub struct DatabaseBackend {
    repo: RentalRepository,
    defaults: CatalogSettings,
}

impl DatabaseBackend {
    /// Wraps a repository. `defaults` apply until settings are saved.
    #[must_use]
    pub const fn new(repo: RentalRepository, defaults: CatalogSettings) -> Self {
        Self { repo, defaults }
    }
}

#[async_trait]
impl RentalBackend for DatabaseBackend {
    fn name(&self) -> &'static str {
        "database"
    }

    async fn settings(&self) -> AppResult<CatalogSettings> {
        Ok(self.repo.get_settings(&self.defaults).await?)
    }

    async fn save_settings(&self, settings: CatalogSettings) -> AppResult<CatalogSettings> {
        Ok(self.repo.save_settings(settings).await?)
    }

    async fn create_item(&self, input: NewItem) -> AppResult<InventoryItem> {
        Ok(self.repo.create_item(input).await?)
    }

    async fn update_item(&self, id: ItemId, patch: ItemPatch) -> AppResult<InventoryItem> {
        Ok(self.repo.update_item(id, patch).await?)
    }

    async fn get_item(&self, id: ItemId) -> AppResult<InventoryItem> {
        Ok(self.repo.get_item(id).await?)
    }

    async fn list_items(&self, filter: &ItemFilter) -> AppResult<Vec<InventoryItem>> {
        Ok(self.repo.list_items(filter).await?)
    }

    async fn set_item_status(&self, id: ItemId, status: ItemStatus) -> AppResult<InventoryItem> {
        Ok(self.repo.set_item_status(id, status).await?)
    }

    async fn delete_item(&self, id: ItemId) -> AppResult<()> {
        Ok(self.repo.delete_item(id).await?)
    }

    async fn inventory_stats(&self) -> AppResult<InventoryStats> {
        Ok(self.repo.inventory_stats().await?)
    }

    async fn create_party(&self, input: NewParty) -> AppResult<Party> {
        Ok(self.repo.create_party(input).await?)
    }

    async fn update_party(&self, id: PartyId, patch: PartyPatch) -> AppResult<Party> {
        Ok(self.repo.update_party(id, patch).await?)
    }

    async fn get_party(&self, id: PartyId) -> AppResult<Party> {
        Ok(self.repo.get_party(id).await?)
    }

    async fn list_parties(&self, filter: &PartyFilter) -> AppResult<Vec<Party>> {
        Ok(self.repo.list_parties(filter).await?)
    }

    async fn delete_party(&self, id: PartyId) -> AppResult<()> {
        Ok(self.repo.delete_party(id).await?)
    }

    async fn create_booking(&self, request: BookingRequest) -> AppResult<Booking> {
        Ok(self.repo.create_booking(request).await?)
    }

    async fn reserve_booking(&self, request: BookingRequest) -> AppResult<Booking> {
        Ok(self.repo.reserve_booking(request).await?)
    }

    async fn activate_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.repo.activate_booking(id).await?)
    }

    async fn edit_booking(&self, id: BookingId, request: BookingRequest) -> AppResult<Booking> {
        Ok(self.repo.edit_booking(id, request).await?)
    }

    async fn return_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.repo.return_booking(id).await?)
    }

    async fn cancel_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.repo.cancel_booking(id).await?)
    }

    async fn delete_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.repo.delete_booking(id).await?)
    }

    async fn get_booking(&self, id: BookingId) -> AppResult<Booking> {
        Ok(self.repo.get_booking(id).await?)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        Ok(self.repo.list_bookings(filter).await?)
    }

    async fn revenue(&self) -> AppResult<RevenueSummary> {
        Ok(self.repo.revenue().await?)
    }

    async fn add_payment(&self, party_id: PartyId, request: PaymentRequest) -> AppResult<LedgerEntry> {
        Ok(self.repo.add_payment(party_id, request).await?)
    }

    async fn add_refund(&self, party_id: PartyId, request: RefundRequest) -> AppResult<LedgerEntry> {
        Ok(self.repo.add_refund(party_id, request).await?)
    }

    async fn delete_entry(&self, id: LedgerEntryId) -> AppResult<LedgerEntry> {
        Ok(self.repo.delete_entry(id).await?)
    }

    async fn entries_for_party(&self, party_id: PartyId) -> AppResult<Vec<LedgerEntry>> {
        Ok(self.repo.entries_for_party(party_id).await?)
    }

    async fn entries_for_booking(&self, booking_id: BookingId) -> AppResult<Vec<LedgerEntry>> {
        Ok(self.repo.entries_for_booking(booking_id).await?)
    }

    async fn statement(
        &self,
        party_id: PartyId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<Statement> {
        Ok(self.repo.statement(party_id, from, to).await?)
    }

    async fn recompute_balance(&self, party_id: PartyId) -> AppResult<Decimal> {
        Ok(self.repo.recompute_balance(party_id).await?)
    }

    async fn verify_balances(&self) -> AppResult<ReconciliationReport> {
        Ok(self.repo.verify_balances().await?)
    }

    async fn create_user(&self, input: NewUser) -> AppResult<User> {
        Ok(self.repo.create_user(input).await?)
    }

    async fn get_user(&self, id: UserId) -> AppResult<User> {
        Ok(self.repo.get_user(id).await?)
    }

    async fn list_users(&self, filter: &UserFilter) -> AppResult<Vec<User>> {
        Ok(self.repo.list_users(filter).await?)
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> AppResult<User> {
        Ok(self.repo.update_user(id, patch).await?)
    }

    async fn set_user_active(&self, id: UserId, active: bool) -> AppResult<User> {
        Ok(self.repo.set_user_active(id, active).await?)
    }

    async fn delete_user(&self, id: UserId) -> AppResult<()> {
        Ok(self.repo.delete_user(id).await?)
    }

    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        Ok(self.repo.authenticate(username, password).await?)
    }
}
