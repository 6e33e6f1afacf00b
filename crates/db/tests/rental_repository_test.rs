//! Integration tests for the rental repository against in-memory SQLite.

use chrono::NaiveDate;
use rentdesk_core::booking::{BookingFilter, BookingRequest, BookingStatus};
use rentdesk_core::inventory::{ItemFilter, ItemStatus, NewItem};
use rentdesk_core::ledger::{EntryKind, MAX_AMOUNT, PaymentMethod, PaymentRequest, RefundRequest};
use rentdesk_core::party::{NewParty, PartyFilter};
use rentdesk_core::settings::{CatalogSettings, Preset};
use rentdesk_core::user::{NewUser, UserFilter, UserPatch};
use rentdesk_core::RentalError;
use rentdesk_db::{Migrator, RentalRepository, RepositoryError, connect_with};
use rentdesk_shared::Role;
use rentdesk_shared::types::{ItemId, PartyId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;

async fn repository() -> RentalRepository {
    let db = connect_with("sqlite::memory:", 1, 1)
        .await
        .expect("Failed to open SQLite");
    Migrator::up(&db, None).await.expect("Failed to migrate");
    RentalRepository::new(db)
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn request(party_id: PartyId, item_ids: Vec<ItemId>, start: u32, end: u32) -> BookingRequest {
    BookingRequest {
        party_id,
        item_ids,
        start_date: date(start),
        end_date: date(end),
        notes: None,
    }
}

fn payment(amount: Decimal) -> PaymentRequest {
    PaymentRequest {
        amount,
        method: PaymentMethod::Cash,
        date: None,
        description: None,
    }
}

fn rental_error(err: &RepositoryError) -> &RentalError {
    err.as_rental().expect("expected a rule violation")
}

struct Fixture {
    repo: RentalRepository,
    e1: ItemId,
    e2: ItemId,
    c1: PartyId,
    c2: PartyId,
}

/// E1 at 300/day, E2 at 100/day, two clients with zero balances.
async fn fixture() -> Fixture {
    let repo = repository().await;
    let e1 = repo.create_item(NewItem::new("E1", dec!(300))).await.unwrap().id;
    let e2 = repo.create_item(NewItem::new("E2", dec!(100))).await.unwrap().id;
    let c1 = repo.create_party(NewParty::client("C1")).await.unwrap().id;
    let c2 = repo.create_party(NewParty::client("C2")).await.unwrap().id;
    Fixture {
        repo,
        e1,
        e2,
        c1,
        c2,
    }
}

impl Fixture {
    async fn item_status(&self, id: ItemId) -> ItemStatus {
        self.repo.get_item(id).await.unwrap().status
    }

    async fn balance(&self, id: PartyId) -> Decimal {
        self.repo.get_party(id).await.unwrap().balance
    }

    async fn assert_consistent(&self) {
        assert!(self.repo.verify_balances().await.unwrap().is_consistent());
    }
}

// ============================================================================
// Bookings
// ============================================================================

#[tokio::test]
async fn test_create_pay_return_scenario() {
    let f = fixture().await;

    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();
    assert_eq!(booking.total_amount, dec!(600));
    assert_eq!(booking.status, BookingStatus::Active);
    assert_eq!(f.item_status(f.e1).await, ItemStatus::Rented);
    assert_eq!(f.balance(f.c1).await, dec!(600));

    let stored = f.repo.get_booking(booking.id).await.unwrap();
    assert_eq!(stored.lines.len(), 1);
    assert_eq!(stored.lines[0].days, 2);
    assert_eq!(stored.lines[0].item_name, "E1");

    let entries = f.repo.entries_for_booking(booking.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Invoice);
    assert_eq!(entries[0].signed_amount(), dec!(600));

    f.repo.add_payment(f.c1, payment(dec!(600))).await.unwrap();
    assert_eq!(f.balance(f.c1).await, Decimal::ZERO);

    let returned = f.repo.return_booking(booking.id).await.unwrap();
    assert_eq!(returned.status, BookingStatus::Completed);
    assert_eq!(f.item_status(f.e1).await, ItemStatus::Available);
    assert_eq!(f.balance(f.c1).await, Decimal::ZERO);
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_delete_reverses_create() {
    let f = fixture().await;
    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();

    f.repo.delete_booking(booking.id).await.unwrap();

    assert_eq!(f.item_status(f.e1).await, ItemStatus::Available);
    assert_eq!(f.balance(f.c1).await, Decimal::ZERO);
    let err = f.repo.get_booking(booking.id).await.unwrap_err();
    assert_eq!(rental_error(&err), &RentalError::BookingNotFound(booking.id));
    assert!(f.repo.entries_for_party(f.c1).await.unwrap().is_empty());
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_failed_create_rolls_back() {
    let f = fixture().await;
    f.repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();

    let err = f
        .repo
        .create_booking(request(f.c2, vec![f.e2, f.e1], 1, 3))
        .await
        .unwrap_err();

    assert_eq!(
        rental_error(&err),
        &RentalError::ItemUnavailable {
            item_id: f.e1,
            status: ItemStatus::Rented,
        }
    );
    let bookings = f.repo.list_bookings(&BookingFilter::default()).await.unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(f.item_status(f.e2).await, ItemStatus::Available);
    assert_eq!(f.balance(f.c2).await, Decimal::ZERO);
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_edit_swaps_items_and_moves_invoice() {
    let f = fixture().await;
    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();

    let edited = f
        .repo
        .edit_booking(booking.id, request(f.c2, vec![f.e2], 1, 4))
        .await
        .unwrap();

    assert_eq!(edited.total_amount, dec!(300));
    assert_eq!(edited.party_id, f.c2);
    assert_eq!(edited.status, BookingStatus::Active);
    assert_eq!(f.item_status(f.e1).await, ItemStatus::Available);
    assert_eq!(f.item_status(f.e2).await, ItemStatus::Rented);
    assert_eq!(f.balance(f.c1).await, Decimal::ZERO);
    assert_eq!(f.balance(f.c2).await, dec!(300));

    let entries = f.repo.entries_for_booking(booking.id).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].party_id, f.c2);
    assert_eq!(entries[0].amount, dec!(300));

    let stored = f.repo.get_booking(booking.id).await.unwrap();
    assert_eq!(stored.lines.len(), 1);
    assert_eq!(stored.lines[0].item_id, f.e2);
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_edit_with_same_values_changes_nothing() {
    let f = fixture().await;
    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1, f.e2], 1, 3))
        .await
        .unwrap();

    let edited = f
        .repo
        .edit_booking(booking.id, request(f.c1, vec![f.e1, f.e2], 1, 3))
        .await
        .unwrap();

    assert_eq!(edited.total_amount, dec!(800));
    assert_eq!(edited.lines, booking.lines);
    assert_eq!(f.balance(f.c1).await, dec!(800));
    assert_eq!(f.item_status(f.e1).await, ItemStatus::Rented);
    assert_eq!(f.item_status(f.e2).await, ItemStatus::Rented);

    let entries = f.repo.entries_for_party(f.c1).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].kind, EntryKind::Invoice);
    assert_eq!(entries[0].amount, dec!(800));
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_second_return_keeps_items_held_by_other_booking() {
    let f = fixture().await;
    let first = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();
    f.repo.return_booking(first.id).await.unwrap();
    let second = f
        .repo
        .create_booking(request(f.c2, vec![f.e1], 4, 6))
        .await
        .unwrap();

    let again = f.repo.return_booking(first.id).await.unwrap();
    assert_eq!(again.status, BookingStatus::Completed);
    assert_eq!(f.item_status(f.e1).await, ItemStatus::Rented);

    f.repo.return_booking(second.id).await.unwrap();
    assert_eq!(f.item_status(f.e1).await, ItemStatus::Available);
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_oversized_amounts_are_rejected() {
    let f = fixture().await;
    let err = f
        .repo
        .create_item(NewItem::new("Crane", Decimal::MAX))
        .await
        .unwrap_err();
    assert!(matches!(
        rental_error(&err),
        RentalError::AmountTooLarge { .. }
    ));

    let tower = f
        .repo
        .create_item(NewItem::new("Tower", MAX_AMOUNT))
        .await
        .unwrap()
        .id;
    let err = f
        .repo
        .create_booking(request(f.c1, vec![tower], 1, 3))
        .await
        .unwrap_err();
    assert!(matches!(
        rental_error(&err),
        RentalError::AmountTooLarge { .. }
    ));
    assert_eq!(f.balance(f.c1).await, Decimal::ZERO);
    assert_eq!(f.item_status(tower).await, ItemStatus::Available);

    f.repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_cancel_active_booking_refunds_invoice() {
    let f = fixture().await;
    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1, f.e2], 1, 2))
        .await
        .unwrap();
    assert_eq!(f.balance(f.c1).await, dec!(400));

    let cancelled = f.repo.cancel_booking(booking.id).await.unwrap();

    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(f.item_status(f.e1).await, ItemStatus::Available);
    assert_eq!(f.item_status(f.e2).await, ItemStatus::Available);
    assert_eq!(f.balance(f.c1).await, Decimal::ZERO);
    let kinds: Vec<EntryKind> = f
        .repo
        .entries_for_booking(booking.id)
        .await
        .unwrap()
        .into_iter()
        .map(|entry| entry.kind)
        .collect();
    assert_eq!(kinds, vec![EntryKind::Invoice, EntryKind::Refund]);

    let err = f.repo.cancel_booking(booking.id).await.unwrap_err();
    assert!(matches!(
        rental_error(&err),
        RentalError::InvalidTransition { .. }
    ));
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_reserve_then_activate() {
    let f = fixture().await;
    let reserved = f
        .repo
        .reserve_booking(request(f.c1, vec![f.e2], 1, 3))
        .await
        .unwrap();
    assert_eq!(reserved.status, BookingStatus::Pending);
    assert_eq!(f.item_status(f.e2).await, ItemStatus::Available);
    assert_eq!(f.balance(f.c1).await, Decimal::ZERO);

    let active = f.repo.activate_booking(reserved.id).await.unwrap();

    assert_eq!(active.status, BookingStatus::Active);
    assert_eq!(f.item_status(f.e2).await, ItemStatus::Rented);
    assert_eq!(f.balance(f.c1).await, dec!(200));
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_credit_limit_blocks_create() {
    let repo = repository().await;
    let item = repo
        .create_item(NewItem::new("Crane", dec!(500)))
        .await
        .unwrap()
        .id;
    let party = repo
        .create_party(NewParty::client("Acme").with_credit_limit(dec!(1000)))
        .await
        .unwrap()
        .id;

    let err = repo
        .create_booking(request(party, vec![item], 1, 4))
        .await
        .unwrap_err();

    assert!(matches!(
        rental_error(&err),
        RentalError::CreditLimitExceeded { .. }
    ));
    assert_eq!(repo.get_item(item).await.unwrap().status, ItemStatus::Available);
    assert!(repo.create_booking(request(party, vec![item], 1, 3)).await.is_ok());
}

#[tokio::test]
async fn test_list_bookings_filters_by_party() {
    let f = fixture().await;
    f.repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();
    f.repo
        .reserve_booking(request(f.c2, vec![f.e2], 5, 6))
        .await
        .unwrap();

    let filter = BookingFilter {
        party_id: Some(f.c2),
        ..BookingFilter::default()
    };
    let listed = f.repo.list_bookings(&filter).await.unwrap();

    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].party_id, f.c2);
    assert_eq!(listed[0].lines.len(), 1);
}

// ============================================================================
// Inventory and parties
// ============================================================================

#[tokio::test]
async fn test_item_in_use_cannot_be_deleted_or_retired() {
    let f = fixture().await;
    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();

    let err = f.repo.delete_item(f.e1).await.unwrap_err();
    assert_eq!(
        rental_error(&err),
        &RentalError::ItemInUse {
            item_id: f.e1,
            booking_id: booking.id,
        }
    );
    let err = f
        .repo
        .set_item_status(f.e1, ItemStatus::Retired)
        .await
        .unwrap_err();
    assert!(matches!(rental_error(&err), RentalError::ItemInUse { .. }));

    f.repo.delete_item(f.e2).await.unwrap();
    let live = f.repo.list_items(&ItemFilter::default()).await.unwrap();
    assert_eq!(live.len(), 1);
    let stats = f.repo.inventory_stats().await.unwrap();
    assert_eq!(stats.total, 1);
    assert_eq!(stats.rented, 1);
}

#[tokio::test]
async fn test_deleted_party_is_hidden_and_frozen() {
    let f = fixture().await;
    f.repo.delete_party(f.c2).await.unwrap();

    let listed = f.repo.list_parties(&PartyFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    let err = f.repo.add_payment(f.c2, payment(dec!(10))).await.unwrap_err();
    assert_eq!(rental_error(&err), &RentalError::PartyDeleted(f.c2));
    assert!(f.repo.get_party(f.c2).await.unwrap().is_deleted());
}

// ============================================================================
// Ledger
// ============================================================================

#[tokio::test]
async fn test_invoice_is_locked_while_booking_exists() {
    let f = fixture().await;
    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();
    let invoice = f.repo.entries_for_booking(booking.id).await.unwrap()[0].clone();

    let err = f.repo.delete_entry(invoice.id).await.unwrap_err();
    assert_eq!(
        rental_error(&err),
        &RentalError::InvoiceLocked {
            entry_id: invoice.id,
            booking_id: booking.id,
        }
    );

    let paid = f.repo.add_payment(f.c1, payment(dec!(100))).await.unwrap();
    assert_eq!(f.balance(f.c1).await, dec!(500));
    f.repo.delete_entry(paid.id).await.unwrap();
    assert_eq!(f.balance(f.c1).await, dec!(600));
    f.assert_consistent().await;
}

#[tokio::test]
async fn test_refund_and_statement() {
    let f = fixture().await;
    f.repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();
    f.repo.add_payment(f.c1, payment(dec!(700))).await.unwrap();
    let refund = f
        .repo
        .add_refund(
            f.c1,
            RefundRequest {
                amount: dec!(50),
                date: None,
                description: Some("  ".to_string()),
                booking_id: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(refund.description, "Refund");

    let statement = f.repo.statement(f.c1, None, None).await.unwrap();
    assert_eq!(statement.lines.len(), 3);
    assert_eq!(statement.closing_balance, f.balance(f.c1).await);
    assert_eq!(statement.closing_balance, dec!(-150));
    assert_eq!(f.repo.recompute_balance(f.c1).await.unwrap(), dec!(-150));

    let err = f
        .repo
        .statement(f.c1, Some(date(5)), Some(date(1)))
        .await
        .unwrap_err();
    assert!(matches!(
        rental_error(&err),
        RentalError::InvalidDateRange { .. }
    ));
}

#[tokio::test]
async fn test_refund_rejects_booking_of_another_party() {
    let f = fixture().await;
    let booking = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();

    let err = f
        .repo
        .add_refund(
            f.c2,
            RefundRequest {
                amount: dec!(100),
                date: None,
                description: None,
                booking_id: Some(booking.id),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        rental_error(&err),
        &RentalError::RefundPartyMismatch {
            booking_id: booking.id,
            party_id: f.c2,
        }
    );
    assert_eq!(f.balance(f.c2).await, Decimal::ZERO);
    assert!(f.repo.entries_for_party(f.c2).await.unwrap().is_empty());
    f.assert_consistent().await;
}

// ============================================================================
// Settings
// ============================================================================

#[tokio::test]
async fn test_settings_fall_back_until_saved() {
    let repo = repository().await;
    let fallback = CatalogSettings::default();
    assert_eq!(repo.get_settings(&fallback).await.unwrap(), fallback);

    let cars = CatalogSettings::from_preset(Preset::Cars);
    repo.save_settings(cars.clone()).await.unwrap();
    assert_eq!(repo.get_settings(&fallback).await.unwrap(), cars);

    let photo = CatalogSettings::from_preset(Preset::Photography);
    repo.save_settings(photo.clone()).await.unwrap();
    assert_eq!(repo.get_settings(&fallback).await.unwrap(), photo);

    let mut blank = photo;
    blank.currency = " ".to_string();
    let err = repo.save_settings(blank).await.unwrap_err();
    assert!(matches!(rental_error(&err), RentalError::MissingField(_)));
}

// ============================================================================
// Revenue
// ============================================================================

#[tokio::test]
async fn test_revenue_sums_invoiced_bookings() {
    let f = fixture().await;
    let first = f
        .repo
        .create_booking(request(f.c1, vec![f.e1], 1, 3))
        .await
        .unwrap();
    let held = f
        .repo
        .reserve_booking(request(f.c2, vec![f.e2], 1, 3))
        .await
        .unwrap();
    f.repo.return_booking(first.id).await.unwrap();

    let summary = f.repo.revenue().await.unwrap();
    assert_eq!(summary.revenue, dec!(600));
    assert_eq!(summary.invoiced_bookings, 1);
    assert_eq!(summary.pending_bookings, 1);
    assert_eq!(summary.pending_value, dec!(200));

    f.repo.cancel_booking(held.id).await.unwrap();
    let summary = f.repo.revenue().await.unwrap();
    assert_eq!(summary.pending_bookings, 0);
    assert_eq!(summary.revenue, dec!(600));
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_user_lifecycle_and_sign_in() {
    let repo = repository().await;
    let admin = repo
        .create_user(NewUser::new("Omar", "Omar", "desk-password", Role::Admin))
        .await
        .unwrap();
    let clerk = repo
        .create_user(NewUser::new("Sara", "sara", "desk-password", Role::Employee))
        .await
        .unwrap();
    assert_eq!(admin.username, "omar");

    let err = repo
        .create_user(NewUser::new("Other", " SARA ", "desk-password", Role::Employee))
        .await
        .unwrap_err();
    assert_eq!(
        rental_error(&err),
        &RentalError::UsernameTaken("sara".to_string())
    );

    let signed_in = repo.authenticate("omar", "desk-password").await.unwrap();
    assert_eq!(signed_in.id, admin.id);
    let err = repo.authenticate("omar", "wrong-password").await.unwrap_err();
    assert_eq!(rental_error(&err), &RentalError::InvalidCredentials);

    repo.set_user_active(clerk.id, false).await.unwrap();
    let err = repo.authenticate("sara", "desk-password").await.unwrap_err();
    assert_eq!(rental_error(&err), &RentalError::AccountDisabled);

    let listed = repo.list_users(&UserFilter::default()).await.unwrap();
    assert_eq!(listed.len(), 2);
    let active = repo
        .list_users(&UserFilter {
            active: Some(true),
            ..UserFilter::default()
        })
        .await
        .unwrap();
    assert_eq!(active.len(), 1);

    repo.delete_user(clerk.id).await.unwrap();
    assert!(repo.get_user(clerk.id).await.unwrap().is_deleted());
    assert_eq!(repo.list_users(&UserFilter::default()).await.unwrap().len(), 1);
    let err = repo.authenticate("sara", "desk-password").await.unwrap_err();
    assert_eq!(rental_error(&err), &RentalError::InvalidCredentials);

    // The username is free again once its holder is deleted.
    repo.create_user(NewUser::new("Sara", "sara", "desk-password", Role::Employee))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_last_admin_is_kept() {
    let repo = repository().await;
    let admin = repo
        .create_user(NewUser::new("Omar", "omar", "desk-password", Role::Admin))
        .await
        .unwrap();

    let err = repo.delete_user(admin.id).await.unwrap_err();
    assert_eq!(rental_error(&err), &RentalError::LastAdmin);
    let err = repo.set_user_active(admin.id, false).await.unwrap_err();
    assert_eq!(rental_error(&err), &RentalError::LastAdmin);
    assert!(repo.get_user(admin.id).await.unwrap().active);

    repo.create_user(NewUser::new("Backup", "backup", "desk-password", Role::Admin))
        .await
        .unwrap();
    let patch = UserPatch {
        role: Some(Role::Employee),
        password: Some("fresh-password".to_string()),
        ..UserPatch::default()
    };
    let demoted = repo.update_user(admin.id, patch).await.unwrap();
    assert_eq!(demoted.role, Role::Employee);
    assert!(repo.authenticate("omar", "fresh-password").await.is_ok());
}

