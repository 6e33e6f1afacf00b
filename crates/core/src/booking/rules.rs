//! Booking preconditions shared by every storage backend.
//!
//! These checks are pure: they look at already-loaded records and either
//! pass or name the conflict. Both the in-memory engine and the database
//! repository run them before writing anything.

use rentdesk_shared::types::{BookingId, ItemId, PartyId};
use rust_decimal::Decimal;

use crate::booking::pricing::{collapse_ids, rental_days};
use crate::booking::types::{Booking, BookingRequest, BookingStatus};
use crate::error::{RentalError, RentalResult};
use crate::inventory::types::{InventoryItem, ItemStatus};
use crate::ledger::balance::checked_add;
use crate::party::types::{Party, PartyStatus};

/// A request whose selection and dates have been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Distinct item ids in selection order.
    pub item_ids: Vec<ItemId>,
    /// Billable days.
    pub days: u32,
}

/// Checks the selection and date range of a request.
pub fn validate_request(request: &BookingRequest) -> RentalResult<ValidatedRequest> {
    let item_ids = collapse_ids(&request.item_ids);
    if item_ids.is_empty() {
        return Err(RentalError::EmptySelection);
    }
    let days = rental_days(request.start_date, request.end_date)?;
    Ok(ValidatedRequest { item_ids, days })
}

/// A party that is deleted cannot receive new ledger activity.
pub fn ensure_party_live(party: &Party) -> RentalResult<()> {
    if party.is_deleted() {
        return Err(RentalError::PartyDeleted(party.id));
    }
    Ok(())
}

/// A party may book unless it is deleted or blacklisted.
pub fn ensure_party_can_book(party: &Party) -> RentalResult<()> {
    ensure_party_live(party)?;
    if party.status == PartyStatus::Blacklisted {
        return Err(RentalError::PartyBlacklisted(party.id));
    }
    Ok(())
}

/// An item may go on a booking if it is live and either available or
/// already on the booking being changed.
pub fn ensure_item_bookable(item: &InventoryItem, already_on_booking: bool) -> RentalResult<()> {
    if item.is_deleted() {
        return Err(RentalError::ItemDeleted(item.id));
    }
    if already_on_booking || item.status == ItemStatus::Available {
        return Ok(());
    }
    Err(RentalError::ItemUnavailable {
        item_id: item.id,
        status: item.status,
    })
}

/// Rejects an increase that would take the party past its credit limit.
///
/// Decreases and zero changes always pass.
pub fn ensure_credit(party: &Party, increase: Decimal) -> RentalResult<()> {
    let Some(limit) = party.credit_limit else {
        return Ok(());
    };
    if increase > Decimal::ZERO && checked_add(party.balance, increase)? > limit {
        return Err(RentalError::CreditLimitExceeded {
            party_id: party.id,
            limit,
            balance: party.balance,
            requested: increase,
        });
    }
    Ok(())
}

/// Rejects a refund tied to a booking of another party.
pub fn ensure_refund_matches(booking: &Booking, party_id: PartyId) -> RentalResult<()> {
    if booking.party_id != party_id {
        return Err(RentalError::RefundPartyMismatch {
            booking_id: booking.id,
            party_id,
        });
    }
    Ok(())
}

/// Checks an operator status change against the bookings holding the item.
///
/// `Rented` is never set by hand, and items out on an active booking keep
/// their status until the booking releases them.
pub fn ensure_status_settable(
    item: &InventoryItem,
    target: ItemStatus,
    active_holder: Option<BookingId>,
) -> RentalResult<()> {
    if target == ItemStatus::Rented {
        return Err(RentalError::RentedStatusNotSettable);
    }
    if item.is_deleted() {
        return Err(RentalError::ItemDeleted(item.id));
    }
    if let Some(booking_id) = active_holder {
        return Err(RentalError::ItemInUse {
            item_id: item.id,
            booking_id,
        });
    }
    Ok(())
}

/// First booking other than `exclude` that holds the item with one of `statuses`.
pub fn find_holder<'a>(
    bookings: impl IntoIterator<Item = &'a Booking>,
    item_id: ItemId,
    statuses: &[BookingStatus],
    exclude: Option<BookingId>,
) -> Option<BookingId> {
    bookings
        .into_iter()
        .find(|booking| {
            Some(booking.id) != exclude
                && statuses.contains(&booking.status)
                && booking.holds(item_id)
        })
        .map(|booking| booking.id)
}

/// Of `candidates`, the items no active booking other than `exclude` holds.
pub fn releasable<'a>(
    candidates: &[ItemId],
    bookings: impl IntoIterator<Item = &'a Booking> + Clone,
    exclude: BookingId,
) -> Vec<ItemId> {
    candidates
        .iter()
        .copied()
        .filter(|item_id| {
            find_holder(
                bookings.clone(),
                *item_id,
                &[BookingStatus::Active],
                Some(exclude),
            )
            .is_none()
        })
        .collect()
}

/// Items of `old` that are not in `new`.
#[must_use]
pub fn dropped_items(old: &[ItemId], new: &[ItemId]) -> Vec<ItemId> {
    old.iter().filter(|id| !new.contains(id)).copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::{InventoryRegistry, NewItem};
    use crate::party::{NewParty, PartyLedger, PartyPatch};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn request(item_ids: Vec<ItemId>, start: u32, end: u32) -> BookingRequest {
        BookingRequest {
            party_id: rentdesk_shared::types::PartyId::new(),
            item_ids,
            start_date: NaiveDate::from_ymd_opt(2024, 1, start).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, end).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_validate_request() {
        let a = ItemId::new();
        let validated = validate_request(&request(vec![a, a], 1, 3)).unwrap();
        assert_eq!(validated.item_ids, vec![a]);
        assert_eq!(validated.days, 2);

        assert_eq!(
            validate_request(&request(vec![], 1, 3)),
            Err(RentalError::EmptySelection)
        );
        assert!(matches!(
            validate_request(&request(vec![a], 3, 1)),
            Err(RentalError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_party_checks() {
        let mut ledger = PartyLedger::new();
        let id = ledger.create(NewParty::client("Acme")).unwrap().id;
        assert!(ensure_party_can_book(ledger.get(id).unwrap()).is_ok());

        ledger
            .update(
                id,
                PartyPatch {
                    status: Some(PartyStatus::Blacklisted),
                    ..PartyPatch::default()
                },
            )
            .unwrap();
        assert_eq!(
            ensure_party_can_book(ledger.get(id).unwrap()),
            Err(RentalError::PartyBlacklisted(id))
        );
        assert!(ensure_party_live(ledger.get(id).unwrap()).is_ok());

        ledger.soft_delete(id).unwrap();
        assert_eq!(
            ensure_party_live(ledger.get(id).unwrap()),
            Err(RentalError::PartyDeleted(id))
        );
    }

    #[test]
    fn test_credit_limit() {
        let mut ledger = PartyLedger::new();
        let id = ledger
            .create(NewParty::client("Acme").with_credit_limit(dec!(1000)))
            .unwrap()
            .id;
        ledger.adjust_balance(id, dec!(400)).unwrap();
        let party = ledger.get(id).unwrap();

        assert!(ensure_credit(party, dec!(600)).is_ok());
        assert_eq!(
            ensure_credit(party, dec!(600.01)),
            Err(RentalError::CreditLimitExceeded {
                party_id: id,
                limit: dec!(1000),
                balance: dec!(400),
                requested: dec!(600.01),
            })
        );
        assert!(ensure_credit(party, dec!(-5000)).is_ok());
    }

    #[test]
    fn test_item_checks() {
        let mut registry = InventoryRegistry::new();
        let id = registry.create(NewItem::new("Crane", dec!(900))).unwrap().id;
        assert!(ensure_item_bookable(registry.get(id).unwrap(), false).is_ok());

        registry.set_status(id, ItemStatus::Rented).unwrap();
        assert_eq!(
            ensure_item_bookable(registry.get(id).unwrap(), false),
            Err(RentalError::ItemUnavailable {
                item_id: id,
                status: ItemStatus::Rented,
            })
        );
        assert!(ensure_item_bookable(registry.get(id).unwrap(), true).is_ok());

        let holder = BookingId::new();
        assert_eq!(
            ensure_status_settable(registry.get(id).unwrap(), ItemStatus::Maintenance, Some(holder)),
            Err(RentalError::ItemInUse {
                item_id: id,
                booking_id: holder,
            })
        );
        assert_eq!(
            ensure_status_settable(registry.get(id).unwrap(), ItemStatus::Rented, None),
            Err(RentalError::RentedStatusNotSettable)
        );

        registry.delete(id).unwrap();
        assert_eq!(
            ensure_item_bookable(registry.get(id).unwrap(), true),
            Err(RentalError::ItemDeleted(id))
        );
    }

    #[test]
    fn test_dropped_items() {
        let a = ItemId::new();
        let b = ItemId::new();
        let c = ItemId::new();
        assert_eq!(dropped_items(&[a, b, c], &[b]), vec![a, c]);
        assert!(dropped_items(&[a], &[a, b]).is_empty());
    }
}
