//! Property-based tests for BookingEngine.
//!
//! Random sequences of booking, payment and status operations are replayed
//! against one engine. After every step:
//! - each stored party balance equals the sum of its entries
//! - an item is Rented exactly when an Active booking lists it
//! - booking totals equal the sum of their lines
//!
//! A step that fails must leave the records exactly as they were.

use chrono::{Days, NaiveDate};
use proptest::prelude::*;
use rentdesk_shared::types::{BookingId, ItemId, LedgerEntryId, PartyId};
use rust_decimal::Decimal;

use super::engine::BookingEngine;
use super::types::{Booking, BookingRequest, BookingStatus};
use crate::inventory::{ItemStatus, NewItem};
use crate::ledger::{LedgerEntry, PaymentMethod, PaymentRequest, RefundRequest};
use crate::party::NewParty;
use crate::state::RentalState;

const ITEMS: usize = 5;
const PARTIES: usize = 3;

/// Strategy to generate daily rates (0.00 to 500.00).
fn daily_rate() -> impl Strategy<Value = Decimal> {
    (0i64..50_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate positive amounts (0.01 to 2,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..200_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a non-empty selection of item indexes.
fn selection() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..ITEMS, 1..4)
}

/// Strategy to generate an operator-settable status.
fn settable_status() -> impl Strategy<Value = ItemStatus> {
    prop_oneof![
        Just(ItemStatus::Available),
        Just(ItemStatus::Maintenance),
        Just(ItemStatus::Retired),
    ]
}

#[derive(Debug, Clone)]
enum Op {
    Create {
        party: usize,
        items: Vec<usize>,
        start: u64,
        len: u64,
    },
    Reserve {
        party: usize,
        items: Vec<usize>,
        start: u64,
        len: u64,
    },
    Edit {
        booking: usize,
        party: usize,
        items: Vec<usize>,
        start: u64,
        len: u64,
    },
    Activate(usize),
    Return(usize),
    Cancel(usize),
    Delete(usize),
    Pay {
        party: usize,
        amount: Decimal,
    },
    Refund {
        party: usize,
        amount: Decimal,
    },
    SetStatus {
        item: usize,
        status: ItemStatus,
    },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..PARTIES, selection(), 0u64..30, 0u64..10)
            .prop_map(|(party, items, start, len)| Op::Create { party, items, start, len }),
        1 => (0..PARTIES, selection(), 0u64..30, 0u64..10)
            .prop_map(|(party, items, start, len)| Op::Reserve { party, items, start, len }),
        2 => (any::<usize>(), 0..PARTIES, selection(), 0u64..30, 0u64..10).prop_map(
            |(booking, party, items, start, len)| Op::Edit { booking, party, items, start, len }
        ),
        1 => any::<usize>().prop_map(Op::Activate),
        2 => any::<usize>().prop_map(Op::Return),
        1 => any::<usize>().prop_map(Op::Cancel),
        1 => any::<usize>().prop_map(Op::Delete),
        2 => (0..PARTIES, positive_amount()).prop_map(|(party, amount)| Op::Pay { party, amount }),
        1 => (0..PARTIES, positive_amount()).prop_map(|(party, amount)| Op::Refund { party, amount }),
        1 => (0..ITEMS, settable_status()).prop_map(|(item, status)| Op::SetStatus { item, status }),
    ]
}

struct World {
    engine: BookingEngine,
    items: Vec<ItemId>,
    parties: Vec<PartyId>,
    bookings: Vec<BookingId>,
}

impl World {
    fn new(rates: &[Decimal], credit_limit: Decimal) -> Self {
        let engine = BookingEngine::new();
        let items = rates
            .iter()
            .enumerate()
            .map(|(i, rate)| {
                engine
                    .create_item(NewItem::new(format!("Item {i}"), *rate))
                    .unwrap()
                    .id
            })
            .collect();
        let parties = (0..PARTIES)
            .map(|i| {
                let mut input = NewParty::client(format!("Party {i}"));
                // The last party has a credit limit so rejections get exercised.
                if i == PARTIES - 1 {
                    input = input.with_credit_limit(credit_limit);
                }
                engine.create_party(input).unwrap().id
            })
            .collect();
        Self {
            engine,
            items,
            parties,
            bookings: Vec::new(),
        }
    }

    fn request(&self, party: usize, items: &[usize], start: u64, len: u64) -> BookingRequest {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let start_date = base.checked_add_days(Days::new(start)).unwrap();
        BookingRequest {
            party_id: self.parties[party],
            item_ids: items.iter().map(|i| self.items[*i]).collect(),
            start_date,
            end_date: start_date.checked_add_days(Days::new(len)).unwrap(),
            notes: None,
        }
    }

    fn booking(&self, index: usize) -> Option<BookingId> {
        if self.bookings.is_empty() {
            None
        } else {
            Some(self.bookings[index % self.bookings.len()])
        }
    }

    /// Applies one operation. Errors are expected and returned, not raised.
    fn apply(&mut self, op: &Op) -> Result<(), crate::RentalError> {
        match op {
            Op::Create {
                party,
                items,
                start,
                len,
            } => {
                let booking = self
                    .engine
                    .create_booking(self.request(*party, items, *start, *len))?;
                self.bookings.push(booking.id);
            }
            Op::Reserve {
                party,
                items,
                start,
                len,
            } => {
                let booking = self
                    .engine
                    .reserve_booking(self.request(*party, items, *start, *len))?;
                self.bookings.push(booking.id);
            }
            Op::Edit {
                booking,
                party,
                items,
                start,
                len,
            } => {
                if let Some(id) = self.booking(*booking) {
                    self.engine
                        .edit_booking(id, self.request(*party, items, *start, *len))?;
                }
            }
            Op::Activate(booking) => {
                if let Some(id) = self.booking(*booking) {
                    self.engine.activate_booking(id)?;
                }
            }
            Op::Return(booking) => {
                if let Some(id) = self.booking(*booking) {
                    self.engine.return_booking(id)?;
                }
            }
            Op::Cancel(booking) => {
                if let Some(id) = self.booking(*booking) {
                    self.engine.cancel_booking(id)?;
                }
            }
            Op::Delete(booking) => {
                if let Some(id) = self.booking(*booking) {
                    self.engine.delete_booking(id)?;
                    self.bookings.retain(|known| *known != id);
                }
            }
            Op::Pay { party, amount } => {
                self.engine.add_payment(
                    self.parties[*party],
                    PaymentRequest {
                        amount: *amount,
                        method: PaymentMethod::Transfer,
                        date: None,
                        description: None,
                    },
                )?;
            }
            Op::Refund { party, amount } => {
                self.engine.add_refund(
                    self.parties[*party],
                    RefundRequest {
                        amount: *amount,
                        date: None,
                        description: None,
                        booking_id: None,
                    },
                )?;
            }
            Op::SetStatus { item, status } => {
                self.engine.set_item_status(self.items[*item], *status)?;
            }
        }
        Ok(())
    }
}

/// Statuses, balances, bookings and entries, for before/after comparison.
type Fingerprint = (
    Vec<(ItemId, ItemStatus)>,
    Vec<(PartyId, Decimal)>,
    Vec<Booking>,
    Vec<LedgerEntry>,
);

fn fingerprint(state: &RentalState) -> Fingerprint {
    (
        state.inventory.iter().map(|item| (item.id, item.status)).collect(),
        state
            .parties
            .iter()
            .map(|party| (party.id, party.balance))
            .collect(),
        state.bookings.values().cloned().collect(),
        state.log.entries().to_vec(),
    )
}

fn entry_ids(state: &RentalState) -> Vec<LedgerEntryId> {
    state.log.entries().iter().map(|entry| entry.id).collect()
}

fn check_invariants(state: &RentalState) -> Result<(), TestCaseError> {
    let report = state.verify_balances().unwrap();
    prop_assert!(
        report.is_consistent(),
        "balance drift: {:?}",
        report.mismatches
    );

    for item in state.inventory.iter() {
        let held = state
            .bookings
            .values()
            .any(|booking| booking.status == BookingStatus::Active && booking.holds(item.id));
        prop_assert_eq!(
            item.status == ItemStatus::Rented,
            held,
            "item {} is {} but held by an active booking: {}",
            item.id,
            item.status,
            held
        );
    }

    for booking in state.bookings.values() {
        let sum: Decimal = booking.lines.iter().map(|line| line.line_total).sum();
        prop_assert_eq!(booking.total_amount, sum);
    }
    Ok(())
}

fn world_strategy() -> impl Strategy<Value = (Vec<Decimal>, Decimal, Vec<Op>)> {
    (
        prop::collection::vec(daily_rate(), ITEMS),
        positive_amount(),
        prop::collection::vec(op_strategy(), 1..40),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balances, inventory and totals stay consistent after every step, and
    /// failed steps leave the records untouched.
    #[test]
    fn prop_invariants_hold_over_random_operations(
        (rates, limit, ops) in world_strategy(),
    ) {
        let mut world = World::new(&rates, limit);

        for op in &ops {
            let before = world.engine.snapshot().unwrap();
            if world.apply(op).is_err() {
                let after = world.engine.snapshot().unwrap();
                prop_assert_eq!(fingerprint(&before), fingerprint(&after), "failed {:?} left changes", op);
            }
            check_invariants(&world.engine.snapshot().unwrap())?;
        }
    }

    /// Creating a booking and deleting it restores statuses, balances and
    /// the log.
    #[test]
    fn prop_create_then_delete_is_identity(
        (rates, limit, ops) in world_strategy(),
        party in 0..PARTIES,
        items in selection(),
        start in 0u64..30,
        len in 0u64..10,
    ) {
        let mut world = World::new(&rates, limit);
        for op in &ops {
            let _ = world.apply(op);
        }

        let before = world.engine.snapshot().unwrap();
        let request = world.request(party, &items, start, len);
        if let Ok(booking) = world.engine.create_booking(request) {
            world.engine.delete_booking(booking.id).unwrap();
            let after = world.engine.snapshot().unwrap();

            let (statuses, balances, bookings, _) = fingerprint(&before);
            let (statuses_after, balances_after, bookings_after, _) = fingerprint(&after);
            prop_assert_eq!(statuses, statuses_after);
            prop_assert_eq!(balances, balances_after);
            prop_assert_eq!(bookings, bookings_after);
            prop_assert_eq!(entry_ids(&before), entry_ids(&after));
        }
    }

    /// Editing a live booking with its own values changes nothing that matters.
    #[test]
    fn prop_edit_with_same_values_is_no_op(
        (rates, limit, ops) in world_strategy(),
        pick in any::<usize>(),
    ) {
        let mut world = World::new(&rates, limit);
        for op in &ops {
            let _ = world.apply(op);
        }

        let state = world.engine.snapshot().unwrap();
        let live: Vec<&Booking> = state
            .bookings
            .values()
            .filter(|booking| booking.status.is_live())
            .collect();
        prop_assume!(!live.is_empty());
        let booking = live[pick % live.len()].clone();

        let request = BookingRequest {
            party_id: booking.party_id,
            item_ids: booking.item_ids(),
            start_date: booking.start_date,
            end_date: booking.end_date,
            notes: booking.notes.clone(),
        };
        let edited = world.engine.edit_booking(booking.id, request).unwrap();
        let after = world.engine.snapshot().unwrap();

        prop_assert_eq!(&edited.lines, &booking.lines);
        prop_assert_eq!(edited.total_amount, booking.total_amount);
        prop_assert_eq!(edited.status, booking.status);
        let (statuses, balances, _, entries) = fingerprint(&state);
        let (statuses_after, balances_after, _, entries_after) = fingerprint(&after);
        prop_assert_eq!(statuses, statuses_after);
        prop_assert_eq!(balances, balances_after);
        prop_assert_eq!(entries, entries_after);
    }

    /// A party statement always closes at the stored balance.
    #[test]
    fn prop_statement_closes_at_stored_balance(
        (rates, limit, ops) in world_strategy(),
    ) {
        let mut world = World::new(&rates, limit);
        for op in &ops {
            let _ = world.apply(op);
        }

        for party_id in &world.parties {
            let statement = world.engine.statement(*party_id, None, None).unwrap();
            let stored = world.engine.get_party(*party_id).unwrap().balance;
            prop_assert_eq!(statement.closing_balance, stored);
            prop_assert_eq!(
                statement.opening_balance + statement.total_debit - statement.total_credit,
                statement.closing_balance
            );
        }
    }
}
