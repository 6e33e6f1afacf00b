//! Customer account statements.

use chrono::NaiveDate;
use rentdesk_shared::types::{BookingId, LedgerEntryId, PartyId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RentalResult;
use crate::ledger::balance::{PartyBalance, RunningBalance, checked_add};
use crate::ledger::entry::{Direction, EntryKind, LedgerEntry, PaymentMethod};

/// One line of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    /// The ledger entry.
    pub entry_id: LedgerEntryId,
    /// Business date.
    pub date: NaiveDate,
    /// Invoice, payment or refund.
    pub kind: EntryKind,
    /// Description.
    pub description: String,
    /// Related booking.
    pub booking_id: Option<BookingId>,
    /// Payment method.
    pub method: Option<PaymentMethod>,
    /// Debit column.
    pub debit: Decimal,
    /// Credit column.
    pub credit: Decimal,
    /// Balance after this line.
    pub balance: Decimal,
}

/// A party's account activity over an optional date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// The party.
    pub party_id: PartyId,
    /// First day included, if bounded.
    pub from: Option<NaiveDate>,
    /// Last day included, if bounded.
    pub to: Option<NaiveDate>,
    /// Balance carried from entries before `from`.
    pub opening_balance: Decimal,
    /// Lines in date order.
    pub lines: Vec<StatementLine>,
    /// Sum of the debit column.
    pub total_debit: Decimal,
    /// Sum of the credit column.
    pub total_credit: Decimal,
    /// Balance after the last line.
    pub closing_balance: Decimal,
}

impl Statement {
    /// Builds a statement from a party's entries, already in date order.
    ///
    /// Entries dated after `to` are left out entirely.
    pub fn build(
        party_id: PartyId,
        entries: &[LedgerEntry],
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RentalResult<Self> {
        let mut opening = PartyBalance::new(party_id);
        let mut period = PartyBalance::new(party_id);
        let mut running: Option<RunningBalance> = None;
        let mut lines = Vec::new();

        for entry in entries.iter().filter(|entry| entry.party_id == party_id) {
            if from.is_some_and(|from| entry.date < from) {
                opening.add_entry(entry)?;
                continue;
            }
            if to.is_some_and(|to| entry.date > to) {
                continue;
            }
            period.add_entry(entry)?;
            let next = match &running {
                Some(previous) => RunningBalance::next_entry(previous, entry.signed_amount())?,
                None => RunningBalance::opening(opening.balance, entry.signed_amount())?,
            };
            let (debit, credit) = match entry.direction {
                Direction::Debit => (entry.amount, Decimal::ZERO),
                Direction::Credit => (Decimal::ZERO, entry.amount),
            };
            lines.push(StatementLine {
                entry_id: entry.id,
                date: entry.date,
                kind: entry.kind,
                description: entry.description.clone(),
                booking_id: entry.booking_id,
                method: entry.method,
                debit,
                credit,
                balance: next.current_balance,
            });
            running = Some(next);
        }

        Ok(Self {
            party_id,
            from,
            to,
            opening_balance: opening.balance,
            lines,
            total_debit: period.debit_total,
            total_credit: period.credit_total,
            closing_balance: checked_add(opening.balance, period.balance)?,
        })
    }
}
