//! Booking pricing: day counts and line totals.

use chrono::NaiveDate;
use rentdesk_shared::types::ItemId;
use rust_decimal::Decimal;

use crate::booking::types::BookingLine;
use crate::error::{RentalError, RentalResult};
use crate::inventory::types::InventoryItem;
use crate::ledger::balance::checked_sum;

/// Number of billable days between two dates, never less than one.
///
/// A same-day rental is one day; `2024-01-01..2024-01-03` is two.
pub fn rental_days(start: NaiveDate, end: NaiveDate) -> RentalResult<u32> {
    if end < start {
        return Err(RentalError::InvalidDateRange { start, end });
    }
    let days = (end - start).num_days().max(1);
    Ok(u32::try_from(days).unwrap_or(u32::MAX))
}

/// Removes repeated ids, keeping first occurrences in order.
#[must_use]
pub fn collapse_ids(ids: &[ItemId]) -> Vec<ItemId> {
    let mut unique = Vec::with_capacity(ids.len());
    for id in ids {
        if !unique.contains(id) {
            unique.push(*id);
        }
    }
    unique
}

/// Prices one item for a number of days at its current rate.
pub fn price_line(item: &InventoryItem, days: u32) -> RentalResult<BookingLine> {
    let line_total = item
        .daily_rate
        .checked_mul(Decimal::from(days))
        .ok_or(RentalError::AmountOverflow)?;
    Ok(BookingLine {
        item_id: item.id,
        item_name: item.name.clone(),
        daily_rate: item.daily_rate,
        days,
        line_total,
    })
}

/// Sum of line totals.
pub fn total_of(lines: &[BookingLine]) -> RentalResult<Decimal> {
    checked_sum(lines.iter().map(|line| line.line_total))
}
