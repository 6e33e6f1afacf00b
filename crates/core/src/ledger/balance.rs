//! Party balance calculations.

use rentdesk_shared::types::PartyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RentalError, RentalResult};
use crate::ledger::entry::{Direction, LedgerEntry};

/// Largest amount accepted for a rate, limit or single ledger entry (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Rejects amounts above [`MAX_AMOUNT`].
pub fn ensure_within_max(amount: Decimal) -> RentalResult<()> {
    if amount > MAX_AMOUNT {
        return Err(RentalError::AmountTooLarge {
            amount,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

/// `a + b`, failing instead of panicking when the result leaves the decimal range.
pub fn checked_add(a: Decimal, b: Decimal) -> RentalResult<Decimal> {
    a.checked_add(b).ok_or(RentalError::AmountOverflow)
}

/// `a - b`, failing instead of panicking when the result leaves the decimal range.
pub fn checked_sub(a: Decimal, b: Decimal) -> RentalResult<Decimal> {
    a.checked_sub(b).ok_or(RentalError::AmountOverflow)
}

/// Sums amounts, failing on overflow.
pub fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> RentalResult<Decimal> {
    amounts.into_iter().try_fold(Decimal::ZERO, checked_add)
}

/// Debit and credit totals of a party over some set of entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyBalance {
    /// The party.
    pub party_id: PartyId,
    /// Total debit amount.
    pub debit_total: Decimal,
    /// Total credit amount.
    pub credit_total: Decimal,
    /// Net balance (debits minus credits).
    pub balance: Decimal,
}

impl PartyBalance {
    /// Creates a zero balance.
    #[must_use]
    pub const fn new(party_id: PartyId) -> Self {
        Self {
            party_id,
            debit_total: Decimal::ZERO,
            credit_total: Decimal::ZERO,
            balance: Decimal::ZERO,
        }
    }

    /// Adds a debit amount.
    pub fn add_debit(&mut self, amount: Decimal) -> RentalResult<()> {
        self.debit_total = checked_add(self.debit_total, amount)?;
        self.balance = checked_sub(self.debit_total, self.credit_total)?;
        Ok(())
    }

    /// Adds a credit amount.
    pub fn add_credit(&mut self, amount: Decimal) -> RentalResult<()> {
        self.credit_total = checked_add(self.credit_total, amount)?;
        self.balance = checked_sub(self.debit_total, self.credit_total)?;
        Ok(())
    }

    /// Adds an entry on the side its direction names.
    pub fn add_entry(&mut self, entry: &LedgerEntry) -> RentalResult<()> {
        match entry.direction {
            Direction::Debit => self.add_debit(entry.amount),
            Direction::Credit => self.add_credit(entry.amount),
        }
    }
}

/// Balance before and after one statement line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before this entry.
    pub previous_balance: Decimal,
    /// Balance after this entry.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Starts a chain from an opening balance.
    pub fn opening(balance: Decimal, balance_change: Decimal) -> RentalResult<Self> {
        Ok(Self {
            previous_balance: balance,
            current_balance: checked_add(balance, balance_change)?,
        })
    }

    /// Continues a chain from the previous line.
    pub fn next_entry(previous: &Self, balance_change: Decimal) -> RentalResult<Self> {
        Ok(Self {
            previous_balance: previous.current_balance,
            current_balance: checked_add(previous.current_balance, balance_change)?,
        })
    }
}
