//! Balance reconciliation between stored balances and the transaction log.

use std::collections::HashMap;

use rentdesk_shared::types::PartyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::RentalResult;
use crate::ledger::balance::{checked_add, checked_sub};
use crate::ledger::entry::LedgerEntry;
use crate::party::types::Party;

/// A party whose stored balance disagrees with its entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceMismatch {
    /// The party.
    pub party_id: PartyId,
    /// Party name.
    pub party_name: String,
    /// Balance stored on the party.
    pub stored: Decimal,
    /// Balance recomputed from the log.
    pub computed: Decimal,
    /// `stored - computed`.
    pub difference: Decimal,
}

/// Outcome of checking every party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    /// Number of parties checked (deleted ones included).
    pub checked: usize,
    /// Parties whose balance is off.
    pub mismatches: Vec<BalanceMismatch>,
}

impl ReconciliationReport {
    /// Returns true when every balance matches its entries.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Compares each party's stored balance with the sum of its entries.
pub fn reconcile<'a>(
    parties: impl IntoIterator<Item = &'a Party>,
    entries: &[LedgerEntry],
) -> RentalResult<ReconciliationReport> {
    let mut computed: HashMap<PartyId, Decimal> = HashMap::new();
    for entry in entries {
        let total = computed.entry(entry.party_id).or_default();
        *total = checked_add(*total, entry.signed_amount())?;
    }

    let mut checked = 0;
    let mut mismatches = Vec::new();
    for party in parties {
        checked += 1;
        let expected = computed.get(&party.id).copied().unwrap_or_default();
        if party.balance != expected {
            mismatches.push(BalanceMismatch {
                party_id: party.id,
                party_name: party.name.clone(),
                stored: party.balance,
                computed: expected,
                difference: checked_sub(party.balance, expected)?,
            });
        }
    }

    Ok(ReconciliationReport {
        checked,
        mismatches,
    })
}
