//! In-memory party ledger.

use std::collections::BTreeMap;

use chrono::Utc;
use rentdesk_shared::types::PartyId;
use rust_decimal::Decimal;

use crate::error::{RentalError, RentalResult};
use crate::ledger::balance::checked_add;
use crate::party::types::{NewParty, Party, PartyFilter, PartyPatch};

/// Holds customers and suppliers with their cached balances.
///
/// `adjust_balance` is plain arithmetic. Pairing it with the matching ledger
/// entry is the caller's job.
#[derive(Debug, Clone, Default)]
pub struct PartyLedger {
    parties: BTreeMap<PartyId, Party>,
}

impl PartyLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a party, including soft-deleted ones.
    pub fn get(&self, id: PartyId) -> RentalResult<&Party> {
        self.parties.get(&id).ok_or(RentalError::PartyNotFound(id))
    }

    /// Lists parties matching the filter.
    #[must_use]
    pub fn list(&self, filter: &PartyFilter) -> Vec<Party> {
        self.parties
            .values()
            .filter(|party| filter.matches(party))
            .cloned()
            .collect()
    }

    /// Registers a new party with a zero balance.
    pub fn create(&mut self, input: NewParty) -> RentalResult<Party> {
        let party = input.into_party()?;
        self.parties.insert(party.id, party.clone());
        Ok(party)
    }

    /// Inserts a party as-is. Used when loading persisted state.
    pub fn insert(&mut self, party: Party) {
        self.parties.insert(party.id, party);
    }

    /// Applies a patch to a live party.
    pub fn update(&mut self, id: PartyId, patch: PartyPatch) -> RentalResult<Party> {
        let party = self.parties.get_mut(&id).ok_or(RentalError::PartyNotFound(id))?;
        if party.is_deleted() {
            return Err(RentalError::PartyDeleted(id));
        }
        patch.apply(party)?;
        party.updated_at = Utc::now();
        Ok(party.clone())
    }

    /// Soft-deletes a party. Its bookings and ledger history stay.
    pub fn soft_delete(&mut self, id: PartyId) -> RentalResult<()> {
        let party = self.parties.get_mut(&id).ok_or(RentalError::PartyNotFound(id))?;
        if party.deleted_at.is_none() {
            let now = Utc::now();
            party.deleted_at = Some(now);
            party.updated_at = now;
        }
        Ok(())
    }

    /// Adds `delta` to the party's balance and returns the new balance.
    pub fn adjust_balance(&mut self, id: PartyId, delta: Decimal) -> RentalResult<Decimal> {
        let party = self.parties.get_mut(&id).ok_or(RentalError::PartyNotFound(id))?;
        party.balance = checked_add(party.balance, delta)?;
        party.updated_at = Utc::now();
        Ok(party.balance)
    }

    /// Iterates over all parties, including deleted ones.
    pub fn iter(&self) -> impl Iterator<Item = &Party> {
        self.parties.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::party::types::{PartyKind, PartyStatus};
    use rust_decimal_macros::dec;

    #[test]
    fn test_create_starts_at_zero_balance() {
        let mut ledger = PartyLedger::new();
        let party = ledger.create(NewParty::client("  Acme Builders ")).unwrap();
        assert_eq!(party.name, "Acme Builders");
        assert_eq!(party.balance, Decimal::ZERO);
        assert_eq!(party.kind, PartyKind::Client);
        assert_eq!(party.status, PartyStatus::Active);
    }

    #[test]
    fn test_create_validates() {
        let mut ledger = PartyLedger::new();
        assert_eq!(
            ledger.create(NewParty::client("")),
            Err(RentalError::MissingField("name"))
        );
        assert_eq!(
            ledger.create(NewParty::client("Acme").with_credit_limit(dec!(-1))),
            Err(RentalError::NegativeCreditLimit(dec!(-1)))
        );
    }

    #[test]
    fn test_adjust_balance_accumulates() {
        let mut ledger = PartyLedger::new();
        let id = ledger.create(NewParty::client("Acme")).unwrap().id;

        assert_eq!(ledger.adjust_balance(id, dec!(600)).unwrap(), dec!(600));
        assert_eq!(ledger.adjust_balance(id, dec!(-250.50)).unwrap(), dec!(349.50));
        assert_eq!(ledger.get(id).unwrap().balance, dec!(349.50));
    }

    #[test]
    fn test_adjust_unknown_party_fails() {
        let mut ledger = PartyLedger::new();
        let id = PartyId::new();
        assert_eq!(
            ledger.adjust_balance(id, dec!(1)),
            Err(RentalError::PartyNotFound(id))
        );
    }

    #[test]
    fn test_update_keeps_balance() {
        let mut ledger = PartyLedger::new();
        let id = ledger.create(NewParty::client("Acme")).unwrap().id;
        ledger.adjust_balance(id, dec!(75)).unwrap();

        let updated = ledger
            .update(
                id,
                PartyPatch {
                    status: Some(PartyStatus::Blacklisted),
                    phone: Some("0500000000".to_string()),
                    ..PartyPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.balance, dec!(75));
        assert_eq!(updated.status, PartyStatus::Blacklisted);
        assert_eq!(updated.phone, "0500000000");
    }

    #[test]
    fn test_soft_delete_hides_but_keeps_record() {
        let mut ledger = PartyLedger::new();
        let id = ledger.create(NewParty::client("Acme")).unwrap().id;
        ledger.soft_delete(id).unwrap();

        assert!(ledger.list(&PartyFilter::default()).is_empty());
        assert!(ledger.get(id).unwrap().is_deleted());
        assert_eq!(
            ledger.update(id, PartyPatch::default()),
            Err(RentalError::PartyDeleted(id))
        );
    }
}
