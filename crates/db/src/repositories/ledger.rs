//! Ledger operations of the rental repository.

use chrono::NaiveDate;
use rentdesk_core::booking::rules;
use rentdesk_core::ledger::{
    EntryKind, LedgerEntry, PaymentRequest, ReconciliationReport, RefundRequest, Statement,
    checked_sum, reconcile,
};
use rentdesk_core::party::PartyFilter;
use rentdesk_core::RentalError;
use rentdesk_shared::types::{BookingId, LedgerEntryId, PartyId};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, Condition, TransactionTrait};
use tracing::{info, warn};

use super::store::{booking_exists, load_booking, load_entries, load_entry, load_party, post, unpost};
use super::{RentalRepository, RepositoryResult, non_blank, today};
use crate::entities::ledger_entries;

fn party_condition(party_id: PartyId) -> Condition {
    Condition::all().add(ledger_entries::Column::PartyId.eq(party_id.into_inner()))
}

impl RentalRepository {
    /// Records a payment and lowers the party's balance by its amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the party is missing or deleted, the amount is not
    /// positive, or the database operation fails.
    pub async fn add_payment(
        &self,
        party_id: PartyId,
        request: PaymentRequest,
    ) -> RepositoryResult<LedgerEntry> {
        let txn = self.db.begin().await?;

        rules::ensure_party_live(&load_party(&txn, party_id, true).await?)?;
        let description =
            non_blank(request.description).unwrap_or_else(|| "Payment on account".to_string());
        let entry = LedgerEntry::new(
            party_id,
            EntryKind::Payment,
            request.amount,
            request.date.unwrap_or_else(today),
            description,
        )?
        .with_method(request.method);
        let entry = post(&txn, entry).await?;

        txn.commit().await?;
        info!(entry_id = %entry.id, party_id = %party_id, amount = %entry.amount, "Payment recorded");
        Ok(entry)
    }

    /// Records a refund and lowers the party's balance by its amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the party is missing or deleted, the referenced
    /// booking is missing, the amount is not positive, or the database
    /// operation fails.
    pub async fn add_refund(
        &self,
        party_id: PartyId,
        request: RefundRequest,
    ) -> RepositoryResult<LedgerEntry> {
        let txn = self.db.begin().await?;

        rules::ensure_party_live(&load_party(&txn, party_id, true).await?)?;
        if let Some(booking_id) = request.booking_id {
            rules::ensure_refund_matches(&load_booking(&txn, booking_id, false).await?, party_id)?;
        }
        let description = non_blank(request.description).unwrap_or_else(|| "Refund".to_string());
        let mut entry = LedgerEntry::new(
            party_id,
            EntryKind::Refund,
            request.amount,
            request.date.unwrap_or_else(today),
            description,
        )?;
        if let Some(booking_id) = request.booking_id {
            entry = entry.with_booking(booking_id);
        }
        let entry = post(&txn, entry).await?;

        txn.commit().await?;
        info!(entry_id = %entry.id, party_id = %party_id, amount = %entry.amount, "Refund recorded");
        Ok(entry)
    }

    /// Deletes an entry and reverses its balance effect.
    ///
    /// A booking's invoice goes only with its booking.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry is missing, it is the invoice of an
    /// existing booking, or the database operation fails.
    pub async fn delete_entry(&self, id: LedgerEntryId) -> RepositoryResult<LedgerEntry> {
        let txn = self.db.begin().await?;

        let entry = load_entry(&txn, id).await?;
        if entry.kind == EntryKind::Invoice {
            if let Some(booking_id) = entry.booking_id {
                if booking_exists(&txn, booking_id).await? {
                    return Err(RentalError::InvoiceLocked {
                        entry_id: id,
                        booking_id,
                    }
                    .into());
                }
            }
        }
        unpost(&txn, &entry).await?;

        txn.commit().await?;
        info!(entry_id = %id, party_id = %entry.party_id, "Ledger entry deleted");
        Ok(entry)
    }

    /// A party's entries by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the party is missing or the query fails.
    pub async fn entries_for_party(&self, party_id: PartyId) -> RepositoryResult<Vec<LedgerEntry>> {
        load_party(&self.db, party_id, false).await?;
        load_entries(&self.db, party_condition(party_id)).await
    }

    /// A booking's entries by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking is missing or the query fails.
    pub async fn entries_for_booking(
        &self,
        booking_id: BookingId,
    ) -> RepositoryResult<Vec<LedgerEntry>> {
        if !booking_exists(&self.db, booking_id).await? {
            return Err(RentalError::BookingNotFound(booking_id).into());
        }
        let condition =
            Condition::all().add(ledger_entries::Column::BookingId.eq(booking_id.into_inner()));
        load_entries(&self.db, condition).await
    }

    /// Builds a party statement over an optional date range.
    ///
    /// # Errors
    ///
    /// Returns an error if `to` precedes `from`, the party is missing, or the
    /// query fails.
    pub async fn statement(
        &self,
        party_id: PartyId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> RepositoryResult<Statement> {
        if let (Some(start), Some(end)) = (from, to) {
            if end < start {
                return Err(RentalError::InvalidDateRange { start, end }.into());
            }
        }
        let entries = self.entries_for_party(party_id).await?;
        Ok(Statement::build(party_id, &entries, from, to)?)
    }

    /// Sums a party's entries.
    ///
    /// # Errors
    ///
    /// Returns an error if the party is missing or the query fails.
    pub async fn recompute_balance(&self, party_id: PartyId) -> RepositoryResult<Decimal> {
        let entries = self.entries_for_party(party_id).await?;
        Ok(checked_sum(entries.iter().map(LedgerEntry::signed_amount))?)
    }

    /// Compares every stored balance, deleted parties included, with the log.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn verify_balances(&self) -> RepositoryResult<ReconciliationReport> {
        let filter = PartyFilter {
            include_deleted: true,
            ..PartyFilter::default()
        };
        let parties = self.list_parties(&filter).await?;
        let entries = load_entries(&self.db, Condition::all()).await?;

        let report = reconcile(&parties, &entries)?;
        if !report.is_consistent() {
            warn!(
                mismatches = report.mismatches.len(),
                checked = report.checked,
                "Stored balances disagree with the ledger"
            );
        }
        Ok(report)
    }
}
