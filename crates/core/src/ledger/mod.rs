//! Transaction log and balance bookkeeping.
//!
//! This module implements the financial side of rentals:
//! - Ledger entries (invoices, payments, refunds) as `{amount, direction}`
//! - The transaction log with date-ordered listings
//! - Running balances and customer statements
//! - Reconciliation of stored balances against the log

pub mod balance;
pub mod entry;
pub mod log;
pub mod reconcile;
pub mod statement;

pub use balance::{
    MAX_AMOUNT, PartyBalance, RunningBalance, checked_add, checked_sub, checked_sum,
    ensure_within_max,
};
pub use entry::{Direction, EntryKind, LedgerEntry, PaymentMethod, PaymentRequest, RefundRequest};
pub use log::TransactionLog;
pub use reconcile::{BalanceMismatch, ReconciliationReport, reconcile};
pub use statement::{Statement, StatementLine};
