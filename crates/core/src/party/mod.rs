//! Party ledger: customers and suppliers with their running balance.

pub mod registry;
pub mod types;

pub use registry::PartyLedger;
pub use types::{NewParty, Party, PartyFilter, PartyKind, PartyPatch, PartyStatus};
