//! Core rental business logic for RentDesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and the booking/ledger consistency
//! rules live here.
//!
//! # Modules
//!
//! - `inventory` - Rentable items and their availability
//! - `party` - Customers, suppliers and their running balances
//! - `ledger` - Invoices, payments, refunds, statements and reconciliation
//! - `booking` - Booking engine, state machine, pricing and the selection cart
//! - `settings` - Catalog presets that configure the rental domain
//! - `user` - Operator accounts and sign-in

pub mod booking;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod party;
pub mod settings;
pub mod state;
pub mod user;

pub use error::{ErrorKind, RentalError, RentalResult};
pub use state::RentalState;
