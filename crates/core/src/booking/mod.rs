//! Booking engine and its supporting rules.
//!
//! This module implements the orchestration side of rentals:
//! - Booking types and the status state machine
//! - Pricing (day counts, rate snapshots)
//! - Preconditions shared with the database repository
//! - The in-memory engine that keeps inventory, ledger and balances in step
//! - The selection cart used to stage a booking

pub mod cart;
pub mod engine;
pub mod pricing;
pub mod rules;
pub mod types;
pub mod workflow;

#[cfg(test)]
mod engine_props;

pub use cart::{BookingCart, CartItem};
pub use engine::BookingEngine;
pub use pricing::{collapse_ids, price_line, rental_days, total_of};
pub use types::{
    Booking, BookingAction, BookingFilter, BookingLine, BookingRequest, BookingStatus,
    RevenueSummary,
};
pub use workflow::BookingWorkflow;
