//! Booking state machine.

use crate::booking::types::{BookingAction, BookingStatus};
use crate::error::{RentalError, RentalResult};

/// Stateless service for booking status transitions.
///
/// | From \ action | edit | activate | return | cancel |
/// |---|---|---|---|---|
/// | Pending | Pending | Active | ✗ | Cancelled |
/// | Active | Active | ✗ | Completed | Cancelled |
/// | Completed | ✗ | ✗ | Completed | ✗ |
/// | Cancelled | ✗ | ✗ | ✗ | ✗ |
///
/// Delete is allowed from every status and has no target status.
pub struct BookingWorkflow;

impl BookingWorkflow {
    /// Returns the status a booking ends up in after `action`.
    ///
    /// # Errors
    ///
    /// Returns `RentalError::InvalidTransition` if the action is not allowed
    /// from `from`. `Delete` is always allowed and reports `from` unchanged.
    pub fn next_status(from: BookingStatus, action: BookingAction) -> RentalResult<BookingStatus> {
        use BookingAction as A;
        use BookingStatus as S;

        match (from, action) {
            (S::Pending, A::Edit) => Ok(S::Pending),
            (S::Active, A::Edit) => Ok(S::Active),
            (S::Pending, A::Activate) => Ok(S::Active),
            (S::Active | S::Completed, A::Return) => Ok(S::Completed),
            (S::Pending | S::Active, A::Cancel) => Ok(S::Cancelled),
            (_, A::Delete) => Ok(from),
            _ => Err(RentalError::InvalidTransition { from, action }),
        }
    }

    /// Returns true if `action` is allowed from `from`.
    #[must_use]
    pub fn is_allowed(from: BookingStatus, action: BookingAction) -> bool {
        Self::next_status(from, action).is_ok()
    }
}
