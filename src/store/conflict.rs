use chrono::NaiveDate;

use crate::model::{Booking, NewBooking};

use super::StoreError;

/// Whether `create` rejects bookings that overlap an active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Overlapping bookings on the same office, room and date are refused.
    #[default]
    Reject,
    /// Every well-formed booking is appended.
    Allow,
}

/// Today's calendar date in UTC; the reference point for archival.
pub fn today_utc() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

/// Check the candidate against the active bookings only.
pub(crate) fn check_no_conflict(active: &[Booking], candidate: &NewBooking) -> Result<(), StoreError> {
    let wanted = candidate.time_range();
    match active
        .iter()
        .find(|b| b.same_slot_day(candidate) && b.time_range().overlaps(&wanted))
    {
        Some(existing) => Err(StoreError::Conflict(existing.id)),
        None => Ok(()),
    }
}
