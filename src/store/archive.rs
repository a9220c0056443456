use chrono::{Datelike, Days, NaiveDate};

use crate::model::Booking;

/// Rule deciding when an active booking has expired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveCutoff {
    /// Expired once its date is before today.
    #[default]
    Daily,
    /// Expired once its date is before the Monday starting the current week.
    Weekly,
}

impl ArchiveCutoff {
    /// First date that is still active.
    pub fn cutoff_date(self, today: NaiveDate) -> NaiveDate {
        match self {
            ArchiveCutoff::Daily => today,
            ArchiveCutoff::Weekly => {
                let since_monday = today.weekday().num_days_from_monday() as u64;
                today - Days::new(since_monday)
            }
        }
    }

    /// Cutoff as the `YYYY-MM-DD` string booking dates are compared against.
    pub fn cutoff_key(self, today: NaiveDate) -> String {
        self.cutoff_date(today).format("%Y-%m-%d").to_string()
    }
}

pub fn is_expired(booking: &Booking, cutoff: &str) -> bool {
    booking.date.as_str() < cutoff
}

/// Stable partition into `(still_active, expired)`. Both halves keep input order.
pub fn partition_expired(bookings: Vec<Booking>, cutoff: &str) -> (Vec<Booking>, Vec<Booking>) {
    bookings.into_iter().partition(|b| !is_expired(b, cutoff))
}
