use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::store::{today_utc, BookingStore};

/// Background task that periodically archives expired bookings, so the
/// archive stays current even when nobody lists the active bookings.
pub async fn run_reaper(store: Arc<BookingStore>, every: Duration) {
    let mut interval = tokio::time::interval(every);
    loop {
        interval.tick().await;
        let today = today_utc();
        let due = store.collect_expired(today).await;
        if due.is_empty() {
            continue;
        }
        for booking in &due {
            debug!(id = %booking.id, date = %booking.date, "due for archive");
        }
        match store.sweep(today).await {
            Ok(0) => {}
            Ok(moved) => info!("reaper archived {moved} bookings"),
            Err(e) => tracing::error!("reaper sweep failed: {e}"),
        }
    }
}
