use chrono::NaiveDate;
use tracing::{debug, info};

use crate::model::*;
use crate::observability;

use super::archive::{is_expired, partition_expired};
use super::conflict::today_utc;
use super::{BookingStore, StateGuard, StoreError};

impl BookingStore {
    /// Active bookings, after archiving anything expired as of today (UTC).
    pub async fn list_active(&self) -> Result<Vec<Booking>, StoreError> {
        self.list_active_at(today_utc()).await
    }

    /// Active bookings after sweeping with an explicit `today`.
    pub async fn list_active_at(&self, today: NaiveDate) -> Result<Vec<Booking>, StoreError> {
        let (guard, _) = self.sweep_locked(self.lock().await, today).await?;
        Ok(guard.bookings.clone())
    }

    /// Archived bookings. Never sweeps.
    pub async fn list_past(&self) -> Vec<Booking> {
        self.state.read().await.past.clone()
    }

    /// Move expired active bookings into the archive. Returns how many moved.
    pub async fn sweep(&self, today: NaiveDate) -> Result<usize, StoreError> {
        let (_, moved) = self.sweep_locked(self.lock().await, today).await?;
        Ok(moved)
    }

    /// Active bookings a sweep at `today` would archive, in order.
    pub async fn collect_expired(&self, today: NaiveDate) -> Vec<Booking> {
        let cutoff = self.options.archive_cutoff.cutoff_key(today);
        self.state
            .read()
            .await
            .bookings
            .iter()
            .filter(|b| is_expired(b, &cutoff))
            .cloned()
            .collect()
    }

    async fn sweep_locked(&self, guard: StateGuard, today: NaiveDate) -> Result<(StateGuard, usize), StoreError> {
        let cutoff = self.options.archive_cutoff.cutoff_key(today);
        if !guard.bookings.iter().any(|b| is_expired(b, &cutoff)) {
            debug!("sweep at {today}: nothing before {cutoff}");
            return Ok((guard, 0));
        }

        let mut next = guard.clone();
        let (still_active, expired) = partition_expired(std::mem::take(&mut next.bookings), &cutoff);
        let moved = expired.len();
        next.bookings = still_active;
        next.past.extend(expired);
        let guard = self.commit(guard, next).await?;

        info!("archived {moved} bookings dated before {cutoff}");
        metrics::counter!(observability::BOOKINGS_ARCHIVED_TOTAL).increment(moved as u64);
        Ok((guard, moved))
    }
}
