use tracing::{info, warn};
use ulid::Ulid;

use crate::model::*;
use crate::observability;

use super::conflict::check_no_conflict;
use super::{BookingStore, ConflictPolicy, Locator, StateGuard, StoreError};

impl BookingStore {
    /// Append a new active booking and return it with its assigned id.
    pub async fn create(&self, candidate: NewBooking) -> Result<Booking, StoreError> {
        let guard = self.lock().await;

        if self.options.conflict_policy == ConflictPolicy::Reject {
            if let Err(e) = check_no_conflict(&guard.bookings, &candidate) {
                warn!(
                    office = %candidate.office,
                    room = %candidate.room,
                    date = %candidate.date,
                    "rejected booking {}-{}: {e}",
                    candidate.start_time,
                    candidate.end_time
                );
                metrics::counter!(observability::CONFLICTS_TOTAL).increment(1);
                return Err(e);
            }
        }

        let booking = Booking::from_new(Ulid::new(), candidate);
        let mut next = guard.clone();
        next.bookings.push(booking.clone());
        self.commit(guard, next).await?;

        info!(
            id = %booking.id,
            office = %booking.office,
            room = %booking.room,
            date = %booking.date,
            "booked {}-{}",
            booking.start_time,
            booking.end_time
        );
        metrics::counter!(observability::BOOKINGS_CREATED_TOTAL).increment(1);
        Ok(booking)
    }

    /// Remove the booking at `index`, shifting later entries down.
    pub async fn delete(&self, collection: Collection, index: usize) -> Result<Booking, StoreError> {
        let guard = self.lock().await;
        if index >= guard.collection(collection).len() {
            return Err(StoreError::NotFound {
                collection,
                locator: Locator::Index(index),
            });
        }
        self.remove_at(guard, collection, index).await
    }

    /// Remove the booking with `id` from `collection`.
    pub async fn delete_by_id(&self, collection: Collection, id: Ulid) -> Result<Booking, StoreError> {
        let guard = self.lock().await;
        let index = guard
            .collection(collection)
            .iter()
            .position(|b| b.id == id)
            .ok_or(StoreError::NotFound {
                collection,
                locator: Locator::Id(id),
            })?;
        self.remove_at(guard, collection, index).await
    }

    async fn remove_at(
        &self,
        guard: StateGuard,
        collection: Collection,
        index: usize,
    ) -> Result<Booking, StoreError> {
        let mut next = guard.clone();
        let removed = next.collection_mut(collection).remove(index);
        self.commit(guard, next).await?;

        info!(id = %removed.id, "deleted {collection} booking at index {index}");
        metrics::counter!(observability::BOOKINGS_DELETED_TOTAL, "collection" => collection.label())
            .increment(1);
        Ok(removed)
    }

    /// Empty the archive. Returns how many bookings were dropped.
    pub async fn clear_archive(&self) -> Result<usize, StoreError> {
        let guard = self.lock().await;
        let cleared = guard.past.len();
        if cleared > 0 {
            let mut next = guard.clone();
            next.past.clear();
            self.commit(guard, next).await?;
        }
        info!("cleared {cleared} archived bookings");
        metrics::counter!(observability::ARCHIVE_CLEARS_TOTAL).increment(1);
        Ok(cleared)
    }
}
