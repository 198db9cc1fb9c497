//! Per-listing wait-list with priority insertion and promotion.
//!
//! Ordering rules:
//!   - gold/platinum members are inserted at position 1, shifting every
//!     active entry down one; the most recent priority entrant always holds
//!     position 1
//!   - everyone else appends at the tail
//!   - promotion takes the head, retires its entry, and renumbers the rest
//!     back to 1..n
//!
//! All mutations for one listing run under that listing's lock; shift and
//! renumber are single statements in the store. Between them, active
//! positions stay contiguous with no duplicates.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use common::logger::warn_if_slow;
use common::sync::KeyedLocks;
use pricing::Tier;

use crate::error::BookingError;
use crate::model::{Booking, BookingStatus, QueueEntry};
use crate::store::BookingStore;

/// Rough wait communicated to the user on joining.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitEstimate {
    /// Front of the line (position 3 or better).
    Soon,
    /// Linear estimate further back: two hours per position.
    Hours(u32),
}

impl WaitEstimate {
    pub fn for_position(position: u32) -> Self {
        if position <= 3 {
            WaitEstimate::Soon
        } else {
            WaitEstimate::Hours(position * 2)
        }
    }
}

impl fmt::Display for WaitEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitEstimate::Soon => f.write_str("soon"),
            WaitEstimate::Hours(h) => write!(f, "about {h} hours"),
        }
    }
}

/// Result of joining a wait-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueuePlacement {
    pub position: u32,
    pub estimate: WaitEstimate,
}

impl QueuePlacement {
    pub fn at(position: u32) -> Self {
        Self {
            position,
            estimate: WaitEstimate::for_position(position),
        }
    }
}

/// Manages wait-lists and promotes waiters into confirmed bookings.
pub struct QueueManager<S> {
    store: Arc<S>,
    locks: KeyedLocks<Uuid>,
}

impl<S: BookingStore> QueueManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Adds a user to a listing's wait-list and returns their placement.
    ///
    /// Re-joining is idempotent: an existing active entry is returned as-is,
    /// no second entry is created.
    #[instrument(
        skip(self),
        target = "queue",
        fields(listing_id = %listing_id, user_id = %user_id)
    )]
    pub async fn join(
        &self,
        listing_id: Uuid,
        user_id: Uuid,
        member_tier: Option<Tier>,
        now: DateTime<Utc>,
    ) -> Result<QueuePlacement, BookingError> {
        let lock = self.locks.key(&listing_id);
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.queue_entry(listing_id, user_id).await? {
            debug!(
                position = existing.position,
                "repeat join returns the existing placement"
            );
            return Ok(QueuePlacement::at(existing.position));
        }

        let entries = self.store.active_queue(listing_id).await?;
        let priority = member_tier.is_some_and(|t| t.grants_priority());

        let position = if priority {
            if !entries.is_empty() {
                self.store.shift_queue_down(listing_id).await?;
            }
            1
        } else {
            entries.iter().map(|e| e.position).max().unwrap_or(0) + 1
        };

        let entry = QueueEntry {
            listing_id,
            user_id,
            position,
            auto_booked: false,
            auto_booked_at: None,
            joined_at: now,
        };
        self.store.insert_queue_entry(&entry).await?;

        info!(position, priority, "user joined wait-list");
        Ok(QueuePlacement::at(position))
    }

    /// The user's current wait-list position, or `None` if not queued.
    pub async fn position(
        &self,
        listing_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<u32>, BookingError> {
        let entry = self.store.queue_entry(listing_id, user_id).await?;
        Ok(entry.map(|e| e.position))
    }

    /// Promotes the head of the wait-list into a confirmed booking.
    ///
    /// Best-effort: every failure is logged and swallowed here so the
    /// cancellation that freed the slot always stands on its own.
    #[instrument(skip(self), target = "queue", fields(listing_id = %listing_id))]
    pub async fn auto_promote(&self, listing_id: Uuid, now: DateTime<Utc>) {
        let lock = self.locks.key(&listing_id);
        let _guard = lock.lock().await;

        if let Err(e) = self.try_promote(listing_id, now).await {
            warn!(error = %e, "wait-list promotion failed; cancellation stands");
        }
    }

    async fn try_promote(&self, listing_id: Uuid, now: DateTime<Utc>) -> Result<(), BookingError> {
        let entries = self.store.active_queue(listing_id).await?;
        let Some(head) = entries.first() else {
            debug!("wait-list empty; nothing to promote");
            return Ok(());
        };

        let listing = self
            .store
            .fetch_listing(listing_id)
            .await?
            .ok_or(BookingError::ListingNotFound(listing_id))?;

        // Promoted bookings are scheduled immediately; the wait-list does not
        // retain the slot time the canceled booking held.
        let booking = Booking {
            booking_id: Uuid::new_v4(),
            listing_id,
            creator_id: listing.creator_id,
            customer_id: head.user_id,
            status: BookingStatus::Confirmed,
            scheduled_at: now,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_booking(&booking).await?;

        self.store
            .retire_queue_entry(listing_id, head.user_id, now)
            .await?;

        warn_if_slow("queue_renumber", Duration::from_millis(100), async {
            self.store.renumber_queue(listing_id).await
        })
        .await?;

        info!(
            user_id = %head.user_id,
            booking_id = %booking.booking_id,
            "promoted wait-listed user into a confirmed booking"
        );
        Ok(())
    }
}
