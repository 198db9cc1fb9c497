//! Request-level booking orchestration.
//!
//! For each request it:
//!   1. Loads the listing and rejects inactive ones.
//!   2. Runs the capacity gate.
//!   3. Creates a pending booking, or hands the customer to the wait-list.
//!
//! Status changes go through the state machine in `model`; a cancellation
//! frees a seat and triggers wait-list promotion as a side effect.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use common::logger::warn_if_slow;
use common::sync::KeyedLocks;
use pricing::Tier;

use crate::capacity::is_capacity_reached;
use crate::error::BookingError;
use crate::model::{Actor, Booking, BookingStatus, validate_transition};
use crate::queue::{QueueManager, QueuePlacement};
use crate::store::BookingStore;

/// What a booking request produced.
#[derive(Debug)]
pub enum BookingOutcome {
    /// A pending booking was created; the creator still has to confirm.
    Booked(Booking),
    /// The listing was full; the customer is wait-listed instead.
    Waitlisted(QueuePlacement),
}

pub struct BookingManager<S> {
    store: Arc<S>,
    queue: QueueManager<S>,
    locks: KeyedLocks<Uuid>,
}

impl<S: BookingStore> BookingManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            queue: QueueManager::new(store.clone()),
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// Wait-list operations for callers that need positions directly.
    pub fn queue(&self) -> &QueueManager<S> {
        &self.queue
    }

    /// Handles a customer's booking request against the capacity gate.
    ///
    /// Admission for one listing is serialized here so two requests cannot
    /// both take the last seat through this path.
    #[instrument(
        skip(self),
        target = "booking",
        fields(listing_id = %listing_id, customer_id = %customer_id)
    )]
    pub async fn request_booking(
        &self,
        listing_id: Uuid,
        customer_id: Uuid,
        member_tier: Option<Tier>,
        scheduled_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<BookingOutcome, BookingError> {
        let lock = self.locks.key(&listing_id);
        let _guard = lock.lock().await;

        let listing = self
            .store
            .fetch_listing(listing_id)
            .await?
            .ok_or(BookingError::ListingNotFound(listing_id))?;

        if !listing.active {
            return Err(BookingError::ListingInactive(listing_id));
        }

        let full = warn_if_slow("capacity_check", Duration::from_millis(100), async {
            is_capacity_reached(self.store.as_ref(), listing_id, listing.capacity).await
        })
        .await?;

        if full {
            let placement = self
                .queue
                .join(listing_id, customer_id, member_tier, now)
                .await?;
            info!(position = placement.position, "listing full; customer wait-listed");
            return Ok(BookingOutcome::Waitlisted(placement));
        }

        let booking = Booking::pending(&listing, customer_id, scheduled_at, now);
        self.store.insert_booking(&booking).await?;

        info!(booking_id = %booking.booking_id, "pending booking created");
        Ok(BookingOutcome::Booked(booking))
    }

    /// Applies one status transition on behalf of `actor`.
    ///
    /// Cancellations additionally run wait-list promotion for the listing;
    /// promotion trouble never unwinds the cancellation itself.
    #[instrument(
        skip(self),
        target = "booking",
        fields(booking_id = %booking_id, to = %to, actor = %actor)
    )]
    pub async fn transition(
        &self,
        booking_id: Uuid,
        to: BookingStatus,
        actor: Actor,
        now: DateTime<Utc>,
    ) -> Result<Booking, BookingError> {
        let mut booking = self
            .store
            .fetch_booking(booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound(booking_id))?;

        let from = booking.status;
        validate_transition(from, to, actor)?;

        self.store
            .update_booking_status(booking_id, to, now)
            .await?;
        booking.status = to;
        booking.updated_at = now;

        info!(%from, "booking status updated");

        if to == BookingStatus::Canceled {
            self.queue.auto_promote(booking.listing_id, now).await;
        }

        Ok(booking)
    }
}
