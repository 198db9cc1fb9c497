pub mod sqlite_store;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{Booking, BookingStatus, Listing, QueueEntry};

/// Persistence seam for listings, bookings and the wait-list.
///
/// Queue mutations are expressed as whole-queue statements
/// (`shift_queue_down`, `renumber_queue`) rather than per-row updates so an
/// implementation can apply each as one atomic write.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn fetch_listing(&self, listing_id: Uuid) -> Result<Option<Listing>>;

    /// Insert-or-update by listing id.
    async fn save_listing(&self, listing: &Listing) -> Result<()>;

    async fn insert_booking(&self, booking: &Booking) -> Result<()>;

    async fn fetch_booking(&self, booking_id: Uuid) -> Result<Option<Booking>>;

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Number of pending + confirmed bookings for the listing.
    async fn count_active_bookings(&self, listing_id: Uuid) -> Result<u32>;

    /// Non-auto-booked entries for the listing, ordered by position.
    async fn active_queue(&self, listing_id: Uuid) -> Result<Vec<QueueEntry>>;

    /// The user's active entry, if any.
    async fn queue_entry(&self, listing_id: Uuid, user_id: Uuid) -> Result<Option<QueueEntry>>;

    async fn insert_queue_entry(&self, entry: &QueueEntry) -> Result<()>;

    /// Increment every active position for the listing by one, making room
    /// at position 1. Must touch all active entries in a single write.
    async fn shift_queue_down(&self, listing_id: Uuid) -> Result<()>;

    /// Reassign active positions to 1..n, preserving relative order.
    async fn renumber_queue(&self, listing_id: Uuid) -> Result<()>;

    /// Mark the user's active entry auto-booked at `at`; the row is retained.
    async fn retire_queue_entry(&self, listing_id: Uuid, user_id: Uuid, at: DateTime<Utc>)
    -> Result<()>;
}
