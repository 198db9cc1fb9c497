//! Capacity gate: decides whether a listing can take another live booking.

use uuid::Uuid;

use crate::error::BookingError;
use crate::store::BookingStore;

/// True when the listing's live bookings (pending + confirmed) have reached
/// its declared capacity. Completed and canceled bookings never count.
///
/// This is a point-in-time count, not a reservation: the caller's insert is
/// a separate statement, and two racing requests can both observe a free
/// seat. Requests routed through `BookingManager` are serialized per
/// listing; direct callers own that trade-off.
pub async fn is_capacity_reached<S: BookingStore + ?Sized>(
    store: &S,
    listing_id: Uuid,
    capacity: u32,
) -> Result<bool, BookingError> {
    let live = store.count_active_bookings(listing_id).await?;
    Ok(live >= capacity)
}
