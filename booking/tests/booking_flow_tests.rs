use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use booking::capacity::is_capacity_reached;
use booking::manager::{BookingManager, BookingOutcome};
use booking::model::{Actor, Booking, BookingStatus, Listing};
use booking::store::BookingStore;
use booking::{BookingError, WaitEstimate};
use pricing::{EventTier, Tier};

use mock_store::InMemoryBookingStore;

fn sample_listing(capacity: u32) -> Listing {
    Listing {
        listing_id: Uuid::new_v4(),
        creator_id: Uuid::new_v4(),
        capacity,
        event_tier: Some(EventTier::A),
        price: Decimal::new(30_000, 2),
        active: true,
    }
}

fn t0() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn booking_with_status(listing: &Listing, status: BookingStatus) -> Booking {
    let mut b = Booking::pending(listing, Uuid::new_v4(), t0(), t0());
    b.status = status;
    b
}

#[tokio::test]
async fn capacity_counts_only_live_bookings() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryBookingStore::default());
    let listing = sample_listing(2);
    store.save_listing(&listing).await?;

    store
        .insert_booking(&booking_with_status(&listing, BookingStatus::Pending))
        .await?;
    store
        .insert_booking(&booking_with_status(&listing, BookingStatus::Completed))
        .await?;
    store
        .insert_booking(&booking_with_status(&listing, BookingStatus::Canceled))
        .await?;

    // One live booking out of capacity two.
    assert!(!is_capacity_reached(store.as_ref(), listing.listing_id, 2).await?);

    store
        .insert_booking(&booking_with_status(&listing, BookingStatus::Confirmed))
        .await?;
    assert!(is_capacity_reached(store.as_ref(), listing.listing_id, 2).await?);

    Ok(())
}

#[tokio::test]
async fn requests_fill_capacity_then_waitlist() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryBookingStore::default());
    let listing = sample_listing(2);
    store.save_listing(&listing).await?;

    let mgr = BookingManager::new(store.clone());

    for _ in 0..2 {
        let outcome = mgr
            .request_booking(listing.listing_id, Uuid::new_v4(), None, t0(), t0())
            .await?;
        assert!(matches!(outcome, BookingOutcome::Booked(_)));
    }

    let outcome = mgr
        .request_booking(listing.listing_id, Uuid::new_v4(), None, t0(), t0())
        .await?;
    match outcome {
        BookingOutcome::Waitlisted(placement) => {
            assert_eq!(placement.position, 1);
            assert_eq!(placement.estimate, WaitEstimate::Soon);
        }
        other => panic!("expected waitlisting, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn unknown_and_inactive_listings_are_rejected() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryBookingStore::default());
    let mgr = BookingManager::new(store.clone());

    let missing = mgr
        .request_booking(Uuid::new_v4(), Uuid::new_v4(), None, t0(), t0())
        .await;
    assert!(matches!(missing, Err(BookingError::ListingNotFound(_))));

    let mut listing = sample_listing(5);
    listing.active = false;
    store.save_listing(&listing).await?;

    let inactive = mgr
        .request_booking(listing.listing_id, Uuid::new_v4(), None, t0(), t0())
        .await;
    assert!(matches!(inactive, Err(BookingError::ListingInactive(_))));

    Ok(())
}

#[tokio::test]
async fn lifecycle_enforces_roles_and_order() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryBookingStore::default());
    let listing = sample_listing(5);
    store.save_listing(&listing).await?;

    let mgr = BookingManager::new(store.clone());

    let booking = match mgr
        .request_booking(listing.listing_id, Uuid::new_v4(), None, t0(), t0())
        .await?
    {
        BookingOutcome::Booked(b) => b,
        other => panic!("expected a booking, got {other:?}"),
    };

    // Customers cannot confirm their own booking.
    let denied = mgr
        .transition(booking.booking_id, BookingStatus::Confirmed, Actor::Customer, t0())
        .await;
    assert!(matches!(denied, Err(BookingError::NotPermitted { .. })));

    // Creator confirms, then completes.
    let confirmed = mgr
        .transition(booking.booking_id, BookingStatus::Confirmed, Actor::Creator, t0())
        .await?;
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    let completed = mgr
        .transition(booking.booking_id, BookingStatus::Completed, Actor::Creator, t0())
        .await?;
    assert_eq!(completed.status, BookingStatus::Completed);

    // Terminal: no way back.
    let reopened = mgr
        .transition(booking.booking_id, BookingStatus::Pending, Actor::Creator, t0())
        .await;
    assert!(matches!(reopened, Err(BookingError::InvalidTransition { .. })));

    Ok(())
}

#[tokio::test]
async fn transition_on_missing_booking_fails() {
    let store = Arc::new(InMemoryBookingStore::default());
    let mgr = BookingManager::new(store);

    let res = mgr
        .transition(Uuid::new_v4(), BookingStatus::Canceled, Actor::Customer, t0())
        .await;
    assert!(matches!(res, Err(BookingError::BookingNotFound(_))));
}

#[tokio::test]
async fn cancellation_promotes_the_first_waiter() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryBookingStore::default());
    let listing = sample_listing(1);
    store.save_listing(&listing).await?;

    let mgr = BookingManager::new(store.clone());

    let customer_a = Uuid::new_v4();
    let customer_b = Uuid::new_v4();

    // A takes the only seat and gets confirmed.
    let booking_a = match mgr
        .request_booking(listing.listing_id, customer_a, None, t0(), t0())
        .await?
    {
        BookingOutcome::Booked(b) => b,
        other => panic!("expected a booking, got {other:?}"),
    };
    mgr.transition(booking_a.booking_id, BookingStatus::Confirmed, Actor::Creator, t0())
        .await?;

    // B finds the listing full and is wait-listed at position 1.
    let outcome = mgr
        .request_booking(listing.listing_id, customer_b, Some(Tier::Gold), t0(), t0())
        .await?;
    match outcome {
        BookingOutcome::Waitlisted(p) => assert_eq!(p.position, 1),
        other => panic!("expected waitlisting, got {other:?}"),
    }

    // A cancels; B is promoted into a confirmed booking automatically.
    mgr.transition(booking_a.booking_id, BookingStatus::Canceled, Actor::Customer, t0())
        .await?;

    let promoted: Vec<Booking> = store
        .bookings
        .lock()
        .await
        .values()
        .filter(|b| b.customer_id == customer_b)
        .cloned()
        .collect();
    assert_eq!(promoted.len(), 1);
    assert_eq!(promoted[0].status, BookingStatus::Confirmed);
    assert_eq!(promoted[0].creator_id, listing.creator_id);

    // B's queue entry is retired, not deleted.
    assert_eq!(mgr.queue().position(listing.listing_id, customer_b).await?, None);
    let retired = store
        .queue
        .lock()
        .await
        .iter()
        .filter(|e| e.auto_booked && e.user_id == customer_b)
        .count();
    assert_eq!(retired, 1);

    Ok(())
}

#[tokio::test]
async fn cancellation_stands_even_when_promotion_cannot_run() -> anyhow::Result<()> {
    let store = Arc::new(InMemoryBookingStore::default());
    let listing = sample_listing(1);
    store.save_listing(&listing).await?;

    let mgr = BookingManager::new(store.clone());

    let booking = match mgr
        .request_booking(listing.listing_id, Uuid::new_v4(), None, t0(), t0())
        .await?
    {
        BookingOutcome::Booked(b) => b,
        other => panic!("expected a booking, got {other:?}"),
    };

    // Someone is waiting, but the listing row disappears before the cancel.
    mgr.queue()
        .join(listing.listing_id, Uuid::new_v4(), None, t0())
        .await?;
    store.listings.lock().await.remove(&listing.listing_id);

    let canceled = mgr
        .transition(booking.booking_id, BookingStatus::Canceled, Actor::Customer, t0())
        .await?;

    // The cancellation itself succeeded; no promoted booking exists.
    assert_eq!(canceled.status, BookingStatus::Canceled);
    let confirmed = store
        .bookings
        .lock()
        .await
        .values()
        .filter(|b| b.status == BookingStatus::Confirmed)
        .count();
    assert_eq!(confirmed, 0);

    Ok(())
}
