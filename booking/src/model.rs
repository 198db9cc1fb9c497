use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use pricing::EventTier;

use crate::error::BookingError;

/// A bookable service or event offered by a creator.
///
/// `capacity` is the declared number of concurrent seats; admission is
/// checked against it by the capacity gate.
#[derive(Debug, Clone)]
pub struct Listing {
    pub listing_id: Uuid,
    pub creator_id: Uuid,
    pub capacity: u32,
    /// Pricing bracket; unrecognized labels load as `None` (no discount).
    pub event_tier: Option<EventTier>,
    pub price: Decimal,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Canceled,
}

impl BookingStatus {
    /// Completed and canceled bookings accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Canceled)
    }

    /// Only live reservations occupy a seat.
    pub fn counts_toward_capacity(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Completed => "completed",
            BookingStatus::Canceled => "canceled",
        };
        f.write_str(s)
    }
}

impl FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "completed" => Ok(BookingStatus::Completed),
            "canceled" => Ok(BookingStatus::Canceled),
            other => Err(anyhow::anyhow!("invalid booking status value: {}", other)),
        }
    }
}

/// Who is asking for a status change. Resolved by the caller from the
/// authenticated identity; the state machine only checks the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Creator,
    Customer,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Actor::Creator => "creator",
            Actor::Customer => "customer",
        };
        f.write_str(s)
    }
}

/// One reservation. Never physically deleted; lifecycle moves through
/// [`BookingStatus`] under [`validate_transition`].
#[derive(Debug, Clone)]
pub struct Booking {
    pub booking_id: Uuid,
    pub listing_id: Uuid,
    pub creator_id: Uuid,
    pub customer_id: Uuid,
    pub status: BookingStatus,
    pub scheduled_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// A fresh customer-requested reservation, awaiting creator confirmation.
    pub fn pending(
        listing: &Listing,
        customer_id: Uuid,
        scheduled_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            booking_id: Uuid::new_v4(),
            listing_id: listing.listing_id,
            creator_id: listing.creator_id,
            customer_id,
            status: BookingStatus::Pending,
            scheduled_at,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A waiting customer on a listing's wait-list.
///
/// Active (non-auto-booked) positions for one listing are contiguous
/// ascending from 1. Promoted entries keep their row with
/// `auto_booked = true` as a historical record.
#[derive(Debug, Clone)]
pub struct QueueEntry {
    pub listing_id: Uuid,
    pub user_id: Uuid,
    pub position: u32,
    pub auto_booked: bool,
    pub auto_booked_at: Option<DateTime<Utc>>,
    pub joined_at: DateTime<Utc>,
}

/// Validates one booking state-machine step.
///
/// Allowed: pending -> confirmed -> completed, and cancellation from either
/// live state. Confirmation and completion are creator-only; either side may
/// cancel. Everything else is rejected with the offending pair named, never
/// silently ignored.
pub fn validate_transition(
    from: BookingStatus,
    to: BookingStatus,
    actor: Actor,
) -> Result<(), BookingError> {
    use BookingStatus::*;

    let pair_ok = matches!(
        (from, to),
        (Pending, Confirmed) | (Confirmed, Completed) | (Pending, Canceled) | (Confirmed, Canceled)
    );
    if !pair_ok {
        return Err(BookingError::InvalidTransition { from, to });
    }

    let actor_ok = match to {
        Confirmed | Completed => actor == Actor::Creator,
        Canceled => true,
        Pending => false,
    };
    if !actor_ok {
        return Err(BookingError::NotPermitted { actor, from, to });
    }

    Ok(())
}
