use thiserror::Error;
use uuid::Uuid;

use crate::model::{Actor, BookingStatus};

#[derive(Error, Debug)]
pub enum BookingError {
    #[error("listing not found: {0}")]
    ListingNotFound(Uuid),

    #[error("listing is not accepting bookings: {0}")]
    ListingInactive(Uuid),

    #[error("booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("invalid booking transition: {from} -> {to}")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("{actor} may not move a booking from {from} to {to}")]
    NotPermitted {
        actor: Actor,
        from: BookingStatus,
        to: BookingStatus,
    },

    #[error("storage error: {0}")]
    Store(#[from] anyhow::Error),
}
