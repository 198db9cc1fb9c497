//! Creator payout engine.
//!
//! Two entry points, both on [`processor::PayoutProcessor`]:
//!   - `run_weekly_batch` aggregates the week's completed bookings per
//!     creator and pays each net of commission (partial-failure batch)
//!   - `create_instant_payout` pays on demand under the monthly
//!     free-then-fee schedule
//!
//! The external money mover sits behind [`provider::PayoutProvider`];
//! persistence behind [`store::PayoutStore`].

pub mod config;
pub mod error;
pub mod fees;
pub mod model;
pub mod processor;
pub mod provider;
pub mod store;

pub use error::PayoutError;
pub use processor::{PayoutPolicy, PayoutProcessor};
