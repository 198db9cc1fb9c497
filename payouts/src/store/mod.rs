pub mod sqlite_store;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::{CreatorEarnings, CreatorProfile, PayoutRecord};

/// Persistence seam for payout records and creator profiles.
///
/// `completed_earnings` also reads the booking tables (completed bookings
/// joined to listing prices); implementations live over the same database
/// as the booking store.
#[async_trait]
pub trait PayoutStore: Send + Sync {
    /// Per-creator gross totals of bookings completed (status `completed`,
    /// last updated at or after `since`), joined to the listing price.
    /// Creators with nothing in the window are absent from the result.
    async fn completed_earnings(&self, since: DateTime<Utc>) -> Result<Vec<CreatorEarnings>>;

    async fn fetch_profile(&self, creator_id: Uuid) -> Result<Option<CreatorProfile>>;

    /// Insert-or-update by creator id.
    async fn save_profile(&self, profile: &CreatorProfile) -> Result<()>;

    async fn insert_payout(&self, record: &PayoutRecord) -> Result<()>;

    /// Number of instant payouts recorded for the creator at or after `since`.
    async fn count_instant_since(&self, creator_id: Uuid, since: DateTime<Utc>) -> Result<u32>;
}
