//! Payout orchestration.
//!
//! Responsibilities:
//! - Aggregate the week's completed earnings per creator and pay each one
//!   net of commission (partial-failure batch: one creator's trouble never
//!   stops the others).
//! - Serve on-demand instant payouts under the monthly free-then-fee
//!   schedule, fee off the top before commission.
//!
//! Non-responsibilities:
//! - Moving money (the provider does this).
//! - Marking payouts paid/failed (provider notifications do this later).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use common::logger::warn_if_slow;
use common::sync::KeyedLocks;
use pricing::{Tier, payout_breakdown};

use crate::error::PayoutError;
use crate::fees::{InstantFeePolicy, instant_fee, month_start};
use crate::model::{
    BatchSummary, CreatorEarnings, CreatorProfile, PayoutRecord, PayoutStatus, PayoutType,
};
use crate::provider::PayoutProvider;
use crate::store::PayoutStore;

/// Policy knobs for the processor.
#[derive(Debug, Clone)]
pub struct PayoutPolicy {
    /// Trailing aggregation window for the weekly batch, in days.
    pub batch_window_days: i64,
    /// Instant payout fee schedule.
    pub instant_fees: InstantFeePolicy,
}

impl Default for PayoutPolicy {
    fn default() -> Self {
        Self {
            batch_window_days: 7,
            instant_fees: InstantFeePolicy::default(),
        }
    }
}

pub struct PayoutProcessor<S, P> {
    store: Arc<S>,
    provider: Arc<P>,
    policy: PayoutPolicy,
    /// Serializes instant payouts per creator so two simultaneous requests
    /// cannot both take the month's free slot.
    creator_locks: KeyedLocks<Uuid>,
}

impl<S: PayoutStore, P: PayoutProvider> PayoutProcessor<S, P> {
    pub fn new(store: Arc<S>, provider: Arc<P>) -> Self {
        Self::with_policy(store, provider, PayoutPolicy::default())
    }

    pub fn with_policy(store: Arc<S>, provider: Arc<P>, policy: PayoutPolicy) -> Self {
        Self {
            store,
            provider,
            policy,
            creator_locks: KeyedLocks::new(),
        }
    }

    /// Pays every creator their share of the window's completed bookings.
    ///
    /// Only the initial aggregate fetch can fail the run as a whole; each
    /// creator after that is on their own, with failures collected into the
    /// summary's error list.
    #[instrument(skip(self), target = "payouts")]
    pub async fn run_weekly_batch(&self, now: DateTime<Utc>) -> Result<BatchSummary, PayoutError> {
        let since = now - chrono::Duration::days(self.policy.batch_window_days);
        let earnings = self.store.completed_earnings(since).await?;

        let mut summary = BatchSummary::default();

        for e in earnings {
            if e.gross <= Decimal::ZERO {
                continue;
            }
            summary.total += 1;

            match self.pay_one_batch(&e, now).await {
                Ok(record) => {
                    summary.processed += 1;
                    debug!(
                        creator_id = %e.creator_id,
                        net = %record.net,
                        "batch payout recorded"
                    );
                }
                Err(err) => {
                    warn!(
                        creator_id = %e.creator_id,
                        gross = %e.gross,
                        error = %err,
                        "batch payout failed for creator; continuing"
                    );
                    summary.errors.push(format!("creator {}: {}", e.creator_id, err));
                }
            }
        }

        info!(
            processed = summary.processed,
            total = summary.total,
            failed = summary.errors.len(),
            "weekly payout batch finished"
        );
        Ok(summary)
    }

    async fn pay_one_batch(
        &self,
        earnings: &CreatorEarnings,
        now: DateTime<Utc>,
    ) -> Result<PayoutRecord, PayoutError> {
        let profile = self.require_profile(earnings.creator_id).await?;
        let account = require_account(&profile)?;
        let tier = Tier::from_label(profile.tier_label.as_deref());

        let breakdown = payout_breakdown(earnings.gross, tier);

        let receipt = warn_if_slow("provider_transfer", Duration::from_millis(2_000), async {
            self.provider.create_transfer(account, breakdown.net).await
        })
        .await
        .map_err(|source| PayoutError::Provider {
            creator_id: earnings.creator_id,
            payout_type: PayoutType::Batch,
            amount: breakdown.net,
            source,
        })?;

        let record = PayoutRecord {
            payout_id: Uuid::new_v4(),
            creator_id: earnings.creator_id,
            gross: breakdown.gross,
            commission: breakdown.commission,
            net: breakdown.net,
            payout_type: PayoutType::Batch,
            provider_ref: Some(receipt.transfer_id),
            status: PayoutStatus::Pending,
            created_at: now,
        };
        self.store.insert_payout(&record).await?;

        Ok(record)
    }

    /// Pays a creator on demand.
    ///
    /// The first instant payout each calendar month is free; later ones pay
    /// the express fee on the requested amount. The fee comes off the top,
    /// then commission applies to what remains.
    #[instrument(
        skip(self),
        target = "payouts",
        fields(creator_id = %creator_id, amount = %amount)
    )]
    pub async fn create_instant_payout(
        &self,
        creator_id: Uuid,
        amount: Decimal,
        now: DateTime<Utc>,
    ) -> Result<PayoutRecord, PayoutError> {
        if amount <= Decimal::ZERO {
            return Err(PayoutError::NonPositiveAmount { creator_id, amount });
        }

        let lock = self.creator_locks.key(&creator_id);
        let _guard = lock.lock().await;

        let profile = self.require_profile(creator_id).await?;
        let account = require_account(&profile)?;
        let tier = Tier::from_label(profile.tier_label.as_deref());

        let prior = self
            .store
            .count_instant_since(creator_id, month_start(now))
            .await?;
        let fee = instant_fee(amount, prior, &self.policy.instant_fees);

        let payout_amount = amount - fee;
        if payout_amount <= Decimal::ZERO {
            return Err(PayoutError::AmountBelowFee {
                creator_id,
                amount,
                fee,
            });
        }

        let breakdown = payout_breakdown(payout_amount, tier);

        let receipt = warn_if_slow("provider_transfer", Duration::from_millis(2_000), async {
            self.provider.create_transfer(account, breakdown.net).await
        })
        .await
        .map_err(|source| PayoutError::Provider {
            creator_id,
            payout_type: PayoutType::Instant,
            amount: breakdown.net,
            source,
        })?;

        let record = PayoutRecord {
            payout_id: Uuid::new_v4(),
            creator_id,
            gross: breakdown.gross,
            commission: breakdown.commission,
            net: breakdown.net,
            payout_type: PayoutType::Instant,
            provider_ref: Some(receipt.transfer_id),
            status: PayoutStatus::Pending,
            created_at: now,
        };
        self.store.insert_payout(&record).await?;

        info!(
            prior_this_month = prior,
            fee = %fee,
            net = %breakdown.net,
            "instant payout created"
        );
        Ok(record)
    }

    async fn require_profile(&self, creator_id: Uuid) -> Result<CreatorProfile, PayoutError> {
        self.store
            .fetch_profile(creator_id)
            .await?
            .ok_or(PayoutError::ProfileNotFound(creator_id))
    }
}

fn require_account(profile: &CreatorProfile) -> Result<&str, PayoutError> {
    profile
        .payout_account
        .as_deref()
        .ok_or(PayoutError::NoPayoutAccount(profile.creator_id))
}
