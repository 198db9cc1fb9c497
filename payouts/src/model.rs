use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutType {
    /// Scheduled weekly aggregation payout.
    Batch,
    /// On-demand payout under the monthly fee schedule.
    Instant,
}

impl fmt::Display for PayoutType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PayoutType::Batch => "batch",
            PayoutType::Instant => "instant",
        };
        f.write_str(s)
    }
}

impl FromStr for PayoutType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "batch" => Ok(PayoutType::Batch),
            "instant" => Ok(PayoutType::Instant),
            other => Err(anyhow::anyhow!("invalid payout type value: {}", other)),
        }
    }
}

/// Provider-side lifecycle of a payout. We record `pending`; later states
/// arrive via asynchronous provider notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutStatus {
    Pending,
    InTransit,
    Paid,
    Failed,
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::InTransit => "in_transit",
            PayoutStatus::Paid => "paid",
            PayoutStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for PayoutStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PayoutStatus::Pending),
            "in_transit" => Ok(PayoutStatus::InTransit),
            "paid" => Ok(PayoutStatus::Paid),
            "failed" => Ok(PayoutStatus::Failed),
            other => Err(anyhow::anyhow!("invalid payout status value: {}", other)),
        }
    }
}

/// One money movement to a creator.
///
/// `net + commission == gross` to the cent; the gross here is the amount the
/// commission was computed on (for instant payouts, the requested amount
/// minus the express fee).
#[derive(Debug, Clone)]
pub struct PayoutRecord {
    pub payout_id: Uuid,
    pub creator_id: Uuid,
    pub gross: Decimal,
    pub commission: Decimal,
    pub net: Decimal,
    pub payout_type: PayoutType,
    /// External transfer reference from the payout provider.
    pub provider_ref: Option<String>,
    pub status: PayoutStatus,
    pub created_at: DateTime<Utc>,
}

/// What the engine needs to know about a creator: tier label as stored
/// (free-form; parsed to a known tier at the point of use) and the external
/// payout destination, if one is connected.
#[derive(Debug, Clone)]
pub struct CreatorProfile {
    pub creator_id: Uuid,
    pub tier_label: Option<String>,
    pub payout_account: Option<String>,
}

/// One creator's aggregated gross over a batch window.
#[derive(Debug, Clone)]
pub struct CreatorEarnings {
    pub creator_id: Uuid,
    pub gross: Decimal,
}

/// Outcome of one weekly batch run. `errors` holds one message per failed
/// creator; a failure never stops the rest of the batch.
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub total: usize,
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payout_labels_round_trip() {
        for t in [PayoutType::Batch, PayoutType::Instant] {
            assert_eq!(t.to_string().parse::<PayoutType>().unwrap(), t);
        }
        for s in [
            PayoutStatus::Pending,
            PayoutStatus::InTransit,
            PayoutStatus::Paid,
            PayoutStatus::Failed,
        ] {
            assert_eq!(s.to_string().parse::<PayoutStatus>().unwrap(), s);
        }
        assert!("wire".parse::<PayoutType>().is_err());
    }
}
