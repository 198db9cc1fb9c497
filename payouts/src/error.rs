use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::model::PayoutType;
use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum PayoutError {
    #[error("creator profile not found: {0}")]
    ProfileNotFound(Uuid),

    #[error("no payout account connected for creator {0}")]
    NoPayoutAccount(Uuid),

    #[error("payout amount must be positive: {amount} for creator {creator_id}")]
    NonPositiveAmount { creator_id: Uuid, amount: Decimal },

    #[error(
        "instant fee leaves nothing to pay out: {amount} minus {fee} fee for creator {creator_id}"
    )]
    AmountBelowFee {
        creator_id: Uuid,
        amount: Decimal,
        fee: Decimal,
    },

    #[error("payout provider failed for creator {creator_id} ({payout_type} of {amount}): {source}")]
    Provider {
        creator_id: Uuid,
        payout_type: PayoutType,
        amount: Decimal,
        #[source]
        source: ProviderError,
    },

    #[error("storage error: {0}")]
    Store(#[from] anyhow::Error),
}
