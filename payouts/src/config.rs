use crate::fees::InstantFeePolicy;
use crate::processor::PayoutPolicy;

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection string.
    pub database_url: String,

    /// Base URL of the external payout provider API.
    pub provider_url: String,

    /// Trailing aggregation window for the weekly batch, in days.
    ///
    /// The batch picks up bookings whose completion update falls inside
    /// this window; runs are expected weekly, so the default matches.
    pub batch_window_days: i64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://marketplace_dev.db".to_string());

        let provider_url = std::env::var("PAYOUT_PROVIDER_URL")
            .unwrap_or_else(|_| "http://localhost:4242".to_string());

        Self {
            database_url,
            provider_url,
            batch_window_days: 7,
        }
    }

    /// Processor policy derived from this configuration.
    pub fn policy(&self) -> PayoutPolicy {
        PayoutPolicy {
            batch_window_days: self.batch_window_days,
            instant_fees: InstantFeePolicy::default(),
        }
    }
}
