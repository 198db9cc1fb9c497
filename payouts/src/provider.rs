//! External payout provider adapter.
//!
//! This module is responsible for:
//!   - taking a destination account id and a net amount
//!   - calling the provider's transfer-creation API
//!   - mapping the response into a [`TransferReceipt`]
//!
//! Errors are normalized into [`ProviderError`] so callers never see raw
//! transport failures.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transfer rejected: {0}")]
    Rejected(String),
}

/// Provider-side reference for a created transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub transfer_id: String,
}

/// Abstraction over the money mover.
///
/// `amount` is the net amount to deliver; fee and commission deductions
/// happen before this call.
#[async_trait]
pub trait PayoutProvider: Send + Sync {
    async fn create_transfer(
        &self,
        account: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, ProviderError>;
}

#[derive(Serialize)]
struct TransferRequest<'a> {
    destination: &'a str,
    amount: Decimal,
    currency: &'a str,
}

#[derive(Deserialize)]
struct TransferResponse {
    id: String,
}

/// HTTP implementation against the provider's REST API.
#[derive(Clone)]
pub struct HttpPayoutProvider {
    http: Client,
    url: String,
}

impl HttpPayoutProvider {
    pub fn new(url: String) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(5))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }
}

#[async_trait]
impl PayoutProvider for HttpPayoutProvider {
    #[instrument(skip(self), fields(account = %account), level = "debug")]
    async fn create_transfer(
        &self,
        account: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, ProviderError> {
        let url = format!("{}/transfers", self.url);

        let req = TransferRequest {
            destination: account,
            amount,
            currency: "usd",
        };

        let resp = self
            .http
            .post(&url)
            .json(&req)
            .send()
            .await?
            .error_for_status()?;

        let body: TransferResponse = resp.json().await?;

        debug!(transfer_id = %body.id, "transfer created");

        Ok(TransferReceipt {
            transfer_id: body.id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_request_wire_shape() {
        let req = TransferRequest {
            destination: "acct_123",
            amount: Decimal::new(2_550, 2),
            currency: "usd",
        };

        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["destination"], "acct_123");
        assert_eq!(v["amount"], "25.50");
        assert_eq!(v["currency"], "usd");
    }

    #[test]
    fn transfer_response_parses_provider_payload() {
        let body: TransferResponse =
            serde_json::from_str(r#"{"id":"tr_9","object":"transfer"}"#).unwrap();
        assert_eq!(body.id, "tr_9");
    }
}
