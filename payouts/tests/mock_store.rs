use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use payouts::model::{CreatorEarnings, CreatorProfile, PayoutRecord, PayoutType};
use payouts::provider::{PayoutProvider, ProviderError, TransferReceipt};
use payouts::store::PayoutStore;

#[derive(Default)]
pub struct InMemoryPayoutStore {
    pub profiles: Arc<Mutex<HashMap<Uuid, CreatorProfile>>>,
    pub payouts: Arc<Mutex<Vec<PayoutRecord>>>,
    pub earnings: Arc<Mutex<Vec<CreatorEarnings>>>,
}

#[async_trait]
impl PayoutStore for InMemoryPayoutStore {
    async fn completed_earnings(
        &self,
        _since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CreatorEarnings>> {
        Ok(self.earnings.lock().await.clone())
    }

    async fn fetch_profile(&self, creator_id: Uuid) -> anyhow::Result<Option<CreatorProfile>> {
        Ok(self.profiles.lock().await.get(&creator_id).cloned())
    }

    async fn save_profile(&self, profile: &CreatorProfile) -> anyhow::Result<()> {
        self.profiles
            .lock()
            .await
            .insert(profile.creator_id, profile.clone());
        Ok(())
    }

    async fn insert_payout(&self, record: &PayoutRecord) -> anyhow::Result<()> {
        self.payouts.lock().await.push(record.clone());
        Ok(())
    }

    async fn count_instant_since(
        &self,
        creator_id: Uuid,
        since: DateTime<Utc>,
    ) -> anyhow::Result<u32> {
        let n = self
            .payouts
            .lock()
            .await
            .iter()
            .filter(|p| {
                p.creator_id == creator_id
                    && p.payout_type == PayoutType::Instant
                    && p.created_at >= since
            })
            .count();
        Ok(n as u32)
    }
}

/// Records transfers; accounts listed in `fail_accounts` are rejected.
#[derive(Default)]
pub struct MockPayoutProvider {
    pub calls: Mutex<Vec<(String, Decimal)>>,
    pub fail_accounts: Mutex<HashSet<String>>,
}

#[async_trait]
impl PayoutProvider for MockPayoutProvider {
    async fn create_transfer(
        &self,
        account: &str,
        amount: Decimal,
    ) -> Result<TransferReceipt, ProviderError> {
        if self.fail_accounts.lock().await.contains(account) {
            return Err(ProviderError::Rejected(format!(
                "account {account} is blocked"
            )));
        }

        let mut calls = self.calls.lock().await;
        calls.push((account.to_string(), amount));
        Ok(TransferReceipt {
            transfer_id: format!("tr_{}", calls.len()),
        })
    }
}
