//! SQLite-backed implementation of the `PayoutStore` trait.
//!
//! Money columns are stored as decimal TEXT and aggregated client-side in
//! `Decimal`, never summed in SQL, so cents stay exact.

use std::collections::HashMap;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::PayoutStore;
use crate::model::{CreatorEarnings, CreatorProfile, PayoutRecord, PayoutStatus, PayoutType};

pub struct SQLitePayoutStore {
    pool: SqlitePool,
}

impl SQLitePayoutStore {
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect and ensure the schema exists.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        let pool = SqlitePool::connect(path).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS profiles (
  creator_id TEXT PRIMARY KEY,
  tier TEXT,
  payout_account TEXT
);
"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS payouts (
  payout_id TEXT PRIMARY KEY,
  creator_id TEXT NOT NULL,
  gross TEXT NOT NULL,
  commission TEXT NOT NULL,
  net TEXT NOT NULL,
  payout_type TEXT NOT NULL,
  provider_ref TEXT,
  status TEXT NOT NULL,
  created_at_ms BIGINT NOT NULL
);
"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_payouts_creator_type
               ON payouts(creator_id, payout_type, created_at_ms);"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl PayoutStore for SQLitePayoutStore {
    async fn completed_earnings(
        &self,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CreatorEarnings>> {
        let rows = sqlx::query(
            r#"
SELECT b.creator_id AS creator_id, l.price AS price
FROM bookings b
JOIN listings l ON l.listing_id = b.listing_id
WHERE b.status = 'completed' AND b.updated_at_ms >= ?;
"#,
        )
        .bind(since.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        let mut totals: HashMap<Uuid, Decimal> = HashMap::new();
        for r in rows {
            let creator_id = parse_uuid(r.get("creator_id"), "creator_id")?;
            let price = parse_money(r.get("price"))?;
            *totals.entry(creator_id).or_insert(Decimal::ZERO) += price;
        }

        let mut out: Vec<CreatorEarnings> = totals
            .into_iter()
            .map(|(creator_id, gross)| CreatorEarnings { creator_id, gross })
            .collect();
        // Deterministic order keeps batch logs and summaries stable.
        out.sort_by_key(|e| e.creator_id);

        Ok(out)
    }

    async fn fetch_profile(&self, creator_id: Uuid) -> anyhow::Result<Option<CreatorProfile>> {
        let row = sqlx::query(
            r#"
SELECT creator_id, tier, payout_account
FROM profiles
WHERE creator_id = ?;
"#,
        )
        .bind(creator_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(CreatorProfile {
                creator_id: parse_uuid(r.get("creator_id"), "creator_id")?,
                tier_label: r.get("tier"),
                payout_account: r.get("payout_account"),
            })),
            None => Ok(None),
        }
    }

    async fn save_profile(&self, profile: &CreatorProfile) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO profiles (creator_id, tier, payout_account)
VALUES (?, ?, ?)
ON CONFLICT(creator_id) DO UPDATE SET
    tier = excluded.tier,
    payout_account = excluded.payout_account;
"#,
        )
        .bind(profile.creator_id.to_string())
        .bind(&profile.tier_label)
        .bind(&profile.payout_account)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_payout(&self, record: &PayoutRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO payouts (
    payout_id, creator_id, gross, commission, net,
    payout_type, provider_ref, status, created_at_ms
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?);
"#,
        )
        .bind(record.payout_id.to_string())
        .bind(record.creator_id.to_string())
        .bind(record.gross.to_string())
        .bind(record.commission.to_string())
        .bind(record.net.to_string())
        .bind(record.payout_type.to_string())
        .bind(&record.provider_ref)
        .bind(record.status.to_string())
        .bind(record.created_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_instant_since(
        &self,
        creator_id: Uuid,
        since: DateTime<Utc>,
    ) -> anyhow::Result<u32> {
        let row = sqlx::query(
            r#"
SELECT COUNT(*) AS n
FROM payouts
WHERE creator_id = ? AND payout_type = 'instant' AND created_at_ms >= ?;
"#,
        )
        .bind(creator_id.to_string())
        .bind(since.timestamp_millis())
        .fetch_one(&self.pool)
        .await?;

        i64_to_u32(row.get("n"))
    }
}

/// Reads a persisted payout row back into a [`PayoutRecord`].
///
/// Not part of the `PayoutStore` trait (the engine only appends); kept for
/// operational tooling and the store tests.
pub fn row_to_payout(r: &sqlx::sqlite::SqliteRow) -> anyhow::Result<PayoutRecord> {
    let type_str: String = r.get("payout_type");
    let status_str: String = r.get("status");

    Ok(PayoutRecord {
        payout_id: parse_uuid(r.get("payout_id"), "payout_id")?,
        creator_id: parse_uuid(r.get("creator_id"), "creator_id")?,
        gross: parse_money(r.get("gross"))?,
        commission: parse_money(r.get("commission"))?,
        net: parse_money(r.get("net"))?,
        payout_type: PayoutType::from_str(&type_str)
            .map_err(|e| anyhow!("invalid payout type '{}': {}", type_str, e))?,
        provider_ref: r.get("provider_ref"),
        status: PayoutStatus::from_str(&status_str)
            .map_err(|e| anyhow!("invalid payout status '{}': {}", status_str, e))?,
        created_at: ms_to_utc(r.get("created_at_ms"))?,
    })
}

/* =========================
Numeric safety helpers
========================= */

fn parse_uuid(s: String, field: &'static str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(&s).with_context(|| format!("invalid {field}"))
}

fn parse_money(s: String) -> anyhow::Result<Decimal> {
    Decimal::from_str(&s).with_context(|| format!("invalid money value '{s}'"))
}

fn i64_to_u32(v: i64) -> anyhow::Result<u32> {
    if v < 0 || v > u32::MAX as i64 {
        return Err(anyhow!("out of range for u32: {v}"));
    }
    Ok(v as u32)
}

fn ms_to_utc(v: i64) -> anyhow::Result<DateTime<Utc>> {
    Utc.timestamp_millis_opt(v)
        .single()
        .ok_or_else(|| anyhow!("timestamp out of range: {v}"))
}
