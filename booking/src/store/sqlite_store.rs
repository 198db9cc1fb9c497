//! SQLite-backed implementation of the `BookingStore` trait.
//!
//! Responsible only for persistence and row mapping:
//!
//!   - schema creation on startup
//!   - booking inserts and status updates
//!   - wait-list reads plus the two set-based queue mutations
//!     (shift-down and renumber), each a single statement so concurrent
//!     readers never observe a half-shifted queue

use std::str::FromStr;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use pricing::EventTier;

use super::BookingStore;
use crate::model::{Booking, BookingStatus, Listing, QueueEntry};

pub struct SQLiteBookingStore {
    pool: SqlitePool,
}

impl SQLiteBookingStore {
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
CREATE TABLE IF NOT EXISTS listings (
  listing_id TEXT PRIMARY KEY,
  creator_id TEXT NOT NULL,
  capacity INTEGER NOT NULL,
  event_tier TEXT NOT NULL DEFAULT '',
  price TEXT NOT NULL,
  active INTEGER NOT NULL CHECK (active IN (0,1))
);
"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS bookings (
  booking_id TEXT PRIMARY KEY,
  listing_id TEXT NOT NULL,
  creator_id TEXT NOT NULL,
  customer_id TEXT NOT NULL,
  status TEXT NOT NULL,
  scheduled_at_ms BIGINT NOT NULL,
  created_at_ms BIGINT NOT NULL,
  updated_at_ms BIGINT NOT NULL
);
"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
CREATE TABLE IF NOT EXISTS booking_queue (
  listing_id TEXT NOT NULL,
  user_id TEXT NOT NULL,
  position INTEGER NOT NULL,
  auto_booked INTEGER NOT NULL DEFAULT 0 CHECK (auto_booked IN (0,1)),
  auto_booked_at_ms BIGINT,
  joined_at_ms BIGINT NOT NULL
);
"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_bookings_listing_status
               ON bookings(listing_id, status);"#,
        )
        .execute(&self.pool)
        .await?;

        // One active wait-list entry per user per listing; retired rows
        // (auto_booked = 1) are history and may repeat.
        sqlx::query(
            r#"CREATE UNIQUE INDEX IF NOT EXISTS idx_queue_active_user
               ON booking_queue(listing_id, user_id) WHERE auto_booked = 0;"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"CREATE INDEX IF NOT EXISTS idx_queue_listing_position
               ON booking_queue(listing_id, position);"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl BookingStore for SQLiteBookingStore {
    async fn fetch_listing(&self, listing_id: Uuid) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query(
            r#"
SELECT listing_id, creator_id, capacity, event_tier, price, active
FROM listings
WHERE listing_id = ?;
"#,
        )
        .bind(listing_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_listing(&r)?)),
            None => Ok(None),
        }
    }

    async fn save_listing(&self, listing: &Listing) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO listings (listing_id, creator_id, capacity, event_tier, price, active)
VALUES (?, ?, ?, ?, ?, ?)
ON CONFLICT(listing_id) DO UPDATE SET
    creator_id = excluded.creator_id,
    capacity = excluded.capacity,
    event_tier = excluded.event_tier,
    price = excluded.price,
    active = excluded.active;
"#,
        )
        .bind(listing.listing_id.to_string())
        .bind(listing.creator_id.to_string())
        .bind(listing.capacity as i64)
        .bind(
            listing
                .event_tier
                .map(|t| t.to_string())
                .unwrap_or_default(),
        )
        .bind(listing.price.to_string())
        .bind(listing.active as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert_booking(&self, booking: &Booking) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO bookings (
    booking_id, listing_id, creator_id, customer_id,
    status, scheduled_at_ms, created_at_ms, updated_at_ms
)
VALUES (?, ?, ?, ?, ?, ?, ?, ?);
"#,
        )
        .bind(booking.booking_id.to_string())
        .bind(booking.listing_id.to_string())
        .bind(booking.creator_id.to_string())
        .bind(booking.customer_id.to_string())
        .bind(booking.status.to_string())
        .bind(booking.scheduled_at.timestamp_millis())
        .bind(booking.created_at.timestamp_millis())
        .bind(booking.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_booking(&self, booking_id: Uuid) -> anyhow::Result<Option<Booking>> {
        let row = sqlx::query(
            r#"
SELECT booking_id, listing_id, creator_id, customer_id,
       status, scheduled_at_ms, created_at_ms, updated_at_ms
FROM bookings
WHERE booking_id = ?;
"#,
        )
        .bind(booking_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_booking(&r)?)),
            None => Ok(None),
        }
    }

    async fn update_booking_status(
        &self,
        booking_id: Uuid,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
UPDATE bookings
SET status = ?, updated_at_ms = ?
WHERE booking_id = ?;
"#,
        )
        .bind(status.to_string())
        .bind(updated_at.timestamp_millis())
        .bind(booking_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn count_active_bookings(&self, listing_id: Uuid) -> anyhow::Result<u32> {
        let row = sqlx::query(
            r#"
SELECT COUNT(*) AS n
FROM bookings
WHERE listing_id = ? AND status IN ('pending', 'confirmed');
"#,
        )
        .bind(listing_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        i64_to_u32(row.get("n"))
    }

    async fn active_queue(&self, listing_id: Uuid) -> anyhow::Result<Vec<QueueEntry>> {
        let rows = sqlx::query(
            r#"
SELECT listing_id, user_id, position, auto_booked, auto_booked_at_ms, joined_at_ms
FROM booking_queue
WHERE listing_id = ? AND auto_booked = 0
ORDER BY position ASC;
"#,
        )
        .bind(listing_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows {
            out.push(row_to_queue_entry(&r)?);
        }

        Ok(out)
    }

    async fn queue_entry(
        &self,
        listing_id: Uuid,
        user_id: Uuid,
    ) -> anyhow::Result<Option<QueueEntry>> {
        let row = sqlx::query(
            r#"
SELECT listing_id, user_id, position, auto_booked, auto_booked_at_ms, joined_at_ms
FROM booking_queue
WHERE listing_id = ? AND user_id = ? AND auto_booked = 0;
"#,
        )
        .bind(listing_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some(row_to_queue_entry(&r)?)),
            None => Ok(None),
        }
    }

    async fn insert_queue_entry(&self, entry: &QueueEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
INSERT INTO booking_queue (
    listing_id, user_id, position, auto_booked, auto_booked_at_ms, joined_at_ms
)
VALUES (?, ?, ?, ?, ?, ?);
"#,
        )
        .bind(entry.listing_id.to_string())
        .bind(entry.user_id.to_string())
        .bind(entry.position as i64)
        .bind(entry.auto_booked as i64)
        .bind(entry.auto_booked_at.map(|t| t.timestamp_millis()))
        .bind(entry.joined_at.timestamp_millis())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn shift_queue_down(&self, listing_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
UPDATE booking_queue
SET position = position + 1
WHERE listing_id = ? AND auto_booked = 0;
"#,
        )
        .bind(listing_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn renumber_queue(&self, listing_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
UPDATE booking_queue AS q
SET position = ranked.new_position
FROM (
    SELECT user_id, ROW_NUMBER() OVER (ORDER BY position) AS new_position
    FROM booking_queue
    WHERE listing_id = ?1 AND auto_booked = 0
) AS ranked
WHERE q.listing_id = ?1 AND q.auto_booked = 0 AND q.user_id = ranked.user_id;
"#,
        )
        .bind(listing_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn retire_queue_entry(
        &self,
        listing_id: Uuid,
        user_id: Uuid,
        at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
UPDATE booking_queue
SET auto_booked = 1, auto_booked_at_ms = ?
WHERE listing_id = ? AND user_id = ? AND auto_booked = 0;
"#,
        )
        .bind(at.timestamp_millis())
        .bind(listing_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/* =========================
Row mapping + conversions
========================= */

fn row_to_listing(r: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Listing> {
    let tier_label: String = r.get("event_tier");

    Ok(Listing {
        listing_id: parse_uuid(r.get("listing_id"), "listing_id")?,
        creator_id: parse_uuid(r.get("creator_id"), "creator_id")?,
        capacity: i64_to_u32(r.get("capacity"))?,
        event_tier: EventTier::parse(&tier_label),
        price: parse_money(r.get("price"))?,
        active: r.get::<i64, _>("active") == 1,
    })
}

fn row_to_booking(r: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Booking> {
    let status_str: String = r.get("status");
    let status = BookingStatus::from_str(&status_str)
        .map_err(|e| anyhow!("invalid booking status '{}': {}", status_str, e))?;

    Ok(Booking {
        booking_id: parse_uuid(r.get("booking_id"), "booking_id")?,
        listing_id: parse_uuid(r.get("listing_id"), "listing_id")?,
        creator_id: parse_uuid(r.get("creator_id"), "creator_id")?,
        customer_id: parse_uuid(r.get("customer_id"), "customer_id")?,
        status,
        scheduled_at: ms_to_utc(r.get("scheduled_at_ms"))?,
        created_at: ms_to_utc(r.get("created_at_ms"))?,
        updated_at: ms_to_utc(r.get("updated_at_ms"))?,
    })
}

fn row_to_queue_entry(r: &sqlx::sqlite::SqliteRow) -> anyhow::Result<QueueEntry> {
    Ok(QueueEntry {
        listing_id: parse_uuid(r.get("listing_id"), "listing_id")?,
        user_id: parse_uuid(r.get("user_id"), "user_id")?,
        position: i64_to_u32(r.get("position"))?,
        auto_booked: r.get::<i64, _>("auto_booked") == 1,
        auto_booked_at: r
            .get::<Option<i64>, _>("auto_booked_at_ms")
            .map(ms_to_utc)
            .transpose()?,
        joined_at: ms_to_utc(r.get("joined_at_ms"))?,
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
