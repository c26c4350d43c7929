//! `SQLite` implementation of the `JobStore` trait.
//!
//! Records are stored as JSON blobs in the `(pk, sk)` key-value table.
//! Each record has a single writer (the worker owning the job), so
//! read-modify-write updates need no row locking.

use async_trait::async_trait;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use tracing::warn;

use podcaster_core::{JobId, JobPage, JobRecord, JobStore, JobStoreError, JobUpdate};

/// Sort key for the job metadata item.
const SK_METADATA: &str = "METADATA";

/// `SQLite`-backed job store.
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Create a store over an initialized pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn pk(id: &JobId) -> String {
        format!("PODCAST#{id}")
    }

    async fn read_record(&self, id: &JobId) -> Result<Option<JobRecord>, JobStoreError> {
        let row = sqlx::query("SELECT payload FROM podcast_items WHERE pk = ? AND sk = ?")
            .bind(Self::pk(id))
            .bind(SK_METADATA)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| JobStoreError::Storage(e.to_string()))?;

        match row {
            Some(r) => {
                let json: String = r.get("payload");
                let record = serde_json::from_str(&json)
                    .map_err(|e| JobStoreError::Storage(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn write_record(&self, record: &JobRecord) -> Result<(), JobStoreError> {
        let json =
            serde_json::to_string(record).map_err(|e| JobStoreError::Storage(e.to_string()))?;

        sqlx::query(
            "INSERT OR REPLACE INTO podcast_items (pk, sk, payload, created_at) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(Self::pk(&record.id))
        .bind(SK_METADATA)
        .bind(&json)
        .bind(timestamp(record.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| JobStoreError::Storage(e.to_string()))?;

        Ok(())
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Opaque list cursor: base64 of `created_at|pk`.
fn encode_cursor(created_at: &str, pk: &str) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(format!("{created_at}|{pk}"))
}

fn decode_cursor(cursor: &str) -> Option<(String, String)> {
    let raw = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(cursor)
        .ok()?;
    let raw = String::from_utf8(raw).ok()?;
    let (created_at, pk) = raw.split_once('|')?;
    Some((created_at.to_string(), pk.to_string()))
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn create(&self, job: &JobRecord) -> Result<(), JobStoreError> {
        self.write_record(job).await
    }

    async fn update(&self, id: &JobId, update: JobUpdate) -> Result<(), JobStoreError> {
        let mut record = self
            .read_record(id)
            .await?
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        record.apply(&update);
        self.write_record(&record).await
    }

    async fn get(&self, id: &JobId) -> Result<Option<JobRecord>, JobStoreError> {
        self.read_record(id).await
    }

    async fn list(&self, limit: u32, cursor: Option<&str>) -> Result<JobPage, JobStoreError> {
        let limit = limit.clamp(1, 100) as i64;

        // An invalid cursor restarts from the top rather than erroring.
        let position = cursor.and_then(|c| {
            let decoded = decode_cursor(c);
            if decoded.is_none() {
                warn!(cursor = c, "ignoring malformed list cursor");
            }
            decoded
        });

        let rows = match position {
            Some((created_at, pk)) => {
                sqlx::query(
                    "SELECT payload, created_at, pk FROM podcast_items \
                     WHERE sk = ? AND (created_at < ? OR (created_at = ? AND pk < ?)) \
                     ORDER BY created_at DESC, pk DESC LIMIT ?",
                )
                .bind(SK_METADATA)
                .bind(&created_at)
                .bind(&created_at)
                .bind(&pk)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(
                    "SELECT payload, created_at, pk FROM podcast_items \
                     WHERE sk = ? ORDER BY created_at DESC, pk DESC LIMIT ?",
                )
                .bind(SK_METADATA)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(|e| JobStoreError::Storage(e.to_string()))?;

        let mut jobs = Vec::with_capacity(rows.len());
        let mut last_key: Option<(String, String)> = None;
        for row in &rows {
            let json: String = row.get("payload");
            let record: JobRecord = serde_json::from_str(&json)
                .map_err(|e| JobStoreError::Storage(e.to_string()))?;
            jobs.push(record);
            last_key = Some((row.get("created_at"), row.get("pk")));
        }

        let next_cursor = if rows.len() as i64 == limit {
            last_key.map(|(created_at, pk)| encode_cursor(&created_at, &pk))
        } else {
            None
        };

        Ok(JobPage { jobs, next_cursor })
    }

    async fn increment_play_count(&self, id: &JobId) -> Result<(), JobStoreError> {
        let mut record = self
            .read_record(id)
            .await?
            .ok_or_else(|| JobStoreError::NotFound(id.to_string()))?;
        record.play_count += 1;
        self.write_record(&record).await
    }
}
