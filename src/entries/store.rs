/// Entry persistence

use super::{Entry, EntryKind, NewEntry};
use crate::error::{AppError, AppResult};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Entry store service
pub struct EntryStore {
    db: SqlitePool,
}

impl EntryStore {
    /// Create a new entry store
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create an entry
    ///
    /// Free-text fields are trimmed; empty text becomes absent.
    pub async fn create(&self, new_entry: NewEntry) -> AppResult<Entry> {
        if !(new_entry.duration_secs.is_finite() && new_entry.duration_secs > 0.0) {
            return Err(AppError::Validation(
                "Duration must be a positive number of seconds".to_string(),
            ));
        }

        let entry = Entry {
            id: Uuid::new_v4().to_string(),
            account_id: new_entry.account_id,
            kind: new_entry.kind,
            duration_secs: new_entry.duration_secs,
            date: new_entry.date,
            location: normalize_text(new_entry.location),
            notes: normalize_text(new_entry.notes),
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO entry (id, account_id, kind, duration_secs, date, location, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&entry.id)
        .bind(&entry.account_id)
        .bind(entry.kind.as_str())
        .bind(entry.duration_secs)
        .bind(entry.date)
        .bind(&entry.location)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .execute(&self.db)
        .await
        .map_err(AppError::Database)?;

        Ok(entry)
    }

    /// List all entries for an account, most recently created first
    pub async fn list_for_account(&self, account_id: &str) -> AppResult<Vec<Entry>> {
        let rows = sqlx::query(
            "SELECT id, account_id, kind, duration_secs, date, location, notes, created_at
             FROM entry
             WHERE account_id = ?1
             ORDER BY created_at DESC",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await
        .map_err(AppError::Database)?;

        rows.into_iter().map(entry_from_row).collect()
    }
}

fn entry_from_row(row: sqlx::sqlite::SqliteRow) -> AppResult<Entry> {
    let kind: String = row.get("kind");
    let kind = EntryKind::parse(&kind)
        .ok_or_else(|| AppError::Internal(format!("Unknown entry kind in store: {}", kind)))?;

    Ok(Entry {
        id: row.get("id"),
        account_id: row.get("account_id"),
        kind,
        duration_secs: row.get("duration_secs"),
        date: row.get::<NaiveDate, _>("date"),
        location: row.get("location"),
        notes: row.get("notes"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
    })
}

fn normalize_text(text: Option<String>) -> Option<String> {
    text.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
