//! SQLite provider over a `work_history` table.
//!
//! Same lookup rules as the in-process providers, expressed as `LIKE`
//! filters. SQLite's `LIKE` folds ASCII case only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use workmatch_core::{CandidateProvider, CandidateRecord, FieldQuery, ProviderError};

pub struct SqliteCandidates {
    pool: SqlitePool,
}

impl SqliteCandidates {
    /// Open (creating if needed) the database at `path`. `"sqlite::memory:"` works for tests.
    pub async fn open(path: &str) -> Result<Self, ProviderError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| ProviderError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| ProviderError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let provider = Self::from_pool(pool).await?;
        info!("SQLite work history opened at {path}");
        Ok(provider)
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, ProviderError> {
        let provider = Self { pool };
        provider.run_migrations().await?;
        Ok(provider)
    }

    async fn run_migrations(&self) -> Result<(), ProviderError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS work_history (
                id            INTEGER PRIMARY KEY AUTOINCREMENT,
                item_id       TEXT NOT NULL,
                process       TEXT NOT NULL DEFAULT '',
                location      TEXT NOT NULL DEFAULT '',
                cost_center   TEXT,
                equipment_type TEXT NOT NULL DEFAULT '',
                status_code   TEXT NOT NULL DEFAULT '',
                priority      TEXT NOT NULL DEFAULT '일반작업',
                work_title    TEXT,
                work_details  TEXT,
                recorded_at   TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ProviderError::MigrationFailed(format!("work_history table: {e}")))?;

        for (name, column) in [
            ("idx_work_history_item_id", "item_id"),
            ("idx_work_history_location", "location"),
            ("idx_work_history_equipment_type", "equipment_type"),
            ("idx_work_history_status_code", "status_code"),
            ("idx_work_history_recorded_at", "recorded_at DESC"),
        ] {
            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {name} ON work_history({column})"
            ))
            .execute(&self.pool)
            .await
            .map_err(|e| ProviderError::MigrationFailed(format!("{name}: {e}")))?;
        }

        debug!("SQLite migrations complete");
        Ok(())
    }

    pub async fn insert(&self, record: &CandidateRecord) -> Result<(), ProviderError> {
        sqlx::query(
            r#"
            INSERT INTO work_history
                (item_id, process, location, cost_center, equipment_type, status_code,
                 priority, work_title, work_details, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&record.item_id)
        .bind(&record.process)
        .bind(&record.location)
        .bind(&record.cost_center)
        .bind(&record.equipment_type)
        .bind(&record.status_code)
        .bind(&record.priority)
        .bind(&record.work_title)
        .bind(&record.work_details)
        .bind(record.recorded_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(|e| ProviderError::Storage(format!("INSERT failed: {e}")))?;

        debug!(item_id = %record.item_id, "Stored work record");
        Ok(())
    }

    pub async fn count(&self) -> Result<usize, ProviderError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM work_history")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ProviderError::QueryFailed(format!("COUNT failed: {e}")))?;
        let n: i64 = row
            .try_get("n")
            .map_err(|e| ProviderError::QueryFailed(format!("count column: {e}")))?;
        Ok(n.max(0) as usize)
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<CandidateRecord, ProviderError> {
        fn col<'r, T>(row: &'r sqlx::sqlite::SqliteRow, name: &str) -> Result<T, ProviderError>
        where
            T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
        {
            row.try_get(name)
                .map_err(|e| ProviderError::QueryFailed(format!("{name} column: {e}")))
        }

        let recorded_at: Option<String> = col(row, "recorded_at")?;
        let recorded_at = recorded_at.and_then(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        Ok(CandidateRecord {
            item_id: col(row, "item_id")?,
            process: col(row, "process")?,
            location: col(row, "location")?,
            cost_center: col(row, "cost_center")?,
            equipment_type: col(row, "equipment_type")?,
            status_code: col(row, "status_code")?,
            priority: col(row, "priority")?,
            work_title: col(row, "work_title")?,
            work_details: col(row, "work_details")?,
            recorded_at,
        })
    }
}

/// `%value%` with LIKE wildcards in the value escaped.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

const SELECT_COLUMNS: &str = "SELECT item_id, process, location, cost_center, equipment_type, \
     status_code, priority, work_title, work_details, recorded_at FROM work_history";

#[async_trait]
impl CandidateProvider for SqliteCandidates {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn query_by_fields(&self, query: &FieldQuery) -> Result<Vec<CandidateRecord>, ProviderError> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE 1=1");
        let mut params: Vec<String> = Vec::new();

        let location = present(&query.location).map(like_pattern);
        if let Some(pattern) = &location {
            sql.push_str(" AND (location LIKE ? ESCAPE '\\' OR process LIKE ? ESCAPE '\\')");
            params.push(pattern.clone());
            params.push(pattern.clone());
        }
        for (column, value) in [
            ("equipment_type", &query.equipment_type),
            ("status_code", &query.status_code),
            ("priority", &query.priority),
        ] {
            if let Some(value) = present(value) {
                sql.push_str(&format!(" AND {column} LIKE ? ESCAPE '\\'"));
                params.push(like_pattern(value));
            }
        }

        match &location {
            Some(pattern) => {
                sql.push_str(
                    " ORDER BY CASE WHEN location LIKE ? ESCAPE '\\' THEN 0 ELSE 1 END, recorded_at DESC, id DESC LIMIT ?",
                );
                params.push(pattern.clone());
            }
            None => sql.push_str(" ORDER BY recorded_at DESC, id DESC LIMIT ?"),
        }

        let mut db_query = sqlx::query(&sql);
        for param in &params {
            db_query = db_query.bind(param);
        }
        let rows = db_query
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ProviderError::QueryFailed(format!("Field search: {e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn query_by_item_id(
        &self,
        item_id: &str,
        limit: usize,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        if item_id.trim().is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "{SELECT_COLUMNS} WHERE item_id LIKE ?1 ESCAPE '\\' ORDER BY recorded_at DESC, id DESC LIMIT ?2"
        );
        let rows = sqlx::query(&sql)
            .bind(like_pattern(item_id))
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ProviderError::QueryFailed(format!("Item search: {e}")))?;

        rows.iter().map(Self::row_to_record).collect()
    }
}
