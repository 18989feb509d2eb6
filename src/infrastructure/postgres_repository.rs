// Postgres repository implementation
use crate::application::observation_repository::{
    ObservationRepository, RepositoryError, RepositoryResult,
};
use crate::domain::fountain::Fountain;
use crate::domain::observation::ObservationRecord;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;

/// Idempotent schema setup, run on every startup.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS fountains (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        target NUMERIC NOT NULL DEFAULT 30000
    )",
    "CREATE TABLE IF NOT EXISTS observations (
        id SERIAL PRIMARY KEY,
        observed_at TIMESTAMPTZ NOT NULL,
        value NUMERIC NOT NULL
    )",
    "ALTER TABLE observations
        ADD COLUMN IF NOT EXISTS fountain_id INTEGER REFERENCES fountains(id) ON DELETE CASCADE",
    "CREATE INDEX IF NOT EXISTS observations_fountain_time_idx
        ON observations (fountain_id, observed_at)",
];

// Columns are cast so rows decode into i64 / f64 whatever the stored numeric type
const FOUNTAIN_COLUMNS: &str = "id::int8 AS id, name, target::float8 AS target";
const OBSERVATION_COLUMNS: &str =
    "id::int8 AS id, fountain_id::int8 AS fountain_id, observed_at, value::float8 AS value";

#[derive(Debug, FromRow)]
struct FountainRow {
    id: i64,
    name: String,
    target: f64,
}

impl From<FountainRow> for Fountain {
    fn from(row: FountainRow) -> Self {
        Fountain::new(row.id, row.name, row.target)
    }
}

#[derive(Debug, FromRow)]
struct ObservationRow {
    id: i64,
    fountain_id: i64,
    observed_at: DateTime<Utc>,
    value: f64,
}

impl From<ObservationRow> for ObservationRecord {
    fn from(row: ObservationRow) -> Self {
        ObservationRecord::new(row.id, row.fountain_id, row.observed_at, row.value)
    }
}

fn backend(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Backend(err.into())
}

#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Opens the pool and makes sure the tables exist.
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to Postgres")?;

        let repository = Self { pool };
        repository.ensure_schema().await?;
        Ok(repository)
    }

    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        for &statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to apply schema statement: {statement}"))?;
        }
        tracing::debug!("database schema ready");
        Ok(())
    }
}

#[async_trait]
impl ObservationRepository for PostgresRepository {
    async fn list_fountains(&self) -> RepositoryResult<Vec<Fountain>> {
        let rows = sqlx::query_as::<_, FountainRow>(&format!(
            "SELECT {FOUNTAIN_COLUMNS} FROM fountains ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Fountain::from).collect())
    }

    async fn create_fountain(&self, name: &str, target: f64) -> RepositoryResult<Fountain> {
        let row = sqlx::query_as::<_, FountainRow>(&format!(
            "INSERT INTO fountains (name, target) VALUES ($1, $2) RETURNING {FOUNTAIN_COLUMNS}"
        ))
        .bind(name)
        .bind(target)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if err.as_database_error().is_some_and(|db| db.is_unique_violation()) {
                RepositoryError::DuplicateName(name.to_string())
            } else {
                backend(err)
            }
        })?;

        tracing::debug!(id = row.id, name, "created fountain");
        Ok(row.into())
    }

    async fn delete_fountain(&self, id: i64) -> RepositoryResult<bool> {
        // Explicit, since tables created before the fountain_id column may lack the cascade
        let mut tx = self.pool.begin().await.map_err(backend)?;

        sqlx::query("DELETE FROM observations WHERE fountain_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?;
        let deleted = sqlx::query("DELETE FROM fountains WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend)?
            .rows_affected();

        tx.commit().await.map_err(backend)?;
        Ok(deleted > 0)
    }

    async fn list_observations(&self, fountain_id: i64) -> RepositoryResult<Vec<ObservationRecord>> {
        let rows = sqlx::query_as::<_, ObservationRow>(&format!(
            "SELECT {OBSERVATION_COLUMNS} FROM observations \
             WHERE fountain_id = $1 ORDER BY observed_at ASC, id ASC"
        ))
        .bind(fountain_id)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(ObservationRecord::from).collect())
    }

    async fn insert_observation(
        &self,
        fountain_id: i64,
        observed_at: DateTime<Utc>,
        value: f64,
    ) -> RepositoryResult<ObservationRecord> {
        let row = sqlx::query_as::<_, ObservationRow>(&format!(
            "INSERT INTO observations (observed_at, value, fountain_id) VALUES ($1, $2, $3) \
             RETURNING {OBSERVATION_COLUMNS}"
        ))
        .bind(observed_at)
        .bind(value)
        .bind(fountain_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|db| db.is_foreign_key_violation())
            {
                RepositoryError::UnknownFountain(fountain_id)
            } else {
                backend(err)
            }
        })?;

        Ok(row.into())
    }

    async fn update_observation_value(&self, id: i64, value: f64) -> RepositoryResult<bool> {
        let result = sqlx::query("UPDATE observations SET value = $1 WHERE id = $2")
            .bind(value)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_observation(&self, id: i64) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM observations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(backend)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_observations(&self) -> RepositoryResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM observations")
            .fetch_one(&self.pool)
            .await
            .map_err(backend)?;
        Ok(usize::try_from(count).context("negative observation count")?)
    }
}
