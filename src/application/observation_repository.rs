// Repository trait for fountain and observation storage
use crate::domain::fountain::Fountain;
use crate::domain::observation::ObservationRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("fountain name already exists: {0}")]
    DuplicateName(String),

    #[error("unknown fountain: {0}")]
    UnknownFountain(i64),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[async_trait]
pub trait ObservationRepository: Send + Sync {
    /// All fountains, ordered by name
    async fn list_fountains(&self) -> RepositoryResult<Vec<Fountain>>;

    /// Fails with `DuplicateName` if the name is taken
    async fn create_fountain(&self, name: &str, target: f64) -> RepositoryResult<Fountain>;

    /// Removes the fountain and its observations; returns false if it did not exist
    async fn delete_fountain(&self, id: i64) -> RepositoryResult<bool>;

    /// Observations of one fountain, ascending by `observed_at`
    async fn list_observations(&self, fountain_id: i64) -> RepositoryResult<Vec<ObservationRecord>>;

    async fn insert_observation(
        &self,
        fountain_id: i64,
        observed_at: DateTime<Utc>,
        value: f64,
    ) -> RepositoryResult<ObservationRecord>;

    async fn update_observation_value(&self, id: i64, value: f64) -> RepositoryResult<bool>;

    async fn delete_observation(&self, id: i64) -> RepositoryResult<bool>;

    /// Number of observations across all fountains
    async fn count_observations(&self) -> RepositoryResult<usize>;
}
