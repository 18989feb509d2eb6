// In-process repository implementation
use crate::application::observation_repository::{
    ObservationRepository, RepositoryError, RepositoryResult,
};
use crate::domain::fountain::Fountain;
use crate::domain::observation::ObservationRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    fountains: Vec<Fountain>,
    observations: Vec<ObservationRecord>,
    next_fountain_id: i64,
    next_observation_id: i64,
}

/// Keeps fountains and observations in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ObservationRepository for MemoryRepository {
    async fn list_fountains(&self) -> RepositoryResult<Vec<Fountain>> {
        let tables = self.tables.read().await;
        let mut fountains = tables.fountains.clone();
        fountains.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(fountains)
    }

    async fn create_fountain(&self, name: &str, target: f64) -> RepositoryResult<Fountain> {
        let mut tables = self.tables.write().await;
        if tables.fountains.iter().any(|f| f.name == name) {
            return Err(RepositoryError::DuplicateName(name.to_string()));
        }

        tables.next_fountain_id += 1;
        let fountain = Fountain::new(tables.next_fountain_id, name.to_string(), target);
        tables.fountains.push(fountain.clone());

        tracing::debug!(id = fountain.id, name, "created fountain");
        Ok(fountain)
    }

    async fn delete_fountain(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.fountains.len();
        tables.fountains.retain(|f| f.id != id);
        if tables.fountains.len() == before {
            return Ok(false);
        }

        tables.observations.retain(|o| o.fountain_id != id);
        Ok(true)
    }

    async fn list_observations(&self, fountain_id: i64) -> RepositoryResult<Vec<ObservationRecord>> {
        let tables = self.tables.read().await;
        let mut observations: Vec<ObservationRecord> = tables
            .observations
            .iter()
            .filter(|o| o.fountain_id == fountain_id)
            .cloned()
            .collect();

        // Stable, so equal timestamps keep insertion order
        observations.sort_by_key(|o| o.observed_at);
        Ok(observations)
    }

    async fn insert_observation(
        &self,
        fountain_id: i64,
        observed_at: DateTime<Utc>,
        value: f64,
    ) -> RepositoryResult<ObservationRecord> {
        let mut tables = self.tables.write().await;
        if !tables.fountains.iter().any(|f| f.id == fountain_id) {
            return Err(RepositoryError::UnknownFountain(fountain_id));
        }

        tables.next_observation_id += 1;
        let record = ObservationRecord::new(tables.next_observation_id, fountain_id, observed_at, value);
        tables.observations.push(record.clone());
        Ok(record)
    }

    async fn update_observation_value(&self, id: i64, value: f64) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        match tables.observations.iter_mut().find(|o| o.id == id) {
            Some(record) => {
                record.value = value;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_observation(&self, id: i64) -> RepositoryResult<bool> {
        let mut tables = self.tables.write().await;
        let before = tables.observations.len();
        tables.observations.retain(|o| o.id != id);
        Ok(tables.observations.len() != before)
    }

    async fn count_observations(&self) -> RepositoryResult<usize> {
        Ok(self.tables.read().await.observations.len())
    }
}
