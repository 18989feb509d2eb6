// Observation service - Use cases for recording and editing readings
use crate::application::error::ServiceError;
use crate::application::observation_repository::ObservationRepository;
use crate::domain::dashboard::ObservationPage;
use crate::domain::fountain::select_fountain;
use crate::domain::observation::ObservationRecord;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone, Deserialize)]
pub struct BulkEdit {
    pub fountain_id: Option<i64>,
    pub delete_password: Option<String>,
    #[serde(default)]
    pub rows: Vec<BulkRow>,
}

/// One row of the edit table: either a deletion request or a new value.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkRow {
    pub id: i64,
    pub value: Option<f64>,
    #[serde(default)]
    pub delete: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BulkOutcome {
    pub updated: usize,
    pub deleted: usize,
    pub delete_denied: bool,
}

#[derive(Clone)]
pub struct ObservationService {
    repository: Arc<dyn ObservationRepository>,
    delete_password: String,
}

impl ObservationService {
    pub fn new(repository: Arc<dyn ObservationRepository>, delete_password: String) -> Self {
        Self {
            repository,
            delete_password,
        }
    }

    pub async fn list(&self, requested_id: Option<i64>) -> Result<ObservationPage, ServiceError> {
        let fountains = self.repository.list_fountains().await?;
        let selected = select_fountain(&fountains, requested_id).cloned();

        let observations = match &selected {
            Some(fountain) => self.repository.list_observations(fountain.id).await?,
            None => Vec::new(),
        };

        Ok(ObservationPage {
            fountains,
            selected,
            observations,
        })
    }

    /// Stores a reading stamped with the current time.
    pub async fn record(
        &self,
        fountain_id: Option<i64>,
        value: Option<f64>,
    ) -> Result<ObservationRecord, ServiceError> {
        let (Some(fountain_id), Some(value)) = (fountain_id, value.filter(|v| v.is_finite())) else {
            return Err(ServiceError::Invalid(
                "Please enter a valid numeric value.".to_string(),
            ));
        };

        let record = self
            .repository
            .insert_observation(fountain_id, Utc::now(), value)
            .await?;
        tracing::info!(id = record.id, fountain_id, value, "observation recorded");
        Ok(record)
    }

    /// Applies value edits and password-gated deletions.
    ///
    /// With a `fountain_id`, rows naming another fountain's observations are
    /// ignored. Rows whose deletion is refused are skipped while the rest still
    /// apply; the refusal is then reported as `Forbidden`.
    pub async fn bulk_edit(&self, edit: BulkEdit) -> Result<BulkOutcome, ServiceError> {
        let password_ok = edit.delete_password.as_deref() == Some(self.delete_password.as_str());
        let mut outcome = BulkOutcome::default();
        let mut deletes = Vec::new();
        let mut updates = Vec::new();

        let owned_ids: Option<HashSet<i64>> = match edit.fountain_id {
            Some(fountain_id) => Some(
                self.repository
                    .list_observations(fountain_id)
                    .await?
                    .iter()
                    .map(|record| record.id)
                    .collect(),
            ),
            None => None,
        };

        for row in &edit.rows {
            if owned_ids.as_ref().is_some_and(|ids| !ids.contains(&row.id)) {
                tracing::warn!(
                    id = row.id,
                    fountain_id = ?edit.fountain_id,
                    "bulk edit row outside fountain"
                );
                continue;
            }

            if row.delete {
                if password_ok {
                    deletes.push(row.id);
                } else {
                    outcome.delete_denied = true;
                }
                continue;
            }

            if let Some(value) = row.value.filter(|v| v.is_finite()) {
                updates.push((row.id, value));
            }
        }

        for id in deletes {
            if self.repository.delete_observation(id).await? {
                outcome.deleted += 1;
            }
        }

        for (id, value) in updates {
            if self.repository.update_observation_value(id, value).await? {
                outcome.updated += 1;
            }
        }

        tracing::info!(
            fountain_id = ?edit.fountain_id,
            updated = outcome.updated,
            deleted = outcome.deleted,
            delete_denied = outcome.delete_denied,
            "bulk edit applied"
        );

        if outcome.delete_denied {
            return Err(ServiceError::Forbidden(
                "Delete password incorrect. No rows were deleted.".to_string(),
            ));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory_repository::MemoryRepository;

    async fn setup() -> (ObservationService, Arc<MemoryRepository>, i64) {
        let repo = Arc::new(MemoryRepository::new());
        let fountain = repo.create_fountain("Library", 30000.0).await.unwrap();
        let service = ObservationService::new(repo.clone(), "fountain".to_string());
        (service, repo, fountain.id)
    }

    fn row(id: i64, value: Option<f64>, delete: bool) -> BulkRow {
        BulkRow { id, value, delete }
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let (service, _repo, id) = setup().await;
        service.record(Some(id), Some(12000.0)).await.unwrap();
        service.record(Some(id), Some(12500.0)).await.unwrap();

        let page = service.list(None).await.unwrap();
        assert_eq!(page.selected.unwrap().id, id);
        let values: Vec<f64> = page.observations.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![12000.0, 12500.0]);
    }

    #[tokio::test]
    async fn test_record_validation() {
        let (service, _repo, id) = setup().await;
        for (fountain_id, value) in [(Some(id), None), (Some(id), Some(f64::NAN)), (None, Some(1.0))] {
            let err = service.record(fountain_id, value).await.unwrap_err();
            assert_eq!(err.to_string(), "Please enter a valid numeric value.");
        }

        let err = service.record(Some(id + 100), Some(1.0)).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_without_fountains() {
        let service = ObservationService::new(Arc::new(MemoryRepository::new()), String::new());
        let page = service.list(Some(1)).await.unwrap();
        assert!(page.selected.is_none());
        assert!(page.observations.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_edit_with_password() {
        let (service, repo, id) = setup().await;
        let a = service.record(Some(id), Some(1.0)).await.unwrap();
        let b = service.record(Some(id), Some(2.0)).await.unwrap();

        let outcome = service
            .bulk_edit(BulkEdit {
                fountain_id: Some(id),
                delete_password: Some("fountain".to_string()),
                rows: vec![row(a.id, Some(10.0), false), row(b.id, None, true)],
            })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            BulkOutcome {
                updated: 1,
                deleted: 1,
                delete_denied: false
            }
        );
        let remaining = repo.list_observations(id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].value, 10.0);
    }

    #[tokio::test]
    async fn test_bulk_edit_wrong_password_still_updates() {
        let (service, repo, id) = setup().await;
        let a = service.record(Some(id), Some(1.0)).await.unwrap();
        let b = service.record(Some(id), Some(2.0)).await.unwrap();

        let err = service
            .bulk_edit(BulkEdit {
                fountain_id: Some(id),
                delete_password: Some("nope".to_string()),
                rows: vec![row(a.id, Some(5.0), false), row(b.id, None, true)],
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Delete password incorrect. No rows were deleted.");
        let values: Vec<f64> = repo
            .list_observations(id)
            .await
            .unwrap()
            .iter()
            .map(|o| o.value)
            .collect();
        assert_eq!(values, vec![5.0, 2.0]);
    }

    #[tokio::test]
    async fn test_bulk_edit_stays_within_fountain() {
        let (service, repo, id) = setup().await;
        let other = repo.create_fountain("Annex", 30000.0).await.unwrap();
        let own = service.record(Some(id), Some(1.0)).await.unwrap();
        let foreign = service.record(Some(other.id), Some(2.0)).await.unwrap();

        let outcome = service
            .bulk_edit(BulkEdit {
                fountain_id: Some(id),
                delete_password: Some("fountain".to_string()),
                rows: vec![
                    row(own.id, Some(11.0), false),
                    row(foreign.id, Some(99.0), false),
                    row(foreign.id, None, true),
                ],
            })
            .await
            .unwrap();

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.deleted, 0);
        let foreign_rows = repo.list_observations(other.id).await.unwrap();
        assert_eq!(foreign_rows.len(), 1);
        assert_eq!(foreign_rows[0].value, 2.0);
        assert_eq!(repo.list_observations(id).await.unwrap()[0].value, 11.0);
    }

    #[tokio::test]
    async fn test_bulk_edit_without_fountain_uses_global_ids() {
        let (service, repo, id) = setup().await;
        let record = service.record(Some(id), Some(1.0)).await.unwrap();

        let outcome = service
            .bulk_edit(BulkEdit {
                fountain_id: None,
                delete_password: None,
                rows: vec![row(record.id, Some(7.0), false)],
            })
            .await
            .unwrap();

        assert_eq!(outcome.updated, 1);
        assert_eq!(repo.list_observations(id).await.unwrap()[0].value, 7.0);
    }
}
