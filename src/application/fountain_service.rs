// Fountain service - Use cases for listing, creating and deleting fountains
use crate::application::error::ServiceError;
use crate::application::observation_repository::ObservationRepository;
use crate::domain::fountain::Fountain;
use std::sync::Arc;

#[derive(Clone)]
pub struct FountainService {
    repository: Arc<dyn ObservationRepository>,
    delete_password: String,
}

impl FountainService {
    pub fn new(repository: Arc<dyn ObservationRepository>, delete_password: String) -> Self {
        Self {
            repository,
            delete_password,
        }
    }

    pub async fn list_fountains(&self) -> Result<Vec<Fountain>, ServiceError> {
        Ok(self.repository.list_fountains().await?)
    }

    pub async fn create_fountain(
        &self,
        name: Option<&str>,
        target: Option<f64>,
    ) -> Result<Fountain, ServiceError> {
        let name = name.map(str::trim).unwrap_or_default();
        let target = match target {
            Some(target) if target.is_finite() && !name.is_empty() => target,
            _ => {
                return Err(ServiceError::Invalid(
                    "Please enter a valid name and target.".to_string(),
                ));
            }
        };

        let fountain = self.repository.create_fountain(name, target).await?;
        tracing::info!(id = fountain.id, name = %fountain.name, target, "fountain created");
        Ok(fountain)
    }

    pub async fn delete_fountain(&self, id: i64, password: Option<&str>) -> Result<(), ServiceError> {
        if password != Some(self.delete_password.as_str()) {
            tracing::warn!(id, "fountain delete refused");
            return Err(ServiceError::Forbidden(
                "Delete password incorrect. Fountain was not deleted.".to_string(),
            ));
        }

        if self.repository.delete_fountain(id).await? {
            tracing::info!(id, "fountain deleted");
        }
        Ok(())
    }
}
