// Dashboard service - Use case for building a fountain's projection dashboard
use crate::application::error::ServiceError;
use crate::application::observation_repository::ObservationRepository;
use crate::domain::chart::ChartGeometry;
use crate::domain::dashboard::Dashboard;
use crate::domain::fountain::{effective_target, select_fountain};
use crate::domain::observation::Observation;
use crate::domain::projection::compute_projection;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    repository: Arc<dyn ObservationRepository>,
    default_target: f64,
}

impl DashboardService {
    pub fn new(repository: Arc<dyn ObservationRepository>, default_target: f64) -> Self {
        Self {
            repository,
            default_target,
        }
    }

    pub async fn get_dashboard(&self, requested_id: Option<i64>) -> Result<Dashboard, ServiceError> {
        self.get_dashboard_at(requested_id, Utc::now()).await
    }

    /// Builds the dashboard with `now` as the evaluation wall clock.
    pub async fn get_dashboard_at(
        &self,
        requested_id: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<Dashboard, ServiceError> {
        let fountains = self.repository.list_fountains().await?;
        let selected = select_fountain(&fountains, requested_id).cloned();

        let observations: Vec<Observation> = match &selected {
            Some(fountain) => self
                .repository
                .list_observations(fountain.id)
                .await?
                .iter()
                .map(|record| record.observation())
                .collect(),
            None => Vec::new(),
        };

        let target = effective_target(selected.as_ref(), self.default_target);
        let projection = compute_projection(&observations, target, now);
        let chart = ChartGeometry::build(&observations, &projection);

        tracing::debug!(
            fountain_id = ?selected.as_ref().map(|f| f.id),
            observations = observations.len(),
            target,
            has_projection = projection.has_projection(),
            reason = projection.message(),
            "dashboard computed"
        );

        Ok(Dashboard::new(fountains, selected, target, projection, chart))
    }
}
