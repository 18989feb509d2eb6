// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::fountain_service::FountainService;
use crate::application::observation_service::ObservationService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub fountain_service: FountainService,
    pub observation_service: ObservationService,
}
