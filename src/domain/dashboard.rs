// Dashboard domain model
use super::chart::ChartGeometry;
use super::fountain::Fountain;
use super::observation::ObservationRecord;
use super::projection::Projection;
use serde::Serialize;

pub const DASHBOARD_TITLE: &str = "Water Fountain Tracker";

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub title: String,
    pub fountains: Vec<Fountain>,
    pub selected: Option<Fountain>,
    pub target: f64,
    pub projection: Projection,
    pub chart: ChartGeometry,
}

impl Dashboard {
    pub fn new(
        fountains: Vec<Fountain>,
        selected: Option<Fountain>,
        target: f64,
        projection: Projection,
        chart: ChartGeometry,
    ) -> Self {
        Self {
            title: DASHBOARD_TITLE.to_string(),
            fountains,
            selected,
            target,
            projection,
            chart,
        }
    }
}

/// Observations of the selected fountain, for the management view.
#[derive(Debug, Clone, Serialize)]
pub struct ObservationPage {
    pub fountains: Vec<Fountain>,
    pub selected: Option<Fountain>,
    pub observations: Vec<ObservationRecord>,
}
