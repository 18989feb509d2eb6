// Chart geometry - plotting coordinates for the dashboard line chart
use super::observation::Observation;
use super::projection::Projection;
use serde::Serialize;

const Y_AXIS_FLOOR: f64 = 1000.0;
const Y_AXIS_HEADROOM: f64 = 100.0;
const Y_AXIS_SCALE: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Seconds since the first observation.
    pub x: f64,
    pub y: f64,
}

impl ChartPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartGeometry {
    /// Epoch milliseconds of the first observation, the chart's x origin.
    pub start_ms: Option<i64>,
    pub points: Vec<ChartPoint>,
    /// Empty, or the fitted line from the first to the last point.
    pub regression_line: Vec<ChartPoint>,
    pub y_axis_max: f64,
}

impl ChartGeometry {
    /// `observations` must be the ascending series the projection was computed from.
    pub fn build(observations: &[Observation], projection: &Projection) -> Self {
        let start_ms = observations.first().map(|obs| obs.observed_at.timestamp_millis());

        let points: Vec<ChartPoint> = match start_ms {
            Some(start) => observations
                .iter()
                .map(|obs| {
                    let x = (obs.observed_at.timestamp_millis() - start) as f64 / 1000.0;
                    ChartPoint::new(x, obs.value)
                })
                .collect(),
            None => Vec::new(),
        };

        let regression_line = match (projection.regression(), points.last()) {
            (Some(model), Some(end)) if points.len() > 1 => vec![
                ChartPoint::new(0.0, model.value_at(0.0)),
                ChartPoint::new(end.x, model.value_at(end.x)),
            ],
            _ => Vec::new(),
        };

        Self {
            start_ms,
            y_axis_max: suggested_y_max(observations),
            points,
            regression_line,
        }
    }
}

fn suggested_y_max(observations: &[Observation]) -> f64 {
    observations
        .iter()
        .map(|obs| obs.value)
        .reduce(f64::max)
        .map(|max| (max * Y_AXIS_SCALE).max(max + Y_AXIS_HEADROOM))
        .unwrap_or(Y_AXIS_FLOOR)
        .max(Y_AXIS_FLOOR)
}
