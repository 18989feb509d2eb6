// Projection engine - least-squares trend and target crossing estimate
use super::observation::Observation;
use chrono::{DateTime, Utc};
use serde::Serialize;

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
const PROJECTED_DATE_FORMAT: &str = "%b %-d, %Y";

const INSUFFICIENT_DATA: &str = "Projection not available with fewer than 2 observations.";
const NO_TIME_SPREAD: &str = "Cannot estimate projection with current data.";

/// Fitted line in a basis of seconds elapsed since `t0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegressionModel {
    /// Units of value per second.
    pub slope: f64,
    /// Fitted value at `t0`.
    pub intercept: f64,
    pub t0: DateTime<Utc>,
}

impl RegressionModel {
    pub fn value_at(&self, seconds: f64) -> f64 {
        self.intercept + self.slope * seconds
    }

    /// Seconds since `t0` at which the line reaches `target`.
    pub fn seconds_to_reach(&self, target: f64) -> f64 {
        (target - self.intercept) / self.slope
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Projection {
    /// Not enough distinct points in time to fit a line.
    NoRegression { message: String },
    /// A line was fit, but it never reaches the target going forward.
    RegressionNoProjection {
        regression: RegressionModel,
        message: String,
    },
    RegressionWithProjection {
        regression: RegressionModel,
        projected_at: DateTime<Utc>,
        projected_date: String,
        days_remaining: i64,
    },
}

impl Projection {
    pub fn regression(&self) -> Option<&RegressionModel> {
        match self {
            Projection::NoRegression { .. } => None,
            Projection::RegressionNoProjection { regression, .. }
            | Projection::RegressionWithProjection { regression, .. } => Some(regression),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Projection::NoRegression { message }
            | Projection::RegressionNoProjection { message, .. } => Some(message),
            Projection::RegressionWithProjection { .. } => None,
        }
    }

    pub fn has_projection(&self) -> bool {
        matches!(self, Projection::RegressionWithProjection { .. })
    }
}

/// Fits `value ~ time` by ordinary least squares and solves for `target`.
///
/// `observations` must be sorted ascending by `observed_at` and hold finite
/// values; neither is checked here. `now` only feeds `days_remaining`.
pub fn compute_projection(
    observations: &[Observation],
    target: f64,
    now: DateTime<Utc>,
) -> Projection {
    let (first, last) = match observations {
        [first, .., last] => (first, last),
        _ => {
            return Projection::NoRegression {
                message: INSUFFICIENT_DATA.to_string(),
            };
        }
    };

    let t0 = first.observed_at;
    let n = observations.len() as f64;
    let times: Vec<f64> = observations
        .iter()
        .map(|obs| seconds_between(t0, obs.observed_at))
        .collect();

    let mean_t = times.iter().sum::<f64>() / n;
    let mean_y = observations.iter().map(|obs| obs.value).sum::<f64>() / n;

    let (numerator, denominator) = times.iter().zip(observations).fold(
        (0.0, 0.0),
        |(num, den), (t, obs)| {
            let t_diff = t - mean_t;
            (num + t_diff * (obs.value - mean_y), den + t_diff * t_diff)
        },
    );

    if denominator == 0.0 {
        return Projection::NoRegression {
            message: NO_TIME_SPREAD.to_string(),
        };
    }

    let slope = numerator / denominator;
    let regression = RegressionModel {
        slope,
        intercept: mean_y - slope * mean_t,
        t0,
    };

    if slope <= 0.0 {
        return unreachable_target(regression, target);
    }

    let projected_ms =
        t0.timestamp_millis() as f64 + regression.seconds_to_reach(target) * MS_PER_SECOND;
    if projected_ms < last.observed_at.timestamp_millis() as f64 {
        return unreachable_target(regression, target);
    }

    let Some(projected_at) = DateTime::from_timestamp_millis(projected_ms.round() as i64) else {
        tracing::debug!(projected_ms, "projected date outside calendar range");
        return unreachable_target(regression, target);
    };

    // halves round up
    let days_remaining =
        ((projected_ms - now.timestamp_millis() as f64) / MS_PER_DAY + 0.5).floor() as i64;

    Projection::RegressionWithProjection {
        regression,
        projected_at,
        projected_date: projected_at.format(PROJECTED_DATE_FORMAT).to_string(),
        days_remaining,
    }
}

fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MS_PER_SECOND
}

fn unreachable_target(regression: RegressionModel, target: f64) -> Projection {
    Projection::RegressionNoProjection {
        regression,
        message: format!("Cannot estimate date to reach {target} with current data."),
    }
}
