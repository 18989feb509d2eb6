// Seed loader - fills an empty store from a CSV of readings
use crate::application::observation_repository::ObservationRepository;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::path::Path;

/// Parses `timestamp,value` lines, skipping any that do not parse.
pub fn parse_seed_csv(csv: &str) -> Vec<(DateTime<Utc>, f64)> {
    csv.lines()
        .filter_map(|line| {
            let (observed_at, value) = line.split_once(',')?;
            let observed_at = parse_timestamp(observed_at.trim())?;
            let value = value.trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
            Some((observed_at, value))
        })
        .collect()
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Loads the seed file into `fountain_name` when the store has no observations yet.
///
/// Returns the number of readings inserted.
pub async fn seed_if_empty(
    repository: &dyn ObservationRepository,
    path: &Path,
    fountain_name: &str,
    target: f64,
) -> Result<usize> {
    if repository.count_observations().await? > 0 {
        return Ok(0);
    }

    let exists = tokio::fs::try_exists(path)
        .await
        .with_context(|| format!("Failed to check seed file {}", path.display()))?;
    if !exists {
        tracing::info!(path = %path.display(), "no seed file, starting empty");
        return Ok(0);
    }

    let csv = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {}", path.display()))?;
    let readings = parse_seed_csv(&csv);
    if readings.is_empty() {
        return Ok(0);
    }

    let existing = repository
        .list_fountains()
        .await?
        .into_iter()
        .find(|f| f.name == fountain_name);
    let fountain = match existing {
        Some(fountain) => fountain,
        None => repository.create_fountain(fountain_name, target).await?,
    };

    for (observed_at, value) in &readings {
        repository
            .insert_observation(fountain.id, *observed_at, *value)
            .await?;
    }

    tracing::info!(
        fountain = %fountain.name,
        count = readings.len(),
        "seeded observations"
    );
    Ok(readings.len())
}
