// Fountain domain model
use serde::Serialize;

/// Target used when a fountain has none, or an unusable one.
pub const DEFAULT_TARGET: f64 = 30000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fountain {
    pub id: i64,
    pub name: String,
    pub target: f64,
}

impl Fountain {
    pub fn new(id: i64, name: String, target: f64) -> Self {
        Self { id, name, target }
    }
}

/// Picks the requested fountain, falling back to the first one listed.
pub fn select_fountain(fountains: &[Fountain], requested_id: Option<i64>) -> Option<&Fountain> {
    requested_id
        .and_then(|id| fountains.iter().find(|f| f.id == id))
        .or_else(|| fountains.first())
}

/// The value the projection solves for.
pub fn effective_target(fountain: Option<&Fountain>, default: f64) -> f64 {
    fountain
        .map(|f| f.target)
        .filter(|target| target.is_finite())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fountains() -> Vec<Fountain> {
        vec![
            Fountain::new(3, "East Lobby".to_string(), 25000.0),
            Fountain::new(1, "Gym".to_string(), 40000.0),
        ]
    }

    #[test]
    fn test_select_requested_fountain() {
        let fountains = fountains();
        assert_eq!(select_fountain(&fountains, Some(1)).unwrap().name, "Gym");
    }

    #[test]
    fn test_select_falls_back_to_first() {
        let fountains = fountains();
        assert_eq!(select_fountain(&fountains, Some(99)).unwrap().id, 3);
        assert_eq!(select_fountain(&fountains, None).unwrap().id, 3);
        assert!(select_fountain(&[], Some(1)).is_none());
    }

    #[test]
    fn test_effective_target() {
        let gym = Fountain::new(1, "Gym".to_string(), 40000.0);
        assert_eq!(effective_target(Some(&gym), DEFAULT_TARGET), 40000.0);
        assert_eq!(effective_target(None, DEFAULT_TARGET), DEFAULT_TARGET);

        let broken = Fountain::new(2, "Broken".to_string(), f64::NAN);
        assert_eq!(effective_target(Some(&broken), DEFAULT_TARGET), DEFAULT_TARGET);
    }
}
