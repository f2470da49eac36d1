//! Health severity ladder.

use serde::Serialize;

/// Severity of a health check, ordered `Healthy < Degraded < Unhealthy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// The more severe of the two.
    pub fn worst_of(self, other: Self) -> Self {
        self.max(other)
    }

    /// Never more severe than `ceiling`.
    pub fn capped_at(self, ceiling: Self) -> Self {
        self.min(ceiling)
    }

    /// Worst status of a sequence; `Healthy` when empty.
    pub fn worst<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        statuses
            .into_iter()
            .fold(Self::Healthy, Self::worst_of)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;
    use HealthStatus::*;

    #[test_case(Healthy, Healthy, Healthy)]
    #[test_case(Healthy, Degraded, Degraded)]
    #[test_case(Degraded, Unhealthy, Unhealthy)]
    #[test_case(Unhealthy, Healthy, Unhealthy)]
    fn test_worst_of(a: HealthStatus, b: HealthStatus, expected: HealthStatus) {
        assert_eq!(a.worst_of(b), expected);
    }

    #[test]
    fn test_capped_at_degraded() {
        assert_eq!(Unhealthy.capped_at(Degraded), Degraded);
        assert_eq!(Degraded.capped_at(Degraded), Degraded);
        assert_eq!(Healthy.capped_at(Degraded), Healthy);
    }

    #[test]
    fn test_worst_of_empty_is_healthy() {
        assert_eq!(HealthStatus::worst(Vec::new()), Healthy);
        assert_eq!(HealthStatus::worst([Healthy, Degraded, Healthy]), Degraded);
    }

    #[test]
    fn test_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Degraded).unwrap(), "\"degraded\"");
    }
}
