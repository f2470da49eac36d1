//! Individual health probes.
//!
//! Probes never fail: infrastructure errors become a status on the
//! returned [`CheckResult`].

use std::time::Instant;

use serde::Serialize;
use serde_json::{json, Value};
use sqlx::AnyPool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::HealthStatus;
use crate::infrastructure::cache::{keys, Cache};
use crate::infrastructure::registry::{names, ServiceRegistry};
use crate::shared::error::AppError;

/// Tables counted by the database probe.
const COUNTED_TABLES: [&str; 3] = ["users", "classes", "enrollments"];

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub status: HealthStatus,
    pub description: String,
    pub duration_ms: u64,
    pub data: Value,
}

impl CheckResult {
    fn new(status: HealthStatus, description: impl Into<String>, started: Instant, data: Value) -> Self {
        Self {
            status,
            description: description.into(),
            duration_ms: started.elapsed().as_millis() as u64,
            data,
        }
    }
}

/// `SELECT 1`, then row counts for the core tables.
pub async fn check_database(pool: &AnyPool) -> CheckResult {
    let started = Instant::now();

    match database_counts(pool).await {
        Ok(counts) => CheckResult::new(
            HealthStatus::Healthy,
            "Base de datos accesible",
            started,
            Value::Object(counts),
        ),
        Err(e) => {
            warn!(error = %e, "Database health check failed");
            CheckResult::new(
                HealthStatus::Unhealthy,
                "Base de datos inaccesible",
                started,
                json!({ "error": e.to_string() }),
            )
        }
    }
}

async fn database_counts(pool: &AnyPool) -> Result<serde_json::Map<String, Value>, sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;

    let mut counts = serde_json::Map::new();
    for table in COUNTED_TABLES {
        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(pool)
            .await?;
        counts.insert(table.to_string(), json!(count));
    }

    Ok(counts)
}

/// Write a sentinel, read it back, then remove it.
///
/// Worst possible outcome is `Degraded`.
pub async fn check_cache<C>(cache: &C, ttl_seconds: u64) -> CheckResult
where
    C: Cache,
{
    let started = Instant::now();
    let token = Uuid::new_v4().to_string();
    let key = keys::health_sentinel(&token);

    let outcome = cache_round_trip(cache, &key, &token, ttl_seconds).await;

    if let Err(e) = cache.delete(&key).await {
        debug!(key = %key, error = %e, "Failed to remove cache health sentinel");
    }

    let result = match outcome {
        Ok(true) => CheckResult::new(
            HealthStatus::Healthy,
            "Caché operativa",
            started,
            json!({ "round_trip": true }),
        ),
        Ok(false) => CheckResult::new(
            HealthStatus::Degraded,
            "La caché devolvió un valor distinto al escrito",
            started,
            json!({ "round_trip": false }),
        ),
        Err(e) => {
            warn!(error = %e, "Cache health check failed");
            CheckResult::new(
                HealthStatus::Unhealthy,
                "Caché inaccesible",
                started,
                json!({ "error": e.to_string() }),
            )
        }
    };

    CheckResult {
        status: result.status.capped_at(HealthStatus::Degraded),
        ..result
    }
}

async fn cache_round_trip<C>(cache: &C, key: &str, token: &str, ttl: u64) -> Result<bool, AppError>
where
    C: Cache,
{
    cache.set_ex(key, &token, ttl).await?;
    let read_back: Option<String> = cache.get(key).await?;
    Ok(read_back.as_deref() == Some(token))
}

/// Resolve each readiness-critical service inside a fresh scope.
pub fn check_services(registry: &ServiceRegistry) -> CheckResult {
    let started = Instant::now();

    let scope = match registry.begin_scope() {
        Ok(scope) => scope,
        Err(e) => {
            warn!(error = %e, "Service scope could not be opened");
            return CheckResult::new(
                HealthStatus::Unhealthy,
                "No se pudo abrir el ámbito de servicios",
                started,
                json!({ "error": e.to_string() }),
            );
        }
    };

    let mut issues = Vec::new();
    for name in names::HEALTH_CHECKED {
        match scope.resolve(name) {
            None => issues.push(format!("{} is not registered", name)),
            Some(Err(e)) => issues.push(format!("{} failed to resolve: {}", name, e)),
            Some(Ok(_)) => {}
        }
    }

    let (status, description) = if issues.is_empty() {
        (HealthStatus::Healthy, "Servicios disponibles")
    } else {
        warn!(issues = ?issues, "Some services failed to resolve");
        (HealthStatus::Degraded, "Algunos servicios no están disponibles")
    };

    CheckResult::new(
        status,
        description,
        started,
        json!({
            "services_checked": names::HEALTH_CHECKED.len(),
            "issues": issues,
        }),
    )
}
