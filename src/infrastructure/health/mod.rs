//! Health Checks
//!
//! Three probes (database, cache, application services) combined into a
//! single [`HealthReport`]. The overall status is the worst status of the
//! individual checks; the cache check alone can never push it past
//! `Degraded`.

mod probes;
mod status;

pub use probes::{check_cache, check_database, check_services, CheckResult};
pub use status::HealthStatus;

use std::collections::BTreeMap;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::AnyPool;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::info;

use crate::infrastructure::cache::Cache;
use crate::infrastructure::registry::ServiceRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_duration_ms: u64,
    pub checks: BTreeMap<String, CheckResult>,
    pub data: SystemData,
}

/// Process and host facts attached to every report.
#[derive(Debug, Clone, Serialize)]
pub struct SystemData {
    pub machine_name: String,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
    pub timestamp: String,
    pub environment: String,
}

impl SystemData {
    pub fn collect(environment: &str) -> Self {
        Self {
            machine_name: machine_name(),
            process_id: std::process::id(),
            memory_usage_bytes: process_memory_bytes(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            environment: environment.to_string(),
        }
    }
}

fn machine_name() -> String {
    hostname::get()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown".to_string())
}

fn process_memory_bytes() -> u64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0;
    };

    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );

    system.process(pid).map(|p| p.memory()).unwrap_or(0)
}

/// Dependencies inspected by [`run_health_checks`].
pub struct HealthTargets<'a, C> {
    pub pool: &'a AnyPool,
    pub cache: &'a C,
    pub registry: &'a ServiceRegistry,
    pub cache_ttl_seconds: u64,
    pub environment: &'a str,
}

/// Run every probe in order and aggregate the result.
pub async fn run_health_checks<C>(targets: HealthTargets<'_, C>) -> HealthReport
where
    C: Cache,
{
    let started = Instant::now();
    let mut checks = BTreeMap::new();

    checks.insert("database".to_string(), check_database(targets.pool).await);
    checks.insert(
        "cache".to_string(),
        check_cache(targets.cache, targets.cache_ttl_seconds).await,
    );
    checks.insert("services".to_string(), check_services(targets.registry));

    let status = HealthStatus::worst(checks.values().map(|check| check.status));
    let total_duration_ms = started.elapsed().as_millis() as u64;

    info!(status = %status, duration_ms = total_duration_ms, "Health checks completed");

    HealthReport {
        status,
        total_duration_ms,
        checks,
        data: SystemData::collect(targets.environment),
    }
}
