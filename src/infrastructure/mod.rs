//! Infrastructure Layer
//!
//! Contains implementations for external concerns:
//! - Database pool, migrations and SQL repositories (sqlx `Any`)
//! - Cache backends (in-memory, Redis)
//! - Service registry used by handlers and the readiness check
//! - Health probes

pub mod cache;
pub mod database;
pub mod health;
pub mod registry;
pub mod repositories;
