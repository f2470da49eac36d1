//! # Studio API
//!
//! Management backend for a Pilates studio:
//! - Instructors, students and user accounts with role-based access
//! - Studio zones and the class schedule with capacity tracking
//! - Enrollments, attendance, class packages and payments
//! - Health reporting over the database, cache and service registry
//!
//! ## Architecture
//!
//! - **Domain Layer**: Entities, value objects and repository traits
//! - **Application Layer**: Services, DTOs and entity/DTO mapping
//! - **Infrastructure Layer**: SQL repositories, cache backends, health probes
//! - **Presentation Layer**: HTTP routes, handlers and middleware
//!
//! ```text
//! studio_api/
//! +-- config/         Configuration management
//! +-- domain/         Entities, roles and repository traits
//! +-- application/    Services, DTOs and mapping
//! +-- infrastructure/ Database, cache, registry and health checks
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Errors, validation, snowflake IDs
//! ```

// Configuration module
pub mod config;

// Domain layer
pub mod domain;

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Presentation layer
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state
pub mod startup;

// Logging setup
pub mod telemetry;
