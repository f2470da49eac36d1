//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints. Each handler opens a service
//! scope on the registry and delegates to one application service.

pub mod attendance;
pub mod auth;
pub mod class;
pub mod enrollment;
pub mod health;
pub mod instructor;
pub mod package;
pub mod payment;
pub mod purchase;
pub mod student;
pub mod user;
pub mod zone;
