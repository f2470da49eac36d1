//! Application Layer
//!
//! Business services, data transfer objects and the mapping between entities
//! and DTOs. Orchestrates the flow of data between the presentation and
//! domain layers.

pub mod dto;
pub mod mapping;
pub mod services;
