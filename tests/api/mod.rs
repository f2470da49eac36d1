//! API Endpoint Tests

mod auth;
mod classes;
mod enrollments;
mod health;
mod students;
