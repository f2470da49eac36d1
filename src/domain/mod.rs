//! # Domain Layer
//!
//! Entities, value objects and repository traits for the studio.
//! Independent of the web framework and the database driver.
//!
//! ## Structure
//!
//! - **entities**: User, Instructor, Student, Zone, Class, Enrollment, Package,
//!   Purchase, Payment, Attendance
//! - **value_objects**: Role and authorization policies

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
