//! # Domain Entities
//!
//! Core domain entities representing the studio's business objects.
//! All entities map directly to their corresponding database tables.
//!
//! ## People
//!
//! - **User**: login account with a role
//! - **Instructor** / **Student**: profiles, each optionally linked to one user
//!
//! ## Scheduling
//!
//! - **Zone**: room or area where classes happen
//! - **Class**: a scheduled session with a capacity limit
//! - **Enrollment**: a student's reservation in a class
//! - **Attendance**: a student actually attending a class
//!
//! ## Billing
//!
//! - **Package**: purchasable bundle of class credits
//! - **Purchase**: a student's acquisition of a package
//! - **Payment**: money received (or refunded) for a purchase
//!
//! ## Repository Traits
//!
//! Each entity has an associated repository trait defining data access operations.
//! These traits are implemented in the infrastructure layer.

mod attendance;
mod class;
mod enrollment;
mod instructor;
mod package;
mod payment;
mod purchase;
mod student;
mod user;
mod zone;

pub use attendance::{Attendance, AttendanceRepository};
pub use class::{Class, ClassFilter, ClassRepository, ClassStatus};
pub use enrollment::{Enrollment, EnrollmentRepository, EnrollmentStatus, Reservation};
pub use instructor::{Instructor, InstructorRepository};
pub use package::{Package, PackageRepository};
pub use payment::{Payment, PaymentMethod, PaymentRepository, PaymentStatus};
pub use purchase::{Purchase, PurchaseRepository, PurchaseStatus};
pub use student::{Student, StudentRepository};
pub use user::{full_name, User, UserProfileLink, UserRepository};
pub use zone::{Zone, ZoneRepository};
