//! Repository Implementations
//!
//! SQL implementations of the domain repository traits on top of the sqlx
//! `Any` driver, so the same code runs against SQLite and MySQL.
//!
//! ## Available Repositories
//!
//! - **SqlUserRepository** - login accounts
//! - **SqlInstructorRepository** / **SqlStudentRepository** - profiles
//! - **SqlZoneRepository** - rooms
//! - **SqlClassRepository** - scheduled classes with filtering
//! - **SqlEnrollmentRepository** - reservations
//! - **SqlPackageRepository** / **SqlPurchaseRepository** - credit bundles
//! - **SqlPaymentRepository** - payments against purchases
//! - **SqlAttendanceRepository** - attendance records
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use sqlx::AnyPool;
//! use crate::infrastructure::repositories::{SqlClassRepository, SqlZoneRepository};
//!
//! fn setup_repositories(pool: AnyPool) {
//!     let zone_repo = SqlZoneRepository::new(pool.clone());
//!     let class_repo = SqlClassRepository::new(pool);
//! }
//! ```

pub mod user_repository;
pub mod instructor_repository;
pub mod student_repository;
pub mod zone_repository;
pub mod class_repository;
pub mod enrollment_repository;
pub mod package_repository;
pub mod purchase_repository;
pub mod payment_repository;
pub mod attendance_repository;

pub use user_repository::SqlUserRepository;
pub use instructor_repository::SqlInstructorRepository;
pub use student_repository::SqlStudentRepository;
pub use zone_repository::SqlZoneRepository;
pub use class_repository::SqlClassRepository;
pub use enrollment_repository::SqlEnrollmentRepository;
pub use package_repository::SqlPackageRepository;
pub use purchase_repository::SqlPurchaseRepository;
pub use payment_repository::SqlPaymentRepository;
pub use attendance_repository::SqlAttendanceRepository;
