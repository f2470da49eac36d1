//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **AuthService**: registration, login, JWT tokens
//! - **UserService**: accounts, instructor and student profiles
//! - **ClassService**: zones and the class schedule
//! - **EnrollmentService**: reservations and attendance
//! - **PackageService**: packages and purchases
//! - **PaymentService**: payments against purchases

pub mod auth_service;
pub mod class_service;
pub mod enrollment_service;
pub mod package_service;
pub mod payment_service;
pub mod user_service;

// Re-export auth service types
pub use auth_service::{
    decode_access_token, hash_password, issue_access_token, verify_password, AuthError,
    AuthService, AuthServiceImpl, Claims,
};

pub use class_service::{ClassError, ClassService, ClassServiceImpl};
pub use enrollment_service::{EnrollmentError, EnrollmentService, EnrollmentServiceImpl};
pub use package_service::{PackageError, PackageService, PackageServiceImpl};
pub use payment_service::{PaymentError, PaymentService, PaymentServiceImpl};
pub use user_service::{UserError, UserService, UserServiceImpl};

use crate::domain::{Actor, InstructorRepository, StudentRepository, UserProfileLink};
use crate::shared::error::AppError;

/// Which profile, if any, is linked to a user account.
pub(crate) async fn profile_link<I, S>(
    instructors: &I,
    students: &S,
    user_id: i64,
) -> Result<Option<UserProfileLink>, AppError>
where
    I: InstructorRepository + ?Sized,
    S: StudentRepository + ?Sized,
{
    if let Some(instructor) = instructors.find_by_user_id(user_id).await? {
        return Ok(Some(UserProfileLink::Instructor(instructor.id)));
    }

    Ok(students
        .find_by_user_id(user_id)
        .await?
        .map(|student| UserProfileLink::Student(student.id)))
}

/// Staff act on any student; a student only on their own profile.
pub(crate) async fn ensure_student_access<S>(
    students: &S,
    actor: &Actor,
    student_id: i64,
) -> Result<(), AppError>
where
    S: StudentRepository + ?Sized,
{
    if actor.is_staff() {
        return Ok(());
    }

    match students.find_by_user_id(actor.user_id).await? {
        Some(own) if own.id == student_id => Ok(()),
        _ => Err(AppError::Forbidden(
            "Solo puedes acceder a tus propios registros".into(),
        )),
    }
}
