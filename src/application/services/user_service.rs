//! User Service
//!
//! Accounts, instructor profiles and student profiles.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::{auth_service::hash_password, profile_link};
use crate::application::dto::request::{
    CreateInstructorRequest, CreateStudentRequest, CreateUserRequest, UpdateInstructorRequest,
    UpdateStudentRequest, UpdateUserRequest,
};
use crate::application::dto::response::{InstructorDto, StudentDto, UserInfoDto};
use crate::application::mapping::{
    apply_instructor_update, apply_student_update, apply_user_update, instructor_from_create,
    instructor_to_dto, student_from_create, student_to_dto, user_from_create, user_to_info,
};
use crate::domain::{
    AttendanceRepository, ClassFilter, ClassRepository, EnrollmentRepository,
    InstructorRepository, PurchaseRepository, StudentRepository, User, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserInfoDto>, UserError>;

    async fn get_user(&self, user_id: i64) -> Result<UserInfoDto, UserError>;

    /// Create an account with an explicit role (staff onboarding).
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserInfoDto, UserError>;

    async fn update_user(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserInfoDto, UserError>;

    async fn list_instructors(&self, active_only: bool) -> Result<Vec<InstructorDto>, UserError>;

    async fn get_instructor(&self, instructor_id: i64) -> Result<InstructorDto, UserError>;

    async fn create_instructor(
        &self,
        request: CreateInstructorRequest,
    ) -> Result<InstructorDto, UserError>;

    async fn update_instructor(
        &self,
        instructor_id: i64,
        request: UpdateInstructorRequest,
    ) -> Result<InstructorDto, UserError>;

    /// Fails with `InUse` while any class references the instructor.
    async fn delete_instructor(&self, instructor_id: i64) -> Result<(), UserError>;

    async fn list_students(&self, active_only: bool) -> Result<Vec<StudentDto>, UserError>;

    async fn get_student(&self, student_id: i64) -> Result<StudentDto, UserError>;

    async fn create_student(&self, request: CreateStudentRequest) -> Result<StudentDto, UserError>;

    async fn update_student(
        &self,
        student_id: i64,
        request: UpdateStudentRequest,
    ) -> Result<StudentDto, UserError>;

    /// Fails with `InUse` while the student has enrollments or purchases.
    async fn delete_student(&self, student_id: i64) -> Result<(), UserError>;
}

/// User service errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("User not found")]
    UserNotFound,

    #[error("Instructor not found")]
    InstructorNotFound,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("User already has a linked profile")]
    ProfileAlreadyLinked,

    #[error("Still referenced by {0}")]
    InUse(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::UserNotFound => AppError::NotFound("Usuario no encontrado".into()),
            UserError::InstructorNotFound => AppError::NotFound("Instructor no encontrado".into()),
            UserError::StudentNotFound => AppError::NotFound("Alumno no encontrado".into()),
            UserError::EmailExists => {
                AppError::Conflict("El correo electrónico ya está registrado".into())
            }
            UserError::ProfileAlreadyLinked => {
                AppError::Conflict("El usuario ya tiene un perfil asociado".into())
            }
            UserError::InUse(what) => {
                AppError::Conflict(format!("El registro tiene {} asociadas", what))
            }
            UserError::Internal(msg) => AppError::Internal(msg),
            UserError::Store(e) => e,
        }
    }
}

pub struct UserServiceImpl<U, I, S, C, E, P, A>
where
    U: UserRepository,
    I: InstructorRepository,
    S: StudentRepository,
    C: ClassRepository,
    E: EnrollmentRepository,
    P: PurchaseRepository,
    A: AttendanceRepository,
{
    user_repo: Arc<U>,
    instructor_repo: Arc<I>,
    student_repo: Arc<S>,
    class_repo: Arc<C>,
    enrollment_repo: Arc<E>,
    purchase_repo: Arc<P>,
    attendance_repo: Arc<A>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<U, I, S, C, E, P, A> UserServiceImpl<U, I, S, C, E, P, A>
where
    U: UserRepository,
    I: InstructorRepository,
    S: StudentRepository,
    C: ClassRepository,
    E: EnrollmentRepository,
    P: PurchaseRepository,
    A: AttendanceRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        instructor_repo: Arc<I>,
        student_repo: Arc<S>,
        class_repo: Arc<C>,
        enrollment_repo: Arc<E>,
        purchase_repo: Arc<P>,
        attendance_repo: Arc<A>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            user_repo,
            instructor_repo,
            student_repo,
            class_repo,
            enrollment_repo,
            purchase_repo,
            attendance_repo,
            id_generator,
        }
    }

    async fn user_info(&self, user: &User) -> Result<UserInfoDto, UserError> {
        let link = profile_link(&*self.instructor_repo, &*self.student_repo, user.id).await?;
        Ok(user_to_info(user, link))
    }

    /// A user may back at most one profile, instructor or student.
    async fn ensure_linkable(&self, user_id: Option<i64>) -> Result<(), UserError> {
        let Some(user_id) = user_id else {
            return Ok(());
        };

        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(UserError::UserNotFound);
        }

        if profile_link(&*self.instructor_repo, &*self.student_repo, user_id)
            .await?
            .is_some()
        {
            return Err(UserError::ProfileAlreadyLinked);
        }

        Ok(())
    }
}

#[async_trait]
impl<U, I, S, C, E, P, A> UserService for UserServiceImpl<U, I, S, C, E, P, A>
where
    U: UserRepository + 'static,
    I: InstructorRepository + 'static,
    S: StudentRepository + 'static,
    C: ClassRepository + 'static,
    E: EnrollmentRepository + 'static,
    P: PurchaseRepository + 'static,
    A: AttendanceRepository + 'static,
{
    async fn list_users(&self) -> Result<Vec<UserInfoDto>, UserError> {
        let users = self.user_repo.list().await?;
        let mut result = Vec::with_capacity(users.len());
        for user in &users {
            result.push(self.user_info(user).await?);
        }
        Ok(result)
    }

    async fn get_user(&self, user_id: i64) -> Result<UserInfoDto, UserError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)?;
        self.user_info(&user).await
    }

    #[tracing::instrument(skip_all)]
    async fn create_user(&self, request: CreateUserRequest) -> Result<UserInfoDto, UserError> {
        let email = request.email.trim().to_lowercase();
        if self.user_repo.email_exists(&email).await? {
            return Err(UserError::EmailExists);
        }

        let password_hash =
            hash_password(&request.password).map_err(|e| UserError::Internal(e.to_string()))?;
        let user = user_from_create(request, self.id_generator.generate(), password_hash, Utc::now());
        let user = self.user_repo.create(&user).await?;

        tracing::info!(user_id = user.id, role = %user.role, "User created");
        self.user_info(&user).await
    }

    async fn update_user(
        &self,
        user_id: i64,
        request: UpdateUserRequest,
    ) -> Result<UserInfoDto, UserError> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)?;

        apply_user_update(&mut user, request, Utc::now());
        let user = self.user_repo.update(&user).await?;
        self.user_info(&user).await
    }

    async fn list_instructors(&self, active_only: bool) -> Result<Vec<InstructorDto>, UserError> {
        let instructors = self.instructor_repo.list(active_only).await?;
        Ok(instructors.iter().map(instructor_to_dto).collect())
    }

    async fn get_instructor(&self, instructor_id: i64) -> Result<InstructorDto, UserError> {
        self.instructor_repo
            .find_by_id(instructor_id)
            .await?
            .map(|i| instructor_to_dto(&i))
            .ok_or(UserError::InstructorNotFound)
    }

    async fn create_instructor(
        &self,
        request: CreateInstructorRequest,
    ) -> Result<InstructorDto, UserError> {
        self.ensure_linkable(request.user_id).await?;

        let instructor = instructor_from_create(request, self.id_generator.generate(), Utc::now());
        let instructor = self.instructor_repo.create(&instructor).await?;

        tracing::info!(instructor_id = instructor.id, "Instructor created");
        Ok(instructor_to_dto(&instructor))
    }

    async fn update_instructor(
        &self,
        instructor_id: i64,
        request: UpdateInstructorRequest,
    ) -> Result<InstructorDto, UserError> {
        let mut instructor = self
            .instructor_repo
            .find_by_id(instructor_id)
            .await?
            .ok_or(UserError::InstructorNotFound)?;

        apply_instructor_update(&mut instructor, request, Utc::now());
        let instructor = self.instructor_repo.update(&instructor).await?;
        Ok(instructor_to_dto(&instructor))
    }

    async fn delete_instructor(&self, instructor_id: i64) -> Result<(), UserError> {
        if self.instructor_repo.find_by_id(instructor_id).await?.is_none() {
            return Err(UserError::InstructorNotFound);
        }

        let filter = ClassFilter {
            instructor_id: Some(instructor_id),
            ..Default::default()
        };
        if !self.class_repo.list(&filter).await?.is_empty() {
            return Err(UserError::InUse("clases"));
        }

        self.instructor_repo.delete(instructor_id).await?;
        tracing::info!(instructor_id, "Instructor deleted");
        Ok(())
    }

    async fn list_students(&self, active_only: bool) -> Result<Vec<StudentDto>, UserError> {
        let students = self.student_repo.list(active_only).await?;
        Ok(students.iter().map(student_to_dto).collect())
    }

    async fn get_student(&self, student_id: i64) -> Result<StudentDto, UserError> {
        self.student_repo
            .find_by_id(student_id)
            .await?
            .map(|s| student_to_dto(&s))
            .ok_or(UserError::StudentNotFound)
    }

    async fn create_student(&self, request: CreateStudentRequest) -> Result<StudentDto, UserError> {
        self.ensure_linkable(request.user_id).await?;

        let student = student_from_create(request, self.id_generator.generate(), Utc::now());
        let student = self.student_repo.create(&student).await?;

        tracing::info!(student_id = student.id, "Student created");
        Ok(student_to_dto(&student))
    }

    async fn update_student(
        &self,
        student_id: i64,
        request: UpdateStudentRequest,
    ) -> Result<StudentDto, UserError> {
        let mut student = self
            .student_repo
            .find_by_id(student_id)
            .await?
            .ok_or(UserError::StudentNotFound)?;

        apply_student_update(&mut student, request, Utc::now());
        let student = self.student_repo.update(&student).await?;
        Ok(student_to_dto(&student))
    }

    async fn delete_student(&self, student_id: i64) -> Result<(), UserError> {
        if self.student_repo.find_by_id(student_id).await?.is_none() {
            return Err(UserError::StudentNotFound);
        }

        if !self.enrollment_repo.list_by_student(student_id).await?.is_empty() {
            return Err(UserError::InUse("inscripciones"));
        }
        if !self.purchase_repo.list_by_student(student_id).await?.is_empty() {
            return Err(UserError::InUse("compras"));
        }
        if !self.attendance_repo.list_by_student(student_id).await?.is_empty() {
            return Err(UserError::InUse("asistencias"));
        }

        self.student_repo.delete(student_id).await?;
        tracing::info!(student_id, "Student deleted");
        Ok(())
    }
}
