//! Enrollment Service
//!
//! Reservations in classes and attendance records.
//!
//! ## Enrollment rules
//!
//! - the class must be scheduled and not yet started
//! - one confirmed enrollment per student and class
//! - confirmed enrollments never exceed the class `capacity_limit`
//! - when a purchase is given it must belong to the student, be active, not
//!   expired and have credit left; one class credit is taken on enrollment
//!   and given back on cancellation

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::ensure_student_access;
use crate::application::dto::request::{CreateAttendanceRequest, CreateEnrollmentRequest};
use crate::application::dto::response::{AttendanceDto, EnrollmentDto};
use crate::application::mapping::{
    apply_enrollment_status, attendance_from_create, attendance_to_dto, enrollment_from_create,
    enrollment_to_dto,
};
use crate::domain::{
    Actor, Attendance, AttendanceRepository, Class, ClassRepository, ClassStatus, Enrollment,
    EnrollmentRepository, EnrollmentStatus, PurchaseRepository, Reservation, StudentRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait EnrollmentService: Send + Sync {
    async fn enroll(
        &self,
        actor: &Actor,
        request: CreateEnrollmentRequest,
    ) -> Result<EnrollmentDto, EnrollmentError>;

    async fn cancel(&self, actor: &Actor, enrollment_id: i64)
        -> Result<EnrollmentDto, EnrollmentError>;

    /// Mark a confirmed enrollment as completed (class taken).
    async fn complete(&self, enrollment_id: i64) -> Result<EnrollmentDto, EnrollmentError>;

    async fn list_by_class(&self, class_id: i64) -> Result<Vec<EnrollmentDto>, EnrollmentError>;

    async fn list_by_student(
        &self,
        actor: &Actor,
        student_id: i64,
    ) -> Result<Vec<EnrollmentDto>, EnrollmentError>;

    /// Record that a student attended a class. A matching confirmed
    /// enrollment is completed along the way.
    async fn record_attendance(
        &self,
        request: CreateAttendanceRequest,
    ) -> Result<AttendanceDto, EnrollmentError>;

    async fn attendance_by_class(
        &self,
        class_id: i64,
    ) -> Result<Vec<AttendanceDto>, EnrollmentError>;

    async fn attendance_by_student(
        &self,
        actor: &Actor,
        student_id: i64,
    ) -> Result<Vec<AttendanceDto>, EnrollmentError>;
}

/// Enrollment service errors
#[derive(Debug, thiserror::Error)]
pub enum EnrollmentError {
    #[error("Enrollment not found")]
    EnrollmentNotFound,

    #[error("Class not found")]
    ClassNotFound,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Purchase not found")]
    PurchaseNotFound,

    #[error("Student is inactive")]
    StudentInactive,

    #[error("Class does not accept enrollments")]
    ClassClosed,

    #[error("Class is full")]
    ClassFull,

    #[error("Student already enrolled")]
    AlreadyEnrolled,

    #[error("Purchase belongs to another student")]
    PurchaseMismatch,

    #[error("Purchase has no credit left")]
    NoCredit,

    #[error("Enrollment is {0}")]
    NotConfirmed(EnrollmentStatus),

    #[error("Attendance already recorded")]
    AlreadyAttended,

    #[error("Class was cancelled")]
    ClassCancelled,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<EnrollmentError> for AppError {
    fn from(err: EnrollmentError) -> Self {
        match err {
            EnrollmentError::EnrollmentNotFound => {
                AppError::NotFound("Inscripción no encontrada".into())
            }
            EnrollmentError::ClassNotFound => AppError::NotFound("Clase no encontrada".into()),
            EnrollmentError::StudentNotFound => AppError::NotFound("Alumno no encontrado".into()),
            EnrollmentError::PurchaseNotFound => AppError::NotFound("Compra no encontrada".into()),
            EnrollmentError::StudentInactive => {
                AppError::Unprocessable("El alumno no está activo".into())
            }
            EnrollmentError::ClassClosed => {
                AppError::Unprocessable("La clase no admite inscripciones".into())
            }
            EnrollmentError::ClassFull => AppError::Conflict("La clase está completa".into()),
            EnrollmentError::AlreadyEnrolled => {
                AppError::Conflict("El alumno ya está inscrito en esta clase".into())
            }
            EnrollmentError::PurchaseMismatch => {
                AppError::BadRequest("La compra no pertenece al alumno".into())
            }
            EnrollmentError::NoCredit => {
                AppError::Unprocessable("La compra no tiene clases disponibles".into())
            }
            EnrollmentError::NotConfirmed(status) => AppError::Conflict(format!(
                "La inscripción no está confirmada (estado: {})",
                status
            )),
            EnrollmentError::AlreadyAttended => {
                AppError::Conflict("La asistencia ya fue registrada".into())
            }
            EnrollmentError::ClassCancelled => {
                AppError::Unprocessable("La clase fue cancelada".into())
            }
            EnrollmentError::Store(e) => e,
        }
    }
}

pub struct EnrollmentServiceImpl<E, C, S, P, A>
where
    E: EnrollmentRepository,
    C: ClassRepository,
    S: StudentRepository,
    P: PurchaseRepository,
    A: AttendanceRepository,
{
    enrollment_repo: Arc<E>,
    class_repo: Arc<C>,
    student_repo: Arc<S>,
    purchase_repo: Arc<P>,
    attendance_repo: Arc<A>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<E, C, S, P, A> EnrollmentServiceImpl<E, C, S, P, A>
where
    E: EnrollmentRepository,
    C: ClassRepository,
    S: StudentRepository,
    P: PurchaseRepository,
    A: AttendanceRepository,
{
    pub fn new(
        enrollment_repo: Arc<E>,
        class_repo: Arc<C>,
        student_repo: Arc<S>,
        purchase_repo: Arc<P>,
        attendance_repo: Arc<A>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            enrollment_repo,
            class_repo,
            student_repo,
            purchase_repo,
            attendance_repo,
            id_generator,
        }
    }

    async fn find_enrollment(&self, enrollment_id: i64) -> Result<Enrollment, EnrollmentError> {
        self.enrollment_repo
            .find_by_id(enrollment_id)
            .await?
            .ok_or(EnrollmentError::EnrollmentNotFound)
    }

    async fn find_class(&self, class_id: i64) -> Result<Class, EnrollmentError> {
        self.class_repo
            .find_by_id(class_id)
            .await?
            .ok_or(EnrollmentError::ClassNotFound)
    }

    async fn enrollment_dto(&self, enrollment: &Enrollment) -> Result<EnrollmentDto, EnrollmentError> {
        let student = self.student_repo.find_by_id(enrollment.student_id).await?;
        let class = self.class_repo.find_by_id(enrollment.class_id).await?;
        Ok(enrollment_to_dto(enrollment, student.as_ref(), class.as_ref()))
    }

    async fn enrollment_dtos(
        &self,
        enrollments: &[Enrollment],
    ) -> Result<Vec<EnrollmentDto>, EnrollmentError> {
        let mut result = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            result.push(self.enrollment_dto(enrollment).await?);
        }
        Ok(result)
    }

    async fn attendance_dtos(
        &self,
        records: &[Attendance],
    ) -> Result<Vec<AttendanceDto>, EnrollmentError> {
        let mut result = Vec::with_capacity(records.len());
        for record in records {
            let student = self.student_repo.find_by_id(record.student_id).await?;
            let class = self.class_repo.find_by_id(record.class_id).await?;
            result.push(attendance_to_dto(record, student.as_ref(), class.as_ref()));
        }
        Ok(result)
    }
}

#[async_trait]
impl<E, C, S, P, A> EnrollmentService for EnrollmentServiceImpl<E, C, S, P, A>
where
    E: EnrollmentRepository + 'static,
    C: ClassRepository + 'static,
    S: StudentRepository + 'static,
    P: PurchaseRepository + 'static,
    A: AttendanceRepository + 'static,
{
    #[tracing::instrument(skip(self, actor, request), fields(student_id = request.student_id, class_id = request.class_id))]
    async fn enroll(
        &self,
        actor: &Actor,
        request: CreateEnrollmentRequest,
    ) -> Result<EnrollmentDto, EnrollmentError> {
        ensure_student_access(&*self.student_repo, actor, request.student_id).await?;

        let now = Utc::now();

        let student = self
            .student_repo
            .find_by_id(request.student_id)
            .await?
            .ok_or(EnrollmentError::StudentNotFound)?;
        if !student.is_active {
            return Err(EnrollmentError::StudentInactive);
        }

        let class = self.find_class(request.class_id).await?;
        if !class.accepts_enrollments(now) {
            return Err(EnrollmentError::ClassClosed);
        }

        if let Some(purchase_id) = request.purchase_id {
            let purchase = self
                .purchase_repo
                .find_by_id(purchase_id)
                .await?
                .ok_or(EnrollmentError::PurchaseNotFound)?;
            if purchase.student_id != student.id {
                return Err(EnrollmentError::PurchaseMismatch);
            }
            if !purchase.has_credit(now) {
                return Err(EnrollmentError::NoCredit);
            }
        }

        let enrollment = enrollment_from_create(request, self.id_generator.generate(), now);
        let enrollment = match self.enrollment_repo.reserve(&enrollment, now).await? {
            Reservation::Confirmed(enrollment) => enrollment,
            Reservation::AlreadyEnrolled => return Err(EnrollmentError::AlreadyEnrolled),
            Reservation::ClassFull => return Err(EnrollmentError::ClassFull),
            Reservation::NoCredit => return Err(EnrollmentError::NoCredit),
        };

        tracing::info!(enrollment_id = enrollment.id, "Enrollment confirmed");
        Ok(enrollment_to_dto(&enrollment, Some(&student), Some(&class)))
    }

    #[tracing::instrument(skip(self, actor))]
    async fn cancel(
        &self,
        actor: &Actor,
        enrollment_id: i64,
    ) -> Result<EnrollmentDto, EnrollmentError> {
        let enrollment = self.find_enrollment(enrollment_id).await?;
        ensure_student_access(&*self.student_repo, actor, enrollment.student_id).await?;

        if !enrollment.is_confirmed() {
            return Err(EnrollmentError::NotConfirmed(enrollment.status));
        }

        let Some(enrollment) = self.enrollment_repo.release(enrollment_id, Utc::now()).await?
        else {
            let current = self.find_enrollment(enrollment_id).await?;
            return Err(EnrollmentError::NotConfirmed(current.status));
        };

        tracing::info!(enrollment_id, "Enrollment cancelled");
        self.enrollment_dto(&enrollment).await
    }

    async fn complete(&self, enrollment_id: i64) -> Result<EnrollmentDto, EnrollmentError> {
        let mut enrollment = self.find_enrollment(enrollment_id).await?;
        if !enrollment.is_confirmed() {
            return Err(EnrollmentError::NotConfirmed(enrollment.status));
        }

        apply_enrollment_status(&mut enrollment, EnrollmentStatus::Completed, Utc::now());
        let enrollment = self.enrollment_repo.update(&enrollment).await?;
        self.enrollment_dto(&enrollment).await
    }

    async fn list_by_class(&self, class_id: i64) -> Result<Vec<EnrollmentDto>, EnrollmentError> {
        self.find_class(class_id).await?;
        let enrollments = self.enrollment_repo.list_by_class(class_id).await?;
        self.enrollment_dtos(&enrollments).await
    }

    async fn list_by_student(
        &self,
        actor: &Actor,
        student_id: i64,
    ) -> Result<Vec<EnrollmentDto>, EnrollmentError> {
        ensure_student_access(&*self.student_repo, actor, student_id).await?;
        let enrollments = self.enrollment_repo.list_by_student(student_id).await?;
        self.enrollment_dtos(&enrollments).await
    }

    #[tracing::instrument(skip(self, request), fields(student_id = request.student_id, class_id = request.class_id))]
    async fn record_attendance(
        &self,
        request: CreateAttendanceRequest,
    ) -> Result<AttendanceDto, EnrollmentError> {
        let student = self
            .student_repo
            .find_by_id(request.student_id)
            .await?
            .ok_or(EnrollmentError::StudentNotFound)?;
        let class = self.find_class(request.class_id).await?;
        if class.status == ClassStatus::Cancelled {
            return Err(EnrollmentError::ClassCancelled);
        }

        if self
            .attendance_repo
            .find(student.id, class.id)
            .await?
            .is_some()
        {
            return Err(EnrollmentError::AlreadyAttended);
        }

        let now = Utc::now();
        let attendance =
            attendance_from_create(request, self.id_generator.generate(), class.start_time, now);
        let attendance = self.attendance_repo.create(&attendance).await?;

        if let Some(mut enrollment) = self
            .enrollment_repo
            .find_confirmed(student.id, class.id)
            .await?
        {
            apply_enrollment_status(&mut enrollment, EnrollmentStatus::Completed, now);
            self.enrollment_repo.update(&enrollment).await?;
        }

        tracing::info!(attendance_id = attendance.id, "Attendance recorded");
        Ok(attendance_to_dto(&attendance, Some(&student), Some(&class)))
    }

    async fn attendance_by_class(
        &self,
        class_id: i64,
    ) -> Result<Vec<AttendanceDto>, EnrollmentError> {
        self.find_class(class_id).await?;
        let records = self.attendance_repo.list_by_class(class_id).await?;
        self.attendance_dtos(&records).await
    }

    async fn attendance_by_student(
        &self,
        actor: &Actor,
        student_id: i64,
    ) -> Result<Vec<AttendanceDto>, EnrollmentError> {
        ensure_student_access(&*self.student_repo, actor, student_id).await?;
        let records = self.attendance_repo.list_by_student(student_id).await?;
        self.attendance_dtos(&records).await
    }
}
