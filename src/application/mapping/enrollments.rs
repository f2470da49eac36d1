//! Enrollments and attendance.

use chrono::{DateTime, Utc};

use super::name_of;
use crate::application::dto::request::{CreateAttendanceRequest, CreateEnrollmentRequest};
use crate::application::dto::response::{AttendanceDto, EnrollmentDto};
use crate::domain::{Attendance, Class, Enrollment, EnrollmentStatus, Student};

pub fn enrollment_to_dto(
    enrollment: &Enrollment,
    student: Option<&Student>,
    class: Option<&Class>,
) -> EnrollmentDto {
    EnrollmentDto {
        id: enrollment.id.to_string(),
        student_id: enrollment.student_id.to_string(),
        student_name: name_of(student, Student::full_name),
        class_id: enrollment.class_id.to_string(),
        class_name: name_of(class, |c| c.name.clone()),
        class_start_time: class.map(|c| c.start_time),
        purchase_id: enrollment.purchase_id.map(|id| id.to_string()),
        status: enrollment.status,
        created_at: enrollment.created_at,
        updated_at: enrollment.updated_at,
    }
}

/// New enrollments always start `confirmed`.
pub fn enrollment_from_create(
    request: CreateEnrollmentRequest,
    id: i64,
    now: DateTime<Utc>,
) -> Enrollment {
    Enrollment {
        id,
        student_id: request.student_id,
        class_id: request.class_id,
        purchase_id: request.purchase_id,
        status: EnrollmentStatus::Confirmed,
        created_at: now,
        updated_at: now,
    }
}

/// Move an enrollment to a new status and re-stamp it.
pub fn apply_enrollment_status(
    enrollment: &mut Enrollment,
    status: EnrollmentStatus,
    now: DateTime<Utc>,
) {
    enrollment.status = status;
    enrollment.updated_at = now;
}

pub fn attendance_to_dto(
    attendance: &Attendance,
    student: Option<&Student>,
    class: Option<&Class>,
) -> AttendanceDto {
    AttendanceDto {
        id: attendance.id.to_string(),
        student_id: attendance.student_id.to_string(),
        student_name: name_of(student, Student::full_name),
        class_id: attendance.class_id.to_string(),
        class_name: name_of(class, |c| c.name.clone()),
        attended_at: attendance.attended_at,
        notes: attendance.notes.clone(),
        created_at: attendance.created_at,
    }
}

/// `default_attended_at` applies when the request leaves `attended_at` out.
pub fn attendance_from_create(
    request: CreateAttendanceRequest,
    id: i64,
    default_attended_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Attendance {
    Attendance {
        id,
        student_id: request.student_id,
        class_id: request.class_id,
        attended_at: request.attended_at.unwrap_or(default_attended_at),
        notes: request.notes,
        created_at: now,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_enrollment_defaults_to_confirmed() {
        let request: CreateEnrollmentRequest = serde_json::from_value(serde_json::json!({
            "student_id": "1",
            "class_id": "2",
            "status": "completed"
        }))
        .unwrap();
        let now = Utc::now();
        let enrollment = enrollment_from_create(request, 3, now);
        assert_eq!(enrollment.status, EnrollmentStatus::Confirmed);
        assert_eq!(enrollment.created_at, now);
        assert_eq!(enrollment.updated_at, now);
    }

    #[test]
    fn test_enrollment_dto_without_related_records() {
        let now = Utc::now();
        let enrollment = Enrollment {
            id: 3,
            student_id: 1,
            class_id: 2,
            purchase_id: Some(9),
            status: EnrollmentStatus::Cancelled,
            created_at: now,
            updated_at: now,
        };
        let dto = enrollment_to_dto(&enrollment, None, None);
        assert_eq!(dto.student_name, "");
        assert_eq!(dto.class_name, "");
        assert_eq!(dto.class_start_time, None);
        assert_eq!(dto.purchase_id.as_deref(), Some("9"));
    }

    #[test]
    fn test_status_change_restamps() {
        let created = Utc::now() - Duration::hours(2);
        let mut enrollment = Enrollment {
            id: 3,
            student_id: 1,
            class_id: 2,
            purchase_id: None,
            status: EnrollmentStatus::Confirmed,
            created_at: created,
            updated_at: created,
        };
        let now = Utc::now();
        apply_enrollment_status(&mut enrollment, EnrollmentStatus::Cancelled, now);
        assert_eq!(enrollment.status, EnrollmentStatus::Cancelled);
        assert_eq!(enrollment.created_at, created);
        assert_eq!(enrollment.updated_at, now);
    }

    #[test]
    fn test_attendance_uses_default_time_when_absent() {
        let start = Utc::now() - Duration::hours(1);
        let now = Utc::now();
        let request = CreateAttendanceRequest {
            student_id: 1,
            class_id: 2,
            attended_at: None,
            notes: None,
        };
        let attendance = attendance_from_create(request, 4, start, now);
        assert_eq!(attendance.attended_at, start);
        assert_eq!(attendance.created_at, now);
    }
}
