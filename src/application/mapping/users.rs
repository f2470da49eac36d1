//! Users, instructors and students.

use chrono::{DateTime, Utc};

use super::{patch, patch_opt};
use crate::application::dto::request::{
    CreateInstructorRequest, CreateStudentRequest, CreateUserRequest, RegisterRequest,
    UpdateInstructorRequest, UpdateStudentRequest, UpdateUserRequest,
};
use crate::application::dto::response::{InstructorDto, StudentDto, UserInfoDto};
use crate::domain::{Instructor, Role, Student, User, UserProfileLink};

pub fn user_to_info(user: &User, link: Option<UserProfileLink>) -> UserInfoDto {
    let (instructor_id, student_id) = match link {
        Some(UserProfileLink::Instructor(id)) => (Some(id.to_string()), None),
        Some(UserProfileLink::Student(id)) => (None, Some(id.to_string())),
        None => (None, None),
    };

    UserInfoDto {
        id: user.id.to_string(),
        email: user.email.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: user.full_name(),
        role: user.role,
        is_active: user.is_active,
        instructor_id,
        student_id,
        created_at: user.created_at,
    }
}

/// Self-registered accounts are always students.
pub fn user_from_register(
    request: &RegisterRequest,
    id: i64,
    password_hash: String,
    now: DateTime<Utc>,
) -> User {
    User {
        id,
        email: request.email.trim().to_lowercase(),
        password_hash,
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        role: Role::Student,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn user_from_create(
    request: CreateUserRequest,
    id: i64,
    password_hash: String,
    now: DateTime<Utc>,
) -> User {
    User {
        id,
        email: request.email.trim().to_lowercase(),
        password_hash,
        first_name: request.first_name,
        last_name: request.last_name,
        role: request.role,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_user_update(user: &mut User, request: UpdateUserRequest, now: DateTime<Utc>) {
    patch(&mut user.first_name, request.first_name);
    patch(&mut user.last_name, request.last_name);
    patch(&mut user.role, request.role);
    patch(&mut user.is_active, request.is_active);
    user.updated_at = now;
}

pub fn instructor_to_dto(instructor: &Instructor) -> InstructorDto {
    InstructorDto {
        id: instructor.id.to_string(),
        user_id: instructor.user_id.map(|id| id.to_string()),
        first_name: instructor.first_name.clone(),
        last_name: instructor.last_name.clone(),
        full_name: instructor.full_name(),
        email: instructor.email.clone(),
        phone: instructor.phone.clone(),
        specialty: instructor.specialty.clone(),
        bio: instructor.bio.clone(),
        is_active: instructor.is_active,
        created_at: instructor.created_at,
        updated_at: instructor.updated_at,
    }
}

pub fn instructor_from_create(
    request: CreateInstructorRequest,
    id: i64,
    now: DateTime<Utc>,
) -> Instructor {
    Instructor {
        id,
        user_id: request.user_id,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone: request.phone,
        specialty: request.specialty,
        bio: request.bio,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_instructor_update(
    instructor: &mut Instructor,
    request: UpdateInstructorRequest,
    now: DateTime<Utc>,
) {
    patch(&mut instructor.first_name, request.first_name);
    patch(&mut instructor.last_name, request.last_name);
    patch_opt(&mut instructor.email, request.email);
    patch_opt(&mut instructor.phone, request.phone);
    patch_opt(&mut instructor.specialty, request.specialty);
    patch_opt(&mut instructor.bio, request.bio);
    patch(&mut instructor.is_active, request.is_active);
    instructor.updated_at = now;
}

pub fn student_to_dto(student: &Student) -> StudentDto {
    StudentDto {
        id: student.id.to_string(),
        user_id: student.user_id.map(|id| id.to_string()),
        first_name: student.first_name.clone(),
        last_name: student.last_name.clone(),
        full_name: student.full_name(),
        email: student.email.clone(),
        phone: student.phone.clone(),
        birth_date: student.birth_date,
        emergency_contact: student.emergency_contact.clone(),
        medical_notes: student.medical_notes.clone(),
        is_active: student.is_active,
        created_at: student.created_at,
        updated_at: student.updated_at,
    }
}

pub fn student_from_create(request: CreateStudentRequest, id: i64, now: DateTime<Utc>) -> Student {
    Student {
        id,
        user_id: request.user_id,
        first_name: request.first_name,
        last_name: request.last_name,
        email: request.email,
        phone: request.phone,
        birth_date: request.birth_date,
        emergency_contact: request.emergency_contact,
        medical_notes: request.medical_notes,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Student profile created alongside a self-registered account.
pub fn student_from_register(
    request: &RegisterRequest,
    id: i64,
    user: &User,
    now: DateTime<Utc>,
) -> Student {
    Student {
        id,
        user_id: Some(user.id),
        first_name: request.first_name.clone(),
        last_name: request.last_name.clone(),
        email: Some(user.email.clone()),
        phone: request.phone.clone(),
        birth_date: None,
        emergency_contact: None,
        medical_notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_student_update(student: &mut Student, request: UpdateStudentRequest, now: DateTime<Utc>) {
    patch(&mut student.first_name, request.first_name);
    patch(&mut student.last_name, request.last_name);
    patch_opt(&mut student.email, request.email);
    patch_opt(&mut student.phone, request.phone);
    patch_opt(&mut student.birth_date, request.birth_date);
    patch_opt(&mut student.emergency_contact, request.emergency_contact);
    patch_opt(&mut student.medical_notes, request.medical_notes);
    patch(&mut student.is_active, request.is_active);
    student.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    fn user() -> User {
        let created = Utc::now() - Duration::days(30);
        User {
            id: 10,
            email: "ana@studio.test".into(),
            password_hash: "hash".into(),
            first_name: "Ana".into(),
            last_name: "Diaz".into(),
            role: Role::Student,
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    fn student() -> Student {
        let created = Utc::now() - Duration::days(30);
        Student {
            id: 20,
            user_id: Some(10),
            first_name: "Ana".into(),
            last_name: "Diaz".into(),
            email: Some("ana@studio.test".into()),
            phone: Some("600123456".into()),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 4),
            emergency_contact: Some("Luis 600000000".into()),
            medical_notes: Some("Lumbar".into()),
            is_active: true,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_user_info_full_name() {
        let info = user_to_info(&user(), None);
        assert_eq!(info.full_name, "Ana Diaz");
        assert_eq!(info.id, "10");
    }

    #[test]
    fn test_user_info_profile_link_is_exclusive() {
        let info = user_to_info(&user(), Some(UserProfileLink::Student(20)));
        assert_eq!(info.student_id.as_deref(), Some("20"));
        assert_eq!(info.instructor_id, None);

        let info = user_to_info(&user(), Some(UserProfileLink::Instructor(30)));
        assert_eq!(info.instructor_id.as_deref(), Some("30"));
        assert_eq!(info.student_id, None);
    }

    #[test]
    fn test_register_creates_student_with_server_timestamps() {
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": " Ana@Studio.test ",
            "password": "supersecret",
            "first_name": "Ana",
            "last_name": "Diaz",
            "role": "admin",
            "created_at": "2001-01-01T00:00:00Z"
        }))
        .unwrap();
        let now = Utc::now();
        let user = user_from_register(&request, 1, "hash".into(), now);
        assert_eq!(user.role, Role::Student);
        assert_eq!(user.email, "ana@studio.test");
        assert_eq!(user.created_at, now);
        assert_eq!(user.updated_at, now);

        let profile = student_from_register(&request, 2, &user, now);
        assert_eq!(profile.user_id, Some(1));
        assert_eq!(profile.created_at, profile.updated_at);
    }

    #[test]
    fn test_student_update_skips_absent_fields() {
        let mut stored = student();
        let before = stored.clone();
        let now = Utc::now();

        apply_student_update(
            &mut stored,
            UpdateStudentRequest {
                phone: Some("611222333".into()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(stored.phone.as_deref(), Some("611222333"));
        assert_eq!(stored.first_name, before.first_name);
        assert_eq!(stored.email, before.email);
        assert_eq!(stored.birth_date, before.birth_date);
        assert_eq!(stored.medical_notes, before.medical_notes);
        assert_eq!(stored.is_active, before.is_active);
        assert_eq!(stored.created_at, before.created_at);
        assert_eq!(stored.updated_at, now);
    }

    #[test]
    fn test_empty_update_still_restamps_updated_at() {
        let mut stored = user();
        let now = Utc::now();
        apply_user_update(&mut stored, UpdateUserRequest::default(), now);
        assert_eq!(stored.first_name, "Ana");
        assert_eq!(stored.role, Role::Student);
        assert_eq!(stored.updated_at, now);
    }

    #[test]
    fn test_instructor_create_defaults_active() {
        let request: CreateInstructorRequest = serde_json::from_value(serde_json::json!({
            "first_name": "Marta",
            "last_name": "Gil",
            "is_active": false
        }))
        .unwrap();
        let now = Utc::now();
        let instructor = instructor_from_create(request, 5, now);
        assert!(instructor.is_active);
        assert_eq!(instructor_to_dto(&instructor).full_name, "Marta Gil");
    }
}
