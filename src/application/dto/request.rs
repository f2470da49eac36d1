//! Request DTOs
//!
//! Data structures for API request bodies. None of these carry `id`,
//! `created_at`, `updated_at` or default status fields: those are stamped by the
//! server and any such key sent by a client is ignored.
//!
//! Update requests use `Option` for every field. `None` (absent or `null`)
//! leaves the stored value untouched; `Some` overwrites it.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::{de_id, de_opt_id};
use crate::domain::{ClassStatus, PaymentMethod, PaymentStatus, Role};
use crate::shared::validation::PHONE_REGEX;

// ============================================================================
// Auth & users
// ============================================================================

/// Public self-registration; always creates a student account
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "El correo electrónico no es válido"))]
    pub email: String,

    #[validate(length(min = 8, max = 100, message = "La contraseña debe tener entre 8 y 100 caracteres"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "El nombre es requerido (máximo 100 caracteres)"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "El apellido es requerido (máximo 100 caracteres)"))]
    pub last_name: String,

    #[validate(regex(path = *PHONE_REGEX, message = "El teléfono no es válido"))]
    pub phone: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "El correo electrónico no es válido"))]
    pub email: String,

    #[validate(length(min = 1, message = "La contraseña es requerida"))]
    pub password: String,
}

/// Admin-created account with an explicit role
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "El correo electrónico no es válido"))]
    pub email: String,

    #[validate(length(min = 8, max = 100, message = "La contraseña debe tener entre 8 y 100 caracteres"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "El nombre es requerido (máximo 100 caracteres)"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "El apellido es requerido (máximo 100 caracteres)"))]
    pub last_name: String,

    pub role: Role,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre debe tener entre 1 y 100 caracteres"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "El apellido debe tener entre 1 y 100 caracteres"))]
    pub last_name: Option<String>,

    pub role: Option<Role>,

    pub is_active: Option<bool>,
}

// ============================================================================
// Instructors & students
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInstructorRequest {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<i64>,

    #[validate(length(min = 1, max = 100, message = "El nombre es requerido (máximo 100 caracteres)"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "El apellido es requerido (máximo 100 caracteres)"))]
    pub last_name: String,

    #[validate(email(message = "El correo electrónico no es válido"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "El teléfono no es válido"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "La especialidad no puede exceder 100 caracteres"))]
    pub specialty: Option<String>,

    #[validate(length(max = 1000, message = "La biografía no puede exceder 1000 caracteres"))]
    pub bio: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateInstructorRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre debe tener entre 1 y 100 caracteres"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "El apellido debe tener entre 1 y 100 caracteres"))]
    pub last_name: Option<String>,

    #[validate(email(message = "El correo electrónico no es válido"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "El teléfono no es válido"))]
    pub phone: Option<String>,

    #[validate(length(max = 100, message = "La especialidad no puede exceder 100 caracteres"))]
    pub specialty: Option<String>,

    #[validate(length(max = 1000, message = "La biografía no puede exceder 1000 caracteres"))]
    pub bio: Option<String>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[serde(default, deserialize_with = "de_opt_id")]
    pub user_id: Option<i64>,

    #[validate(length(min = 1, max = 100, message = "El nombre es requerido (máximo 100 caracteres)"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "El apellido es requerido (máximo 100 caracteres)"))]
    pub last_name: String,

    #[validate(email(message = "El correo electrónico no es válido"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "El teléfono no es válido"))]
    pub phone: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "El contacto de emergencia no puede exceder 200 caracteres"))]
    pub emergency_contact: Option<String>,

    #[validate(length(max = 2000, message = "Las notas médicas no pueden exceder 2000 caracteres"))]
    pub medical_notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateStudentRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre debe tener entre 1 y 100 caracteres"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "El apellido debe tener entre 1 y 100 caracteres"))]
    pub last_name: Option<String>,

    #[validate(email(message = "El correo electrónico no es válido"))]
    pub email: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "El teléfono no es válido"))]
    pub phone: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "El contacto de emergencia no puede exceder 200 caracteres"))]
    pub emergency_contact: Option<String>,

    #[validate(length(max = 2000, message = "Las notas médicas no pueden exceder 2000 caracteres"))]
    pub medical_notes: Option<String>,

    pub is_active: Option<bool>,
}

// ============================================================================
// Zones & classes
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateZoneRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre de la zona es requerido (máximo 100 caracteres)"))]
    pub name: String,

    #[validate(length(max = 500, message = "La descripción no puede exceder 500 caracteres"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 200, message = "La capacidad debe estar entre 1 y 200"))]
    pub capacity: Option<i32>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateZoneRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre de la zona debe tener entre 1 y 100 caracteres"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "La descripción no puede exceder 500 caracteres"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 200, message = "La capacidad debe estar entre 1 y 200"))]
    pub capacity: Option<i32>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_class_times"))]
pub struct CreateClassRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre de la clase es requerido (máximo 100 caracteres)"))]
    pub name: String,

    #[validate(length(max = 500, message = "La descripción no puede exceder 500 caracteres"))]
    pub description: Option<String>,

    #[serde(deserialize_with = "de_id")]
    pub instructor_id: i64,

    #[serde(deserialize_with = "de_id")]
    pub zone_id: i64,

    pub start_time: DateTime<Utc>,

    pub end_time: DateTime<Utc>,

    #[validate(range(min = 1, max = 100, message = "La capacidad debe estar entre 1 y 100"))]
    pub capacity_limit: i32,
}

fn validate_class_times(request: &CreateClassRequest) -> Result<(), ValidationError> {
    if request.end_time <= request.start_time {
        return Err(ValidationError::new("time_range").with_message(Cow::Borrowed(
            "La hora de fin debe ser posterior a la hora de inicio",
        )));
    }
    Ok(())
}

/// Start/end consistency of a partial update is checked by the class service
/// against the merged values.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateClassRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre de la clase debe tener entre 1 y 100 caracteres"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "La descripción no puede exceder 500 caracteres"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub instructor_id: Option<i64>,

    #[serde(default, deserialize_with = "de_opt_id")]
    pub zone_id: Option<i64>,

    pub start_time: Option<DateTime<Utc>>,

    pub end_time: Option<DateTime<Utc>>,

    #[validate(range(min = 1, max = 100, message = "La capacidad debe estar entre 1 y 100"))]
    pub capacity_limit: Option<i32>,

    pub status: Option<ClassStatus>,
}

/// Class list query parameters
#[derive(Debug, Default, Deserialize)]
pub struct ClassQueryParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub instructor_id: Option<i64>,
    pub zone_id: Option<i64>,
    pub status: Option<ClassStatus>,
}

// ============================================================================
// Enrollments & attendance
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEnrollmentRequest {
    #[serde(deserialize_with = "de_id")]
    pub student_id: i64,

    #[serde(deserialize_with = "de_id")]
    pub class_id: i64,

    /// Purchase to take a class credit from
    #[serde(default, deserialize_with = "de_opt_id")]
    pub purchase_id: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAttendanceRequest {
    #[serde(deserialize_with = "de_id")]
    pub student_id: i64,

    #[serde(deserialize_with = "de_id")]
    pub class_id: i64,

    /// Defaults to the class start time
    pub attended_at: Option<DateTime<Utc>>,

    #[validate(length(max = 500, message = "Las notas no pueden exceder 500 caracteres"))]
    pub notes: Option<String>,
}

// ============================================================================
// Packages, purchases & payments
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePackageRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre del paquete es requerido (máximo 100 caracteres)"))]
    pub name: String,

    #[validate(length(max = 500, message = "La descripción no puede exceder 500 caracteres"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 200, message = "La cantidad de clases debe estar entre 1 y 200"))]
    pub class_count: i32,

    #[validate(range(min = 1, max = 730, message = "La vigencia debe estar entre 1 y 730 días"))]
    pub validity_days: i32,

    #[validate(range(min = 0.0, max = 1_000_000.0, message = "El precio debe ser un valor positivo"))]
    pub price: f64,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePackageRequest {
    #[validate(length(min = 1, max = 100, message = "El nombre del paquete debe tener entre 1 y 100 caracteres"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "La descripción no puede exceder 500 caracteres"))]
    pub description: Option<String>,

    #[validate(range(min = 1, max = 200, message = "La cantidad de clases debe estar entre 1 y 200"))]
    pub class_count: Option<i32>,

    #[validate(range(min = 1, max = 730, message = "La vigencia debe estar entre 1 y 730 días"))]
    pub validity_days: Option<i32>,

    #[validate(range(min = 0.0, max = 1_000_000.0, message = "El precio debe ser un valor positivo"))]
    pub price: Option<f64>,

    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePurchaseRequest {
    #[serde(deserialize_with = "de_id")]
    pub student_id: i64,

    #[serde(deserialize_with = "de_id")]
    pub package_id: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePaymentRequest {
    #[serde(deserialize_with = "de_id")]
    pub purchase_id: i64,

    #[validate(range(exclusive_min = 0.0, max = 1_000_000.0, message = "El monto debe ser mayor a cero"))]
    pub amount: f64,

    pub method: PaymentMethod,

    #[validate(length(max = 100, message = "La referencia no puede exceder 100 caracteres"))]
    pub reference: Option<String>,

    #[validate(length(max = 500, message = "Las notas no pueden exceder 500 caracteres"))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdatePaymentRequest {
    pub status: Option<PaymentStatus>,

    #[validate(length(max = 100, message = "La referencia no puede exceder 100 caracteres"))]
    pub reference: Option<String>,

    #[validate(length(max = 500, message = "Las notas no pueden exceder 500 caracteres"))]
    pub notes: Option<String>,
}

/// `?active_only=true` on list endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ListQueryParams {
    #[serde(default)]
    pub active_only: bool,
}
