//! Response DTOs
//!
//! Data structures for API response bodies. Built only by the functions in
//! [`crate::application::mapping`].

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{
    ClassStatus, EnrollmentStatus, PaymentMethod, PaymentStatus, PurchaseStatus, Role,
};

/// Authenticated account summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserInfoDto {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub instructor_id: Option<String>,
    pub student_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Login/registration response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserInfoDto,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstructorDto {
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDto {
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub emergency_contact: Option<String>,
    pub medical_notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub instructor_id: String,
    pub instructor_name: String,
    pub zone_id: String,
    pub zone_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_minutes: i64,
    pub capacity_limit: i32,
    pub reserved_spots: i32,
    pub available_spots: i32,
    pub status: ClassStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentDto {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub class_id: String,
    pub class_name: String,
    pub class_start_time: Option<DateTime<Utc>>,
    pub purchase_id: Option<String>,
    pub status: EnrollmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceDto {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub class_id: String,
    pub class_name: String,
    pub attended_at: DateTime<Utc>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PackageDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub class_count: i32,
    pub validity_days: i32,
    pub price: f64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseDto {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub package_id: String,
    pub package_name: String,
    pub purchased_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub remaining_classes: i32,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentDto {
    pub id: String,
    pub purchase_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
