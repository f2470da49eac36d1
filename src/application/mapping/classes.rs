//! Zones and classes, including the capacity computation.

use chrono::{DateTime, Utc};

use super::{name_of, patch, patch_opt};
use crate::application::dto::request::{
    ClassQueryParams, CreateClassRequest, CreateZoneRequest, UpdateClassRequest,
    UpdateZoneRequest,
};
use crate::application::dto::response::{ClassDto, ZoneDto};
use crate::domain::{Class, ClassFilter, ClassStatus, Enrollment, Instructor, Zone};

pub fn zone_to_dto(zone: &Zone) -> ZoneDto {
    ZoneDto {
        id: zone.id.to_string(),
        name: zone.name.clone(),
        description: zone.description.clone(),
        capacity: zone.capacity,
        is_active: zone.is_active,
        created_at: zone.created_at,
        updated_at: zone.updated_at,
    }
}

pub fn zone_from_create(request: CreateZoneRequest, id: i64, now: DateTime<Utc>) -> Zone {
    Zone {
        id,
        name: request.name,
        description: request.description,
        capacity: request.capacity,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_zone_update(zone: &mut Zone, request: UpdateZoneRequest, now: DateTime<Utc>) {
    patch(&mut zone.name, request.name);
    patch_opt(&mut zone.description, request.description);
    patch_opt(&mut zone.capacity, request.capacity);
    patch(&mut zone.is_active, request.is_active);
    zone.updated_at = now;
}

/// Number of enrollments holding a spot (status `confirmed`).
pub fn reserved_spots(enrollments: &[Enrollment]) -> i32 {
    enrollments.iter().filter(|e| e.is_confirmed()).count() as i32
}

/// `capacity_limit - reserved`, floored at zero.
pub fn available_spots(capacity_limit: i32, reserved: i32) -> i32 {
    (capacity_limit - reserved).max(0)
}

/// `enrollments` are the class's enrollments in any status; only confirmed
/// ones count against capacity.
pub fn class_to_dto(
    class: &Class,
    instructor: Option<&Instructor>,
    zone: Option<&Zone>,
    enrollments: &[Enrollment],
) -> ClassDto {
    let reserved = reserved_spots(enrollments);

    ClassDto {
        id: class.id.to_string(),
        name: class.name.clone(),
        description: class.description.clone(),
        instructor_id: class.instructor_id.to_string(),
        instructor_name: name_of(instructor, Instructor::full_name),
        zone_id: class.zone_id.to_string(),
        zone_name: name_of(zone, |z| z.name.clone()),
        start_time: class.start_time,
        end_time: class.end_time,
        duration_minutes: class.duration_minutes(),
        capacity_limit: class.capacity_limit,
        reserved_spots: reserved,
        available_spots: available_spots(class.capacity_limit, reserved),
        status: class.status,
        created_at: class.created_at,
        updated_at: class.updated_at,
    }
}

pub fn class_from_create(request: CreateClassRequest, id: i64, now: DateTime<Utc>) -> Class {
    Class {
        id,
        name: request.name,
        description: request.description,
        instructor_id: request.instructor_id,
        zone_id: request.zone_id,
        start_time: request.start_time,
        end_time: request.end_time,
        capacity_limit: request.capacity_limit,
        status: ClassStatus::Scheduled,
        created_at: now,
        updated_at: now,
    }
}

pub fn apply_class_update(class: &mut Class, request: UpdateClassRequest, now: DateTime<Utc>) {
    patch(&mut class.name, request.name);
    patch_opt(&mut class.description, request.description);
    patch(&mut class.instructor_id, request.instructor_id);
    patch(&mut class.zone_id, request.zone_id);
    patch(&mut class.start_time, request.start_time);
    patch(&mut class.end_time, request.end_time);
    patch(&mut class.capacity_limit, request.capacity_limit);
    patch(&mut class.status, request.status);
    class.updated_at = now;
}

/// Query string → repository filter.
pub fn class_filter(params: ClassQueryParams) -> ClassFilter {
    ClassFilter {
        from: params.from,
        to: params.to,
        instructor_id: params.instructor_id,
        zone_id: params.zone_id,
        status: params.status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EnrollmentStatus;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn class(capacity_limit: i32) -> Class {
        let start = Utc::now() + Duration::days(1);
        Class {
            id: 100,
            name: "Reformer Intermedio".into(),
            description: Some("Nivel 2".into()),
            instructor_id: 7,
            zone_id: 8,
            start_time: start,
            end_time: start + Duration::minutes(55),
            capacity_limit,
            status: ClassStatus::Scheduled,
            created_at: start - Duration::days(10),
            updated_at: start - Duration::days(10),
        }
    }

    fn enrollment(id: i64, status: EnrollmentStatus) -> Enrollment {
        let now = Utc::now();
        Enrollment {
            id,
            student_id: id + 1000,
            class_id: 100,
            purchase_id: None,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn instructor() -> Instructor {
        let now = Utc::now();
        Instructor {
            id: 7,
            user_id: None,
            first_name: "Marta".into(),
            last_name: "Gil".into(),
            email: None,
            phone: None,
            specialty: Some("Reformer".into()),
            bio: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_available_spots_counts_only_confirmed() {
        let enrollments = vec![
            enrollment(1, EnrollmentStatus::Confirmed),
            enrollment(2, EnrollmentStatus::Confirmed),
            enrollment(3, EnrollmentStatus::Confirmed),
            enrollment(4, EnrollmentStatus::Cancelled),
            enrollment(5, EnrollmentStatus::Cancelled),
            enrollment(6, EnrollmentStatus::Completed),
        ];
        let dto = class_to_dto(&class(10), None, None, &enrollments);
        assert_eq!(dto.reserved_spots, 3);
        assert_eq!(dto.available_spots, 7);
    }

    #[test]
    fn test_available_spots_never_negative() {
        let enrollments: Vec<_> = (0..4)
            .map(|i| enrollment(i, EnrollmentStatus::Confirmed))
            .collect();
        let dto = class_to_dto(&class(2), None, None, &enrollments);
        assert_eq!(dto.available_spots, 0);
    }

    #[test]
    fn test_missing_related_records_yield_empty_names() {
        let dto = class_to_dto(&class(10), None, None, &[]);
        assert_eq!(dto.instructor_name, "");
        assert_eq!(dto.zone_name, "");
        assert_eq!(dto.available_spots, 10);
    }

    #[test]
    fn test_related_names_are_derived() {
        let now = Utc::now();
        let zone = Zone {
            id: 8,
            name: "Sala Norte".into(),
            description: None,
            capacity: Some(12),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let dto = class_to_dto(&class(10), Some(&instructor()), Some(&zone), &[]);
        assert_eq!(dto.instructor_name, "Marta Gil");
        assert_eq!(dto.zone_name, "Sala Norte");
        assert_eq!(dto.duration_minutes, 55);
    }

    #[test]
    fn test_create_ignores_client_timestamps_and_status() {
        let request: CreateClassRequest = serde_json::from_value(serde_json::json!({
            "name": "Mat",
            "instructor_id": "7",
            "zone_id": "8",
            "start_time": "2030-03-01T10:00:00Z",
            "end_time": "2030-03-01T11:00:00Z",
            "capacity_limit": 12,
            "status": "cancelled",
            "created_at": "1999-01-01T00:00:00Z",
            "updated_at": "1999-01-01T00:00:00Z"
        }))
        .unwrap();
        let now = Utc::now();
        let class = class_from_create(request, 1, now);
        assert_eq!(class.created_at, now);
        assert_eq!(class.updated_at, now);
        assert_eq!(class.status, ClassStatus::Scheduled);
    }

    #[test]
    fn test_update_overwrites_only_supplied_fields() {
        let mut stored = class(10);
        let before = stored.clone();
        let now = Utc::now();

        apply_class_update(
            &mut stored,
            UpdateClassRequest {
                capacity_limit: Some(14),
                description: None,
                ..Default::default()
            },
            now,
        );

        assert_eq!(stored.capacity_limit, 14);
        assert_eq!(stored.description, before.description);
        assert_eq!(stored.name, before.name);
        assert_eq!(stored.start_time, before.start_time);
        assert_eq!(stored.status, before.status);
        assert_eq!(stored.created_at, before.created_at);
        assert_eq!(stored.updated_at, now);
    }

    #[test]
    fn test_zone_update_keeps_description_when_absent() {
        let now = Utc::now();
        let mut zone = zone_from_create(
            CreateZoneRequest {
                name: "Sala Sur".into(),
                description: Some("Luz natural".into()),
                capacity: Some(8),
            },
            3,
            now,
        );
        apply_zone_update(
            &mut zone,
            UpdateZoneRequest {
                name: Some("Sala Sur 2".into()),
                ..Default::default()
            },
            now,
        );
        assert_eq!(zone.name, "Sala Sur 2");
        assert_eq!(zone.description.as_deref(), Some("Luz natural"));
        assert_eq!(zone.capacity, Some(8));
    }
}
