//! Class Service
//!
//! Zones and the class schedule. Cancelling a class releases every confirmed
//! enrollment in it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::dto::request::{
    CreateClassRequest, CreateZoneRequest, UpdateClassRequest, UpdateZoneRequest,
};
use crate::application::dto::response::{ClassDto, ZoneDto};
use crate::application::mapping::{
    apply_class_update, apply_zone_update, class_from_create, class_to_dto, reserved_spots,
    zone_from_create, zone_to_dto,
};
use crate::domain::{
    Class, ClassFilter, ClassRepository, ClassStatus, EnrollmentRepository, Instructor,
    InstructorRepository, Zone, ZoneRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait ClassService: Send + Sync {
    async fn list_zones(&self, active_only: bool) -> Result<Vec<ZoneDto>, ClassError>;

    async fn get_zone(&self, zone_id: i64) -> Result<ZoneDto, ClassError>;

    async fn create_zone(&self, request: CreateZoneRequest) -> Result<ZoneDto, ClassError>;

    async fn update_zone(
        &self,
        zone_id: i64,
        request: UpdateZoneRequest,
    ) -> Result<ZoneDto, ClassError>;

    /// Fails with `InUse` while any class is held in the zone.
    async fn delete_zone(&self, zone_id: i64) -> Result<(), ClassError>;

    async fn list_classes(&self, filter: ClassFilter) -> Result<Vec<ClassDto>, ClassError>;

    async fn get_class(&self, class_id: i64) -> Result<ClassDto, ClassError>;

    async fn create_class(&self, request: CreateClassRequest) -> Result<ClassDto, ClassError>;

    async fn update_class(
        &self,
        class_id: i64,
        request: UpdateClassRequest,
    ) -> Result<ClassDto, ClassError>;

    async fn cancel_class(&self, class_id: i64) -> Result<ClassDto, ClassError>;
}

/// Class service errors
#[derive(Debug, thiserror::Error)]
pub enum ClassError {
    #[error("Class not found")]
    ClassNotFound,

    #[error("Zone not found")]
    ZoneNotFound,

    #[error("Instructor not found")]
    InstructorNotFound,

    #[error("{0} is inactive")]
    Inactive(&'static str),

    #[error("End time must be after start time")]
    InvalidTimeRange,

    #[error("Capacity {limit} exceeds zone capacity {zone_capacity}")]
    ExceedsZoneCapacity { limit: i32, zone_capacity: i32 },

    #[error("Capacity cannot drop below {reserved} reserved spots")]
    BelowReserved { reserved: i32 },

    #[error("Class is {0}")]
    NotScheduled(ClassStatus),

    #[error("Zone still has classes")]
    InUse,

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<ClassError> for AppError {
    fn from(err: ClassError) -> Self {
        match err {
            ClassError::ClassNotFound => AppError::NotFound("Clase no encontrada".into()),
            ClassError::ZoneNotFound => AppError::NotFound("Zona no encontrada".into()),
            ClassError::InstructorNotFound => AppError::NotFound("Instructor no encontrado".into()),
            ClassError::Inactive(what) => {
                AppError::Unprocessable(format!("{} no está activo", what))
            }
            ClassError::InvalidTimeRange => AppError::BadRequest(
                "La hora de fin debe ser posterior a la hora de inicio".into(),
            ),
            ClassError::ExceedsZoneCapacity { zone_capacity, .. } => AppError::Unprocessable(
                format!("La capacidad excede la capacidad de la zona ({})", zone_capacity),
            ),
            ClassError::BelowReserved { reserved } => AppError::Conflict(format!(
                "La capacidad no puede ser menor que los lugares reservados ({})",
                reserved
            )),
            ClassError::NotScheduled(status) => {
                AppError::Conflict(format!("La clase no está programada (estado: {})", status))
            }
            ClassError::InUse => AppError::Conflict("La zona tiene clases asociadas".into()),
            ClassError::Store(e) => e,
        }
    }
}

pub struct ClassServiceImpl<Z, C, I, E>
where
    Z: ZoneRepository,
    C: ClassRepository,
    I: InstructorRepository,
    E: EnrollmentRepository,
{
    zone_repo: Arc<Z>,
    class_repo: Arc<C>,
    instructor_repo: Arc<I>,
    enrollment_repo: Arc<E>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<Z, C, I, E> ClassServiceImpl<Z, C, I, E>
where
    Z: ZoneRepository,
    C: ClassRepository,
    I: InstructorRepository,
    E: EnrollmentRepository,
{
    pub fn new(
        zone_repo: Arc<Z>,
        class_repo: Arc<C>,
        instructor_repo: Arc<I>,
        enrollment_repo: Arc<E>,
            id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            zone_repo,
            class_repo,
            instructor_repo,
            enrollment_repo,
            id_generator,
        }
    }

    async fn find_class(&self, class_id: i64) -> Result<Class, ClassError> {
        self.class_repo
            .find_by_id(class_id)
            .await?
            .ok_or(ClassError::ClassNotFound)
    }

    async fn class_dto(&self, class: &Class) -> Result<ClassDto, ClassError> {
        let instructor = self.instructor_repo.find_by_id(class.instructor_id).await?;
        let zone = self.zone_repo.find_by_id(class.zone_id).await?;
        let enrollments = self.enrollment_repo.list_by_class(class.id).await?;

        Ok(class_to_dto(class, instructor.as_ref(), zone.as_ref(), &enrollments))
    }

    /// Instructor and zone must exist and be active, and the class must fit
    /// in the zone.
    async fn check_references(&self, class: &Class) -> Result<(), ClassError> {
        let instructor = self
            .instructor_repo
            .find_by_id(class.instructor_id)
            .await?
            .ok_or(ClassError::InstructorNotFound)?;
        if !instructor.is_active {
            return Err(ClassError::Inactive("El instructor"));
        }

        let zone = self
            .zone_repo
            .find_by_id(class.zone_id)
            .await?
            .ok_or(ClassError::ZoneNotFound)?;
        if !zone.is_active {
            return Err(ClassError::Inactive("La zona"));
        }

        if let Some(zone_capacity) = zone.capacity {
            if class.capacity_limit > zone_capacity {
                return Err(ClassError::ExceedsZoneCapacity {
                    limit: class.capacity_limit,
                    zone_capacity,
                });
            }
        }

        Ok(())
    }
}

#[async_trait]
impl<Z, C, I, E> ClassService for ClassServiceImpl<Z, C, I, E>
where
    Z: ZoneRepository + 'static,
    C: ClassRepository + 'static,
    I: InstructorRepository + 'static,
    E: EnrollmentRepository + 'static,
{
    async fn list_zones(&self, active_only: bool) -> Result<Vec<ZoneDto>, ClassError> {
        let zones = self.zone_repo.list(active_only).await?;
        Ok(zones.iter().map(zone_to_dto).collect())
    }

    async fn get_zone(&self, zone_id: i64) -> Result<ZoneDto, ClassError> {
        self.zone_repo
            .find_by_id(zone_id)
            .await?
            .map(|z| zone_to_dto(&z))
            .ok_or(ClassError::ZoneNotFound)
    }

    async fn create_zone(&self, request: CreateZoneRequest) -> Result<ZoneDto, ClassError> {
        let zone = zone_from_create(request, self.id_generator.generate(), Utc::now());
        let zone = self.zone_repo.create(&zone).await?;

        tracing::info!(zone_id = zone.id, name = %zone.name, "Zone created");
        Ok(zone_to_dto(&zone))
    }

    async fn update_zone(
        &self,
        zone_id: i64,
        request: UpdateZoneRequest,
    ) -> Result<ZoneDto, ClassError> {
        let mut zone = self
            .zone_repo
            .find_by_id(zone_id)
            .await?
            .ok_or(ClassError::ZoneNotFound)?;

        apply_zone_update(&mut zone, request, Utc::now());
        let zone = self.zone_repo.update(&zone).await?;
        Ok(zone_to_dto(&zone))
    }

    async fn delete_zone(&self, zone_id: i64) -> Result<(), ClassError> {
        if self.zone_repo.find_by_id(zone_id).await?.is_none() {
            return Err(ClassError::ZoneNotFound);
        }

        let filter = ClassFilter {
            zone_id: Some(zone_id),
            ..Default::default()
        };
        if !self.class_repo.list(&filter).await?.is_empty() {
            return Err(ClassError::InUse);
        }

        self.zone_repo.delete(zone_id).await?;
        tracing::info!(zone_id, "Zone deleted");
        Ok(())
    }

    async fn list_classes(&self, filter: ClassFilter) -> Result<Vec<ClassDto>, ClassError> {
        let classes = self.class_repo.list(&filter).await?;

        let mut instructors: HashMap<i64, Option<Instructor>> = HashMap::new();
        let mut zones: HashMap<i64, Option<Zone>> = HashMap::new();
        let mut result = Vec::with_capacity(classes.len());

        for class in &classes {
            if !instructors.contains_key(&class.instructor_id) {
                let found = self.instructor_repo.find_by_id(class.instructor_id).await?;
                instructors.insert(class.instructor_id, found);
            }
            if !zones.contains_key(&class.zone_id) {
                let found = self.zone_repo.find_by_id(class.zone_id).await?;
                zones.insert(class.zone_id, found);
            }
            let enrollments = self.enrollment_repo.list_by_class(class.id).await?;

            result.push(class_to_dto(
                class,
                instructors.get(&class.instructor_id).and_then(Option::as_ref),
                zones.get(&class.zone_id).and_then(Option::as_ref),
                &enrollments,
            ));
        }

        Ok(result)
    }

    async fn get_class(&self, class_id: i64) -> Result<ClassDto, ClassError> {
        let class = self.find_class(class_id).await?;
        self.class_dto(&class).await
    }

    #[tracing::instrument(skip_all)]
    async fn create_class(&self, request: CreateClassRequest) -> Result<ClassDto, ClassError> {
        let class = class_from_create(request, self.id_generator.generate(), Utc::now());
        self.check_references(&class).await?;

        let class = self.class_repo.create(&class).await?;
        tracing::info!(class_id = class.id, start = %class.start_time, "Class scheduled");

        self.class_dto(&class).await
    }

    #[tracing::instrument(skip(self, request))]
    async fn update_class(
        &self,
        class_id: i64,
        request: UpdateClassRequest,
    ) -> Result<ClassDto, ClassError> {
        let mut class = self.find_class(class_id).await?;
        if class.status == ClassStatus::Cancelled {
            return Err(ClassError::NotScheduled(class.status));
        }

        apply_class_update(&mut class, request, Utc::now());

        if class.end_time <= class.start_time {
            return Err(ClassError::InvalidTimeRange);
        }
        self.check_references(&class).await?;

        let reserved = reserved_spots(&self.enrollment_repo.list_by_class(class.id).await?);
        if class.capacity_limit < reserved {
            return Err(ClassError::BelowReserved { reserved });
        }

        let class = self.class_repo.update(&class).await?;
        self.class_dto(&class).await
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_class(&self, class_id: i64) -> Result<ClassDto, ClassError> {
        let class = self.find_class(class_id).await?;
        if class.status != ClassStatus::Scheduled {
            return Err(ClassError::NotScheduled(class.status));
        }

        let Some(released) = self.class_repo.cancel(class_id, Utc::now()).await? else {
            let current = self.find_class(class_id).await?;
            return Err(ClassError::NotScheduled(current.status));
        };
        let class = self.find_class(class_id).await?;

        tracing::info!(class_id = class.id, released, "Class cancelled");
        self.class_dto(&class).await
    }
}
