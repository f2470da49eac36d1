//! Package Service
//!
//! The package catalogue and student purchases.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::ensure_student_access;
use crate::application::dto::request::{
    CreatePackageRequest, CreatePurchaseRequest, UpdatePackageRequest,
};
use crate::application::dto::response::{PackageDto, PurchaseDto};
use crate::application::mapping::{
    apply_package_update, package_from_create, package_to_dto, purchase_from_package,
    purchase_to_dto,
};
use crate::domain::{
    Actor, PackageRepository, Purchase, PurchaseRepository, PurchaseStatus, StudentRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

#[async_trait]
pub trait PackageService: Send + Sync {
    async fn list_packages(&self, active_only: bool) -> Result<Vec<PackageDto>, PackageError>;

    async fn get_package(&self, package_id: i64) -> Result<PackageDto, PackageError>;

    async fn create_package(&self, request: CreatePackageRequest) -> Result<PackageDto, PackageError>;

    async fn update_package(
        &self,
        package_id: i64,
        request: UpdatePackageRequest,
    ) -> Result<PackageDto, PackageError>;

    /// Withdraw a package from sale. Existing purchases are unaffected.
    async fn deactivate_package(&self, package_id: i64) -> Result<PackageDto, PackageError>;

    async fn purchase(
        &self,
        actor: &Actor,
        request: CreatePurchaseRequest,
    ) -> Result<PurchaseDto, PackageError>;

    async fn get_purchase(&self, actor: &Actor, purchase_id: i64)
        -> Result<PurchaseDto, PackageError>;

    async fn list_purchases(
        &self,
        actor: &Actor,
        student_id: i64,
    ) -> Result<Vec<PurchaseDto>, PackageError>;

    async fn cancel_purchase(&self, purchase_id: i64) -> Result<PurchaseDto, PackageError>;
}

/// Package service errors
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("Package not found")]
    PackageNotFound,

    #[error("Purchase not found")]
    PurchaseNotFound,

    #[error("Student not found")]
    StudentNotFound,

    #[error("Package is not on sale")]
    PackageInactive,

    #[error("Purchase is {0}")]
    NotActive(PurchaseStatus),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<PackageError> for AppError {
    fn from(err: PackageError) -> Self {
        match err {
            PackageError::PackageNotFound => AppError::NotFound("Paquete no encontrado".into()),
            PackageError::PurchaseNotFound => AppError::NotFound("Compra no encontrada".into()),
            PackageError::StudentNotFound => AppError::NotFound("Alumno no encontrado".into()),
            PackageError::PackageInactive => {
                AppError::Unprocessable("El paquete no está disponible".into())
            }
            PackageError::NotActive(status) => AppError::Conflict(format!(
                "La compra no está activa (estado: {})",
                status
            )),
            PackageError::Store(e) => e,
        }
    }
}

pub struct PackageServiceImpl<K, P, S>
where
    K: PackageRepository,
    P: PurchaseRepository,
    S: StudentRepository,
{
    package_repo: Arc<K>,
    purchase_repo: Arc<P>,
    student_repo: Arc<S>,
    id_generator: Arc<SnowflakeGenerator>,
}

impl<K, P, S> PackageServiceImpl<K, P, S>
where
    K: PackageRepository,
    P: PurchaseRepository,
    S: StudentRepository,
{
    pub fn new(
        package_repo: Arc<K>,
        purchase_repo: Arc<P>,
        student_repo: Arc<S>,
        id_generator: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            package_repo,
            purchase_repo,
            student_repo,
            id_generator,
        }
    }

    async fn find_purchase(&self, purchase_id: i64) -> Result<Purchase, PackageError> {
        self.purchase_repo
            .find_by_id(purchase_id)
            .await?
            .ok_or(PackageError::PurchaseNotFound)
    }

    async fn purchase_dto(&self, purchase: &Purchase) -> Result<PurchaseDto, PackageError> {
        let student = self.student_repo.find_by_id(purchase.student_id).await?;
        let package = self.package_repo.find_by_id(purchase.package_id).await?;
        Ok(purchase_to_dto(
            purchase,
            student.as_ref(),
            package.as_ref(),
            Utc::now(),
        ))
    }
}

#[async_trait]
impl<K, P, S> PackageService for PackageServiceImpl<K, P, S>
where
    K: PackageRepository + 'static,
    P: PurchaseRepository + 'static,
    S: StudentRepository + 'static,
{
    async fn list_packages(&self, active_only: bool) -> Result<Vec<PackageDto>, PackageError> {
        let packages = self.package_repo.list(active_only).await?;
        Ok(packages.iter().map(package_to_dto).collect())
    }

    async fn get_package(&self, package_id: i64) -> Result<PackageDto, PackageError> {
        self.package_repo
            .find_by_id(package_id)
            .await?
            .map(|p| package_to_dto(&p))
            .ok_or(PackageError::PackageNotFound)
    }

    async fn create_package(&self, request: CreatePackageRequest) -> Result<PackageDto, PackageError> {
        let package = package_from_create(request, self.id_generator.generate(), Utc::now());
        let package = self.package_repo.create(&package).await?;

        tracing::info!(package_id = package.id, name = %package.name, "Package created");
        Ok(package_to_dto(&package))
    }

    async fn update_package(
        &self,
        package_id: i64,
        request: UpdatePackageRequest,
    ) -> Result<PackageDto, PackageError> {
        let mut package = self
            .package_repo
            .find_by_id(package_id)
            .await?
            .ok_or(PackageError::PackageNotFound)?;

        apply_package_update(&mut package, request, Utc::now());
        let package = self.package_repo.update(&package).await?;
        Ok(package_to_dto(&package))
    }

    async fn deactivate_package(&self, package_id: i64) -> Result<PackageDto, PackageError> {
        let mut package = self
            .package_repo
            .find_by_id(package_id)
            .await?
            .ok_or(PackageError::PackageNotFound)?;

        package.is_active = false;
        package.updated_at = Utc::now();
        let package = self.package_repo.update(&package).await?;

        tracing::info!(package_id, "Package deactivated");
        Ok(package_to_dto(&package))
    }

    #[tracing::instrument(skip(self, actor, request), fields(student_id = request.student_id, package_id = request.package_id))]
    async fn purchase(
        &self,
        actor: &Actor,
        request: CreatePurchaseRequest,
    ) -> Result<PurchaseDto, PackageError> {
        ensure_student_access(&*self.student_repo, actor, request.student_id).await?;

        let student = self
            .student_repo
            .find_by_id(request.student_id)
            .await?
            .ok_or(PackageError::StudentNotFound)?;
        let package = self
            .package_repo
            .find_by_id(request.package_id)
            .await?
            .ok_or(PackageError::PackageNotFound)?;
        if !package.is_active {
            return Err(PackageError::PackageInactive);
        }

        let now = Utc::now();
        let purchase = purchase_from_package(student.id, &package, self.id_generator.generate(), now);
        let purchase = self.purchase_repo.create(&purchase).await?;

        tracing::info!(purchase_id = purchase.id, expires = %purchase.expires_at, "Package purchased");
        Ok(purchase_to_dto(&purchase, Some(&student), Some(&package), now))
    }

    async fn get_purchase(
        &self,
        actor: &Actor,
        purchase_id: i64,
    ) -> Result<PurchaseDto, PackageError> {
        let purchase = self.find_purchase(purchase_id).await?;
        ensure_student_access(&*self.student_repo, actor, purchase.student_id).await?;
        self.purchase_dto(&purchase).await
    }

    async fn list_purchases(
        &self,
        actor: &Actor,
        student_id: i64,
    ) -> Result<Vec<PurchaseDto>, PackageError> {
        ensure_student_access(&*self.student_repo, actor, student_id).await?;

        let purchases = self.purchase_repo.list_by_student(student_id).await?;
        let mut result = Vec::with_capacity(purchases.len());
        for purchase in &purchases {
            result.push(self.purchase_dto(purchase).await?);
        }
        Ok(result)
    }

    async fn cancel_purchase(&self, purchase_id: i64) -> Result<PurchaseDto, PackageError> {
        let mut purchase = self.find_purchase(purchase_id).await?;
        if purchase.status != PurchaseStatus::Active {
            return Err(PackageError::NotActive(purchase.status));
        }

        purchase.status = PurchaseStatus::Cancelled;
        purchase.updated_at = Utc::now();
        let purchase = self.purchase_repo.update(&purchase).await?;

        tracing::info!(purchase_id, "Purchase cancelled");
        self.purchase_dto(&purchase).await
    }
}
