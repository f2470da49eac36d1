//! Service Registry
//!
//! Named service factories resolved inside a per-request scope. A scope
//! builds the SQL repositories once over the shared pool, and every service
//! resolved from that scope shares them.
//!
//! ```rust,ignore
//! let scope = state.registry.begin_scope()?;
//! let classes = scope.class_service()?;
//! let class = classes.get_class(class_id).await?;
//! ```

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sqlx::AnyPool;

use crate::application::services::{
    AuthServiceImpl, ClassServiceImpl, EnrollmentServiceImpl, PackageServiceImpl,
    PaymentServiceImpl, UserServiceImpl,
};
use crate::config::JwtSettings;
use crate::infrastructure::repositories::{
    SqlAttendanceRepository, SqlClassRepository, SqlEnrollmentRepository,
    SqlInstructorRepository, SqlPackageRepository, SqlPaymentRepository, SqlPurchaseRepository,
    SqlStudentRepository, SqlUserRepository, SqlZoneRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

pub type AuthSvc = AuthServiceImpl<SqlUserRepository, SqlInstructorRepository, SqlStudentRepository>;

pub type UserSvc = UserServiceImpl<
    SqlUserRepository,
    SqlInstructorRepository,
    SqlStudentRepository,
    SqlClassRepository,
    SqlEnrollmentRepository,
    SqlPurchaseRepository,
    SqlAttendanceRepository,
>;

pub type ClassSvc = ClassServiceImpl<
    SqlZoneRepository,
    SqlClassRepository,
    SqlInstructorRepository,
    SqlEnrollmentRepository,
>;

pub type EnrollmentSvc = EnrollmentServiceImpl<
    SqlEnrollmentRepository,
    SqlClassRepository,
    SqlStudentRepository,
    SqlPurchaseRepository,
    SqlAttendanceRepository,
>;

pub type PackageSvc =
    PackageServiceImpl<SqlPackageRepository, SqlPurchaseRepository, SqlStudentRepository>;

pub type PaymentSvc = PaymentServiceImpl<SqlPaymentRepository, SqlPurchaseRepository>;

/// A resolved service instance, downcast by [`ServiceScope::resolve_as`].
pub type Resolved = Arc<dyn Any + Send + Sync>;

type Factory = Arc<dyn Fn(&ServiceScope<'_>) -> Result<Resolved, AppError> + Send + Sync>;

/// Registration names.
pub mod names {
    pub const AUTH_SERVICE: &str = "auth_service";
    pub const USER_SERVICE: &str = "user_service";
    pub const CLASS_SERVICE: &str = "class_service";
    pub const ENROLLMENT_SERVICE: &str = "enrollment_service";
    pub const PACKAGE_SERVICE: &str = "package_service";
    pub const PAYMENT_SERVICE: &str = "payment_service";

    /// Services the readiness check expects to resolve.
    pub const HEALTH_CHECKED: [&str; 5] = [
        USER_SERVICE,
        CLASS_SERVICE,
        ENROLLMENT_SERVICE,
        PACKAGE_SERVICE,
        PAYMENT_SERVICE,
    ];
}

pub struct ServiceRegistry {
    pool: AnyPool,
    snowflake: Arc<SnowflakeGenerator>,
    jwt: JwtSettings,
    factories: HashMap<&'static str, Factory>,
}

impl ServiceRegistry {
    /// An empty registry; see [`ServiceRegistry::with_default_services`].
    pub fn new(pool: AnyPool, snowflake: Arc<SnowflakeGenerator>, jwt: JwtSettings) -> Self {
        Self {
            pool,
            snowflake,
            jwt,
            factories: HashMap::new(),
        }
    }

    /// A registry with every application service registered.
    pub fn with_default_services(
        pool: AnyPool,
        snowflake: Arc<SnowflakeGenerator>,
        jwt: JwtSettings,
    ) -> Self {
        let mut registry = Self::new(pool, snowflake, jwt);

        registry.register(names::AUTH_SERVICE, |scope| {
            let r = &scope.repos;
            Ok(Arc::new(AuthSvc::new(
                r.users.clone(),
                r.instructors.clone(),
                r.students.clone(),
                scope.snowflake(),
                scope.registry.jwt.clone(),
            )) as Resolved)
        });

        registry.register(names::USER_SERVICE, |scope| {
            let r = &scope.repos;
            Ok(Arc::new(UserSvc::new(
                r.users.clone(),
                r.instructors.clone(),
                r.students.clone(),
                r.classes.clone(),
                r.enrollments.clone(),
                r.purchases.clone(),
                r.attendances.clone(),
                scope.snowflake(),
            )) as Resolved)
        });

        registry.register(names::CLASS_SERVICE, |scope| {
            let r = &scope.repos;
            Ok(Arc::new(ClassSvc::new(
                r.zones.clone(),
                r.classes.clone(),
                r.instructors.clone(),
                r.enrollments.clone(),
                scope.snowflake(),
            )) as Resolved)
        });

        registry.register(names::ENROLLMENT_SERVICE, |scope| {
            let r = &scope.repos;
            Ok(Arc::new(EnrollmentSvc::new(
                r.enrollments.clone(),
                r.classes.clone(),
                r.students.clone(),
                r.purchases.clone(),
                r.attendances.clone(),
                scope.snowflake(),
            )) as Resolved)
        });

        registry.register(names::PACKAGE_SERVICE, |scope| {
            let r = &scope.repos;
            Ok(Arc::new(PackageSvc::new(
                r.packages.clone(),
                r.purchases.clone(),
                r.students.clone(),
                scope.snowflake(),
            )) as Resolved)
        });

        registry.register(names::PAYMENT_SERVICE, |scope| {
            let r = &scope.repos;
            Ok(Arc::new(PaymentSvc::new(
                r.payments.clone(),
                r.purchases.clone(),
                scope.snowflake(),
            )) as Resolved)
        });

        registry
    }

    /// Register (or replace) a named factory.
    pub fn register<F>(&mut self, name: &'static str, factory: F)
    where
        F: Fn(&ServiceScope<'_>) -> Result<Resolved, AppError> + Send + Sync + 'static,
    {
        self.factories.insert(name, Arc::new(factory));
    }

    /// Remove a registration. Returns whether it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        self.factories.remove(name).is_some()
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Open a resolution scope.
    ///
    /// # Errors
    /// Fails when the database pool has been closed.
    pub fn begin_scope(&self) -> Result<ServiceScope<'_>, AppError> {
        if self.pool.is_closed() {
            return Err(AppError::Internal(
                "Cannot open a service scope: database pool is closed".into(),
            ));
        }

        Ok(ServiceScope {
            registry: self,
            repos: Repositories::new(&self.pool),
        })
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ServiceRegistry")
            .field("services", &names)
            .finish_non_exhaustive()
    }
}

struct Repositories {
    users: Arc<SqlUserRepository>,
    instructors: Arc<SqlInstructorRepository>,
    students: Arc<SqlStudentRepository>,
    zones: Arc<SqlZoneRepository>,
    classes: Arc<SqlClassRepository>,
    enrollments: Arc<SqlEnrollmentRepository>,
    packages: Arc<SqlPackageRepository>,
    purchases: Arc<SqlPurchaseRepository>,
    payments: Arc<SqlPaymentRepository>,
    attendances: Arc<SqlAttendanceRepository>,
}

impl Repositories {
    fn new(pool: &AnyPool) -> Self {
        Self {
            users: Arc::new(SqlUserRepository::new(pool.clone())),
            instructors: Arc::new(SqlInstructorRepository::new(pool.clone())),
            students: Arc::new(SqlStudentRepository::new(pool.clone())),
            zones: Arc::new(SqlZoneRepository::new(pool.clone())),
            classes: Arc::new(SqlClassRepository::new(pool.clone())),
            enrollments: Arc::new(SqlEnrollmentRepository::new(pool.clone())),
            packages: Arc::new(SqlPackageRepository::new(pool.clone())),
            purchases: Arc::new(SqlPurchaseRepository::new(pool.clone())),
            payments: Arc::new(SqlPaymentRepository::new(pool.clone())),
            attendances: Arc::new(SqlAttendanceRepository::new(pool.clone())),
        }
    }
}

/// Resolution scope handed out by [`ServiceRegistry::begin_scope`].
pub struct ServiceScope<'r> {
    registry: &'r ServiceRegistry,
    repos: Repositories,
}

impl ServiceScope<'_> {
    pub fn snowflake(&self) -> Arc<SnowflakeGenerator> {
        self.registry.snowflake.clone()
    }

    /// `None` when nothing is registered under `name`.
    pub fn resolve(&self, name: &str) -> Option<Result<Resolved, AppError>> {
        self.registry
            .factories
            .get(name)
            .map(|factory| factory(self))
    }

    pub fn resolve_as<T>(&self, name: &str) -> Result<Arc<T>, AppError>
    where
        T: Any + Send + Sync,
    {
        let service = self.resolve(name).ok_or_else(|| {
            AppError::Internal(format!("Service '{}' is not registered", name))
        })??;

        service.downcast::<T>().map_err(|_| {
            AppError::Internal(format!("Service '{}' has an unexpected type", name))
        })
    }

    pub fn auth_service(&self) -> Result<Arc<AuthSvc>, AppError> {
        self.resolve_as(names::AUTH_SERVICE)
    }

    pub fn user_service(&self) -> Result<Arc<UserSvc>, AppError> {
        self.resolve_as(names::USER_SERVICE)
    }

    pub fn class_service(&self) -> Result<Arc<ClassSvc>, AppError> {
        self.resolve_as(names::CLASS_SERVICE)
    }

    pub fn enrollment_service(&self) -> Result<Arc<EnrollmentSvc>, AppError> {
        self.resolve_as(names::ENROLLMENT_SERVICE)
    }

    pub fn package_service(&self) -> Result<Arc<PackageSvc>, AppError> {
        self.resolve_as(names::PACKAGE_SERVICE)
    }

    pub fn payment_service(&self) -> Result<Arc<PaymentSvc>, AppError> {
        self.resolve_as(names::PAYMENT_SERVICE)
    }
}
