//! Authentication Service
//!
//! Self-registration, login and JWT issuing/validation.

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::profile_link;
use crate::application::dto::request::{LoginRequest, RegisterRequest};
use crate::application::dto::response::{AuthResponse, UserInfoDto};
use crate::application::mapping::{student_from_register, user_from_register, user_to_info};
use crate::config::JwtSettings;
use crate::domain::{
    Actor, InstructorRepository, Role, StudentRepository, User, UserProfileLink, UserRepository,
};
use crate::shared::error::AppError;
use crate::shared::snowflake::SnowflakeGenerator;

/// Authentication service trait for dependency injection
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a student account with its student profile and sign it in.
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError>;

    /// Authenticate with email and password.
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError>;

    /// Profile of the authenticated user.
    async fn me(&self, user_id: i64) -> Result<UserInfoDto, AuthError>;

    /// Resolve a bearer token to the caller. Role and active flag are read
    /// from the stored account, not the claims.
    async fn authenticate(&self, token: &str) -> Result<Actor, AuthError>;
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub role: Role,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account disabled")]
    AccountDisabled,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Email already exists")]
    EmailExists,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] AppError),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => {
                AppError::Unauthorized("Correo o contraseña incorrectos".into())
            }
            AuthError::AccountDisabled => AppError::Forbidden("La cuenta está desactivada".into()),
            AuthError::TokenExpired => AppError::Unauthorized("El token ha expirado".into()),
            AuthError::InvalidToken => AppError::Unauthorized("Token inválido".into()),
            AuthError::UserNotFound => AppError::NotFound("Usuario no encontrado".into()),
            AuthError::EmailExists => {
                AppError::Conflict("El correo electrónico ya está registrado".into())
            }
            AuthError::Hashing(msg) => AppError::Internal(msg),
            AuthError::Store(e) => e,
        }
    }
}

/// Hash a password using Argon2id
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against its hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Sign an access token for `user`. Returns the token and its lifetime in seconds.
pub fn issue_access_token(
    user: &User,
    settings: &JwtSettings,
    now: DateTime<Utc>,
) -> Result<(String, i64), AuthError> {
    let claims = Claims {
        sub: user.id.to_string(),
        role: user.role,
        exp: (now + Duration::minutes(settings.access_token_expiry_minutes)).timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| AuthError::Hashing(format!("Token generation failed: {}", e)))?;

    Ok((token, settings.access_token_expiry_minutes * 60))
}

/// Decode and validate an access token
pub fn decode_access_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}

/// AuthService implementation
pub struct AuthServiceImpl<U, I, S>
where
    U: UserRepository,
    I: InstructorRepository,
    S: StudentRepository,
{
    user_repo: Arc<U>,
    instructor_repo: Arc<I>,
    student_repo: Arc<S>,
    id_generator: Arc<SnowflakeGenerator>,
    jwt_settings: JwtSettings,
}

impl<U, I, S> AuthServiceImpl<U, I, S>
where
    U: UserRepository,
    I: InstructorRepository,
    S: StudentRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        instructor_repo: Arc<I>,
        student_repo: Arc<S>,
        id_generator: Arc<SnowflakeGenerator>,
        jwt_settings: JwtSettings,
    ) -> Self {
        Self {
            user_repo,
            instructor_repo,
            student_repo,
            id_generator,
            jwt_settings,
        }
    }

    fn respond(
        &self,
        user: &User,
        link: Option<UserProfileLink>,
    ) -> Result<AuthResponse, AuthError> {
        let (access_token, expires_in) = issue_access_token(user, &self.jwt_settings, Utc::now())?;

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user: user_to_info(user, link),
        })
    }
}

#[async_trait]
impl<U, I, S> AuthService for AuthServiceImpl<U, I, S>
where
    U: UserRepository + 'static,
    I: InstructorRepository + 'static,
    S: StudentRepository + 'static,
{
    #[tracing::instrument(skip_all)]
    async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim().to_lowercase();
        if self.user_repo.email_exists(&email).await? {
            return Err(AuthError::EmailExists);
        }

        let password_hash = hash_password(&request.password)?;
        let now = Utc::now();

        let user = user_from_register(&request, self.id_generator.generate(), password_hash, now);
        let user = self.user_repo.create(&user).await?;

        let profile = student_from_register(&request, self.id_generator.generate(), &user, now);
        let profile = self.student_repo.create(&profile).await?;

        tracing::info!(user_id = user.id, student_id = profile.id, "Student account registered");

        self.respond(&user, Some(UserProfileLink::Student(profile.id)))
    }

    #[tracing::instrument(skip_all)]
    async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        let email = request.email.trim().to_lowercase();
        let user = self
            .user_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            tracing::debug!(user_id = user.id, "Rejected login with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        let link = profile_link(&*self.instructor_repo, &*self.student_repo, user.id).await?;
        self.respond(&user, link)
    }

    async fn me(&self, user_id: i64) -> Result<UserInfoDto, AuthError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let link = profile_link(&*self.instructor_repo, &*self.student_repo, user.id).await?;
        Ok(user_to_info(&user, link))
    }

    async fn authenticate(&self, token: &str) -> Result<Actor, AuthError> {
        let claims = decode_access_token(token, &self.jwt_settings.secret)?;
        let user = self
            .user_repo
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::AccountDisabled);
        }

        Ok(Actor::new(user.id, user.role))
    }
}
