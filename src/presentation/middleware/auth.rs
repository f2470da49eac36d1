//! Authentication and Authorization Middleware
//!
//! `auth_middleware` validates the bearer JWT, loads the account it names and
//! stores the caller as an [`Actor`] request extension. A deactivated account
//! is refused even while its token is still valid. The `require_*` layers run after it and gate
//! a route group on a [`Policy`].

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    RequestExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::application::services::AuthService;
use crate::domain::{Actor, Policy};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Authentication middleware that validates JWT tokens
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = request
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::Unauthorized("Falta el token de acceso".into()))?;

    let actor = state
        .registry
        .begin_scope()?
        .auth_service()?
        .authenticate(bearer.token())
        .await?;

    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

async fn authorize(policy: Policy, request: Request, next: Next) -> Result<Response, AppError> {
    let actor = request
        .extensions()
        .get::<Actor>()
        .copied()
        .ok_or_else(|| AppError::Unauthorized("Autenticación requerida".into()))?;

    if !actor.role.satisfies(policy) {
        tracing::warn!(
            user_id = actor.user_id,
            role = %actor.role,
            policy = policy.name(),
            "Access denied"
        );
        return Err(AppError::Forbidden(
            "No tienes permisos para realizar esta acción".into(),
        ));
    }

    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    authorize(Policy::AdminOnly, request, next).await
}

pub async fn require_instructor(request: Request, next: Next) -> Result<Response, AppError> {
    authorize(Policy::InstructorOrAdmin, request, next).await
}

pub async fn require_member(request: Request, next: Next) -> Result<Response, AppError> {
    authorize(Policy::AnyMember, request, next).await
}
