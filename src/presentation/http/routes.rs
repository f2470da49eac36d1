//! Route Configuration
//!
//! Every resource router is a merge of up to three tiers. Each tier carries
//! its own policy layer; authentication wraps all of them.

use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use super::handlers;
use crate::presentation::middleware::{
    auth_middleware, require_admin, require_instructor, require_member,
};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        .with_state(state)
}

/// API v1 routes
fn api_routes(state: AppState) -> Router<AppState> {
    let protected = Router::new()
        .nest("/users", user_routes())
        .nest("/instructors", instructor_routes())
        .nest("/students", student_routes())
        .nest("/zones", zone_routes())
        .nest("/classes", class_routes())
        .nest("/enrollments", enrollment_routes())
        .nest("/packages", package_routes())
        .nest("/purchases", purchase_routes())
        .nest("/payments", payment_routes())
        .nest("/attendance", attendance_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/auth", auth_routes(state))
        .merge(protected)
}

fn members(router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn(require_member))
}

fn instructors(router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn(require_instructor))
}

fn admins(router: Router<AppState>) -> Router<AppState> {
    router.route_layer(middleware::from_fn(require_admin))
}

/// Register and login are public; `/me` needs a token
fn auth_routes(state: AppState) -> Router<AppState> {
    let session = Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .merge(session)
}

fn user_routes() -> Router<AppState> {
    admins(
        Router::new()
            .route(
                "/",
                get(handlers::user::list_users).post(handlers::user::create_user),
            )
            .route(
                "/{id}",
                get(handlers::user::get_user).put(handlers::user::update_user),
            ),
    )
}

fn instructor_routes() -> Router<AppState> {
    use handlers::instructor::*;

    members(
        Router::new()
            .route("/", get(list_instructors))
            .route("/{id}", get(get_instructor)),
    )
    .merge(admins(
        Router::new()
            .route("/", post(create_instructor))
            .route("/{id}", patch(update_instructor).delete(delete_instructor)),
    ))
}

fn student_routes() -> Router<AppState> {
    use handlers::student::*;

    instructors(
        Router::new()
            .route("/", get(list_students).post(create_student))
            .route("/{id}", get(get_student).patch(update_student)),
    )
    .merge(admins(
        Router::new().route("/{id}", delete(delete_student)),
    ))
}

fn zone_routes() -> Router<AppState> {
    use handlers::zone::*;

    members(
        Router::new()
            .route("/", get(list_zones))
            .route("/{id}", get(get_zone)),
    )
    .merge(admins(
        Router::new()
            .route("/", post(create_zone))
            .route("/{id}", patch(update_zone).delete(delete_zone)),
    ))
}

fn class_routes() -> Router<AppState> {
    use handlers::class::*;

    members(
        Router::new()
            .route("/", get(list_classes))
            .route("/{id}", get(get_class)),
    )
    .merge(instructors(
        Router::new()
            .route("/", post(create_class))
            .route("/{id}", patch(update_class))
            .route("/{id}/cancel", post(cancel_class)),
    ))
}

fn enrollment_routes() -> Router<AppState> {
    use handlers::enrollment::*;

    members(
        Router::new()
            .route("/", post(create_enrollment))
            .route("/{id}/cancel", post(cancel_enrollment))
            .route("/class/{id}", get(class_enrollments))
            .route("/student/{id}", get(student_enrollments)),
    )
    .merge(instructors(
        Router::new().route("/{id}/complete", post(complete_enrollment)),
    ))
}

fn package_routes() -> Router<AppState> {
    use handlers::package::*;

    members(
        Router::new()
            .route("/", get(list_packages))
            .route("/{id}", get(get_package)),
    )
    .merge(admins(
        Router::new()
            .route("/", post(create_package))
            .route("/{id}", patch(update_package).delete(deactivate_package)),
    ))
}

fn purchase_routes() -> Router<AppState> {
    use handlers::purchase::*;

    members(
        Router::new()
            .route("/", post(create_purchase))
            .route("/{id}", get(get_purchase))
            .route("/student/{id}", get(student_purchases)),
    )
    .merge(admins(
        Router::new().route("/{id}/cancel", post(cancel_purchase)),
    ))
}

fn payment_routes() -> Router<AppState> {
    use handlers::payment::*;

    instructors(
        Router::new()
            .route("/", post(create_payment))
            .route("/purchase/{id}", get(purchase_payments)),
    )
    .merge(admins(Router::new().route("/{id}", patch(update_payment))))
}

fn attendance_routes() -> Router<AppState> {
    use handlers::attendance::*;

    instructors(Router::new().route("/", post(record_attendance)))
        .merge(members(
            Router::new()
                .route("/class/{id}", get(class_attendance))
                .route("/student/{id}", get(student_attendance)),
        ))
}
