use axum::{
    routing::{get, post},
    Router,
};

pub mod auth;
pub mod hospitals;
pub mod rbac;
pub mod records;
pub mod system;
pub mod users;

/// Endpoints reachable without a session.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/hospitals/register", post(hospitals::register))
        .route(
            "/api/hospitals/activate/:token",
            get(hospitals::activate).post(hospitals::activate),
        )
        .route("/api/auth/login", post(auth::login))
}

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    let mut router = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/hospitals/me", get(hospitals::current))
        .nest("/api/users", users::router())
        .nest("/api/rbac", rbac::router());

    for (path, kind) in records::ROUTES {
        router = router.nest(path, records::router(kind));
    }
    router
}
