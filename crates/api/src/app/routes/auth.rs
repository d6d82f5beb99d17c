use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    response::IntoResponse,
    Json,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::{PrincipalContext, TenantContext};

/// POST /api/auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.auth.login(&body.email, &body.password).await {
        Ok(outcome) => Json(dto::LoginResponse::from(outcome)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /api/auth/me
pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    match services.auth.current_principal(&principal.authenticated(&tenant)).await {
        Ok(p) => Json(serde_json::json!({
            "tenant_id": tenant.tenant_id(),
            "principal": p.summary(),
        }))
        .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
