use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use carehub_auth::Operation;
use carehub_core::PrincipalId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_user).get(list_users))
        .route("/:id/deactivate", post(deactivate_user))
}

/// POST /api/users - add a staff account to the caller's hospital
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateStaffRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::UsersManage) {
        return resp;
    }
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.auth.create_staff(tenant.tenant_id(), body.into()).await {
        Ok(summary) => (StatusCode::CREATED, Json(summary)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /api/users
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::UsersRead) {
        return resp;
    }

    match services.auth.list_staff(tenant.tenant_id()).await {
        Ok(users) => Json(serde_json::json!({ "users": users })).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// POST /api/users/:id/deactivate
pub async fn deactivate_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::UsersManage) {
        return resp;
    }
    let Ok(target) = id.parse::<PrincipalId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found");
    };

    match services
        .auth
        .deactivate_staff(&principal.authenticated(&tenant), target)
        .await
    {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
