//! RBAC audit endpoints.
//!
//! Expose the operation table and let callers ask "may I do X?" without
//! attempting the operation.

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use carehub_auth::{explain_authorization, operation_table, Operation};

use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub fn router() -> Router {
    Router::new()
        .route("/operations", get(list_operations))
        .route("/check", get(check_operation))
}

/// GET /api/rbac/operations
pub async fn list_operations(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::RbacRead) {
        return resp;
    }

    Json(serde_json::json!({ "operations": operation_table() })).into_response()
}

/// GET /api/rbac/check?operation=patients.create
pub async fn check_operation(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<dto::RbacCheckQuery>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::RbacRead) {
        return resp;
    }
    let Some(operation) = Operation::parse(query.operation.trim()) else {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "unknown_operation",
            format!("unknown operation '{}'", query.operation),
        );
    };

    Json(explain_authorization(&principal.authenticated(&tenant), operation)).into_response()
}
