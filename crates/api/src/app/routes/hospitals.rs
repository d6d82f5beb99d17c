use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use carehub_auth::Operation;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

/// POST /api/hospitals/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<dto::RegisterHospitalRequest>, JsonRejection>,
) -> axum::response::Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.auth.register(body.into()).await {
        Ok(reference) => (
            StatusCode::CREATED,
            Json(dto::RegisterHospitalResponse {
                message: "Hospital registered. Use the activation link to activate the account.",
                activation_link: reference.link,
                tenant_id: reference.tenant_id,
                public_id: reference.public_id,
            }),
        )
            .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET|POST /api/hospitals/activate/:token
pub async fn activate(
    Extension(services): Extension<Arc<AppServices>>,
    Path(token): Path<String>,
) -> axum::response::Response {
    match services.auth.activate(&token).await {
        Ok(tenant) => Json(serde_json::json!({
            "message": "Hospital account activated. You can now log in.",
            "public_id": tenant.public_id,
        }))
        .into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}

/// GET /api/hospitals/me
pub async fn current(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::HospitalRead) {
        return resp;
    }

    match services.auth.current_tenant(&principal.authenticated(&tenant)).await {
        Ok(t) => Json(dto::HospitalResponse::from(t)).into_response(),
        Err(e) => errors::auth_error_to_response(e),
    }
}
