//! Patients, appointments and prescriptions.
//!
//! One router per [`EntityKind`]; the kind travels to the handlers as a
//! request extension.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use carehub_auth::Operation;
use carehub_core::{EntityKind, ExternalId};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::{PrincipalContext, TenantContext};

pub const ROUTES: [(&str, EntityKind); 3] = [
    ("/api/patients", EntityKind::Patient),
    ("/api/appointments", EntityKind::Appointment),
    ("/api/prescriptions", EntityKind::Prescription),
];

pub fn router(kind: EntityKind) -> Router {
    Router::new()
        .route("/", post(create_record).get(list_records))
        .route("/:id", get(get_record))
        .layer(Extension(kind))
}

pub async fn create_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(kind): Extension<EntityKind>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::create(kind)) {
        return resp;
    }
    let Json(payload) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    let hospital = match services.auth.current_tenant(&principal.authenticated(&tenant)).await {
        Ok(t) => t,
        Err(e) => return errors::auth_error_to_response(e),
    };

    match services
        .records
        .create(tenant.tenant_id(), hospital.public_id, kind, payload, principal.principal_id())
        .await
    {
        Ok(record) => (
            StatusCode::CREATED,
            Json(dto::RecordCreatedResponse {
                id: record.id.to_string(),
                kind: record.kind,
                created_at: record.created_at,
            }),
        )
            .into_response(),
        Err(e) => errors::record_error_to_response(e),
    }
}

pub async fn list_records(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(kind): Extension<EntityKind>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::read(kind)) {
        return resp;
    }

    match services.records.list(tenant.tenant_id(), kind).await {
        Ok(records) => {
            let items: Vec<dto::RecordResponse> = records.into_iter().map(Into::into).collect();
            Json(serde_json::json!({ "items": items })).into_response()
        }
        Err(e) => errors::record_error_to_response(e),
    }
}

pub async fn get_record(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Extension(kind): Extension<EntityKind>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = authz::require(&tenant, &principal, Operation::read(kind)) {
        return resp;
    }
    let Ok(id) = id.parse::<ExternalId>() else {
        return errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found");
    };

    match services.records.get(tenant.tenant_id(), kind, &id).await {
        Ok(Some(record)) => Json(dto::RecordResponse::from(record)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Err(e) => errors::record_error_to_response(e),
    }
}
