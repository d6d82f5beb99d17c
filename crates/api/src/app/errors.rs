use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use carehub_auth::{AuthError, AuthzError};
use carehub_infra::clinical::RecordError;
use carehub_infra::sequence::SequenceError;

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        AuthError::Conflict(_) => json_error(StatusCode::CONFLICT, "conflict", err.to_string()),
        AuthError::InvalidCredentials => json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", err.to_string()),
        AuthError::TenantNotActive => json_error(StatusCode::FORBIDDEN, "tenant_not_active", err.to_string()),
        AuthError::InvalidActivationToken => json_error(StatusCode::BAD_REQUEST, "invalid_token", err.to_string()),
        AuthError::Token(_) | AuthError::PrincipalUnavailable => {
            json_error(StatusCode::UNAUTHORIZED, "unauthorized", "not authorized")
        }
        AuthError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        AuthError::Store(_) | AuthError::Crypto(_) => internal_error(&err),
    }
}

pub fn authz_error_to_response(err: AuthzError) -> axum::response::Response {
    json_error(StatusCode::FORBIDDEN, "forbidden", err.to_string())
}

pub fn record_error_to_response(err: RecordError) -> axum::response::Response {
    match err {
        RecordError::InvalidPayload => json_error(StatusCode::BAD_REQUEST, "validation_error", err.to_string()),
        RecordError::Sequence(SequenceError::Contention) => json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "allocation_contention",
            "identifier allocation is busy, retry later",
        ),
        RecordError::Sequence(SequenceError::Backend(_)) | RecordError::Store(_) => internal_error(&err),
    }
}

/// Malformed or incomplete JSON bodies are validation failures.
pub fn json_rejection(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "validation_error", rejection.body_text())
}

/// Log the details, return a generic 500.
pub fn internal_error(err: &dyn std::error::Error) -> axum::response::Response {
    tracing::error!(error = %err, "internal error");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use carehub_auth::{Operation, StoreError, TokenError, UniqueField};

    use super::*;

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        let cases = [
            (AuthError::validation("x"), StatusCode::BAD_REQUEST),
            (AuthError::Conflict(UniqueField::Email), StatusCode::CONFLICT),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::TenantNotActive, StatusCode::FORBIDDEN),
            (AuthError::InvalidActivationToken, StatusCode::BAD_REQUEST),
            (AuthError::Token(TokenError::Expired), StatusCode::UNAUTHORIZED),
            (AuthError::PrincipalUnavailable, StatusCode::UNAUTHORIZED),
            (AuthError::NotFound, StatusCode::NOT_FOUND),
            (AuthError::Store(StoreError::Backend("db down".into())), StatusCode::INTERNAL_SERVER_ERROR),
            (AuthError::Crypto("bad hash".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(auth_error_to_response(err).status(), status);
        }
    }

    #[test]
    fn record_errors_map_to_expected_statuses() {
        assert_eq!(
            record_error_to_response(RecordError::Sequence(SequenceError::Contention)).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            record_error_to_response(RecordError::InvalidPayload).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            authz_error_to_response(AuthzError::Forbidden(Operation::UsersManage)).status(),
            StatusCode::FORBIDDEN
        );
    }
}
