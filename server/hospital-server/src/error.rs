use appointment_engine::{AppointmentError, SchedulingError, ValidationError};
use auth_identity::AuthError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use crypto::CryptoError;
use database_layer::DatabaseError;
use error_common::codes;
use logger_redacted::redacted_error;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use utoipa::ToSchema;
use uuid::Uuid;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Unique error ID; the same ID appears in the server log
    pub error_id: String,
    /// Error family
    pub error_type: String,
    /// Stable machine-readable code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Request field the error refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Errors returned by handlers and extractors.
///
/// The `Display` text is what the caller sees. Variants carrying a `detail`
/// keep it for the log only.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
        code: &'static str,
    },

    #[error("{message}")]
    Authentication { message: String, code: &'static str },

    #[error("{message}")]
    Authorization { message: String, code: &'static str },

    #[error("{message}")]
    NotFound { message: String, code: &'static str },

    #[error("{message}")]
    Conflict { message: String, code: &'static str },

    #[error("Service temporarily unavailable")]
    ServiceUnavailable { detail: String, code: &'static str },

    #[error("Drug information service unavailable")]
    Upstream { detail: String },

    #[error("Internal server error")]
    Internal { detail: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
            code: codes::validation::INVALID_INPUT,
        }
    }

    pub fn invalid_field(field: &str, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.to_string()),
            code: codes::validation::INVALID_INPUT,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            code: codes::database::NOT_FOUND,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn upstream(detail: impl Into<String>) -> Self {
        Self::Upstream {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Authorization { .. } => "authorization_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::ServiceUnavailable { .. } => "service_unavailable",
            ApiError::Upstream { .. } => "upstream_error",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation { code, .. }
            | ApiError::Authentication { code, .. }
            | ApiError::Authorization { code, .. }
            | ApiError::NotFound { code, .. }
            | ApiError::Conflict { code, .. }
            | ApiError::ServiceUnavailable { code, .. } => code,
            ApiError::Upstream { .. } => codes::upstream::DRUG_LOOKUP_FAILED,
            ApiError::Internal { .. } => codes::system::INTERNAL,
        }
    }

    fn field(&self) -> Option<String> {
        match self {
            ApiError::Validation { field, .. } => field.clone(),
            _ => None,
        }
    }

    /// Text for the log line; never sent to the caller.
    fn log_detail(&self) -> String {
        match self {
            ApiError::ServiceUnavailable { detail, .. }
            | ApiError::Upstream { detail }
            | ApiError::Internal { detail } => detail.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        redacted_error!(
            {
                error_id = %error_id,
                error_type = %self.error_type(),
                code = self.code(),
                status_code = status_code.as_u16()
            },
            "API error occurred: {}",
            self.log_detail()
        );

        let body = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            code: self.code().to_string(),
            message: self.to_string(),
            field: self.field(),
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let message = err.to_string();
        match err {
            AuthError::UnknownRole => Self::Authorization {
                message,
                code: codes::authentication::UNKNOWN_ROLE,
            },
            AuthError::MissingCredentials => Self::Authentication {
                message,
                code: codes::authentication::MISSING_CREDENTIALS,
            },
            AuthError::InvalidCredentials => Self::Authentication {
                message,
                code: codes::authentication::INVALID_CREDENTIALS,
            },
            AuthError::Forbidden => Self::Authorization {
                message,
                code: codes::authorization::FORBIDDEN,
            },
            AuthError::StoreUnavailable(detail) => Self::ServiceUnavailable {
                detail,
                code: codes::authentication::STORE_UNAVAILABLE,
            },
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let code = match err {
            ValidationError::UnknownKind(_) => codes::validation::UNKNOWN_KIND,
            ValidationError::MissingVariantField { .. } => codes::validation::MISSING_VARIANT_FIELD,
            ValidationError::BadTimestamp(_) => codes::validation::BAD_TIMESTAMP,
            ValidationError::UnknownPatient(_) => codes::validation::UNKNOWN_PATIENT,
        };
        Self::Validation {
            message: err.to_string(),
            field: Some(err.field().to_string()),
            code,
        }
    }
}

impl From<AppointmentError> for ApiError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound(_) => Self::NotFound {
                message: err.to_string(),
                code: codes::appointment::NOT_FOUND,
            },
            AppointmentError::InvalidTransition { .. } => Self::Conflict {
                message: err.to_string(),
                code: codes::appointment::INVALID_TRANSITION,
            },
        }
    }
}

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::Validation(e) => e.into(),
            SchedulingError::DirectoryUnavailable(detail) => Self::ServiceUnavailable {
                detail,
                code: codes::appointment::DIRECTORY_UNAVAILABLE,
            },
        }
    }
}

/// Malformed bodies become the same 400 envelope as every other validation
/// failure. The serde text stays in the log.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let text = rejection.body_text();
        debug!(status = rejection.status().as_u16(), rejection = %text, "Rejected request body");
        match rejection {
            JsonRejection::JsonDataError(_) => match rejected_field(&text) {
                Some(field) => {
                    let message = format!("{field} is missing or has the wrong type");
                    Self::invalid_field(&field, message)
                }
                None => Self::validation("Request body does not match the expected shape"),
            },
            JsonRejection::JsonSyntaxError(_) => Self::validation("Request body is not valid JSON"),
            JsonRejection::MissingJsonContentType(_) => {
                Self::validation("Expected a JSON body with Content-Type: application/json")
            }
            _ => Self::validation("Failed to read the request body"),
        }
    }
}

/// Field named by a serde data error, either `missing field `x`` or a
/// `path: reason` prefix.
fn rejected_field(text: &str) -> Option<String> {
    let (_, detail) = text.split_once("target type: ")?;
    if let Some((_, rest)) = detail.split_once("missing field `") {
        return rest.split_once('`').map(|(field, _)| field.to_string());
    }
    let (path, _) = detail.split_once(": ")?;
    let is_path = !path.is_empty()
        && path
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '[' | ']'));
    is_path.then(|| path.to_string())
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { .. } => Self::not_found(err.to_string()),
            DatabaseError::Conflict(message) => Self::Conflict {
                message,
                code: codes::database::CONSTRAINT_VIOLATION,
            },
            DatabaseError::ConnectionFailed(detail) => Self::ServiceUnavailable {
                detail,
                code: codes::database::CONNECTION_FAILED,
            },
            DatabaseError::QueryFailed(_) | DatabaseError::Sqlx(_) => Self::internal(err.to_string()),
        }
    }
}

impl From<CryptoError> for ApiError {
    fn from(err: CryptoError) -> Self {
        Self::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appointment_engine::{AppointmentKind, AppointmentStatus};

    #[test]
    fn auth_errors_map_to_taxonomy_status() {
        let cases = [
            (AuthError::UnknownRole, StatusCode::FORBIDDEN),
            (AuthError::MissingCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (AuthError::Forbidden, StatusCode::FORBIDDEN),
            (
                AuthError::StoreUnavailable("pool timed out".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_code(), status);
        }
    }

    #[test]
    fn store_detail_is_not_shown_to_callers() {
        let err = ApiError::from(AuthError::StoreUnavailable(
            "connection to 10.0.0.4 refused".into(),
        ));
        assert!(!err.to_string().contains("10.0.0.4"));
        assert_eq!(err.code(), codes::authentication::STORE_UNAVAILABLE);
    }

    #[test]
    fn validation_errors_name_their_field() {
        let err = ApiError::from(ValidationError::MissingVariantField {
            kind: AppointmentKind::Emergency,
            field: "priority_level",
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.field().as_deref(), Some("priority_level"));
        assert_eq!(err.code(), codes::validation::MISSING_VARIANT_FIELD);
    }

    #[test]
    fn lifecycle_errors_are_distinct() {
        let missing = ApiError::from(AppointmentError::NotFound("a1".into()));
        let terminal = ApiError::from(AppointmentError::InvalidTransition {
            appointment_id: "a1".into(),
            status: AppointmentStatus::Cancelled,
        });
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(terminal.status_code(), StatusCode::CONFLICT);
        assert_ne!(missing.code(), terminal.code());
    }

    #[test]
    fn serde_rejections_name_the_offending_field() {
        let missing = "Failed to deserialize the JSON body into the target type: \
                       missing field `scheduled_at` at line 1 column 52";
        let wrong_type = "Failed to deserialize the JSON body into the target type: \
                          priority_level: invalid type: string \"high\", expected i32 at line 1 column 30";
        let root = "Failed to deserialize the JSON body into the target type: \
                    invalid type: sequence, expected a map at line 1 column 0";
        assert_eq!(rejected_field(missing).as_deref(), Some("scheduled_at"));
        assert_eq!(rejected_field(wrong_type).as_deref(), Some("priority_level"));
        assert_eq!(rejected_field(root), None);
        assert_eq!(rejected_field("Failed to buffer the request body"), None);
    }

    #[test]
    fn scheduling_errors_are_validation_or_unavailable() {
        let invalid = ApiError::from(SchedulingError::Validation(ValidationError::UnknownPatient(
            "P404".into(),
        )));
        let down = ApiError::from(SchedulingError::DirectoryUnavailable("timeout".into()));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.field().as_deref(), Some("patient_id"));
        assert_eq!(down.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!down.to_string().contains("timeout"));
    }

    #[test]
    fn crypto_failures_are_internal() {
        let err = ApiError::from(CryptoError::Hashing("bad salt".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
