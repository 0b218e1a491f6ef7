//! Mapping of core failures onto HTTP responses.
//!
//! | Core error             | Status | `error` kind           |
//! |------------------------|--------|------------------------|
//! | `Validation`           | 400    | `validation_error`     |
//! | `MalformedDate`        | 400    | `malformed_date`       |
//! | `InvalidInput`         | 400    | `invalid_input`        |
//! | `PatientNotFound`      | 404    | `patient_not_found`    |
//! | `EmailAlreadyExists`   | 409    | `email_already_exists` |
//! | `Persistence`          | 500    | `persistence_error`    |
//!
//! A blocking task that panicked or was cancelled is a 500 `internal_error`.
//!
//! Server-side details are logged and never echoed to the client.

use api_shared::pb::{ErrorRes, FieldViolationRes};
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use patient_core::PatientError;

/// Error returned by every handler.
#[derive(Debug)]
pub enum ApiError {
    Patient(PatientError),
    /// The request body was not a JSON object of the expected shape.
    Body(JsonRejection),
    /// The blocking task running the operation panicked or was cancelled.
    Task(tokio::task::JoinError),
}

impl From<PatientError> for ApiError {
    fn from(value: PatientError) -> Self {
        Self::Patient(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self::Body(value)
    }
}

fn error_res(error: &str, message: impl Into<String>) -> ErrorRes {
    ErrorRes {
        error: error.into(),
        message: message.into(),
        violations: vec![],
    }
}

impl ApiError {
    fn status_and_body(&self) -> (StatusCode, ErrorRes) {
        match self {
            ApiError::Patient(PatientError::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                ErrorRes {
                    violations: errors
                        .violations()
                        .iter()
                        .map(|v| FieldViolationRes {
                            field: v.field.to_string(),
                            message: v.message.clone(),
                        })
                        .collect(),
                    ..error_res("validation_error", "Request validation failed")
                },
            ),
            ApiError::Patient(PatientError::MalformedDate { field, value }) => (
                StatusCode::BAD_REQUEST,
                ErrorRes {
                    violations: vec![FieldViolationRes {
                        field: field.to_string(),
                        message: format!("'{value}' is not a valid ISO-8601 date (YYYY-MM-DD)"),
                    }],
                    ..error_res("malformed_date", "Malformed date")
                },
            ),
            ApiError::Patient(PatientError::InvalidInput(msg)) => (
                StatusCode::BAD_REQUEST,
                error_res("invalid_input", msg.clone()),
            ),
            ApiError::Body(rejection) => (
                StatusCode::BAD_REQUEST,
                error_res("invalid_input", rejection.body_text()),
            ),
            ApiError::Patient(PatientError::PatientNotFound(id)) => (
                StatusCode::NOT_FOUND,
                error_res("patient_not_found", format!("Patient not found: {id}")),
            ),
            ApiError::Patient(PatientError::EmailAlreadyExists(email)) => (
                StatusCode::CONFLICT,
                error_res(
                    "email_already_exists",
                    format!("Email already exists: {email}"),
                ),
            ),
            ApiError::Patient(PatientError::Persistence(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_res("persistence_error", "Internal error"),
            ),
            ApiError::Task(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_res("internal_error", "Internal error"),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        if status.is_server_error() {
            tracing::error!("request failed: {:?}", self);
        }
        (status, Json(body)).into_response()
    }
}
