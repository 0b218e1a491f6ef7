//! Wire payloads exchanged with external clients.
//!
//! Every field is a string on the wire. Request fields are optional on decode: a client that
//! omits a field gets a field-level validation error from the core instead of a body decode
//! failure.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /patients` and `PUT /patients/{patientId}`.
///
/// `registeredDate` is required when creating and ignored when updating.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PatientRequest {
    #[schema(example = "Ann")]
    pub name: Option<String>,
    #[schema(example = "a@x.com")]
    pub email: Option<String>,
    #[schema(example = "1 Rd")]
    pub address: Option<String>,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    #[schema(example = "1990-01-01")]
    pub date_of_birth: Option<String>,
    /// ISO-8601 calendar date (`YYYY-MM-DD`).
    #[schema(example = "2024-01-01")]
    pub registered_date: Option<String>,
}

/// A stored patient as returned to clients. The registered date is never exposed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: String,
    pub date_of_birth: String,
}

/// One rejected request field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolationRes {
    /// Wire name of the offending field, e.g. `dateOfBirth`.
    pub field: String,
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    /// Stable error kind, e.g. `validation_error` or `email_already_exists`.
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolationRes>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}
