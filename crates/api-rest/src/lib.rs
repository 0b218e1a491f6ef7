//! # API REST
//!
//! REST API implementation for the patient service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation (served as JSON)
//! - REST-specific concerns (JSON framing, status codes, CORS, request tracing)
//!
//! All business rules live in `patient-core`; handlers only decode, delegate and encode.

#![warn(rust_2018_idioms)]

pub mod error;

use api_shared::pb;
use api_shared::HealthService;
use axum::{
    extract::{rejection::JsonRejection, Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use patient_core::{PatientError, PatientId, PatientResult, PatientService};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub use error::ApiError;

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers.
#[derive(Clone)]
pub struct AppState {
    patient_service: PatientService,
}

impl AppState {
    pub fn new(patient_service: PatientService) -> Self {
        Self { patient_service }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        get_patient,
        create_patient,
        update_patient,
        delete_patient,
    ),
    components(schemas(
        pb::HealthRes,
        pb::PatientRequest,
        pb::PatientResponse,
        pb::ErrorRes,
        pb::FieldViolationRes,
    ))
)]
pub struct ApiDoc;

/// Builds the router with all patient routes, CORS and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route(
            "/patients/:patient_id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `addr` and serves the REST API until Ctrl-C.
///
/// # Errors
/// Returns an error if the address cannot be bound or the server fails while running.
pub async fn serve(addr: &str, patient_service: PatientService) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("-- Patient REST API listening on {}", listener.local_addr()?);

    axum::serve(listener, router(AppState::new(patient_service)))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Patient REST API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
    }
}

/// Runs a core operation on the blocking pool; store calls block the calling thread.
async fn run_blocking<T, F>(op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> PatientResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(ApiError::Task)?
        .map_err(ApiError::from)
}

fn parse_patient_id(raw: &str) -> Result<PatientId, ApiError> {
    PatientId::parse(raw).map_err(|e| ApiError::from(PatientError::from(e)))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = pb::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<pb::HealthRes> {
    Json(HealthService::check_health())
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[utoipa::path(
    get,
    path = "/patients",
    responses(
        (status = 200, description = "List of patients", body = [pb::PatientResponse]),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// List all patients in the system
///
/// # Errors
/// Returns `500 Internal Server Error` if the store cannot be read.
#[axum::debug_handler]
async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<pb::PatientResponse>>, ApiError> {
    let service = state.patient_service.clone();
    let patients = run_blocking(move || service.list_patients()).await?;
    Ok(Json(patients))
}

#[utoipa::path(
    get,
    path = "/patients/{patient_id}",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 200, description = "Patient found", body = pb::PatientResponse),
        (status = 400, description = "Malformed patient identifier", body = pb::ErrorRes),
        (status = 404, description = "Patient not found", body = pb::ErrorRes),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// Fetch a single patient
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(patient_id): AxumPath<String>,
) -> Result<Json<pb::PatientResponse>, ApiError> {
    let id = parse_patient_id(&patient_id)?;
    let service = state.patient_service.clone();
    let patient = run_blocking(move || service.get_patient(id)).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = pb::PatientRequest,
    responses(
        (status = 200, description = "Patient created", body = pb::PatientResponse),
        (status = 400, description = "Validation failed", body = pb::ErrorRes),
        (status = 409, description = "Email already exists", body = pb::ErrorRes),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// Create a new patient record
///
/// `registeredDate` is required. Every invalid field is reported in one response.
///
/// # Errors
/// - `400 Bad Request` on validation failure or a malformed date
/// - `409 Conflict` if another patient already uses the email
/// - `500 Internal Server Error` if the store fails
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    payload: Result<Json<pb::PatientRequest>, JsonRejection>,
) -> Result<Json<pb::PatientResponse>, ApiError> {
    let Json(req) = payload?;
    let service = state.patient_service.clone();
    let patient = run_blocking(move || service.create_patient(&req)).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    put,
    path = "/patients/{patient_id}",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    request_body = pb::PatientRequest,
    responses(
        (status = 200, description = "Patient updated", body = pb::PatientResponse),
        (status = 400, description = "Validation failed", body = pb::ErrorRes),
        (status = 404, description = "Patient not found", body = pb::ErrorRes),
        (status = 409, description = "Email already exists", body = pb::ErrorRes),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// Replace a patient's name, email, address and date of birth
///
/// `registeredDate` is ignored. Keeping the patient's current email is allowed.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    AxumPath(patient_id): AxumPath<String>,
    payload: Result<Json<pb::PatientRequest>, JsonRejection>,
) -> Result<Json<pb::PatientResponse>, ApiError> {
    let id = parse_patient_id(&patient_id)?;
    let Json(req) = payload?;
    let service = state.patient_service.clone();
    let patient = run_blocking(move || service.update_patient(id, &req)).await?;
    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/patients/{patient_id}",
    params(("patient_id" = String, Path, description = "Patient identifier")),
    responses(
        (status = 204, description = "Patient deleted (or already absent)"),
        (status = 400, description = "Malformed patient identifier", body = pb::ErrorRes),
        (status = 500, description = "Internal server error", body = pb::ErrorRes)
    )
)]
/// Delete a patient
///
/// Idempotent: deleting an unknown identifier also returns `204 No Content`.
#[axum::debug_handler]
async fn delete_patient(
    State(state): State<AppState>,
    AxumPath(patient_id): AxumPath<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_patient_id(&patient_id)?;
    let service = state.patient_service.clone();
    run_blocking(move || service.delete_patient(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
