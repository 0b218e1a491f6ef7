use crate::pb::HealthRes;

/// Health check reported by the REST API.
///
/// This service provides a standardised way to check the health status of the patient service.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Returns a `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Patient service is alive".into(),
        }
    }
}
