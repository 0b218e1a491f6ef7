//! # API Shared
//!
//! Shared wire definitions for the patient service APIs.
//!
//! Contains:
//! - Request/response payloads (`pb` module)
//! - Shared services like `HealthService`
//!
//! Used by `patient-core` (mapping) and `api-rest` (transport).

pub mod health;
pub mod pb;

pub use health::HealthService;
pub use pb::*;
