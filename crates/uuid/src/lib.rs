//! Patient record identifiers.
//!
//! Every stored patient is addressed by a [`PatientId`]: a random (v4) UUID assigned once by the
//! persistence layer when the record is first saved and never reused.
//!
//! ## Text form
//! - Rendered in the standard hyphenated lowercase form, e.g.
//!   `550e8400-e29b-41d4-a716-446655440000`.
//! - Parsing accepts any form the `uuid` crate understands (hyphenated, simple, braced, URN,
//!   either case), so identifiers copied from other tooling still resolve. The rendered form is
//!   always the canonical one.
//!
//! Callers outside the store should treat the identifier as opaque: stable, unique and
//! string-renderable, nothing more.

use std::{fmt, str::FromStr};

use ::uuid::Uuid;

/// Error type for identifier operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;

/// Identifier of a stored patient record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatientId(Uuid);

impl PatientId {
    /// Generates a fresh identifier.
    ///
    /// Only the persistence layer should call this, when inserting a new record.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an externally supplied identifier (path segment, CLI argument, database column).
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not a UUID.
    pub fn parse(input: &str) -> UuidResult<Self> {
        Uuid::parse_str(input.trim())
            .map(Self)
            .map_err(|_| UuidError::InvalidInput(format!("not a valid patient id: '{input}'")))
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PatientId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatientId::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct() {
        let a = PatientId::new();
        let b = PatientId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn display_is_hyphenated_lowercase() {
        let id = PatientId::parse("550E8400E29B41D4A716446655440000").expect("valid uuid");
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn parses_own_display_form() {
        let id = PatientId::new();
        let reparsed: PatientId = id.to_string().parse().expect("display form should parse");
        assert_eq!(id, reparsed);
    }

    #[test]
    fn rejects_non_uuid_input() {
        for input in ["", "abc", "550e8400-e29b-41d4-a716", "zzze8400e29b41d4a716446655440000"] {
            assert!(
                matches!(PatientId::parse(input), Err(UuidError::InvalidInput(_))),
                "expected rejection for {input:?}"
            );
        }
    }
}
