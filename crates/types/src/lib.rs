//! Validated text primitives shared across the patient service.
//!
//! A value of these types has been checked once, at construction; code holding one can rely on
//! it without re-validating.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of the part of an email address before the `@`.
const MAX_EMAIL_LOCAL_PART_LEN: usize = 64;

/// Maximum length of the domain part of an email address.
const MAX_EMAIL_DOMAIN_LEN: usize = 255;

static EMAIL_LOCAL_PART: LazyLock<Regex> = LazyLock::new(|| {
    let atom = r"[a-zA-Z0-9!#$%&'*+/=?^_`{|}~\-[^\x00-\x7F]]+";
    Regex::new(&format!(r"^{atom}(?:\.{atom})*$")).expect("static local-part pattern is valid")
});

static EMAIL_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    let label = r"[a-zA-Z0-9[^\x00-\x7F]](?:[a-zA-Z0-9\-[^\x00-\x7F]]{0,61}[a-zA-Z0-9[^\x00-\x7F]])?";
    Regex::new(&format!(r"^(?:{label}(?:\.{label})*|\[[0-9.:a-fA-F]+\])$"))
        .expect("static domain pattern is valid")
});

/// Errors that can occur when creating validated text types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input text is not a syntactically valid email address
    #[error("invalid email address: '{0}'")]
    InvalidEmail(String),
}

/// A syntactically valid email address.
///
/// The address is kept exactly as supplied (no trimming or case folding), so two addresses are
/// equal only when their text is identical.
///
/// Accepted shape: `local@domain`, split on the last `@`, where
/// - the local part is one or more dot-separated atoms of letters, digits, non-ASCII characters
///   and the RFC 5322 specials `!#$%&'*+/=?^_`{|}~-`, at most 64 characters;
/// - the domain is dot-separated labels of letters, digits and inner hyphens (a single label
///   such as `localhost` is allowed), or a bracketed address literal, at most 255 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and validates an email address.
    ///
    /// # Errors
    ///
    /// Returns [`TextError::Empty`] for blank input and [`TextError::InvalidEmail`] when the
    /// address does not have a valid shape.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let input = input.as_ref();
        if input.trim().is_empty() {
            return Err(TextError::Empty);
        }

        if Self::is_valid(input) {
            Ok(Self(input.to_owned()))
        } else {
            Err(TextError::InvalidEmail(input.to_owned()))
        }
    }

    fn is_valid(input: &str) -> bool {
        let Some((local, domain)) = input.rsplit_once('@') else {
            return false;
        };

        if local.is_empty() || domain.is_empty() {
            return false;
        }

        if local.chars().count() > MAX_EMAIL_LOCAL_PART_LEN
            || domain.chars().count() > MAX_EMAIL_DOMAIN_LEN
        {
            return false;
        }

        EMAIL_LOCAL_PART.is_match(local) && EMAIL_DOMAIN.is_match(domain)
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
