//! Input validation for domains and ports.

use crate::error::Error;
use lazy_static::lazy_static;
use regex::Regex;

const MAX_DOMAIN_LEN: usize = 253;

lazy_static! {
    // Dot-separated labels of 1-63 alphanumerics/hyphens, never starting or ending with a hyphen.
    static ref DOMAIN_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(\.[a-zA-Z0-9]([a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .unwrap();

    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Returns true when `domain` is a syntactically valid host name. No normalization (case,
/// trailing dot) is performed.
#[must_use]
pub fn is_valid_domain(domain: &str) -> bool {
    domain.len() <= MAX_DOMAIN_LEN && DOMAIN_REGEX.is_match(domain)
}

/// Like [`is_valid_domain`] but returns [`Error::InvalidDomain`] for rejected input.
pub fn validate_domain(domain: &str) -> Result<&str, Error> {
    if is_valid_domain(domain) {
        Ok(domain)
    } else {
        Err(Error::InvalidDomain(domain.to_string()))
    }
}

/// Basic shape check for the Let's Encrypt notification address.
pub fn validate_email(email: &str) -> Result<&str, Error> {
    let email = email.trim();
    if EMAIL_REGEX.is_match(email) {
        Ok(email)
    } else {
        Err(Error::InvalidEmail(email.to_string()))
    }
}

/// Parse a user supplied port, accepting only `1..=65535`.
///
/// # Errors
///
/// Returns [`Error::InvalidPort`] if `raw` isn't an integer, or [`Error::PortOutOfRange`] if it is
/// one but doesn't name a TCP port.
pub fn validate_port(raw: &str) -> Result<u16, Error> {
    let trimmed = raw.trim();
    let digits = trimmed
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidPort(raw.to_string()));
    }
    // Any integer, however large, is a number outside the port range rather than bad input.
    match trimmed.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(Error::PortOutOfRange(trimmed.to_string())),
    }
}
