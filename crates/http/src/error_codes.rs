//! Structured `code` → typed-error mapping (spec.md §4.3 step 6).
//!
//! Ported from `original_source/.../base_client.py::ERROR_CODE_MAP`:
//! when the gateway's error body carries a normalized `code` field, it
//! takes precedence over the plain HTTP status mapping.

use crate::error::ApiErrorKind;

/// `(code, kind, docs_url)` — looked up after normalizing the body's
/// `code` field to uppercase-with-underscores.
pub fn lookup(code: &str) -> Option<(ApiErrorKind, &'static str)> {
    match code {
        "USER_NOT_GROUP_MEMBER" => Some((
            ApiErrorKind::Conflict,
            "docs.signalrt.dev/errors#user-not-a-group-member",
        )),
        "USERNAME_ALREADY_TAKEN" => Some((
            ApiErrorKind::Conflict,
            "docs.signalrt.dev/errors#username-already-taken",
        )),
        "GROUP_NOT_FOUND" => Some((
            ApiErrorKind::NotFound,
            "docs.signalrt.dev/errors#group-not-found",
        )),
        "ATTACHMENT_NOT_FOUND" => Some((
            ApiErrorKind::NotFound,
            "docs.signalrt.dev/errors#attachment-not-found",
        )),
        "CONTACT_NOT_FOUND" => Some((
            ApiErrorKind::NotFound,
            "docs.signalrt.dev/errors#contact-not-found",
        )),
        "RATE_LIMIT_EXCEEDED" => Some((
            ApiErrorKind::RateLimit,
            "docs.signalrt.dev/errors#rate-limit-exceeded",
        )),
        "INTERNAL_SERVER_ERROR" => Some((
            ApiErrorKind::Server,
            "docs.signalrt.dev/errors#server-error",
        )),
        _ => None,
    }
}

/// Normalize a raw `code` value the way the original does: trim, map
/// spaces/hyphens to underscores, uppercase.
#[must_use]
pub fn normalize(code: &str) -> String {
    code.trim()
        .replace([' ', '-'], "_")
        .to_uppercase()
}

/// HTTP status → typed error fallback (spec.md §4.3 step 6), used when
/// the body carries no recognized `code`.
#[must_use]
pub fn from_status(status: u16) -> (ApiErrorKind, &'static str) {
    match status {
        401 => (ApiErrorKind::Auth, "docs.signalrt.dev/errors#authentication-error"),
        404 => (ApiErrorKind::NotFound, "docs.signalrt.dev/errors#not-found-error"),
        409 => (ApiErrorKind::Conflict, "docs.signalrt.dev/errors#conflict-error"),
        429 => (ApiErrorKind::RateLimit, "docs.signalrt.dev/errors#rate-limit-error"),
        500..=599 => (ApiErrorKind::Server, "docs.signalrt.dev/errors#server-error"),
        _ => (ApiErrorKind::Api, "docs.signalrt.dev/errors#api-error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_hyphenated_lowercase_code() {
        assert_eq!(normalize("rate-limit exceeded "), "RATE_LIMIT_EXCEEDED");
    }

    #[test]
    fn looks_up_known_code() {
        let (kind, _) = lookup("RATE_LIMIT_EXCEEDED").unwrap();
        assert_eq!(kind, ApiErrorKind::RateLimit);
    }

    #[test]
    fn unknown_code_falls_back_to_status() {
        assert!(lookup("SOMETHING_MADE_UP").is_none());
        let (kind, _) = from_status(404);
        assert_eq!(kind, ApiErrorKind::NotFound);
    }

    #[test]
    fn server_status_range_maps_to_server_kind() {
        let (kind, _) = from_status(503);
        assert_eq!(kind, ApiErrorKind::Server);
    }

    #[test]
    fn unmapped_4xx_status_falls_back_to_generic_api_error() {
        let (kind, _) = from_status(418);
        assert_eq!(kind, ApiErrorKind::Api);
    }
}
