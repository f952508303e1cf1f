//! ID helpers shared across the runtime.

use uuid::Uuid;

/// Generate a new message identifier.
///
/// Message IDs are assigned at parse time, not by the gateway, so
/// duplicate frames (same `(source, timestamp)`) get distinct `id`s —
/// dedup is keyed on `(source, timestamp)`, never on `id`.
#[must_use]
pub fn new_message_id() -> Uuid {
    Uuid::new_v4()
}

/// Canonicalize a phone-number-shaped identifier.
///
/// A purely-digit string is prefixed with `+`. Existing `+` prefixes,
/// base64-ish tokens (trailing `=`), and UUID-shaped account ids pass
/// through unchanged.
#[must_use]
pub fn normalize_number(id: &str) -> String {
    if id.starts_with('+') || id.contains('-') || id.ends_with('=') {
        return id.to_string();
    }
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        return format!("+{id}");
    }
    id.to_string()
}
