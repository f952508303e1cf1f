//! Small time helpers used by the checkpoint/DLQ stores and queue metrics.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the Unix epoch.
///
/// Used for `DlqEntry::inserted_at` and similar persisted timestamps.
/// Monotonic queue-latency measurements use `tokio::time::Instant`
/// instead — never this.
#[must_use]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
