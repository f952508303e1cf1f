//! The gateway crate raises exactly what [`signalrt_http`] raises — these
//! are thin stubs over the HTTP core, not a new error hierarchy.

pub use signalrt_http::{ApiError, ApiErrorKind, Error, Result};
