//! Shared types, error definitions, and utilities used across all signalrt crates.

pub mod error;
pub mod ids;
pub mod time;

pub use error::{Error, FromMessage, Result};
