//! Command routing and middleware-chain dispatch for inbound chat
//! messages (C7 + §4.7).
//!
//! [`command::CommandRouter`] matches free text against registered
//! [`command::Command`] triggers. [`middleware::MiddlewareChain`] then
//! wraps the matched command's handler in zero or more [`middleware::Middleware`]
//! layers before invoking it.

pub mod command;
pub mod error;
pub mod middleware;

pub use command::{Command, CommandHandler, CommandRouter, Matched, Trigger};
pub use error::{Error, Result};
pub use middleware::{DispatchContext, Middleware, MiddlewareChain, Next, OutboundGateway};
