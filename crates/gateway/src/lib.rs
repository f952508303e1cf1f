//! Resource clients over the HTTP core (C1), one module per Signal
//! REST resource, plus the bootstrap wiring that turns them and the
//! rest of the workspace into a running bot process.
//!
//! Each resource module is a thin, ungrounded-in-business-logic stub:
//! request/response shapes plus one method per endpoint. Ported 1:1
//! from `original_source/signal_client/infrastructure/api_clients/`.

pub mod accounts;
pub mod attachments;
pub mod bootstrap;
pub mod clients;
pub mod contacts;
pub mod devices;
pub mod error;
pub mod general;
pub mod groups;
pub mod identities;
pub mod messages;
pub mod profiles;
pub mod reactions;
pub mod receipts;
pub mod search;
pub mod sticker_packs;

pub use bootstrap::{bootstrap, bootstrap_with, Registrar};
pub use clients::GatewayClients;
pub use error::{ApiError, ApiErrorKind, Error, Result};
