//! Wire-to-domain mapping for the Signal gateway's envelope frames.
//!
//! [`message`] holds the immutable [`message::Message`] type produced by
//! [`envelope::parse`]; [`queued`] holds the mutable transit wrapper the
//! worker pool threads through the ingress/shard queues.

pub mod envelope;
pub mod message;
pub mod queued;

pub use envelope::{parse, recipient_from_raw, Error, Result};
pub use message::{AttachmentPointer, GroupInfo, Message, MessageKind, Quote, Reaction};
pub use queued::QueuedMessage;
