//! WebSocket listener (C2) and ingress Listener Service (C9): connects
//! to the Signal gateway's receive socket, reconnecting on every
//! `ConnectionClosed`, and hands decoded frames to a bounded,
//! backpressure-governed queue. Never parses — see [`service`].

mod service;
mod websocket;

pub use service::{BackpressurePolicy, ListenerService};
pub use websocket::{ConnectionState, WebSocketListener};
