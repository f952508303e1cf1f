//! WebSocket listener (C2): a reconnecting read loop over the Signal
//! gateway's receive socket, ported from
//! `original_source/.../websocket_client.py::WebSocketClient.listen`
//! and the teacher's `start_polling` reconnect-loop shape
//! (`crates/telegram/src/bot.rs`).

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use futures_util::StreamExt;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::service::ListenerService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Reconnecting,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Connecting,
            2 => Self::Open,
            3 => Self::Reconnecting,
            _ => Self::Disconnected,
        }
    }
}

/// Tracks the listener's current connection state for metrics and
/// introspection, independent of the read loop's control flow.
#[derive(Default)]
struct StateCell(AtomicU8);

impl StateCell {
    fn set(&self, state: ConnectionState) {
        let value = match state {
            ConnectionState::Disconnected => 0,
            ConnectionState::Connecting => 1,
            ConnectionState::Open => 2,
            ConnectionState::Reconnecting => 3,
        };
        self.0.store(value, Ordering::SeqCst);
    }

    fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.0.load(Ordering::SeqCst))
    }
}

/// Reconnecting WebSocket client for a single receive socket.
pub struct WebSocketListener {
    url: String,
    reconnect_delay: Duration,
    state: StateCell,
}

impl WebSocketListener {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect_delay: Duration::from_secs(1),
            state: StateCell::default(),
        }
    }

    #[must_use]
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.state.get()
    }

    /// Run the connect/read/reconnect loop until `stop` is set. Each
    /// decoded frame is hand off to `service.enqueue`; the service's
    /// own backpressure policy governs what happens if the ingress
    /// queue is full.
    pub async fn run(&self, service: &ListenerService, stop: CancellationToken) {
        loop {
            if stop.is_cancelled() {
                self.state.set(ConnectionState::Disconnected);
                return;
            }

            self.state.set(ConnectionState::Connecting);
            match connect_async(&self.url).await {
                Ok((stream, _response)) => {
                    info!(url = %self.url, "websocket connected");
                    self.state.set(ConnectionState::Open);
                    signalrt_metrics::counter!(signalrt_metrics::websocket::CONNECTIONS_TOTAL)
                        .increment(1);
                    signalrt_metrics::gauge!(signalrt_metrics::websocket::CONNECTION_OPEN)
                        .set(1.0);

                    let (_write, mut read) = stream.split();
                    loop {
                        if stop.is_cancelled() {
                            signalrt_metrics::gauge!(signalrt_metrics::websocket::CONNECTION_OPEN)
                                .set(0.0);
                            self.state.set(ConnectionState::Disconnected);
                            return;
                        }
                        match read.next().await {
                            Some(Ok(WsMessage::Text(text))) => {
                                signalrt_metrics::counter!(
                                    signalrt_metrics::websocket::MESSAGES_RECEIVED_TOTAL
                                )
                                .increment(1);
                                service.enqueue(text.to_string()).await;
                            },
                            Some(Ok(WsMessage::Binary(bytes))) => {
                                match String::from_utf8(bytes.to_vec()) {
                                    Ok(text) => {
                                        signalrt_metrics::counter!(
                                            signalrt_metrics::websocket::MESSAGES_RECEIVED_TOTAL
                                        )
                                        .increment(1);
                                        service.enqueue(text).await;
                                    },
                                    Err(error) => {
                                        warn!(%error, "dropping non-UTF-8 binary frame");
                                    },
                                }
                            },
                            Some(Ok(WsMessage::Close(frame))) => {
                                debug!(?frame, "websocket closed by gateway");
                                break;
                            },
                            Some(Ok(_)) => {},
                            Some(Err(error)) => {
                                warn!(%error, "websocket read error");
                                break;
                            },
                            None => break,
                        }
                    }
                    signalrt_metrics::gauge!(signalrt_metrics::websocket::CONNECTION_OPEN)
                        .set(0.0);
                },
                Err(error) => {
                    warn!(url = %self.url, %error, "websocket connect failed");
                },
            }

            if stop.is_cancelled() {
                self.state.set(ConnectionState::Disconnected);
                return;
            }
            self.state.set(ConnectionState::Reconnecting);
            tokio::time::sleep(self.reconnect_delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_listener_defaults_to_one_second_reconnect_delay() {
        let listener = WebSocketListener::new("ws://localhost/v1/receive/+1");
        assert_eq!(listener.reconnect_delay, Duration::from_secs(1));
    }

    #[test]
    fn initial_state_is_disconnected() {
        let listener = WebSocketListener::new("ws://localhost/v1/receive/+1");
        assert_eq!(listener.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn run_exits_immediately_when_stop_already_set() {
        let listener = WebSocketListener::new("ws://127.0.0.1:1/v1/receive/+1");
        let service = ListenerService::new(4, crate::service::BackpressurePolicy::DropNewest);
        let stop = CancellationToken::new();
        stop.cancel();
        listener.run(&service, stop).await;
        assert_eq!(listener.state(), ConnectionState::Disconnected);
    }
}
