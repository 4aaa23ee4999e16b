//! Reconnecting WebSocket session using tokio-tungstenite
//!
//! The session task owns the socket for the life of the process: it dials,
//! splits, pumps frames in both directions, and on any close or error falls
//! back to `Disconnected` and retries with backoff. Close and error are not
//! distinguished downstream; both collapse into exactly one
//! [`SocketEvent::Closed`] per connection, with the error detail going to the
//! log only.
//!
//! Frames submitted while the socket is not connected are queued and flushed
//! strictly in submission order on the next connect, ahead of anything
//! submitted afterwards.

use std::ops::ControlFlow;
use std::sync::atomic::AtomicU8;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use hearth_protocol::InboundMessage;

use crate::infrastructure::messaging::connection::{
    set_connection_state, ConnectionState, ConnectionStateObserver,
};
use crate::infrastructure::websocket::core::{BackoffState, OutboundQueue, ReconnectPolicy};

/// Lifecycle and data events emitted by the session task.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    /// Entered Connected; queued frames are flushed right after
    Opened,
    /// Left Connected (close and error look the same downstream)
    Closed,
    /// A parsed inbound frame
    Frame(InboundMessage),
    /// An inbound text frame that was not valid JSON; never forwarded as a
    /// normal message
    InvalidFrame { detail: String },
}

/// Clonable sender half for submitting serialized frames to the session.
#[derive(Clone)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<String>,
}

impl FrameSender {
    pub fn new(tx: mpsc::UnboundedSender<String>) -> Self {
        Self { tx }
    }

    /// Submit a frame for transmission, or for queueing if not connected.
    pub fn submit(&self, frame: String) -> anyhow::Result<()> {
        self.tx
            .send(frame)
            .map_err(|_| anyhow::anyhow!("transport session is gone"))
    }
}

/// Handle controlling the session task lifecycle.
pub struct SessionHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl SessionHandle {
    /// Stop the session task.
    ///
    /// Consumes the handle; a stopped session cannot be restarted - spawn a
    /// new one to reconnect.
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Everything a caller needs to use the session.
pub struct SessionParts {
    pub handle: SessionHandle,
    pub frames: FrameSender,
    pub events: mpsc::UnboundedReceiver<SocketEvent>,
    pub observer: ConnectionStateObserver,
}

/// Spawn the session task for `url`.
///
/// The task starts connecting immediately and keeps reconnecting until the
/// handle is shut down or every [`FrameSender`] is dropped.
pub fn spawn_session(url: impl Into<String>, policy: ReconnectPolicy) -> SessionParts {
    let url = url.into();
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let state = Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8()));
    let observer = ConnectionStateObserver::new(Arc::clone(&state));

    tokio::spawn(session_task(
        url,
        policy,
        state,
        outbound_rx,
        shutdown_rx,
        event_tx,
    ));

    SessionParts {
        handle: SessionHandle {
            shutdown_tx: Some(shutdown_tx),
        },
        frames: FrameSender::new(outbound_tx),
        events: event_rx,
        observer,
    }
}

async fn session_task(
    url: String,
    policy: ReconnectPolicy,
    state: Arc<AtomicU8>,
    mut outbound_rx: mpsc::UnboundedReceiver<String>,
    mut shutdown_rx: oneshot::Receiver<()>,
    event_tx: mpsc::UnboundedSender<SocketEvent>,
) {
    let mut queue = OutboundQueue::default();
    let mut backoff = BackoffState::new(policy);

    'reconnect: loop {
        set_connection_state(&state, ConnectionState::Connecting);
        tracing::debug!(url = %url, "connecting");

        let connect = connect_async(url.as_str());
        tokio::pin!(connect);

        // Race the dial against shutdown; frames submitted meanwhile queue up.
        let ws_stream = loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    set_connection_state(&state, ConnectionState::Disconnected);
                    return;
                }
                maybe_frame = outbound_rx.recv() => {
                    match maybe_frame {
                        Some(frame) => queue.push(frame),
                        None => {
                            set_connection_state(&state, ConnectionState::Disconnected);
                            return;
                        }
                    }
                }
                result = &mut connect => {
                    match result {
                        Ok((ws_stream, _)) => break ws_stream,
                        Err(e) => {
                            tracing::warn!(attempt = backoff.attempts(), "connection failed: {e}");
                            set_connection_state(&state, ConnectionState::Disconnected);
                            if wait_before_retry(
                                &mut backoff,
                                &state,
                                &mut outbound_rx,
                                &mut shutdown_rx,
                                &mut queue,
                            )
                            .await
                            .is_break()
                            {
                                return;
                            }
                            continue 'reconnect;
                        }
                    }
                }
            }
        };

        tracing::info!(url = %url, "connected to server");
        set_connection_state(&state, ConnectionState::Connected);
        backoff.reset();
        let _ = event_tx.send(SocketEvent::Opened);

        let (mut write, mut read) = ws_stream.split();

        // Flush frames queued while disconnected, strictly in submission order.
        let mut connection_lost = false;
        while let Some(frame) = queue.pop() {
            if let Err(e) = write.send(Message::Text(frame.clone())).await {
                tracing::warn!("flush failed, requeueing frame: {e}");
                queue.requeue_front(frame);
                connection_lost = true;
                break;
            }
        }

        while !connection_lost {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    let _ = write.send(Message::Close(None)).await;
                    set_connection_state(&state, ConnectionState::Disconnected);
                    let _ = event_tx.send(SocketEvent::Closed);
                    return;
                }
                maybe_frame = outbound_rx.recv() => {
                    match maybe_frame {
                        Some(frame) => {
                            if let Err(e) = write.send(Message::Text(frame.clone())).await {
                                tracing::warn!("send failed, requeueing frame: {e}");
                                queue.requeue_front(frame);
                                connection_lost = true;
                            }
                        }
                        None => {
                            tracing::debug!("all frame senders dropped, closing session");
                            let _ = write.send(Message::Close(None)).await;
                            set_connection_state(&state, ConnectionState::Disconnected);
                            return;
                        }
                    }
                }
                maybe_msg = read.next() => {
                    match maybe_msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<serde_json::Value>(&text) {
                                Ok(value) => {
                                    let _ = event_tx.send(SocketEvent::Frame(InboundMessage(value)));
                                }
                                Err(e) => {
                                    tracing::warn!("dropping unparseable frame: {e}");
                                    let _ = event_tx.send(SocketEvent::InvalidFrame {
                                        detail: e.to_string(),
                                    });
                                }
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            tracing::info!("server closed connection");
                            connection_lost = true;
                        }
                        // Binary, ping and pong are not part of the protocol;
                        // tungstenite answers pings itself.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::error!("websocket error: {e}");
                            connection_lost = true;
                        }
                        None => {
                            connection_lost = true;
                        }
                    }
                }
            }
        }

        // Close and error collapse into exactly one Closed per connection.
        set_connection_state(&state, ConnectionState::Disconnected);
        let _ = event_tx.send(SocketEvent::Closed);

        if wait_before_retry(
            &mut backoff,
            &state,
            &mut outbound_rx,
            &mut shutdown_rx,
            &mut queue,
        )
        .await
        .is_break()
        {
            return;
        }
    }
}

/// Sleep out the backoff delay, still queueing submissions and honoring
/// shutdown. Break means the session should stop.
async fn wait_before_retry(
    backoff: &mut BackoffState,
    state: &AtomicU8,
    outbound_rx: &mut mpsc::UnboundedReceiver<String>,
    shutdown_rx: &mut oneshot::Receiver<()>,
    queue: &mut OutboundQueue,
) -> ControlFlow<()> {
    let delay = backoff.next_delay_and_advance();
    tracing::debug!(
        attempt = backoff.attempts(),
        delay_ms = delay.as_millis() as u64,
        "waiting before reconnect"
    );

    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut *shutdown_rx => {
                set_connection_state(state, ConnectionState::Disconnected);
                return ControlFlow::Break(());
            }
            _ = &mut sleep => return ControlFlow::Continue(()),
            maybe_frame = outbound_rx.recv() => {
                match maybe_frame {
                    Some(frame) => queue.push(frame),
                    None => {
                        set_connection_state(state, ConnectionState::Disconnected);
                        return ControlFlow::Break(());
                    }
                }
            }
        }
    }
}
