//! WebSocket transport for view streams, built on tokio-tungstenite.
//!
//! Each `open` spawns one task that owns the socket end to end: connect,
//! pump frames, close. The task reports everything as token-stamped
//! events on the shared queue; the handle side only enqueues commands, so
//! the synchronous manager never touches the wire.

use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tracing::{debug, trace};

use view_conn::{HandleToken, Transport, TransportError, TransportEvent, TransportHandle};

/// Commands crossing from a handle into its socket task.
enum HandleCommand {
    Send(String),
    Close { code: u16, reason: String },
}

/// WebSocket-backed [`Transport`].
pub struct WsTransport {
    events: mpsc::UnboundedSender<TransportEvent>,
}

impl WsTransport {
    /// Build the transport together with the queue its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TransportEvent>) {
        let (events, events_rx) = mpsc::unbounded_channel();
        (Self { events }, events_rx)
    }
}

impl Transport for WsTransport {
    type Handle = WsHandle;

    fn open(&mut self, url: &str, token: HandleToken) -> WsHandle {
        let (commands, commands_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_socket(
            url.to_string(),
            token,
            self.events.clone(),
            commands_rx,
        ));
        WsHandle { commands }
    }
}

/// Command side of one socket task.
pub struct WsHandle {
    commands: mpsc::UnboundedSender<HandleCommand>,
}

impl TransportHandle for WsHandle {
    fn send_text(&mut self, text: &str) -> Result<(), TransportError> {
        self.commands
            .send(HandleCommand::Send(text.to_string()))
            .map_err(|_| TransportError::HandleClosed)
    }

    fn close(&mut self, code: u16, reason: &str) {
        // A dead task means the socket already closed; nothing to do
        let _ = self.commands.send(HandleCommand::Close {
            code,
            reason: reason.to_string(),
        });
    }
}

/// Own one socket end to end. Every exit path ends with a `Closed` event.
async fn run_socket(
    url: String,
    token: HandleToken,
    events: mpsc::UnboundedSender<TransportEvent>,
    mut commands: mpsc::UnboundedReceiver<HandleCommand>,
) {
    let ws_stream = match tokio_tungstenite::connect_async(&url).await {
        Ok((ws_stream, _)) => ws_stream,
        Err(err) => {
            let _ = events.send(TransportEvent::Failed {
                token,
                error: err.to_string(),
            });
            let _ = events.send(TransportEvent::Closed {
                token,
                code: None,
                reason: "connect failed".to_string(),
            });
            return;
        }
    };
    if events.send(TransportEvent::Opened { token }).is_err() {
        return;
    }

    let (mut ws_write, mut ws_read) = ws_stream.split();
    let mut peer_close: Option<(Option<u16>, String)> = None;

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(HandleCommand::Send(text)) => {
                    if let Err(err) = ws_write.send(tungstenite::Message::Text(text.into())).await {
                        let _ = events.send(TransportEvent::Failed {
                            token,
                            error: err.to_string(),
                        });
                        break;
                    }
                }
                Some(HandleCommand::Close { code, reason }) => {
                    trace!(%token, code, "sending close frame");
                    let frame = tungstenite::protocol::CloseFrame {
                        code: code.into(),
                        reason: reason.into(),
                    };
                    if ws_write.send(tungstenite::Message::Close(Some(frame))).await.is_err() {
                        break;
                    }
                    // Keep reading until the peer acknowledges
                }
                None => break,
            },
            message = ws_read.next() => match message {
                Some(Ok(tungstenite::Message::Text(text))) => {
                    if events.send(TransportEvent::Message {
                        token,
                        text: text.to_string(),
                    }).is_err() {
                        break;
                    }
                }
                Some(Ok(tungstenite::Message::Close(frame))) => {
                    peer_close = Some(match frame {
                        Some(frame) => (Some(frame.code.into()), frame.reason.to_string()),
                        None => (None, String::new()),
                    });
                    break;
                }
                Some(Ok(_)) => {} // ping/pong/binary: nothing to forward
                Some(Err(err)) => {
                    let _ = events.send(TransportEvent::Failed {
                        token,
                        error: err.to_string(),
                    });
                    break;
                }
                None => break,
            },
        }
    }

    // Finish the close handshake if one is still pending
    let _ = ws_write.close().await;

    let (code, reason) = peer_close.unwrap_or((None, String::new()));
    let _ = events.send(TransportEvent::Closed {
        token,
        code,
        reason,
    });
    debug!(%token, "socket task finished");
}
