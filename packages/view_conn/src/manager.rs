//! Connection manager for a live view stream.
//!
//! Owns at most one live connection at a time. `connect` supersedes any
//! existing handle (the old handle's close is issued before the new one is
//! constructed), `send_control` forwards commands only while the channel
//! is open, and every transport event is filtered by handle token so a
//! superseded connection can never touch current state.

use tracing::{debug, error, info, trace, warn};

use crate::buffer::DisplayBuffer;
use crate::descriptor::EndpointDescriptor;
use crate::protocol::ControlMessage;
use crate::surface::{ControlAppearance, ViewControl, ViewSurface};
use crate::transport::{HandleToken, Transport, TransportEvent, TransportHandle};

/// Close code sent to a handle replaced by a newer `connect` call.
pub const SUPERSEDE_CLOSE_CODE: u16 = 3001;

/// Close code for a locally requested teardown.
pub const SHUTDOWN_CLOSE_CODE: u16 = 1000;

/// Lifecycle of the managed connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No source selected, no handle.
    Idle,
    /// Handle constructed, handshake not settled.
    Connecting,
    /// Traffic flows.
    Open,
    /// Close requested locally, confirmation pending.
    Closing,
    /// The last handle is gone.
    Closed,
}

struct LiveHandle<H> {
    token: HandleToken,
    handle: H,
}

/// Single-connection manager feeding a [`DisplayBuffer`] and a
/// [`ViewSurface`].
pub struct ViewConnectionManager<T: Transport, S: ViewSurface> {
    transport: T,
    surface: S,
    buffer: DisplayBuffer,
    state: ConnectionState,
    paused: bool,
    live: Option<LiveHandle<T::Handle>>,
    next_token: u64,
}

impl<T: Transport, S: ViewSurface> ViewConnectionManager<T, S> {
    pub fn new(transport: T, surface: S) -> Self {
        Self::with_buffer(transport, surface, DisplayBuffer::new())
    }

    /// Build with a caller-provided buffer (custom soft cap).
    pub fn with_buffer(transport: T, surface: S, buffer: DisplayBuffer) -> Self {
        Self {
            transport,
            surface,
            buffer,
            state: ConnectionState::Idle,
            paused: false,
            live: None,
            next_token: 0,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn buffer(&self) -> &DisplayBuffer {
        &self.buffer
    }

    /// Point the view at `descriptor`, superseding any live connection.
    ///
    /// The buffer is cleared and the pause flag reset on every call. With
    /// the sentinel selector no handle is constructed and the manager goes
    /// idle. Never fails; transport problems arrive later as events.
    pub fn connect(&mut self, descriptor: &EndpointDescriptor) {
        if let Some(mut live) = self.live.take() {
            debug!(token = %live.token, "closing superseded connection");
            live.handle.close(
                SUPERSEDE_CLOSE_CODE,
                &format!("superseded: reconnect to {}", descriptor.selector()),
            );
        }

        self.buffer.clear();
        self.paused = false;
        self.surface.render(&self.buffer);
        self.surface
            .set_control(ViewControl::Pause, ControlAppearance::Disabled);

        let Some(url) = descriptor.url() else {
            info!("no source selected, staying idle");
            self.state = ConnectionState::Idle;
            self.surface
                .set_control(ViewControl::Submit, ControlAppearance::Normal);
            return;
        };

        let token = self.mint_token();
        info!(%token, %url, "connecting");
        let handle = self.transport.open(&url, token);
        self.live = Some(LiveHandle { token, handle });
        self.state = ConnectionState::Connecting;
        self.surface
            .set_control(ViewControl::Submit, ControlAppearance::Disabled);
    }

    /// Send a control command if the channel is open; otherwise skip it
    /// silently. `TogglePause` flips the pause flag either way.
    pub fn send_control(&mut self, message: ControlMessage) {
        match (self.state, self.live.as_mut()) {
            (ConnectionState::Open, Some(live)) => match serde_json::to_string(&message) {
                Ok(json) => {
                    if let Err(err) = live.handle.send_text(&json) {
                        warn!(token = %live.token, %err, "control send failed");
                    }
                }
                Err(err) => error!(%err, "control message did not serialize"),
            },
            _ => {
                debug!(state = ?self.state, ?message, "control send skipped, channel not open");
            }
        }

        if message == ControlMessage::TogglePause {
            self.paused = !self.paused;
            let appearance = if self.paused {
                ControlAppearance::Active
            } else {
                ControlAppearance::Normal
            };
            self.surface.set_control(ViewControl::Pause, appearance);
        }
    }

    /// Request a graceful close of the live connection, if any. The state
    /// settles to `Closed` when the transport confirms.
    pub fn shutdown(&mut self) {
        if self.state == ConnectionState::Closing {
            return;
        }
        let Some(live) = self.live.as_mut() else {
            debug!("shutdown with no live connection");
            return;
        };
        info!(token = %live.token, "closing connection");
        live.handle.close(SHUTDOWN_CLOSE_CODE, "view closed");
        self.state = ConnectionState::Closing;
    }

    /// Apply one transport event. Events from superseded handles are
    /// discarded here by token.
    pub fn handle_event(&mut self, event: TransportEvent) {
        let token = event.token();
        if self.live.as_ref().map(|live| live.token) != Some(token) {
            trace!(%token, "discarding event from superseded handle");
            return;
        }

        match event {
            TransportEvent::Opened { .. } => self.on_opened(token),
            TransportEvent::Message { text, .. } => self.on_chunk(&text),
            TransportEvent::Closed { code, reason, .. } => self.on_closed(token, code, &reason),
            TransportEvent::Failed { error, .. } => self.on_failed(token, &error),
        }
    }

    fn on_opened(&mut self, token: HandleToken) {
        if self.state != ConnectionState::Connecting {
            trace!(%token, state = ?self.state, "ignoring open outside connecting state");
            return;
        }
        info!(%token, "channel open");
        self.state = ConnectionState::Open;
        self.surface
            .set_control(ViewControl::Submit, ControlAppearance::Normal);
        self.surface
            .set_control(ViewControl::Pause, ControlAppearance::Normal);
    }

    fn on_chunk(&mut self, text: &str) {
        if self.state != ConnectionState::Open {
            trace!(state = ?self.state, "dropping chunk outside open state");
            return;
        }
        self.buffer.append_line(text);
        self.surface.render(&self.buffer);
        self.surface.scroll_to_end();
    }

    fn on_closed(&mut self, token: HandleToken, code: Option<u16>, reason: &str) {
        match self.state {
            ConnectionState::Open => {
                warn!(%token, ?code, reason, "channel closed unexpectedly");
            }
            ConnectionState::Connecting => {
                warn!(%token, ?code, reason, "channel closed before opening");
            }
            _ => info!(%token, ?code, reason, "channel closed"),
        }
        self.live = None;
        self.state = ConnectionState::Closed;
        self.buffer.clear();
        self.surface.render(&self.buffer);
        self.surface
            .set_control(ViewControl::Submit, ControlAppearance::Normal);
        self.surface
            .set_control(ViewControl::Pause, ControlAppearance::Disabled);
    }

    fn on_failed(&mut self, token: HandleToken, error: &str) {
        if self.state == ConnectionState::Connecting {
            error!(%token, error, "connect failed");
        } else {
            error!(%token, error, "transport error");
        }
    }

    fn mint_token(&mut self) -> HandleToken {
        self.next_token += 1;
        HandleToken(self.next_token)
    }
}
