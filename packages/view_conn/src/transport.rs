//! Seam between the synchronous manager and an async wire.
//!
//! A [`Transport`] hands out one [`TransportHandle`] per `open` call and
//! reports everything that happens to that connection as token-stamped
//! [`TransportEvent`]s on whatever queue the caller drains. The manager
//! never blocks on the wire; it only reacts to events.

use std::fmt;

use crate::error::TransportError;

/// Identity stamped on each connection handle.
///
/// Tokens are minted monotonically per manager, so an event from a
/// superseded handle is recognizable no matter how late it arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleToken(pub u64);

impl fmt::Display for HandleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle and traffic events delivered by a transport.
#[derive(Debug, Clone)]
pub enum TransportEvent {
    /// Handshake settled; the channel is ready for traffic.
    Opened { token: HandleToken },
    /// One inbound text chunk.
    Message { token: HandleToken, text: String },
    /// The channel is gone, whether locally requested or not.
    Closed {
        token: HandleToken,
        code: Option<u16>,
        reason: String,
    },
    /// Transport-level failure report. A `Closed` always follows.
    Failed { token: HandleToken, error: String },
}

impl TransportEvent {
    pub fn token(&self) -> HandleToken {
        match self {
            TransportEvent::Opened { token }
            | TransportEvent::Message { token, .. }
            | TransportEvent::Closed { token, .. }
            | TransportEvent::Failed { token, .. } => *token,
        }
    }
}

/// One live connection. Both operations are requests; completion and
/// failure arrive as [`TransportEvent`]s.
pub trait TransportHandle {
    /// Queue a text frame for sending.
    fn send_text(&mut self, text: &str) -> Result<(), TransportError>;

    /// Request the channel be closed with the given code and reason.
    /// Safe to call more than once; later calls are ignored.
    fn close(&mut self, code: u16, reason: &str);
}

/// Factory for connection handles.
pub trait Transport {
    type Handle: TransportHandle;

    /// Begin connecting to `url`. Never blocks and never fails directly:
    /// the outcome arrives as an `Opened` event, or as `Failed` followed
    /// by `Closed`, stamped with `token`.
    fn open(&mut self, url: &str, token: HandleToken) -> Self::Handle;
}
