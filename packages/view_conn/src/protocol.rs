//! Outbound control frames for a view stream.

use serde::{Deserialize, Serialize};

/// Client-to-server command, sent as a JSON text frame shaped
/// `{"command": "<name>"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case")]
pub enum ControlMessage {
    /// Pause or resume the server-side stream.
    TogglePause,
    /// Ask the server to end the stream; the server closes the channel.
    Quit,
}
