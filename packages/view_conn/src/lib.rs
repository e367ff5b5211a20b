//! Connection management for live text view streams.
//!
//! A [`ViewConnectionManager`] owns at most one live connection to a
//! streaming endpoint, feeds inbound text chunks into a bounded
//! [`DisplayBuffer`], and reflects lifecycle changes onto a
//! [`ViewSurface`]. The wire itself lives behind the [`Transport`] trait,
//! so the manager stays synchronous and fully testable; an async driver
//! delivers [`TransportEvent`]s into it from whatever queue it likes.
//!
//! Reconnecting is always explicit: a new [`connect`] supersedes the old
//! handle (closing it first), and events the old handle emits afterwards
//! are discarded by token. There is no automatic reconnect.
//!
//! [`connect`]: ViewConnectionManager::connect
//!
//! # Example
//!
//! ```
//! use view_conn::{DisplayBuffer, EndpointDescriptor, SourceSelector, StreamRoute};
//!
//! let endpoint = EndpointDescriptor::new(
//!     "ws://127.0.0.1:8000",
//!     StreamRoute::Tail,
//!     SourceSelector::parse("app.log"),
//! );
//! assert_eq!(
//!     endpoint.url().as_deref(),
//!     Some("ws://127.0.0.1:8000/ws/tail/app.log"),
//! );
//!
//! let mut buffer = DisplayBuffer::new();
//! buffer.append_line("first chunk");
//! assert_eq!(buffer.contents(), "first chunk\n");
//! ```

pub mod buffer;
pub mod descriptor;
pub mod error;
pub mod manager;
pub mod protocol;
pub mod surface;
pub mod transport;

pub use buffer::DisplayBuffer;
pub use descriptor::{EndpointDescriptor, NOT_SELECTED, SourceSelector, StartPos, StreamRoute};
pub use error::TransportError;
pub use manager::{
    ConnectionState, SHUTDOWN_CLOSE_CODE, SUPERSEDE_CLOSE_CODE, ViewConnectionManager,
};
pub use protocol::ControlMessage;
pub use surface::{ControlAppearance, ViewControl, ViewSurface};
pub use transport::{HandleToken, Transport, TransportEvent, TransportHandle};
