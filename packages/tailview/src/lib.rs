// Library interface for the tailview client
// Exposes the session plumbing for integration tests and embedding

pub mod config;
pub mod session;
pub mod terminal;
pub mod websocket;

pub use session::{SessionCommand, SessionManager, run_session, spawn_stdin_commands};
pub use terminal::TermSurface;
pub use websocket::WsTransport;
