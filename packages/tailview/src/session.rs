//! Interactive session plumbing: one manager, transport events, user
//! commands, signals.

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use view_conn::{
    ConnectionState, ControlMessage, EndpointDescriptor, SourceSelector, TransportEvent,
    ViewConnectionManager,
};

use crate::terminal::TermSurface;
use crate::websocket::WsTransport;

/// What the user asked the session to do.
#[derive(Debug)]
pub enum SessionCommand {
    /// Re-point the view at a different source (or the sentinel).
    Connect(EndpointDescriptor),
    /// Forward a control command to the server.
    Control(ControlMessage),
}

pub type SessionManager = ViewConnectionManager<WsTransport, TermSurface>;

/// Spawn a blocking reader translating stdin lines into session commands.
///
/// `p` toggles pause, `q` asks the server to end the stream, `o <source>`
/// switches sources, bare `o` deselects. The thread ends at stdin EOF.
pub fn spawn_stdin_commands(endpoint: EndpointDescriptor) -> mpsc::Receiver<SessionCommand> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut line = String::new();
        loop {
            line.clear();
            match stdin.read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match parse_command(trimmed, &endpoint) {
                Some(command) => {
                    if tx.blocking_send(command).is_err() {
                        break;
                    }
                }
                None => {
                    eprintln!("[tailview: commands are p (pause), q (quit), o <source> (switch)]");
                }
            }
        }
    });
    rx
}

fn parse_command(line: &str, endpoint: &EndpointDescriptor) -> Option<SessionCommand> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "p" => Some(SessionCommand::Control(ControlMessage::TogglePause)),
        "q" => Some(SessionCommand::Control(ControlMessage::Quit)),
        "o" => {
            let selector = match parts.next() {
                Some(source) => SourceSelector::parse(source),
                None => SourceSelector::NotSelected,
            };
            Some(SessionCommand::Connect(endpoint.with_selector(selector)))
        }
        _ => None,
    }
}

/// Drive the manager until its connection settles closed.
///
/// Ctrl-C requests a graceful close; a second Ctrl-C exits immediately.
/// An idle manager with no command input left has nothing to wait for.
pub async fn run_session(
    mut manager: SessionManager,
    mut events: mpsc::UnboundedReceiver<TransportEvent>,
    mut commands: mpsc::Receiver<SessionCommand>,
) -> Result<()> {
    let mut commands_open = true;
    let mut interrupted = false;

    loop {
        if manager.state() == ConnectionState::Closed {
            break;
        }
        if manager.state() == ConnectionState::Idle && !commands_open {
            debug!("idle with no command input, ending session");
            break;
        }

        tokio::select! {
            Some(event) = events.recv() => {
                manager.handle_event(event);
            }
            command = commands.recv(), if commands_open => match command {
                Some(SessionCommand::Connect(endpoint)) => manager.connect(&endpoint),
                Some(SessionCommand::Control(message)) => manager.send_control(message),
                None => {
                    debug!("command input closed");
                    commands_open = false;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                if interrupted {
                    info!("second interrupt, exiting now");
                    break;
                }
                interrupted = true;
                manager.shutdown();
                if manager.state() == ConnectionState::Idle {
                    break;
                }
            }
        }
    }

    Ok(())
}
