//! End-to-end stream tests: a real WebSocket server in-process, the real
//! transport, and a manager driven the way the session loop drives it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite;

use tailview::session::{SessionCommand, run_session};
use tailview::terminal::TermSurface;
use tailview::websocket::WsTransport;
use view_conn::{
    ConnectionState, ControlAppearance, ControlMessage, DisplayBuffer, EndpointDescriptor,
    SUPERSEDE_CLOSE_CODE, SourceSelector, StreamRoute, TransportEvent, ViewConnectionManager,
    ViewControl, ViewSurface,
};

/// Timeout for each async operation in tests.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Default, Clone)]
struct RecordingSurface {
    renders: Arc<Mutex<Vec<String>>>,
}

impl ViewSurface for RecordingSurface {
    fn render(&mut self, buffer: &DisplayBuffer) {
        self.renders
            .lock()
            .unwrap()
            .push(buffer.contents().to_string());
    }

    fn scroll_to_end(&mut self) {}

    fn set_control(&mut self, _control: ViewControl, _appearance: ControlAppearance) {}
}

async fn bind_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    (listener, format!("ws://{}", addr))
}

fn tail_endpoint(base: &str, source: &str) -> EndpointDescriptor {
    EndpointDescriptor::new(base, StreamRoute::Tail, SourceSelector::parse(source))
}

#[tokio::test]
async fn streams_chunks_into_the_buffer() {
    timeout(TEST_TIMEOUT, async {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("handshake");
            ws.send(tungstenite::Message::Text("line1".into()))
                .await
                .expect("send");
            ws.send(tungstenite::Message::Text("line2".into()))
                .await
                .expect("send");
            ws.close(None).await.expect("close");
            while ws.next().await.is_some() {}
        });

        let (transport, mut events) = WsTransport::new();
        let surface = RecordingSurface::default();
        let renders = surface.renders.clone();
        let mut manager = ViewConnectionManager::new(transport, surface);
        manager.connect(&tail_endpoint(&base, "app.log"));

        while manager.state() != ConnectionState::Closed {
            let event = events.recv().await.expect("event stream ended");
            manager.handle_event(event);
        }

        assert!(
            renders
                .lock()
                .unwrap()
                .contains(&"line1\nline2\n".to_string())
        );
        // The viewport empties when the channel goes away
        assert!(manager.buffer().is_empty());
        server.await.expect("server task");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn control_frames_reach_the_server() {
    timeout(TEST_TIMEOUT, async {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("handshake");
            let frame = ws.next().await.expect("frame").expect("frame ok");
            let text = match frame {
                tungstenite::Message::Text(text) => text.to_string(),
                other => panic!("expected text frame, got {:?}", other),
            };
            ws.close(None).await.expect("close");
            while ws.next().await.is_some() {}
            text
        });

        let (transport, mut events) = WsTransport::new();
        let mut manager = ViewConnectionManager::new(transport, RecordingSurface::default());
        manager.connect(&tail_endpoint(&base, "app.log"));

        while manager.state() != ConnectionState::Open {
            manager.handle_event(events.recv().await.expect("event"));
        }
        manager.send_control(ControlMessage::TogglePause);
        assert!(manager.is_paused());

        while manager.state() != ConnectionState::Closed {
            manager.handle_event(events.recv().await.expect("event"));
        }

        let wire = server.await.expect("server task");
        let json: serde_json::Value = serde_json::from_str(&wire).expect("wire json");
        assert_eq!(json["command"], "toggle-pause");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn supersede_closes_with_reconnect_code() {
    timeout(TEST_TIMEOUT, async {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            // First connection only ever sees the supersede close
            let (stream, _) = listener.accept().await.expect("accept a");
            let mut first = tokio_tungstenite::accept_async(stream)
                .await
                .expect("handshake a");
            let close_code = loop {
                match first.next().await {
                    Some(Ok(tungstenite::Message::Close(Some(frame)))) => {
                        break u16::from(frame.code);
                    }
                    Some(Ok(_)) => continue,
                    other => panic!("expected close frame, got {:?}", other),
                }
            };

            // Second connection streams and closes normally
            let (stream, _) = listener.accept().await.expect("accept b");
            let mut second = tokio_tungstenite::accept_async(stream)
                .await
                .expect("handshake b");
            second
                .send(tungstenite::Message::Text("fresh".into()))
                .await
                .expect("send");
            second.close(None).await.expect("close");
            while second.next().await.is_some() {}

            close_code
        });

        let (transport, mut events) = WsTransport::new();
        let surface = RecordingSurface::default();
        let renders = surface.renders.clone();
        let mut manager = ViewConnectionManager::new(transport, surface);

        manager.connect(&tail_endpoint(&base, "a.log"));
        while manager.state() != ConnectionState::Open {
            manager.handle_event(events.recv().await.expect("event"));
        }

        manager.connect(&tail_endpoint(&base, "b.log"));
        while manager.state() != ConnectionState::Closed {
            manager.handle_event(events.recv().await.expect("event"));
        }

        let close_code = server.await.expect("server task");
        assert_eq!(close_code, SUPERSEDE_CLOSE_CODE);
        assert!(renders.lock().unwrap().contains(&"fresh\n".to_string()));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn connect_failure_settles_closed() {
    timeout(TEST_TIMEOUT, async {
        let (listener, base) = bind_server().await;
        drop(listener);

        let (transport, mut events) = WsTransport::new();
        let mut manager = ViewConnectionManager::new(transport, RecordingSurface::default());
        manager.connect(&tail_endpoint(&base, "a.log"));

        let mut saw_failure = false;
        while manager.state() != ConnectionState::Closed {
            let event = events.recv().await.expect("event");
            if matches!(event, TransportEvent::Failed { .. }) {
                saw_failure = true;
            }
            manager.handle_event(event);
        }
        assert!(saw_failure, "a refused connection must report a failure");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn session_loop_quits_cleanly() {
    timeout(TEST_TIMEOUT, async {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = tokio_tungstenite::accept_async(stream)
                .await
                .expect("handshake");
            ws.send(tungstenite::Message::Text("streaming".into()))
                .await
                .expect("send");
            loop {
                match ws.next().await {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        let json: serde_json::Value =
                            serde_json::from_str(&text).expect("wire json");
                        if json["command"] == "quit" {
                            let _ = ws.close(None).await;
                        }
                    }
                    Some(Ok(_)) => continue,
                    _ => break,
                }
            }
        });

        let (transport, events) = WsTransport::new();
        let mut manager = ViewConnectionManager::new(transport, TermSurface::new());
        manager.connect(&tail_endpoint(&base, "app.log"));

        // Quit is only transmitted once the channel is open, so keep asking
        // until the session acts on it and ends
        let (tx, commands) = mpsc::channel(16);
        tokio::spawn(async move {
            loop {
                if tx
                    .send(SessionCommand::Control(ControlMessage::Quit))
                    .await
                    .is_err()
                {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        });

        run_session(manager, events, commands)
            .await
            .expect("session");
        server.await.expect("server task");
    })
    .await
    .expect("test timed out");
}
