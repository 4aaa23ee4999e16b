//! Message router - the sole translation point between the UI application's
//! channels and the transport session / library service.
//!
//! A single consumer loop: handlers run to completion one at a time, which
//! keeps inbound delivery in receive order and makes the library's
//! read-modify-write sequences atomic with respect to other commands. One bad
//! frame or storage failure never stops the loop.

use tokio::sync::mpsc;

use hearth_protocol::{ErrorDetails, ErrorKind};

use crate::application::services::LibraryService;
use crate::infrastructure::websocket::{FrameSender, SocketEvent};

use super::ports::{UiCommand, UiEvent};

pub async fn router_task(
    mut commands: mpsc::UnboundedReceiver<UiCommand>,
    mut socket_events: mpsc::UnboundedReceiver<SocketEvent>,
    frames: FrameSender,
    library: LibraryService,
    events: mpsc::UnboundedSender<UiEvent>,
) {
    let mut socket_closed = false;
    loop {
        tokio::select! {
            maybe_command = commands.recv() => {
                match maybe_command {
                    Some(command) => handle_command(command, &frames, &library, &events),
                    None => {
                        tracing::debug!("command channel closed, stopping router");
                        break;
                    }
                }
            }
            maybe_event = socket_events.recv(), if !socket_closed => {
                match maybe_event {
                    Some(event) => handle_socket_event(event, &events),
                    None => {
                        // Session task gone; keep serving persistence commands.
                        tracing::debug!("socket event channel closed");
                        socket_closed = true;
                    }
                }
            }
        }
    }
}

fn handle_command(
    command: UiCommand,
    frames: &FrameSender,
    library: &LibraryService,
    events: &mpsc::UnboundedSender<UiEvent>,
) {
    match command {
        UiCommand::SendMessage(message) => match serde_json::to_string(&message) {
            Ok(frame) => {
                tracing::debug!(payload = %frame, "sending message to server");
                if frames.submit(frame).is_err() {
                    report(events, ErrorKind::TransportError, "transport session is gone");
                }
            }
            Err(e) => report(
                events,
                ErrorKind::TransportError,
                format!("unserializable outbound message: {e}"),
            ),
        },
        UiCommand::PersistNewGame(game) => {
            tracing::debug!(game_id = %game.game_id, "updating library");
            if let Err(e) = library.save(game) {
                report(events, ErrorKind::PersistenceError, e.to_string());
            }
        }
        UiCommand::DeletePersistedGame(game) => {
            tracing::debug!(game_id = %game.game_id, "deleting saved game");
            if let Err(e) = library.remove(&game) {
                report(events, ErrorKind::PersistenceError, e.to_string());
            }
        }
        UiCommand::RequestPersistedGames => {
            tracing::debug!("reloading saved games");
            match library.list() {
                Ok(games) => {
                    let _ = events.send(UiEvent::LibraryLoaded(games));
                }
                Err(e) => report(events, ErrorKind::PersistenceError, e.to_string()),
            }
        }
    }
}

fn handle_socket_event(event: SocketEvent, events: &mpsc::UnboundedSender<UiEvent>) {
    match event {
        SocketEvent::Opened => {
            let _ = events.send(UiEvent::ConnectionEstablished);
        }
        SocketEvent::Closed => {
            let _ = events.send(UiEvent::ConnectionLost);
        }
        SocketEvent::Frame(message) => {
            tracing::debug!(payload = %message.0, "message from server");
            let _ = events.send(UiEvent::MessageReceived(message));
        }
        SocketEvent::InvalidFrame { detail } => {
            report(events, ErrorKind::InvalidFrame, detail);
        }
    }
}

fn report(
    events: &mpsc::UnboundedSender<UiEvent>,
    kind: ErrorKind,
    message: impl Into<String>,
) {
    let details = ErrorDetails::new(kind, message);
    tracing::warn!(kind = ?details.kind, "{}", details.message);
    let _ = events.send(UiEvent::Error(details));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::{json, Map};
    use tokio::time::timeout;

    use crate::infrastructure::messaging::CommandSender;
    use crate::infrastructure::storage::MemoryStore;
    use crate::ports::outbound::storage_port::{MockStoragePort, PersistenceError};
    use hearth_protocol::{InboundMessage, OutboundMessage, SavedGame};

    struct Harness {
        commands: CommandSender,
        socket_tx: mpsc::UnboundedSender<SocketEvent>,
        frames_rx: mpsc::UnboundedReceiver<String>,
        events_rx: mpsc::UnboundedReceiver<UiEvent>,
    }

    fn start_router_with(library: LibraryService) -> Harness {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (socket_tx, socket_rx) = mpsc::unbounded_channel();
        let (frame_tx, frames_rx) = mpsc::unbounded_channel();
        let (event_tx, events_rx) = mpsc::unbounded_channel();

        tokio::spawn(router_task(
            cmd_rx,
            socket_rx,
            FrameSender::new(frame_tx),
            library,
            event_tx,
        ));

        Harness {
            commands: CommandSender::new(cmd_tx),
            socket_tx,
            frames_rx,
            events_rx,
        }
    }

    fn start_router() -> Harness {
        start_router_with(LibraryService::new(Arc::new(MemoryStore::new())))
    }

    fn game(id: &str, label: &str) -> SavedGame {
        let mut data = Map::new();
        data.insert("label".to_string(), json!(label));
        SavedGame::new(id, data)
    }

    async fn next_event(harness: &mut Harness) -> UiEvent {
        timeout(Duration::from_secs(5), harness.events_rx.recv())
            .await
            .expect("event within timeout")
            .expect("router task alive")
    }

    #[tokio::test]
    async fn send_message_commands_become_frames_in_order() {
        let mut harness = start_router();

        for n in 1..=3 {
            harness
                .commands
                .send_message(OutboundMessage(json!({"n": n})))
                .expect("send");
        }

        for n in 1..=3 {
            let frame = timeout(Duration::from_secs(5), harness.frames_rx.recv())
                .await
                .expect("frame within timeout")
                .expect("frame");
            assert_eq!(frame, format!(r#"{{"n":{n}}}"#));
        }
    }

    #[tokio::test]
    async fn persist_then_request_delivers_the_library() {
        let mut harness = start_router();

        harness
            .commands
            .persist_new_game(game("g-1", "first"))
            .expect("persist");
        harness
            .commands
            .request_persisted_games()
            .expect("request");

        match next_event(&mut harness).await {
            UiEvent::LibraryLoaded(library) => {
                assert_eq!(library.len(), 1);
                assert!(library.contains("g-1"));
            }
            other => panic!("expected LibraryLoaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_then_request_yields_an_empty_library() {
        let mut harness = start_router();

        harness
            .commands
            .persist_new_game(game("g-1", "first"))
            .expect("persist");
        harness
            .commands
            .delete_persisted_game(game("g-1", "first"))
            .expect("delete");
        harness
            .commands
            .request_persisted_games()
            .expect("request");

        match next_event(&mut harness).await {
            UiEvent::LibraryLoaded(library) => assert!(library.is_empty()),
            other => panic!("expected LibraryLoaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lifecycle_events_map_to_connect_and_disconnect() {
        let mut harness = start_router();

        harness.socket_tx.send(SocketEvent::Opened).expect("send");
        harness.socket_tx.send(SocketEvent::Closed).expect("send");

        assert_eq!(next_event(&mut harness).await, UiEvent::ConnectionEstablished);
        assert_eq!(next_event(&mut harness).await, UiEvent::ConnectionLost);
    }

    #[tokio::test]
    async fn invalid_frames_report_errors_without_message_events() {
        let mut harness = start_router();

        harness
            .socket_tx
            .send(SocketEvent::InvalidFrame {
                detail: "expected value at line 1".to_string(),
            })
            .expect("send");
        harness
            .socket_tx
            .send(SocketEvent::Frame(InboundMessage(json!({"ok": true}))))
            .expect("send");

        match next_event(&mut harness).await {
            UiEvent::Error(details) => assert_eq!(details.kind, ErrorKind::InvalidFrame),
            other => panic!("expected Error, got {other:?}"),
        }
        match next_event(&mut harness).await {
            UiEvent::MessageReceived(message) => assert_eq!(message.0["ok"], true),
            other => panic!("expected MessageReceived, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn storage_failures_are_reported_and_do_not_stop_the_router() {
        let mut mock = MockStoragePort::new();
        mock.expect_load().returning(|_| Ok(None));
        mock.expect_save()
            .returning(|_, _| Err(PersistenceError::Write("quota exceeded".to_string())));
        let mut harness = start_router_with(LibraryService::new(Arc::new(mock)));

        harness
            .commands
            .persist_new_game(game("g-1", "first"))
            .expect("persist");

        match next_event(&mut harness).await {
            UiEvent::Error(details) => {
                assert_eq!(details.kind, ErrorKind::PersistenceError);
            }
            other => panic!("expected Error, got {other:?}"),
        }

        // The router is still alive and routing.
        harness.socket_tx.send(SocketEvent::Opened).expect("send");
        assert_eq!(next_event(&mut harness).await, UiEvent::ConnectionEstablished);
    }
}
