//! WebSocket server and connection handling.

use crate::advisory::{fetch_with_timeout, AdvisoryService, HttpAdvisory};
use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::view::GameView;
use cognispy_core::{AdvisoryRequest, RoundToken, SessionAction, SessionEvent};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// Game view per connection
    pub views: DashMap<Uuid, GameView>,
    /// Mapping from connection ID to its message sender
    pub senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    /// Remote congratulation text; canned messages only when absent
    pub advisory: Option<Arc<dyn AdvisoryService>>,
    pub config: ServerConfig,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        let advisory = config
            .advisory_url
            .as_deref()
            .map(|url| Arc::new(HttpAdvisory::new(url)) as Arc<dyn AdvisoryService>);
        Self::with_advisory(config, advisory)
    }

    pub fn with_advisory(config: ServerConfig, advisory: Option<Arc<dyn AdvisoryService>>) -> Self {
        Self {
            views: DashMap::new(),
            senders: DashMap::new(),
            advisory,
            config,
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, connection_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&connection_id) {
            let _ = sender.send(msg);
        }
    }

    /// Register a connection and its outgoing channel
    pub fn connect(&self, connection_id: Uuid, tx: mpsc::UnboundedSender<ServerMessage>) {
        self.views
            .insert(connection_id, GameView::new(tx.clone(), self.config.seed));
        self.senders.insert(connection_id, tx);
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("CogniSpy server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let connection_id = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.connect(connection_id, tx);

    let welcome = ServerMessage::Welcome { connection_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(text) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(connection_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", connection_id, e);
                    state.send_to(
                        connection_id,
                        ServerMessage::Error {
                            message: format!("Invalid message: {}", e),
                        },
                    );
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to(connection_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(connection_id, &state);
    send_task.abort();

    info!("Connection closed for {}", connection_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(connection_id: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::Hello { username, locale } => {
            if let Some(mut view) = state.views.get_mut(&connection_id) {
                view.greet(&username, &locale);
                info!(%connection_id, username = %view.username, locale = %view.locale, "player greeted");
            }
            state.send_to(connection_id, ServerMessage::Menu);
        }

        ClientMessage::SelectGame { game } => {
            let Some(mut view) = state.views.get_mut(&connection_id) else {
                return;
            };
            match view.select(&game) {
                Ok(kind) => {
                    let game_state = view.state_json();
                    drop(view);

                    state.send_to(
                        connection_id,
                        ServerMessage::GameSelected {
                            game: kind.route().to_string(),
                        },
                    );
                    if let Some(game_state) = game_state {
                        state.send_to(connection_id, ServerMessage::State { state: game_state });
                    }
                }
                Err(e) => {
                    drop(view);
                    warn!(%connection_id, "{}", e);
                    state.send_to(
                        connection_id,
                        ServerMessage::Error {
                            message: e.to_string(),
                        },
                    );
                    state.send_to(connection_id, ServerMessage::Menu);
                }
            }
        }

        ClientMessage::Start { stage } => {
            apply_action(connection_id, SessionAction::Start { stage }, state);
        }

        ClientMessage::Click { item_id } => {
            apply_action(connection_id, SessionAction::Click { item_id }, state);
        }

        ClientMessage::NextStage => {
            apply_action(connection_id, SessionAction::NextStage, state);
        }

        ClientMessage::Retry => {
            apply_action(connection_id, SessionAction::Retry, state);
        }

        ClientMessage::LeaveGame => {
            if let Some(mut view) = state.views.get_mut(&connection_id) {
                view.leave();
            }
            state.send_to(connection_id, ServerMessage::Menu);
        }

        ClientMessage::SetSound { enabled } => {
            if let Some(mut view) = state.views.get_mut(&connection_id) {
                view.set_sound(enabled);
                debug!(%connection_id, sound = view.sound_enabled(), "sound preference set");
            }
        }

        ClientMessage::Ping => {
            state.send_to(connection_id, ServerMessage::Pong);
        }
    }
}

/// Apply a game action and push the results to the player.
fn apply_action(connection_id: Uuid, action: SessionAction, state: &Arc<ServerState>) {
    let Some(mut view) = state.views.get_mut(&connection_id) else {
        return;
    };

    match view.apply(action) {
        Ok(events) => {
            let game_state = view.state_json();
            let completed = events.iter().any(SessionEvent::is_completion);
            let pending = if completed {
                view.pending_advisory()
            } else {
                None
            };
            let message = view.completion_message();

            drop(view);

            if !events.is_empty() {
                state.send_to(connection_id, ServerMessage::Events { events });
            }
            if let Some(game_state) = game_state {
                state.send_to(connection_id, ServerMessage::State { state: game_state });
            }

            if let Some((token, request)) = pending {
                // Show the canned text at once; remote text may replace it
                if let Some(message) = message {
                    state.send_to(
                        connection_id,
                        ServerMessage::Completion {
                            message,
                            provisional: state.advisory.is_some(),
                        },
                    );
                }
                spawn_advisory(state, connection_id, token, request);
            }
        }
        Err(e) => {
            drop(view);
            debug!(%connection_id, "action rejected: {}", e);
            state.send_to(
                connection_id,
                ServerMessage::Error {
                    message: e.to_string(),
                },
            );
        }
    }
}

/// Fetch remote completion text in the background.
///
/// The task is owned by the player's view, so starting another round,
/// leaving the game or disconnecting cancels it.
fn spawn_advisory(
    state: &Arc<ServerState>,
    connection_id: Uuid,
    token: RoundToken,
    request: AdvisoryRequest,
) {
    let Some(service) = state.advisory.clone() else {
        return;
    };
    let limit = state.config.advisory_timeout;
    let task_state = Arc::clone(state);

    let task = tokio::spawn(async move {
        let text = match fetch_with_timeout(service.as_ref(), &request, limit).await {
            Ok(text) => text,
            Err(e) => {
                warn!(%connection_id, "advisory text unavailable: {}", e);
                // Settle the provisional message if the round is still on screen
                let current = task_state
                    .views
                    .get(&connection_id)
                    .and_then(|view| view.pending_advisory())
                    .is_some_and(|(pending, _)| pending == token);
                if current {
                    task_state.send_to(
                        connection_id,
                        ServerMessage::Completion {
                            message: request.fallback(),
                            provisional: false,
                        },
                    );
                }
                return;
            }
        };

        let accepted = task_state
            .views
            .get_mut(&connection_id)
            .and_then(|mut view| view.accept_advisory(token, &text));

        if let Some(message) = accepted {
            task_state.send_to(
                connection_id,
                ServerMessage::Completion {
                    message,
                    provisional: false,
                },
            );
        }
    });

    match state.views.get_mut(&connection_id) {
        Some(mut view) => view.set_advisory_task(task),
        None => task.abort(),
    }
}

/// Handle player disconnect.
fn handle_disconnect(connection_id: Uuid, state: &Arc<ServerState>) {
    // Dropping the view aborts any advisory fetch still running
    state.views.remove(&connection_id);
    state.senders.remove(&connection_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cognispy_core::AdvisoryError;
    use std::time::Duration;

    struct Fixed;

    #[async_trait]
    impl AdvisoryService for Fixed {
        async fn congratulate(&self, request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
            Ok(format!("Bravo, {}!", request.username))
        }
    }

    struct Down;

    #[async_trait]
    impl AdvisoryService for Down {
        async fn congratulate(&self, _request: &AdvisoryRequest) -> Result<String, AdvisoryError> {
            Err(AdvisoryError::Unavailable("connection refused".to_string()))
        }
    }

    fn config() -> ServerConfig {
        ServerConfig::from_lookup(|key| match key {
            "COGNISPY_SEED" => Some("3".to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn connect(state: &Arc<ServerState>) -> (Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        state.connect(id, tx);
        (id, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn play_bears(id: Uuid, state: &Arc<ServerState>) {
        handle_message(id, ClientMessage::Hello { username: "Ann".into(), locale: "en".into() }, state);
        handle_message(id, ClientMessage::SelectGame { game: "bears".into() }, state);
        handle_message(id, ClientMessage::Start { stage: 1 }, state);
        for spot in ["hat", "star", "drum"] {
            handle_message(id, ClientMessage::Click { item_id: spot.into() }, state);
        }
    }

    #[test]
    fn test_unknown_game_returns_to_menu() {
        let state = Arc::new(ServerState::new(config()));
        let (id, mut rx) = connect(&state);

        handle_message(id, ClientMessage::SelectGame { game: "poker".into() }, &state);
        let msgs = drain(&mut rx);
        assert!(matches!(msgs[0], ServerMessage::Error { .. }));
        assert_eq!(msgs[1], ServerMessage::Menu);
    }

    #[test]
    fn test_action_before_select_is_an_error() {
        let state = Arc::new(ServerState::new(config()));
        let (id, mut rx) = connect(&state);

        handle_message(id, ClientMessage::Start { stage: 1 }, &state);
        assert_eq!(
            drain(&mut rx),
            vec![ServerMessage::Error {
                message: "No game selected".to_string()
            }]
        );
    }

    #[test]
    fn test_completion_without_service_is_final() {
        let state = Arc::new(ServerState::new(config()));
        let (id, mut rx) = connect(&state);
        play_bears(id, &state);

        let msgs = drain(&mut rx);
        assert!(msgs.contains(&ServerMessage::Completion {
            message: "Great job, Ann! Your focus is truly impressive.".to_string(),
            provisional: false,
        }));
    }

    #[tokio::test]
    async fn test_remote_text_replaces_fallback() {
        let state = Arc::new(ServerState::with_advisory(config(), Some(Arc::new(Fixed))));
        let (id, mut rx) = connect(&state);
        play_bears(id, &state);

        let msgs = drain(&mut rx);
        assert!(msgs.iter().any(|m| matches!(
            m,
            ServerMessage::Completion { provisional: true, .. }
        )));

        let last = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                match rx.recv().await {
                    Some(ServerMessage::Completion { message, provisional: false }) => {
                        break Some(message)
                    }
                    Some(_) => continue,
                    None => break None,
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(last.as_deref(), Some("Bravo, Ann!"));
    }

    #[tokio::test]
    async fn test_failed_fetch_settles_on_fallback() {
        let state = Arc::new(ServerState::with_advisory(config(), Some(Arc::new(Down))));
        let (id, mut rx) = connect(&state);
        play_bears(id, &state);
        drain(&mut rx);

        let settled = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                match rx.recv().await {
                    Some(ServerMessage::Completion { message, provisional }) => {
                        break Some((message, provisional))
                    }
                    Some(_) => continue,
                    None => break None,
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(
            settled,
            Some((
                "Great job, Ann! Your focus is truly impressive.".to_string(),
                false
            ))
        );
    }

    #[test]
    fn test_oversized_stage_is_an_error() {
        let state = Arc::new(ServerState::new(config()));
        let (id, mut rx) = connect(&state);
        handle_message(id, ClientMessage::SelectGame { game: "house".into() }, &state);
        drain(&mut rx);

        handle_message(id, ClientMessage::Start { stage: u32::MAX }, &state);
        assert_eq!(
            drain(&mut rx),
            vec![ServerMessage::Error {
                message: format!("Invalid stage: {}", u32::MAX)
            }]
        );
        assert!(state.views.contains_key(&id));
    }

    #[test]
    fn test_disconnect_drops_view() {
        let state = Arc::new(ServerState::new(config()));
        let (id, _rx) = connect(&state);
        handle_disconnect(id, &state);
        assert!(state.views.is_empty());
        assert!(state.senders.is_empty());
    }
}
