//! Lobby server client using tokio-tungstenite

use std::fmt::Display;
use std::sync::atomic::AtomicU8;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Sink, SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use lobby_domain::{AvatarId, NewGameInfo};
use lobby_shared::{AvatarAction, AvatarData, ClientMessage, GameLaunchData, ServerMessage};

use super::pending::{PendingReplies, Resolution};
use crate::application::{ServiceError, TransportError};
use crate::infrastructure::messaging::{
    set_connection_state, ConnectionState, ConnectionStateObserver,
};
use crate::ports::outbound::ServerAccessor;

const OUTGOING_BUFFER: usize = 32;
const GAME_VISIBILITY_PUBLIC: &str = "public";

type WriteAck = Result<(), TransportError>;

/// A message queued for the writer task, acknowledged once written.
struct Outgoing {
    message: ClientMessage,
    written: oneshot::Sender<WriteAck>,
}

fn lock(pending: &Mutex<PendingReplies>) -> MutexGuard<'_, PendingReplies> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Client for the lobby server session.
///
/// The connection is opened on first use and reopened on the next call
/// after it drops.
pub struct LobbyServerClient {
    url: String,
    timeout: Duration,
    state: Arc<AtomicU8>,
    outgoing: tokio::sync::Mutex<Option<mpsc::Sender<Outgoing>>>,
    pending: Arc<Mutex<PendingReplies>>,
}

impl LobbyServerClient {
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            url: url.into(),
            timeout: Duration::from_millis(timeout_ms),
            state: Arc::new(AtomicU8::new(ConnectionState::Disconnected.to_u8())),
            outgoing: tokio::sync::Mutex::new(None),
            pending: Arc::new(Mutex::new(PendingReplies::new())),
        }
    }

    /// Get the URL this client is configured for
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state_observer(&self) -> ConnectionStateObserver {
        ConnectionStateObserver::new(Arc::clone(&self.state))
    }

    /// Open the connection now instead of on the first message.
    pub async fn ensure_connected(&self) -> Result<(), ServiceError> {
        self.sender().await.map(|_| ())
    }

    /// Send a message that has no reply.
    ///
    /// Resolves once the frame has been written to the socket.
    pub async fn send(&self, message: ClientMessage) -> Result<(), ServiceError> {
        let tx = self.sender().await?;
        self.deliver(&tx, message).await
    }

    /// Send a message and wait for the server's reply to it.
    pub async fn request(&self, message: ClientMessage) -> Result<ServerMessage, ServiceError> {
        let Some(reply_command) = message.expected_reply() else {
            return Err(TransportError::Protocol(format!(
                "{:?} has no reply to wait for",
                message
            ))
            .into());
        };
        let tx = self.sender().await?;

        // Register before sending so a fast reply cannot slip past.
        let (waiter_id, waiter) = lock(&self.pending).register(reply_command);
        if let Err(e) = self.deliver(&tx, message).await {
            lock(&self.pending).forget(reply_command, waiter_id);
            return Err(e);
        }
        tracing::debug!(command = reply_command, "Awaiting lobby server reply");

        // On timeout the waiter stays registered and absorbs the late reply.
        match tokio::time::timeout(self.timeout, waiter).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(_)) => Err(TransportError::NotConnected.into()),
            Err(_) => {
                tracing::warn!(command = reply_command, "Lobby server reply timed out");
                Err(self.timeout_error())
            }
        }
    }

    async fn deliver(
        &self,
        tx: &mpsc::Sender<Outgoing>,
        message: ClientMessage,
    ) -> Result<(), ServiceError> {
        let (written, ack) = oneshot::channel();
        tx.send(Outgoing { message, written })
            .await
            .map_err(|_| ServiceError::from(TransportError::NotConnected))?;

        match tokio::time::timeout(self.timeout, ack).await {
            Ok(Ok(result)) => result.map_err(ServiceError::from),
            // Writer stopped before reaching this frame.
            Ok(Err(_)) => Err(TransportError::NotConnected.into()),
            Err(_) => Err(self.timeout_error()),
        }
    }

    fn timeout_error(&self) -> ServiceError {
        TransportError::Timeout {
            timeout_ms: self.timeout.as_millis() as u64,
        }
        .into()
    }

    async fn sender(&self) -> Result<mpsc::Sender<Outgoing>, ServiceError> {
        let mut outgoing = self.outgoing.lock().await;
        if let Some(tx) = outgoing.as_ref() {
            if !tx.is_closed() {
                return Ok(tx.clone());
            }
        }
        let tx = self.connect().await?;
        *outgoing = Some(tx.clone());
        Ok(tx)
    }

    async fn connect(&self) -> Result<mpsc::Sender<Outgoing>, ServiceError> {
        set_connection_state(&self.state, ConnectionState::Connecting);

        let ws_stream = match tokio::time::timeout(self.timeout, connect_async(self.url.as_str())).await
        {
            Ok(Ok((ws_stream, _))) => ws_stream,
            Ok(Err(e)) => {
                tracing::error!(url = %self.url, error = %e, "Failed to connect to lobby server");
                set_connection_state(&self.state, ConnectionState::Failed);
                return Err(TransportError::Connection(e.to_string()).into());
            }
            Err(_) => {
                tracing::error!(url = %self.url, "Connecting to lobby server timed out");
                set_connection_state(&self.state, ConnectionState::Failed);
                return Err(self.timeout_error());
            }
        };
        tracing::info!(url = %self.url, "Connected to lobby server");
        set_connection_state(&self.state, ConnectionState::Connected);

        let (write, mut read) = ws_stream.split();
        let (tx, rx) = mpsc::channel::<Outgoing>(OUTGOING_BUFFER);
        // Dropped by the reader when the connection ends; stops the writer.
        let (reader_done_tx, reader_done) = oneshot::channel::<()>();

        tokio::spawn(write_frames(write, rx, reader_done));

        let pending = Arc::clone(&self.pending);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                match frame {
                    Ok(Message::Text(text)) => dispatch(&pending, &text),
                    Ok(Message::Close(_)) => {
                        tracing::info!("Lobby server closed connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Lobby server connection error");
                        break;
                    }
                }
            }

            drop(reader_done_tx);
            set_connection_state(&state, ConnectionState::Disconnected);
            let failed = lock(&pending).fail_all(TransportError::NotConnected.into());
            if failed > 0 {
                tracing::warn!(failed, "Connection lost with requests in flight");
            }
        });

        Ok(tx)
    }
}

/// Write queued messages to `sink` until the queue closes, a write fails or
/// the reader reports the connection gone.
///
/// Every message is acknowledged with the outcome of its write. Messages
/// still queued when the loop stops are dropped, which their senders see as
/// a lost connection.
async fn write_frames<S>(
    mut sink: S,
    mut rx: mpsc::Receiver<Outgoing>,
    mut reader_done: oneshot::Receiver<()>,
) where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    loop {
        let outgoing = tokio::select! {
            biased;
            _ = &mut reader_done => None,
            outgoing = rx.recv() => outgoing,
        };
        let Some(Outgoing { message, written }) = outgoing else {
            break;
        };
        let json = match serde_json::to_string(&message) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize lobby message");
                let _ = written.send(Err(TransportError::Protocol(e.to_string())));
                continue;
            }
        };
        match sink.send(Message::Text(json.into())).await {
            Ok(()) => {
                let _ = written.send(Ok(()));
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to send lobby message");
                let _ = written.send(Err(TransportError::Connection(e.to_string())));
                break;
            }
        }
    }
    let _ = sink.close().await;
}

fn dispatch(pending: &Mutex<PendingReplies>, text: &str) {
    let message = match serde_json::from_str::<ServerMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to parse lobby server message");
            return;
        }
    };

    if let ServerMessage::Notice { style, text } = &message {
        if message.is_error_notice() {
            tracing::warn!(notice = %text, "Lobby server rejected a request");
            lock(pending).fail_all(TransportError::Rejected(text.clone()).into());
            return;
        }
        tracing::info!(style = %style, notice = %text, "Lobby server notice");
        return;
    }

    match lock(pending).resolve(message) {
        Resolution::Delivered => {}
        Resolution::Abandoned(late) => {
            tracing::warn!(command = ?late.command(), "Dropping reply to a timed out request");
        }
        Resolution::Unsolicited(unsolicited) => {
            tracing::debug!(command = ?unsolicited.command(), "Ignoring unsolicited lobby message");
        }
    }
}

#[async_trait]
impl ServerAccessor for LobbyServerClient {
    async fn select_avatar(&self, avatar_id: AvatarId) -> Result<(), ServiceError> {
        self.send(ClientMessage::Avatar {
            action: AvatarAction::Select,
            avatar_id: Some(avatar_id.value()),
        })
        .await
    }

    async fn get_available_avatars(&self) -> Result<Vec<AvatarData>, ServiceError> {
        let reply = self
            .request(ClientMessage::Avatar {
                action: AvatarAction::ListAvatar,
                avatar_id: None,
            })
            .await?;
        match reply {
            ServerMessage::Avatar { avatarlist } => Ok(avatarlist),
            other => Err(unexpected_reply(&other)),
        }
    }

    async fn host_game(&self, game: &NewGameInfo) -> Result<GameLaunchData, ServiceError> {
        let reply = self
            .request(ClientMessage::GameHost {
                title: game.title.clone(),
                password: game.password.clone(),
                featured_mod: game.featured_mod.clone(),
                mapname: game.map_name.clone(),
                visibility: GAME_VISIBILITY_PUBLIC.to_string(),
                rating_min: game.min_rating,
                rating_max: game.max_rating,
            })
            .await?;
        match reply {
            ServerMessage::GameLaunch(launch) => Ok(launch),
            other => Err(unexpected_reply(&other)),
        }
    }
}

fn unexpected_reply(message: &ServerMessage) -> ServiceError {
    TransportError::Protocol(format!("Unexpected reply {:?}", message.command())).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use lobby_domain::{Avatar, LobbyEvent};
    use serde_json::json;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::runtime::Handle;
    use tokio_tungstenite::WebSocketStream;
    use url::Url;

    use crate::application::{ApiDtoMapper, LobbyService, TaskService};
    use crate::infrastructure::messaging::EventBus;
    use crate::infrastructure::OfflineAccessor;

    async fn spawn_server<F, Fut>(handler: F) -> String
    where
        F: FnOnce(WebSocketStream<TcpStream>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            handler(ws).await;
        });
        format!("ws://{}", addr)
    }

    async fn next_client_message(ws: &mut WebSocketStream<TcpStream>) -> ClientMessage {
        loop {
            if let Message::Text(text) = ws.next().await.unwrap().unwrap() {
                return serde_json::from_str(&text).unwrap();
            }
        }
    }

    async fn send_json(ws: &mut WebSocketStream<TcpStream>, value: serde_json::Value) {
        ws.send(Message::Text(value.to_string().into())).await.unwrap();
    }

    async fn drain(mut ws: WebSocketStream<TcpStream>) {
        while let Some(Ok(_)) = ws.next().await {}
    }

    #[tokio::test]
    async fn lists_available_avatars() {
        let url = spawn_server(|mut ws| async move {
            let request = next_client_message(&mut ws).await;
            assert_eq!(
                request,
                ClientMessage::Avatar {
                    action: AvatarAction::ListAvatar,
                    avatar_id: None
                }
            );
            // Unrelated traffic before the reply.
            send_json(&mut ws, json!({ "command": "social", "friends": [] })).await;
            send_json(
                &mut ws,
                json!({ "command": "notice", "style": "info", "text": "Welcome" }),
            )
            .await;
            send_json(
                &mut ws,
                json!({
                    "command": "avatar",
                    "avatarlist": [{ "id": 1, "url": "http://example.com/a.png", "tooltip": "Test" }]
                }),
            )
            .await;
            drain(ws).await;
        })
        .await;
        let client = LobbyServerClient::new(url, 5_000);

        let avatars = client.get_available_avatars().await.unwrap();

        assert_eq!(avatars.len(), 1);
        assert_eq!(avatars[0].tooltip, "Test");
        assert!(client.state_observer().is_connected());
    }

    #[tokio::test]
    async fn select_avatar_is_fire_and_forget() {
        let (received_tx, received) = oneshot::channel();
        let url = spawn_server(|mut ws| async move {
            let message = next_client_message(&mut ws).await;
            let _ = received_tx.send(message);
            drain(ws).await;
        })
        .await;
        let client = LobbyServerClient::new(url, 5_000);

        client.select_avatar(AvatarId::new(7)).await.unwrap();

        assert_eq!(
            received.await.unwrap(),
            ClientMessage::Avatar {
                action: AvatarAction::Select,
                avatar_id: Some(7)
            }
        );
    }

    #[tokio::test]
    async fn host_game_resolves_with_launch() {
        let url = spawn_server(|mut ws| async move {
            let request = next_client_message(&mut ws).await;
            assert!(matches!(request, ClientMessage::GameHost { ref mapname, .. } if mapname == "setons"));
            send_json(
                &mut ws,
                json!({ "command": "game_launch", "uid": 99, "mod": "faf", "args": [] }),
            )
            .await;
            drain(ws).await;
        })
        .await;
        let client = LobbyServerClient::new(url, 5_000);

        let launch = client.host_game(&new_game()).await.unwrap();

        assert_eq!(launch.uid, 99);
        assert_eq!(launch.featured_mod, "faf");
    }

    #[tokio::test]
    async fn error_notice_fails_pending_request() {
        let url = spawn_server(|mut ws| async move {
            next_client_message(&mut ws).await;
            send_json(
                &mut ws,
                json!({ "command": "notice", "style": "error", "text": "Map not found" }),
            )
            .await;
            drain(ws).await;
        })
        .await;
        let client = LobbyServerClient::new(url, 5_000);

        let error = client.host_game(&new_game()).await.unwrap_err();

        match error {
            ServiceError::Transport(TransportError::Rejected(text)) => {
                assert_eq!(text, "Map not found")
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_reply_times_out() {
        let url = spawn_server(drain).await;
        let client = LobbyServerClient::new(url, 100);

        let error = client.get_available_avatars().await.unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Transport(TransportError::Timeout { timeout_ms: 100 })
        ));
    }

    #[tokio::test]
    async fn closed_connection_fails_pending_request() {
        let url = spawn_server(|mut ws| async move {
            next_client_message(&mut ws).await;
            ws.close(None).await.unwrap();
        })
        .await;
        let client = LobbyServerClient::new(url, 5_000);

        let error = client.get_available_avatars().await.unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Transport(TransportError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_connection_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = LobbyServerClient::new(format!("ws://{}", addr), 5_000);

        let error = client.get_available_avatars().await.unwrap_err();

        assert!(matches!(
            error,
            ServiceError::Transport(TransportError::Connection(_))
        ));
        assert_eq!(client.state_observer().state(), ConnectionState::Failed);
    }

    #[tokio::test]
    async fn late_reply_is_not_given_to_the_next_request() {
        let url = spawn_server(|mut ws| async move {
            // Left unanswered until the second request arrives.
            next_client_message(&mut ws).await;
            next_client_message(&mut ws).await;
            send_json(
                &mut ws,
                json!({ "command": "game_launch", "uid": 1, "mod": "faf" }),
            )
            .await;
            send_json(
                &mut ws,
                json!({ "command": "game_launch", "uid": 2, "mod": "faf" }),
            )
            .await;
            drain(ws).await;
        })
        .await;
        let client = LobbyServerClient::new(url, 200);

        let first = client.host_game(&new_game()).await.unwrap_err();
        let second = client.host_game(&new_game()).await.unwrap();

        assert!(matches!(
            first,
            ServiceError::Transport(TransportError::Timeout { .. })
        ));
        assert_eq!(second.uid, 2);
    }

    #[tokio::test]
    async fn avatar_change_is_not_announced_when_server_went_away() {
        let url = spawn_server(|ws| async move {
            drop(ws);
        })
        .await;
        let client = Arc::new(LobbyServerClient::new(url, 1_000));
        client.ensure_connected().await.unwrap();
        let observer = client.state_observer();
        for _ in 0..200 {
            if !observer.is_connected() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(observer.state(), ConnectionState::Disconnected);

        let events: EventBus<LobbyEvent> = EventBus::new();
        let (_subscription, mut received) = events.subscribe_channel();
        let lobby = LobbyService::new(
            client,
            Arc::new(OfflineAccessor::new()),
            Arc::new(ApiDtoMapper::new()),
            events,
            TaskService::new(Handle::current(), 2),
        );
        let avatar = Avatar::new(
            AvatarId::new(3),
            Url::parse("http://example.com/a.png").unwrap(),
            "Champion",
        );

        let result = lobby.select_avatar(&avatar).await;

        assert!(result.unwrap_err().is_transport());
        assert!(received.try_recv().is_err());
    }

    struct BrokenSink;

    impl Sink<Message> for BrokenSink {
        type Error = io::Error;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "connection reset",
            )))
        }

        fn start_send(self: Pin<&mut Self>, _item: Message) -> Result<(), io::Error> {
            Ok(())
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
            Poll::Ready(Ok(()))
        }
    }

    fn select_avatar_message() -> ClientMessage {
        ClientMessage::Avatar {
            action: AvatarAction::Select,
            avatar_id: Some(3),
        }
    }

    #[tokio::test]
    async fn written_frames_are_acknowledged() {
        let (tx, rx) = mpsc::channel(4);
        let (_reader_alive, reader_done) = oneshot::channel();
        tokio::spawn(write_frames(futures_util::sink::drain(), rx, reader_done));
        let (written, ack) = oneshot::channel();

        assert!(tx
            .send(Outgoing {
                message: select_avatar_message(),
                written
            })
            .await
            .is_ok());

        assert_eq!(ack.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn failed_write_is_reported_to_the_sender() {
        let (tx, rx) = mpsc::channel(4);
        let (_reader_alive, reader_done) = oneshot::channel();
        let writer = tokio::spawn(write_frames(BrokenSink, rx, reader_done));
        let (written, ack) = oneshot::channel();

        assert!(tx
            .send(Outgoing {
                message: select_avatar_message(),
                written
            })
            .await
            .is_ok());

        assert!(matches!(
            ack.await.unwrap(),
            Err(TransportError::Connection(_))
        ));
        writer.await.unwrap();
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn frames_queued_after_disconnect_are_never_acknowledged() {
        let (tx, rx) = mpsc::channel(4);
        let (reader_alive, reader_done) = oneshot::channel::<()>();
        drop(reader_alive);
        let (written, ack) = oneshot::channel();
        assert!(tx
            .send(Outgoing {
                message: select_avatar_message(),
                written
            })
            .await
            .is_ok());

        write_frames(futures_util::sink::drain(), rx, reader_done).await;

        assert!(ack.await.is_err());
    }

    fn new_game() -> NewGameInfo {
        NewGameInfo {
            title: "1v1".to_string(),
            password: None,
            featured_mod: "faf".to_string(),
            map_name: "setons".to_string(),
            min_rating: None,
            max_rating: None,
        }
    }
}
