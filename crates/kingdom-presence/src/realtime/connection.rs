//! Background session loop: one WebSocket at a time, reconnecting with
//! backoff, replaying joins and tracked presence after every reconnect.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};

use super::handler::handle_phoenix_message;
use super::types::{ChannelConfig, PhoenixMessage, RealtimeCommand, RealtimeConfig, RealtimeEvent};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

static NEXT_REF: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_ref() -> String {
    NEXT_REF.fetch_add(1, Ordering::Relaxed).to_string()
}

// ---------------------------------------------------------------------------
// Channel bookkeeping
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct ChannelState {
    config: ChannelConfig,
    tracked: Option<serde_json::Value>,
}

/// What the server should hold for this client, independent of any socket.
#[derive(Debug, Default)]
pub(crate) struct Channels {
    topics: HashMap<String, ChannelState>,
}

impl Channels {
    /// Record the effect of a command and return the frames to send.
    pub(crate) fn apply(&mut self, command: RealtimeCommand) -> Vec<PhoenixMessage> {
        match command {
            RealtimeCommand::JoinChannel { topic, config } => {
                let frame = PhoenixMessage::join(&topic, &config, next_ref());
                self.topics.insert(
                    topic,
                    ChannelState {
                        config,
                        tracked: None,
                    },
                );
                vec![frame]
            }
            RealtimeCommand::LeaveChannel { topic } => {
                self.topics.remove(&topic);
                vec![PhoenixMessage::leave(&topic, next_ref())]
            }
            RealtimeCommand::PresenceTrack { topic, payload } => {
                match self.topics.get_mut(&topic) {
                    Some(state) => state.tracked = Some(payload.clone()),
                    None => warn!(topic = %topic, "Tracking presence on a channel that was never joined"),
                }
                vec![PhoenixMessage::track(&topic, payload, next_ref())]
            }
            RealtimeCommand::PresenceUntrack { topic } => {
                if let Some(state) = self.topics.get_mut(&topic) {
                    state.tracked = None;
                }
                vec![PhoenixMessage::untrack(&topic, next_ref())]
            }
            // The session loop ends on disconnect; see `leave_all`.
            RealtimeCommand::Disconnect => Vec::new(),
        }
    }

    /// Joins and presence tracks to restore on a fresh socket.
    pub(crate) fn resume(&self) -> Vec<PhoenixMessage> {
        let mut frames = Vec::new();
        for (topic, state) in &self.topics {
            frames.push(PhoenixMessage::join(topic, &state.config, next_ref()));
            if let Some(payload) = &state.tracked {
                frames.push(PhoenixMessage::track(topic, payload.clone(), next_ref()));
            }
        }
        frames
    }

    pub(crate) fn leave_all(&self) -> Vec<PhoenixMessage> {
        self.topics
            .keys()
            .map(|topic| PhoenixMessage::leave(topic, next_ref()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Session loop
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionEnd {
    /// The socket went away; reconnect.
    Dropped,
    /// The client asked to disconnect or was dropped.
    Shutdown,
}

/// Encode and send one frame. `false` once the socket is unusable.
async fn send_frame<S>(sink: &mut S, msg: &PhoenixMessage) -> bool
where
    S: Sink<WsMessage> + Unpin,
{
    match serde_json::to_string(msg) {
        Ok(json) => sink.send(WsMessage::Text(json.into())).await.is_ok(),
        Err(e) => {
            warn!(error = %e, event = %msg.event, "Failed to encode Phoenix frame");
            true
        }
    }
}

async fn send_all<S>(sink: &mut S, frames: Vec<PhoenixMessage>) -> bool
where
    S: Sink<WsMessage> + Unpin,
{
    for frame in &frames {
        if !send_frame(sink, frame).await {
            return false;
        }
    }
    true
}

/// Remember the refs of outgoing joins so their replies can be told apart
/// from acks of presence pushes.
fn note_joins(frames: &[PhoenixMessage], pending_joins: &mut HashSet<String>) {
    for frame in frames.iter().filter(|f| f.event == "phx_join") {
        if let Some(msg_ref) = &frame.msg_ref {
            pending_joins.insert(msg_ref.clone());
        }
    }
}

async fn emit(event_tx: &mpsc::Sender<RealtimeEvent>, event: RealtimeEvent) {
    if event_tx.send(event).await.is_err() {
        debug!("Realtime event receiver dropped");
    }
}

/// Owns the connection for the lifetime of a [`RealtimeClient`](super::RealtimeClient).
pub(crate) async fn connection_loop(
    config: RealtimeConfig,
    event_tx: mpsc::Sender<RealtimeEvent>,
    mut command_rx: mpsc::Receiver<RealtimeCommand>,
) {
    let mut channels = Channels::default();
    let base_delay = config.reconnect_delay_secs.max(1);
    let mut delay = base_delay;

    loop {
        let url = config.ws_url();
        info!(project = %config.project_ref, "Connecting to Supabase Realtime");

        match tokio::time::timeout(CONNECT_TIMEOUT, tokio_tungstenite::connect_async(&url)).await {
            Ok(Ok((socket, _))) => {
                delay = base_delay;
                emit(&event_tx, RealtimeEvent::Connected).await;

                let end = run_session(socket, &config, &mut channels, &mut command_rx, &event_tx).await;

                emit(&event_tx, RealtimeEvent::Disconnected).await;
                if end == SessionEnd::Shutdown {
                    info!("Realtime connection shut down");
                    return;
                }
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Failed to connect to Supabase Realtime");
                emit(&event_tx, RealtimeEvent::Error(format!("connection failed: {e}"))).await;
            }
            Err(_) => {
                warn!(timeout_secs = CONNECT_TIMEOUT.as_secs(), "Realtime connect timed out");
                emit(&event_tx, RealtimeEvent::Error("connection timed out".into())).await;
            }
        }

        info!(delay_secs = delay, "Reconnecting to Supabase Realtime");
        if wait_offline(Duration::from_secs(delay), &mut channels, &mut command_rx).await
            == SessionEnd::Shutdown
        {
            info!("Realtime client stopped while offline");
            return;
        }
        delay = config.next_backoff(delay);
    }
}

/// Sleep out the backoff while still accepting commands. Their effects are
/// recorded and replayed once a socket is up again.
async fn wait_offline(
    delay: Duration,
    channels: &mut Channels,
    command_rx: &mut mpsc::Receiver<RealtimeCommand>,
) -> SessionEnd {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            () = &mut sleep => return SessionEnd::Dropped,
            command = command_rx.recv() => match command {
                None | Some(RealtimeCommand::Disconnect) => return SessionEnd::Shutdown,
                Some(command) => {
                    channels.apply(command);
                }
            },
        }
    }
}

async fn run_session<T>(
    socket: T,
    config: &RealtimeConfig,
    channels: &mut Channels,
    command_rx: &mut mpsc::Receiver<RealtimeCommand>,
    event_tx: &mpsc::Sender<RealtimeEvent>,
) -> SessionEnd
where
    T: Stream<Item = Result<WsMessage, tokio_tungstenite::tungstenite::Error>>
        + Sink<WsMessage>
        + Unpin,
{
    let (mut sink, mut stream) = socket.split();
    let mut pending_joins = HashSet::new();

    let resumed = channels.resume();
    note_joins(&resumed, &mut pending_joins);
    if !send_all(&mut sink, resumed).await {
        return SessionEnd::Dropped;
    }

    let period = Duration::from_secs(config.heartbeat_interval_secs.max(1));
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if !send_frame(&mut sink, &PhoenixMessage::heartbeat(next_ref())).await {
                    return SessionEnd::Dropped;
                }
            }
            command = command_rx.recv() => match command {
                None | Some(RealtimeCommand::Disconnect) => {
                    send_all(&mut sink, channels.leave_all()).await;
                    let _ = sink.send(WsMessage::Close(None)).await;
                    return SessionEnd::Shutdown;
                }
                Some(command) => {
                    let frames = channels.apply(command);
                    note_joins(&frames, &mut pending_joins);
                    if !send_all(&mut sink, frames).await {
                        return SessionEnd::Dropped;
                    }
                }
            },
            incoming = stream.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => {
                    match serde_json::from_str::<PhoenixMessage>(&text) {
                        Ok(msg) => handle_phoenix_message(&msg, &mut pending_joins, event_tx).await,
                        Err(e) => debug!(error = %e, "Unrecognized frame from Supabase"),
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("Supabase Realtime closed the connection");
                    return SessionEnd::Dropped;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "WebSocket error");
                    return SessionEnd::Dropped;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use super::*;
    use serde_json::json;
    use tokio_tungstenite::tungstenite::Error as WsError;

    /// In-memory socket: the test plays the server end.
    struct FakeSocket {
        incoming: mpsc::UnboundedReceiver<Result<WsMessage, WsError>>,
        outgoing: mpsc::UnboundedSender<WsMessage>,
    }

    impl Stream for FakeSocket {
        type Item = Result<WsMessage, WsError>;

        fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            self.incoming.poll_recv(cx)
        }
    }

    impl Sink<WsMessage> for FakeSocket {
        type Error = WsError;

        fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
            Poll::Ready(Ok(()))
        }

        fn start_send(self: Pin<&mut Self>, item: WsMessage) -> Result<(), WsError> {
            self.outgoing.send(item).map_err(|_| WsError::ConnectionClosed)
        }

        fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
            Poll::Ready(Ok(()))
        }

        fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), WsError>> {
            Poll::Ready(Ok(()))
        }
    }

    struct Server {
        to_client: mpsc::UnboundedSender<Result<WsMessage, WsError>>,
        from_client: mpsc::UnboundedReceiver<WsMessage>,
    }

    impl Server {
        fn push(&self, msg: &PhoenixMessage) {
            let json = serde_json::to_string(msg).unwrap();
            self.to_client.send(Ok(WsMessage::Text(json.into()))).unwrap();
        }

        fn push_raw(&self, msg: WsMessage) {
            self.to_client.send(Ok(msg)).unwrap();
        }

        fn reply_ok(&self, to: &PhoenixMessage) {
            self.push(&PhoenixMessage {
                topic: to.topic.clone(),
                event: "phx_reply".into(),
                payload: json!({ "status": "ok", "response": {} }),
                msg_ref: to.msg_ref.clone(),
            });
        }

        async fn next_frame(&mut self) -> PhoenixMessage {
            let msg = self.from_client.recv().await.unwrap();
            decode(&msg).unwrap()
        }

        /// Everything the client has sent so far.
        fn sent(&mut self) -> Vec<WsMessage> {
            let mut sent = Vec::new();
            while let Ok(msg) = self.from_client.try_recv() {
                sent.push(msg);
            }
            sent
        }
    }

    fn fake_socket() -> (FakeSocket, Server) {
        let (to_client, incoming) = mpsc::unbounded_channel();
        let (outgoing, from_client) = mpsc::unbounded_channel();
        (
            FakeSocket { incoming, outgoing },
            Server {
                to_client,
                from_client,
            },
        )
    }

    fn decode(msg: &WsMessage) -> Option<PhoenixMessage> {
        match msg {
            WsMessage::Text(text) => serde_json::from_str(text).ok(),
            _ => None,
        }
    }

    fn events(sent: &[WsMessage]) -> Vec<String> {
        sent.iter().filter_map(decode).map(|m| m.event).collect()
    }

    fn join(channels: &mut Channels, topic: &str) {
        channels.apply(RealtimeCommand::JoinChannel {
            topic: topic.into(),
            config: ChannelConfig::for_key("me"),
        });
    }

    #[test]
    fn refs_are_unique() {
        assert_ne!(next_ref(), next_ref());
    }

    #[test]
    fn resume_replays_join_then_track() {
        let mut channels = Channels::default();
        join(&mut channels, "activeCountries");
        channels.apply(RealtimeCommand::PresenceTrack {
            topic: "activeCountries".into(),
            payload: json!({"country": "Kenya", "timestamp": 1}),
        });

        let frames = channels.resume();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event, "phx_join");
        assert_eq!(frames[1].event, "presence");
        assert_eq!(frames[1].payload["payload"]["country"], "Kenya");
    }

    #[test]
    fn untrack_clears_replayed_presence() {
        let mut channels = Channels::default();
        join(&mut channels, "activeCountries");
        channels.apply(RealtimeCommand::PresenceTrack {
            topic: "activeCountries".into(),
            payload: json!({"country": "Kenya", "timestamp": 1}),
        });
        let frames = channels.apply(RealtimeCommand::PresenceUntrack {
            topic: "activeCountries".into(),
        });
        assert_eq!(frames[0].payload["event"], "untrack");

        let resumed = channels.resume();
        assert_eq!(resumed.len(), 1);
        assert_eq!(resumed[0].event, "phx_join");
    }

    #[test]
    fn leave_forgets_channel() {
        let mut channels = Channels::default();
        join(&mut channels, "a");
        join(&mut channels, "b");
        let frames = channels.apply(RealtimeCommand::LeaveChannel { topic: "a".into() });
        assert_eq!(frames[0].event, "phx_leave");
        assert_eq!(channels.resume().len(), 1);
        assert_eq!(channels.leave_all().len(), 1);
    }

    #[test]
    fn latest_track_wins_on_resume() {
        let mut channels = Channels::default();
        join(&mut channels, "activeCountries");
        for country in ["Kenya", "Ghana"] {
            channels.apply(RealtimeCommand::PresenceTrack {
                topic: "activeCountries".into(),
                payload: json!({"country": country, "timestamp": 1}),
            });
        }
        assert_eq!(channels.resume()[1].payload["payload"]["country"], "Ghana");
    }

    #[tokio::test(start_paused = true)]
    async fn offline_wait_records_commands_and_honors_disconnect() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut channels = Channels::default();

        tx.send(RealtimeCommand::JoinChannel {
            topic: "activeCountries".into(),
            config: ChannelConfig::for_key("me"),
        })
        .await
        .unwrap();
        let end = wait_offline(Duration::from_secs(1), &mut channels, &mut rx).await;
        assert_eq!(end, SessionEnd::Dropped);
        assert_eq!(channels.resume().len(), 1);

        tx.send(RealtimeCommand::Disconnect).await.unwrap();
        let end = wait_offline(Duration::from_secs(60), &mut channels, &mut rx).await;
        assert_eq!(end, SessionEnd::Shutdown);

        drop(tx);
        let end = wait_offline(Duration::from_secs(60), &mut channels, &mut rx).await;
        assert_eq!(end, SessionEnd::Shutdown);
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_socket_replays_joins_and_tracked_presence() {
        let (socket, mut server) = fake_socket();
        let mut channels = Channels::default();
        join(&mut channels, "activeCountries");
        channels.apply(RealtimeCommand::PresenceTrack {
            topic: "activeCountries".into(),
            payload: json!({"country": "Kenya", "timestamp": 1}),
        });
        let (_command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, _event_rx) = mpsc::channel(8);

        server.push_raw(WsMessage::Close(None));
        let end = run_session(
            socket,
            &RealtimeConfig::default(),
            &mut channels,
            &mut command_rx,
            &event_tx,
        )
        .await;

        assert_eq!(end, SessionEnd::Dropped);
        let sent = server.sent();
        assert_eq!(events(&sent), ["phx_join", "presence"]);
        let track = decode(&sent[1]).unwrap();
        assert_eq!(track.topic, "realtime:activeCountries");
        assert_eq!(track.payload["payload"]["country"], "Kenya");
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_fires_every_interval() {
        let (socket, mut server) = fake_socket();
        let mut channels = Channels::default();
        let (_command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let config = RealtimeConfig {
            heartbeat_interval_secs: 1,
            ..Default::default()
        };

        let session = run_session(socket, &config, &mut channels, &mut command_rx, &event_tx);
        let timed_out = tokio::time::timeout(Duration::from_millis(2500), session).await;
        assert!(timed_out.is_err());

        let frames: Vec<PhoenixMessage> = server.sent().iter().filter_map(decode).collect();
        assert_eq!(frames.len(), 2);
        for frame in &frames {
            assert_eq!(frame.topic, "phoenix");
            assert_eq!(frame.event, "heartbeat");
        }
        assert_ne!(frames[0].msg_ref, frames[1].msg_ref);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_leaves_channels_then_closes() {
        let (socket, mut server) = fake_socket();
        let mut channels = Channels::default();
        let (command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, _event_rx) = mpsc::channel(8);

        command_tx
            .send(RealtimeCommand::JoinChannel {
                topic: "activeCountries".into(),
                config: ChannelConfig::for_key("me"),
            })
            .await
            .unwrap();
        command_tx.send(RealtimeCommand::Disconnect).await.unwrap();

        let end = run_session(
            socket,
            &RealtimeConfig::default(),
            &mut channels,
            &mut command_rx,
            &event_tx,
        )
        .await;

        assert_eq!(end, SessionEnd::Shutdown);
        let sent = server.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(events(&sent[..2]), ["phx_join", "phx_leave"]);
        assert!(matches!(sent[2], WsMessage::Close(None)));
    }

    #[tokio::test(start_paused = true)]
    async fn socket_error_or_end_of_stream_drops_the_session() {
        let (_command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, _event_rx) = mpsc::channel(8);
        let config = RealtimeConfig::default();
        let mut channels = Channels::default();

        let (socket, server) = fake_socket();
        server.to_client.send(Err(WsError::ConnectionClosed)).unwrap();
        let end = run_session(socket, &config, &mut channels, &mut command_rx, &event_tx).await;
        assert_eq!(end, SessionEnd::Dropped);

        let (socket, server) = fake_socket();
        drop(server);
        let end = run_session(socket, &config, &mut channels, &mut command_rx, &event_tx).await;
        assert_eq!(end, SessionEnd::Dropped);
    }

    #[tokio::test(start_paused = true)]
    async fn incoming_presence_is_forwarded() {
        let (socket, server) = fake_socket();
        let mut channels = Channels::default();
        let (_command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, mut event_rx) = mpsc::channel(8);

        server.push_raw(WsMessage::Text("not json".into()));
        server.push(&PhoenixMessage {
            topic: "realtime:activeCountries".into(),
            event: "presence_state".into(),
            payload: json!({ "a": { "metas": [{ "country": "Ghana", "timestamp": 5 }] } }),
            msg_ref: None,
        });
        server.push_raw(WsMessage::Close(None));

        let end = run_session(
            socket,
            &RealtimeConfig::default(),
            &mut channels,
            &mut command_rx,
            &event_tx,
        )
        .await;
        assert_eq!(end, SessionEnd::Dropped);

        match event_rx.try_recv() {
            Ok(RealtimeEvent::PresenceState { topic, state }) => {
                assert_eq!(topic, "activeCountries");
                assert_eq!(state["a"][0]["country"], "Ghana");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(event_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn only_the_join_reply_reports_a_joined_channel() {
        let (socket, mut server) = fake_socket();
        let (command_tx, mut command_rx) = mpsc::channel(8);
        let (event_tx, mut event_rx) = mpsc::channel(8);

        let session = tokio::spawn(async move {
            let mut channels = Channels::default();
            run_session(
                socket,
                &RealtimeConfig::default(),
                &mut channels,
                &mut command_rx,
                &event_tx,
            )
            .await
        });

        command_tx
            .send(RealtimeCommand::JoinChannel {
                topic: "activeCountries".into(),
                config: ChannelConfig::for_key("me"),
            })
            .await
            .unwrap();
        command_tx
            .send(RealtimeCommand::PresenceTrack {
                topic: "activeCountries".into(),
                payload: json!({"country": "Kenya", "timestamp": 1}),
            })
            .await
            .unwrap();

        let join = server.next_frame().await;
        let track = server.next_frame().await;
        assert_eq!(join.event, "phx_join");
        assert_eq!(track.event, "presence");

        server.reply_ok(&track);
        server.reply_ok(&join);
        server.push_raw(WsMessage::Close(None));
        assert_eq!(session.await.unwrap(), SessionEnd::Dropped);

        let mut joined = Vec::new();
        while let Ok(event) = event_rx.try_recv() {
            match event {
                RealtimeEvent::ChannelJoined { topic } => joined.push(topic),
                other => panic!("unexpected: {other:?}"),
            }
        }
        assert_eq!(joined, ["activeCountries"]);
    }
}
