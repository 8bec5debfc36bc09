//! TCP front end and message routing.
//!
//! Each connection gets a reader task (this module's `handle_connection`) and a
//! writer task draining a bounded queue. All routing goes through one `Hub`
//! behind a mutex, so a room's members see broadcasts in the same order.
//!
//! A peer whose queue fills up is dropped from the hub, and a write that
//! stalls past the configured timeout closes the connection.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use rustc_hash::FxHashMap;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use super::config::RelayConfig;
use super::protocol::{self, ClientMessage, ProtocolError, RoomId, ServerMessage};
use super::room::{ConnectionId, RoomTable};

/// Sending side of one connection's queue.
pub type Outbox = mpsc::Sender<ServerMessage>;

/// Pause after an `accept` failure that will not clear up immediately.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Routing state shared by all connections.
#[derive(Debug, Default)]
pub struct Hub {
    rooms: RoomTable,
    peers: FxHashMap<ConnectionId, Outbox>,
    next_id: u64,
}

impl Hub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rooms(&self) -> &RoomTable {
        &self.rooms
    }

    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.len()
    }

    /// Register a connection and greet it with its player id.
    pub fn connect(&mut self, outbox: Outbox) -> ConnectionId {
        self.next_id += 1;
        let conn = ConnectionId(self.next_id);
        self.peers.insert(conn, outbox);
        if !self.send(conn, ServerMessage::Welcome { id: conn.player_id() }) {
            self.drop_peers(vec![conn]);
        }
        conn
    }

    #[must_use]
    pub fn is_connected(&self, conn: ConnectionId) -> bool {
        self.peers.contains_key(&conn)
    }

    /// Route one client message. Messages from dropped peers are ignored.
    pub fn handle(&mut self, conn: ConnectionId, message: ClientMessage) {
        if !self.is_connected(conn) {
            debug!(%conn, "ignoring message from dropped peer");
            return;
        }
        let stalled = match message {
            ClientMessage::JoinRoom { room_id, user_data } => {
                let players = self.rooms.join(conn, &room_id, user_data).players();
                info!(%conn, room = %room_id, players = players.len(), "joined room");
                self.broadcast(&room_id, &ServerMessage::RoomUpdate { room_id: room_id.clone(), players })
            }
            ClientMessage::GameAction { room_id, action } => {
                debug!(%conn, room = %room_id, "relaying game action");
                self.broadcast(&room_id, &ServerMessage::GameEvent { room_id: room_id.clone(), action })
            }
        };
        self.drop_peers(stalled);
    }

    /// Tell `conn` its last line was refused.
    pub fn reject(&mut self, conn: ConnectionId, message: String) {
        if !self.send(conn, ServerMessage::Error { message }) {
            self.drop_peers(vec![conn]);
        }
    }

    /// Drop `conn` from every room and refresh the rosters it left.
    pub fn disconnect(&mut self, conn: ConnectionId) {
        self.drop_peers(vec![conn]);
    }

    /// Forget each pending peer and refresh the rosters it left. Members
    /// that stall on those refreshes are dropped in turn.
    fn drop_peers(&mut self, mut pending: Vec<ConnectionId>) {
        while let Some(conn) = pending.pop() {
            self.peers.remove(&conn);
            for room_id in self.rooms.leave_all(conn) {
                let Some(room) = self.rooms.room(&room_id) else {
                    debug!(room = %room_id, "room closed");
                    continue;
                };
                let update = ServerMessage::RoomUpdate {
                    room_id: room_id.clone(),
                    players: room.players(),
                };
                pending.extend(self.broadcast(&room_id, &update));
            }
        }
    }

    /// Queue `message` for `conn`. Returns `false` when the peer's queue is
    /// full and the peer must be dropped.
    fn send(&self, conn: ConnectionId, message: ServerMessage) -> bool {
        let Some(outbox) = self.peers.get(&conn) else {
            return true;
        };
        match outbox.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(%conn, "outbox full, dropping slow peer");
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!(%conn, "peer outbox closed");
                true
            }
        }
    }

    /// Queue `message` for every member of `room_id`. Returns the members
    /// whose queues were full.
    fn broadcast(&self, room_id: &RoomId, message: &ServerMessage) -> Vec<ConnectionId> {
        let Some(room) = self.rooms.room(room_id) else {
            debug!(room = %room_id, "no such room");
            return Vec::new();
        };
        room.members()
            .filter(|&member| !self.send(member, message.clone()))
            .collect()
    }
}

/// Bind `config.bind` and serve forever.
pub async fn run(config: RelayConfig) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(bind = %config.bind, "ludo relay listening");
    serve(listener, config).await
}

/// Accept connections on an already bound listener.
pub async fn serve(listener: TcpListener, config: RelayConfig) -> anyhow::Result<()> {
    let hub = Arc::new(Mutex::new(Hub::new()));
    let config = Arc::new(config);
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                warn!(%err, "accept failed");
                if let Some(pause) = accept_backoff(&err) {
                    sleep(pause).await;
                }
                continue;
            }
        };
        info!(%peer, "client connected");

        let hub = Arc::clone(&hub);
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            match handle_connection(stream, hub, &config).await {
                Ok(()) => info!(%peer, "client disconnected"),
                Err(err) => warn!(%peer, %err, "connection ended with error"),
            }
        });
    }
}

/// Errors tied to a single half-open connection are retried at once. The
/// rest (descriptor or memory exhaustion) get a short pause.
fn accept_backoff(err: &io::Error) -> Option<Duration> {
    match err.kind() {
        io::ErrorKind::ConnectionAborted
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionRefused
        | io::ErrorKind::Interrupted
        | io::ErrorKind::WouldBlock => None,
        _ => Some(ACCEPT_BACKOFF),
    }
}

async fn handle_connection(
    stream: TcpStream,
    hub: Arc<Mutex<Hub>>,
    config: &RelayConfig,
) -> anyhow::Result<()> {
    let (rd, wr) = stream.into_split();
    let (tx, rx) = mpsc::channel::<ServerMessage>(config.outbox.max(1));
    let conn = hub.lock().await.connect(tx);
    let write_timeout = config.write_timeout();
    let mut writer = tokio::spawn(write_lines(wr, rx, write_timeout));

    // The writer finishes first when the hub drops this peer or a write stalls.
    let (read, written) = tokio::select! {
        read = read_lines(rd, conn, &hub, config.max_line) => (read, None),
        written = &mut writer => (Ok(()), Some(written)),
    };

    // Dropping the outbox lets the writer drain and exit.
    hub.lock().await.disconnect(conn);
    let written = match written {
        Some(written) => written?,
        None => match timeout(write_timeout, &mut writer).await {
            Ok(written) => written?,
            Err(_) => {
                writer.abort();
                debug!(%conn, "gave up flushing to a stalled peer");
                Ok(())
            }
        },
    };
    read?;
    written
}

async fn write_lines(
    mut wr: OwnedWriteHalf,
    mut rx: mpsc::Receiver<ServerMessage>,
    write_timeout: Duration,
) -> anyhow::Result<()> {
    while let Some(message) = rx.recv().await {
        let line = protocol::encode(&message)?;
        timeout(write_timeout, wr.write_all(line.as_bytes()))
            .await
            .context("peer stopped reading")??;
    }
    wr.shutdown().await.ok();
    Ok(())
}

async fn read_lines(
    rd: OwnedReadHalf,
    conn: ConnectionId,
    hub: &Mutex<Hub>,
    max_line: usize,
) -> anyhow::Result<()> {
    let mut reader = BufReader::new(rd);
    let mut line = Vec::new();
    let limit = u64::try_from(max_line).unwrap_or(u64::MAX).saturating_add(1);

    loop {
        line.clear();
        let n = (&mut reader).take(limit).read_until(b'\n', &mut line).await?;
        if n == 0 {
            return Ok(());
        }

        if line.len() > max_line && line.last() != Some(&b'\n') {
            skip_line(&mut reader).await?;
            let err = ProtocolError::LineTooLong { max: max_line };
            warn!(%conn, %err, "dropped oversized line");
            hub.lock().await.reject(conn, err.to_string());
            continue;
        }

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match protocol::decode(&line) {
            Ok(message) => hub.lock().await.handle(conn, message),
            Err(err) => {
                warn!(%conn, %err, "bad message");
                hub.lock().await.reject(conn, err.to_string());
            }
        }
    }
}

/// Discard input up to and including the next newline.
async fn skip_line(reader: &mut BufReader<OwnedReadHalf>) -> std::io::Result<()> {
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        match buf.iter().position(|&b| b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::protocol::UserData;
    use crate::core::{Color, PlayerId};
    use serde_json::json;

    fn peer_with(hub: &mut Hub, capacity: usize) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let (tx, mut rx) = mpsc::channel(capacity);
        let conn = hub.connect(tx);
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::Welcome { id: conn.player_id() });
        (conn, rx)
    }

    fn peer(hub: &mut Hub) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        peer_with(hub, 64)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<ServerMessage> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    fn join(room: &str, color: Option<Color>) -> ClientMessage {
        ClientMessage::JoinRoom {
            room_id: RoomId::from(room),
            user_data: UserData { color, ..UserData::default() },
        }
    }

    #[test]
    fn test_join_broadcasts_roster() {
        let mut hub = Hub::new();
        let (a, mut rx_a) = peer(&mut hub);
        let (b, mut rx_b) = peer(&mut hub);

        hub.handle(a, join("r", None));
        hub.handle(b, join("r", Some(Color::Blue)));

        let seen_by_a = drain(&mut rx_a);
        assert_eq!(seen_by_a.len(), 2);
        match &seen_by_a[1] {
            ServerMessage::RoomUpdate { players, .. } => {
                assert_eq!(players.len(), 2);
                assert_eq!(players[1].id, b.player_id());
                assert_eq!(players[1].color, Color::Blue);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(drain(&mut rx_b).len(), 1);
    }

    #[test]
    fn test_game_action_echoes_to_sender() {
        let mut hub = Hub::new();
        let (a, mut rx_a) = peer(&mut hub);
        let (b, mut rx_b) = peer(&mut hub);
        let (_c, mut rx_c) = peer(&mut hub);
        hub.handle(a, join("r", None));
        hub.handle(b, join("r", None));
        drain(&mut rx_a);
        drain(&mut rx_b);

        let payload = json!({ "player": "x", "action": { "type": "pass-turn" }, "sequence": 4 });
        hub.handle(a, ClientMessage::GameAction { room_id: RoomId::from("r"), action: payload.clone() });

        let expected = ServerMessage::GameEvent { room_id: RoomId::from("r"), action: payload };
        assert_eq!(drain(&mut rx_a), vec![expected.clone()]);
        assert_eq!(drain(&mut rx_b), vec![expected]);
        assert!(drain(&mut rx_c).is_empty());
    }

    #[test]
    fn test_disconnect_updates_and_reaps() {
        let mut hub = Hub::new();
        let (a, mut rx_a) = peer(&mut hub);
        let (b, _rx_b) = peer(&mut hub);
        hub.handle(a, join("shared", None));
        hub.handle(b, join("shared", None));
        hub.handle(b, join("solo", None));
        drain(&mut rx_a);

        hub.disconnect(b);

        match drain(&mut rx_a).as_slice() {
            [ServerMessage::RoomUpdate { room_id, players }] => {
                assert_eq!(room_id, &RoomId::from("shared"));
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].id, PlayerId::from("conn-1"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(hub.rooms().room(&RoomId::from("solo")).is_none());
        assert_eq!(hub.peer_count(), 1);
    }

    #[test]
    fn test_reject_goes_to_sender_only() {
        let mut hub = Hub::new();
        let (a, mut rx_a) = peer(&mut hub);
        let (b, mut rx_b) = peer(&mut hub);
        hub.handle(a, join("r", None));
        hub.handle(b, join("r", None));
        drain(&mut rx_a);
        drain(&mut rx_b);

        hub.reject(b, "nope".to_string());

        assert!(drain(&mut rx_a).is_empty());
        assert_eq!(drain(&mut rx_b), vec![ServerMessage::Error { message: "nope".to_string() }]);
    }

    #[test]
    fn test_action_for_unknown_room_is_dropped() {
        let mut hub = Hub::new();
        let (a, mut rx_a) = peer(&mut hub);
        hub.handle(a, ClientMessage::GameAction { room_id: RoomId::from("ghost"), action: json!(null) });
        assert!(drain(&mut rx_a).is_empty());
    }

    #[test]
    fn test_peer_with_full_outbox_is_dropped() {
        let mut hub = Hub::new();
        let (fast, mut rx_fast) = peer(&mut hub);
        let (slow, _rx_slow) = peer_with(&mut hub, 4);
        hub.handle(fast, join("r", None));
        hub.handle(slow, join("r", None));
        drain(&mut rx_fast);

        for i in 0..10 {
            hub.handle(fast, ClientMessage::GameAction { room_id: RoomId::from("r"), action: json!(i) });
        }

        assert!(!hub.is_connected(slow));
        assert_eq!(hub.peer_count(), 1);
        let roster = hub.rooms().room(&RoomId::from("r")).unwrap().players();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, fast.player_id());

        let seen = drain(&mut rx_fast);
        let events = seen.iter().filter(|m| matches!(m, ServerMessage::GameEvent { .. })).count();
        assert_eq!(events, 10);
        assert!(seen
            .iter()
            .any(|m| matches!(m, ServerMessage::RoomUpdate { players, .. } if players.len() == 1)));

        // Lines still arriving from the dropped peer change nothing.
        hub.handle(slow, join("r", None));
        assert_eq!(hub.rooms().room(&RoomId::from("r")).unwrap().len(), 1);
        assert!(drain(&mut rx_fast).is_empty());
    }

    #[test]
    fn test_stall_during_roster_refresh_cascades() {
        let mut hub = Hub::new();
        let (a, _rx_a) = peer(&mut hub);
        let (b, _rx_b) = peer_with(&mut hub, 2);
        let (c, mut rx_c) = peer(&mut hub);
        hub.handle(a, join("r", None));
        hub.handle(b, join("r", None));
        hub.handle(c, join("r", None));
        drain(&mut rx_c);

        // `b` holds two roster updates and has no room for the next one.
        hub.disconnect(a);

        assert_eq!(hub.peer_count(), 1);
        let roster = hub.rooms().room(&RoomId::from("r")).unwrap().players();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].id, c.player_id());
        match drain(&mut rx_c).last() {
            Some(ServerMessage::RoomUpdate { players, .. }) => assert_eq!(players.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_accept_backoff() {
        use std::io::{Error, ErrorKind};

        assert_eq!(accept_backoff(&Error::from(ErrorKind::ConnectionAborted)), None);
        assert_eq!(accept_backoff(&Error::from(ErrorKind::Interrupted)), None);
        assert_eq!(accept_backoff(&Error::other("too many open files")), Some(ACCEPT_BACKOFF));
    }
}
