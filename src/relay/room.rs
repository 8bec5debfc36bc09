//! Room bookkeeping: who is in which room, and as which player.

use std::fmt;

use rustc_hash::FxHashMap;

use super::protocol::{RoomId, UserData};
use crate::core::{Player, PlayerId};

/// One TCP connection. Doubles as the player id inside every room it joins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(pub u64);

impl ConnectionId {
    #[must_use]
    pub fn player_id(self) -> PlayerId {
        PlayerId::new(self.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A room's roster in join order.
#[derive(Clone, Debug, Default)]
pub struct Room {
    seats: Vec<(ConnectionId, Player)>,
}

impl Room {
    #[must_use]
    pub fn players(&self) -> Vec<Player> {
        self.seats.iter().map(|(_, p)| p.clone()).collect()
    }

    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.seats.iter().map(|(c, _)| *c)
    }

    #[must_use]
    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.seats.iter().any(|(c, _)| *c == conn)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

/// All live rooms. Rooms are created on first join and dropped once empty.
#[derive(Debug, Default)]
pub struct RoomTable {
    rooms: FxHashMap<RoomId, Room>,
}

impl RoomTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seat `conn` in `room_id`. A connection already seated keeps its
    /// first player record.
    pub fn join(&mut self, conn: ConnectionId, room_id: &RoomId, user: UserData) -> &Room {
        let room = self.rooms.entry(room_id.clone()).or_default();
        if !room.contains(conn) {
            let player = user.into_player(conn.player_id(), room.len());
            room.seats.push((conn, player));
        }
        room
    }

    #[must_use]
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Remove `conn` from every room. Returns the rooms it was in, sorted;
    /// rooms left empty are dropped and will not resolve via `room`.
    pub fn leave_all(&mut self, conn: ConnectionId) -> Vec<RoomId> {
        let mut affected = Vec::new();
        for (id, room) in &mut self.rooms {
            let before = room.seats.len();
            room.seats.retain(|(c, _)| *c != conn);
            if room.seats.len() != before {
                affected.push(id.clone());
            }
        }
        self.rooms.retain(|_, room| !room.is_empty());
        affected.sort();
        affected
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Animal, Color};

    fn named(name: &str) -> UserData {
        UserData {
            name: Some(name.to_string()),
            ..UserData::default()
        }
    }

    #[test]
    fn test_join_assigns_defaults_in_order() {
        let mut table = RoomTable::new();
        let room = RoomId::from("r");
        table.join(ConnectionId(1), &room, UserData::default());
        let players = table.join(ConnectionId(2), &room, UserData::default()).players();

        assert_eq!(players.len(), 2);
        assert_eq!(players[0].name, "Player 1");
        assert_eq!(players[1].name, "Player 2");
        assert_eq!(players[1].id, PlayerId::from("conn-2"));
        assert_eq!(players[1].animal, Animal::Lion);
        assert_eq!(players[1].color, Color::Red);
    }

    #[test]
    fn test_rejoin_keeps_first_record() {
        let mut table = RoomTable::new();
        let room = RoomId::from("r");
        table.join(ConnectionId(1), &room, named("Ann"));
        let players = table.join(ConnectionId(1), &room, named("Annie")).players();

        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name, "Ann");
    }

    #[test]
    fn test_leave_all_reports_and_reaps() {
        let mut table = RoomTable::new();
        let (r1, r2, r3) = (RoomId::from("r1"), RoomId::from("r2"), RoomId::from("r3"));
        table.join(ConnectionId(1), &r2, named("Ann"));
        table.join(ConnectionId(1), &r1, named("Ann"));
        table.join(ConnectionId(2), &r1, named("Bob"));
        table.join(ConnectionId(2), &r3, named("Bob"));

        let affected = table.leave_all(ConnectionId(1));

        assert_eq!(affected, vec![r1.clone(), r2.clone()]);
        assert!(table.room(&r2).is_none());
        assert_eq!(table.room(&r1).unwrap().players()[0].name, "Bob");
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_leave_unknown_connection() {
        let mut table = RoomTable::new();
        table.join(ConnectionId(1), &RoomId::from("r"), UserData::default());
        assert!(table.leave_all(ConnectionId(9)).is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_default_name_counts_current_roster() {
        let mut table = RoomTable::new();
        let room = RoomId::from("r");
        table.join(ConnectionId(1), &room, UserData::default());
        table.join(ConnectionId(2), &room, UserData::default());
        table.leave_all(ConnectionId(1));
        let players = table.join(ConnectionId(3), &room, UserData::default()).players();

        // Names are not unique; the newcomer is the second seated player.
        assert_eq!(players[1].name, "Player 2");
        assert!(!table.is_empty());
    }
}
