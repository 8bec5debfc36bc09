//! Wire messages for the relay, one JSON object per line.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{Animal, Color, Player, PlayerId};

/// Name of a room. Any string a client picks.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// What a client says about itself when joining. Missing fields get defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animal: Option<Animal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl UserData {
    /// Player record for connection `id`, the `seat`-th player in its room.
    #[must_use]
    pub fn into_player(self, id: PlayerId, seat: usize) -> Player {
        let name = self
            .name
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("Player {}", seat + 1));
        Player::new(id, name, self.color.unwrap_or_default())
            .with_animal(self.animal.unwrap_or_default())
    }
}

/// Client to relay.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: RoomId,
        #[serde(default)]
        user_data: UserData,
    },

    /// Opaque payload, fanned out untouched.
    #[serde(rename_all = "camelCase")]
    GameAction {
        room_id: RoomId,
        action: serde_json::Value,
    },
}

/// Relay to client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// First line on every connection: the player id the relay assigned.
    Welcome { id: PlayerId },

    #[serde(rename_all = "camelCase")]
    RoomUpdate { room_id: RoomId, players: Vec<Player> },

    #[serde(rename_all = "camelCase")]
    GameEvent {
        room_id: RoomId,
        action: serde_json::Value,
    },

    Error { message: String },
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line exceeds the {max} byte limit")]
    LineTooLong { max: usize },
}

/// Parse one line from a client. Surrounding whitespace is ignored and
/// invalid UTF-8 is reported like any other malformed JSON.
pub fn decode(line: impl AsRef<[u8]>) -> Result<ClientMessage, ProtocolError> {
    Ok(serde_json::from_slice(line.as_ref())?)
}

/// Render a message as a newline-terminated line.
pub fn encode(message: &ServerMessage) -> Result<String, ProtocolError> {
    let mut line = serde_json::to_string(message)?;
    line.push('\n');
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_join_room() {
        let msg = decode(
            r#"{"type":"join-room","roomId":"r1","userData":{"name":"Ann","animal":"Zebra","color":"green"}}"#,
        )
        .unwrap();

        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                room_id: RoomId::from("r1"),
                user_data: UserData {
                    name: Some("Ann".to_string()),
                    animal: Some(Animal::Zebra),
                    color: Some(Color::Green),
                },
            }
        );
    }

    #[test]
    fn test_decode_join_room_without_user_data() {
        let msg = decode(r#"{"type":"join-room","roomId":"r1"}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::JoinRoom { user_data, .. } if user_data == UserData::default()
        ));
    }

    #[test]
    fn test_decode_game_action_keeps_payload() {
        let msg = decode(r#"{"type":"game-action","roomId":"r1","action":{"anything":[1,2,3]}}"#).unwrap();
        match msg {
            ClientMessage::GameAction { action, .. } => {
                assert_eq!(action, serde_json::json!({ "anything": [1, 2, 3] }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode("not json").is_err());
        assert!(decode([0xff, 0xfe, b'{']).is_err());
        assert!(decode(r#"{"type":"shout","roomId":"r1"}"#).is_err());
        assert!(decode(r#"{"type":"join-room","roomId":"r1","userData":{"color":"purple"}}"#).is_err());
    }

    #[test]
    fn test_encode_room_update() {
        let players = vec![Player::new("c1", "Player 1", Color::Red)];
        let line = encode(&ServerMessage::RoomUpdate {
            room_id: RoomId::from("r1"),
            players,
        })
        .unwrap();

        assert!(line.ends_with('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["type"], "room-update");
        assert_eq!(value["roomId"], "r1");
        assert_eq!(value["players"][0]["name"], "Player 1");
        assert_eq!(value["players"][0]["color"], "red");
    }

    #[test]
    fn test_user_data_defaults() {
        let player = UserData::default().into_player(PlayerId::from("c9"), 2);
        assert_eq!(player.name, "Player 3");
        assert_eq!(player.animal, Animal::Lion);
        assert_eq!(player.color, Color::Red);
        assert_eq!(player.id, PlayerId::from("c9"));

        let blank = UserData {
            name: Some(String::new()),
            ..UserData::default()
        };
        assert_eq!(blank.into_player(PlayerId::from("c9"), 0).name, "Player 1");
    }
}
