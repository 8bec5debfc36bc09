//! Room relay: a stateless fan-out hub for networked games.
//!
//! The relay knows nothing about Ludo rules. Clients join named rooms, the
//! relay keeps each room's roster, and every `game-action` payload is echoed
//! verbatim to everyone in the room, sender included. Each client then runs
//! the payload through its own `rules::apply_payload`.
//!
//! ## Protocol
//!
//! One JSON object per line over TCP, tagged by `"type"`:
//!
//! | Direction | Type          | Fields                  |
//! |-----------|---------------|-------------------------|
//! | in        | `join-room`   | `roomId`, `userData`    |
//! | in        | `game-action` | `roomId`, `action`      |
//! | out       | `welcome`     | `id`                    |
//! | out       | `room-update` | `roomId`, `players`     |
//! | out       | `game-event`  | `roomId`, `action`      |
//! | out       | `error`       | `message`               |
//!
//! Outbound queues are bounded by [`RelayConfig::outbox`]; a client that
//! stops reading is dropped from its rooms like any disconnect.

pub mod config;
pub mod protocol;
pub mod room;
pub mod server;

pub use config::RelayConfig;
pub use protocol::{ClientMessage, ProtocolError, RoomId, ServerMessage, UserData};
pub use room::{ConnectionId, Room, RoomTable};
pub use server::{run, serve, Hub};
