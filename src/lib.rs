//! # ludo-engine
//!
//! A Ludo rules engine for 2-4 players, plus a room relay for networked play.
//!
//! ## Design Principles
//!
//! 1. **Pure Transitions**: Every rule is a function from one `GameState`
//!    snapshot to the next. Illegal input is a `Rejection`, never a panic,
//!    and never alters the snapshot it was given.
//!
//! 2. **Injected Dice**: Randomness comes through the `Dice` trait. Rolled
//!    faces travel inside actions so every peer replays the same game.
//!
//! 3. **Dumb Relay**: The relay fans out opaque payloads and tracks rosters.
//!    Rules run only on clients.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Pawns and players live in `im` vectors so
//!   snapshots clone in O(1).
//!
//! - **Position Encoding**: A pawn is one `i8`: -1 in base, 0-51 on the track
//!   counted from its own entry, 52-57 in the home stretch, 58 finished.
//!
//! ## Modules
//!
//! - `core`: Players, dice, configuration, actions, state
//! - `board`: Track arithmetic, safe cells, pixel layout
//! - `rules`: The rules engine
//! - `session`: Client-side driver tying state, dice and the relay together
//! - `relay`: Line-delimited JSON room relay over TCP

pub mod core;
pub mod board;
pub mod rules;
pub mod session;
pub mod relay;

// Re-export commonly used types
pub use crate::core::{
    Animal, Color, Player, PlayerId,
    Dice, DiceValue, GameRng, GameRngState, ScriptedDice,
    GameConfig, SetupError,
    Action, ActionRecord,
    GameState, GameStatus, Pawn, PawnId, TurnPhase,
};

pub use crate::board::{coordinates_for, layout, Point, Square};

pub use crate::rules::{GameResult, LudoRules, Move, Rejection, RulesEngine};

pub use crate::session::GameSession;

pub use crate::relay::RelayConfig;
