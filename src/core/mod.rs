//! Core engine types: players, dice, configuration, actions, state.
//!
//! These are plain data. All game rules live in `rules`.

pub mod player;
pub mod rng;
pub mod config;
pub mod action;
pub mod state;

pub use player::{Animal, Color, Player, PlayerId};
pub use rng::{Dice, DiceValue, GameRng, GameRngState, ScriptedDice};
pub use config::{GameConfig, SetupError, MAX_PLAYERS, MIN_PLAYERS};
pub use action::{Action, ActionRecord};
pub use state::{GameState, GameStatus, Pawn, PawnId, TurnPhase, PAWNS_PER_PLAYER};
