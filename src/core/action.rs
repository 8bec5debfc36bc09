//! Action representation: what a player did, in a form peers can replay.
//!
//! The relay fans these out verbatim. Dice values travel inside `Roll` so
//! every peer applies the same face regardless of its local dice.
//!
//! ## Wire format
//!
//! ```
//! use ludo_engine::core::{Action, ActionRecord, DiceValue, PlayerId};
//!
//! let record = ActionRecord::new(PlayerId::from("p1"), Action::Roll { value: DiceValue::SIX }, 3);
//! let json = serde_json::to_string(&record).unwrap();
//! assert_eq!(json, r#"{"player":"p1","action":{"type":"roll","value":6},"sequence":3}"#);
//! ```

use serde::{Deserialize, Serialize};

use super::player::PlayerId;
use super::rng::DiceValue;
use super::state::PawnId;

/// A game action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Commit a rolled face.
    Roll { value: DiceValue },

    /// Move one of the current player's pawns by the pending dice value.
    #[serde(rename_all = "camelCase")]
    SelectPawn { pawn_id: PawnId },

    /// Give up a roll that has no legal move.
    PassTurn,
}

impl Action {
    #[must_use]
    pub fn select(pawn_id: impl Into<PawnId>) -> Self {
        Action::SelectPawn {
            pawn_id: pawn_id.into(),
        }
    }

    /// Short verb for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Roll { .. } => "roll",
            Action::SelectPawn { .. } => "select-pawn",
            Action::PassTurn => "pass-turn",
        }
    }
}

/// An action with the actor and the state sequence it was taken at.
///
/// Used for:
/// - The relay `game-action` payload
/// - Detecting stale or duplicated remote actions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// The player who took this action.
    pub player: PlayerId,

    /// The action taken.
    pub action: Action,

    /// `GameState::sequence` the action was applied on.
    pub sequence: u32,
}

impl ActionRecord {
    #[must_use]
    pub fn new(player: PlayerId, action: Action, sequence: u32) -> Self {
        Self {
            player,
            action,
            sequence,
        }
    }
}
