//! Game configuration.
//!
//! Drivers seat players through a `GameConfig`, which validates the roster
//! before any state exists:
//! - 2 to 4 players
//! - unique player ids
//! - one player per color (colors own base slots and home stretches)

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::player::{Animal, Color, Player, PlayerId};
use super::state::GameState;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 4;

/// Roster validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("need 2-4 players, got {0}")]
    PlayerCount(usize),
    #[error("player id {0} is seated twice")]
    DuplicatePlayer(PlayerId),
    #[error("color {0} is taken by more than one player")]
    DuplicateColor(Color),
    #[error("starting player index {index} out of range for {count} players")]
    StartingPlayer { index: usize, count: usize },
}

/// Complete game configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameConfig {
    /// Seated players in turn order.
    pub players: Vec<Player>,

    /// Seat that rolls first.
    #[serde(default)]
    pub starting_player: usize,
}

impl GameConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hot-seat roster: `local-N` ids, seat colors, one animal per seat.
    #[must_use]
    pub fn local(animals: &[Animal]) -> Self {
        Self {
            players: animals
                .iter()
                .enumerate()
                .map(|(i, &animal)| Player::local(i, animal))
                .collect(),
            starting_player: 0,
        }
    }

    /// Add a player.
    #[must_use]
    pub fn with_player(mut self, player: Player) -> Self {
        self.players.push(player);
        self
    }

    /// Set the seat that rolls first.
    #[must_use]
    pub fn with_starting_player(mut self, index: usize) -> Self {
        self.starting_player = index;
        self
    }

    /// Check the roster.
    pub fn validate(&self) -> Result<(), SetupError> {
        let count = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&count) {
            return Err(SetupError::PlayerCount(count));
        }
        if self.starting_player >= count {
            return Err(SetupError::StartingPlayer {
                index: self.starting_player,
                count,
            });
        }
        for (i, player) in self.players.iter().enumerate() {
            let earlier = &self.players[..i];
            if earlier.iter().any(|p| p.id == player.id) {
                return Err(SetupError::DuplicatePlayer(player.id.clone()));
            }
            if earlier.iter().any(|p| p.color == player.color) {
                return Err(SetupError::DuplicateColor(player.color));
            }
        }
        Ok(())
    }

    /// Validate and seat the roster. The result is still `Waiting`.
    pub fn build(self) -> Result<GameState, SetupError> {
        self.validate()?;
        let mut state = GameState::new(self.players);
        state.current_player_index = self.starting_player;
        Ok(state)
    }
}
