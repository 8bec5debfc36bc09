//! Game state: players, pawns, dice and turn pointer.
//!
//! ## GameState
//!
//! One immutable snapshot of a game:
//! - Seated players (ordered; turn order)
//! - All pawns (stable order; used for capture and fan-out tie-breaks)
//! - Turn pointer, pending dice value, status, winner
//! - Human-readable description of the last accepted action
//!
//! Uses `im` persistent vectors so transitions can return a fresh snapshot
//! while the previous one stays valid at O(1) clone cost.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::player::{Color, Player, PlayerId};
use super::rng::DiceValue;
use crate::board::track;

/// Pawns each player owns.
pub const PAWNS_PER_PLAYER: usize = 4;

/// Pawn identifier, `"{owner}-pawn-{ordinal}"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PawnId(pub String);

impl PawnId {
    /// Id of the `ordinal`th pawn owned by `owner`.
    #[must_use]
    pub fn new(owner: &PlayerId, ordinal: usize) -> Self {
        Self(format!("{owner}-pawn-{ordinal}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PawnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PawnId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A single pawn. See `board::track` for the position encoding.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pawn {
    pub id: PawnId,
    pub owner_id: PlayerId,
    pub position: i8,
    pub color: Color,
}

impl Pawn {
    /// A pawn sitting in base.
    #[must_use]
    pub fn new(owner: &Player, ordinal: usize) -> Self {
        Self {
            id: PawnId::new(&owner.id, ordinal),
            owner_id: owner.id.clone(),
            position: track::BASE,
            color: owner.color,
        }
    }

    #[must_use]
    pub fn is_in_base(&self) -> bool {
        self.position == track::BASE
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position == track::FINISHED
    }

    /// On the shared track or in the home stretch.
    #[must_use]
    pub fn is_in_play(&self) -> bool {
        (track::TRACK_START..track::FINISHED).contains(&self.position)
    }

    /// Absolute shared-track cell, `None` when off the shared track.
    #[must_use]
    pub fn track_cell(&self) -> Option<u8> {
        track::track_cell(self.color, self.position)
    }

    #[must_use]
    pub fn can_move(&self, dice: DiceValue) -> bool {
        track::can_move(self.position, dice)
    }
}

/// Game lifecycle. Only ever moves forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

/// Phase of the current turn, derived from the pending dice value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnPhase {
    AwaitingRoll,
    Rolled(DiceValue),
}

/// Complete game snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Seated players in turn order.
    pub players: Vector<Player>,

    /// All pawns, grouped by owner in seat order.
    pub pawns: Vector<Pawn>,

    /// Index into `players` of whose turn it is.
    pub current_player_index: usize,

    /// Rolled but not yet consumed.
    pub dice_value: Option<DiceValue>,

    /// Presentation flag: a roll animation is in flight.
    pub is_rolling: bool,

    pub status: GameStatus,

    pub winner: Option<PlayerId>,

    /// Feedback line for the UI.
    pub last_action: Option<String>,

    /// Number of accepted transitions. Peers applying the same actions agree
    /// on this value.
    pub sequence: u32,
}

impl GameState {
    /// Seat `players` with all pawns in base, status `Waiting`.
    ///
    /// ## Defaults
    ///
    /// - `current_player_index`: 0
    /// - `dice_value`: none
    ///
    /// Use `GameConfig` to validate a roster before seating it.
    #[must_use]
    pub fn new(players: impl IntoIterator<Item = Player>) -> Self {
        let players: Vector<Player> = players.into_iter().collect();
        let pawns = players
            .iter()
            .flat_map(|player| (0..PAWNS_PER_PLAYER).map(move |i| Pawn::new(player, i)))
            .collect();

        Self {
            players,
            pawns,
            current_player_index: 0,
            dice_value: None,
            is_rolling: false,
            status: GameStatus::Waiting,
            winner: None,
            last_action: None,
            sequence: 0,
        }
    }

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Player whose turn it is.
    #[must_use]
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// Index of the seat after the current one.
    #[must_use]
    pub fn next_player_index(&self) -> usize {
        if self.players.is_empty() {
            0
        } else {
            (self.current_player_index + 1) % self.players.len()
        }
    }

    #[must_use]
    pub fn turn_phase(&self) -> TurnPhase {
        match self.dice_value {
            Some(dice) => TurnPhase::Rolled(dice),
            None => TurnPhase::AwaitingRoll,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == GameStatus::Finished
    }

    // === Pawns ===

    #[must_use]
    pub fn pawn_index(&self, id: &PawnId) -> Option<usize> {
        self.pawns.iter().position(|p| &p.id == id)
    }

    #[must_use]
    pub fn pawn(&self, id: &PawnId) -> Option<&Pawn> {
        self.pawns.iter().find(|p| &p.id == id)
    }

    /// Pawns owned by `owner`, in snapshot order.
    pub fn pawns_of<'a>(&'a self, owner: &'a PlayerId) -> impl Iterator<Item = &'a Pawn> + 'a {
        self.pawns.iter().filter(move |p| &p.owner_id == owner)
    }

    /// Whether every pawn of `owner` has finished.
    #[must_use]
    pub fn has_finished_all(&self, owner: &PlayerId) -> bool {
        let mut owned = self.pawns_of(owner).peekable();
        owned.peek().is_some() && owned.all(Pawn::is_finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(n: usize) -> Vec<Player> {
        (0..n).map(|i| Player::local(i, Default::default())).collect()
    }

    #[test]
    fn test_game_state_new() {
        let state = GameState::new(players(3));

        assert_eq!(state.player_count(), 3);
        assert_eq!(state.pawns.len(), 12);
        assert_eq!(state.current_player_index, 0);
        assert_eq!(state.status, GameStatus::Waiting);
        assert_eq!(state.turn_phase(), TurnPhase::AwaitingRoll);
        assert!(state.pawns.iter().all(Pawn::is_in_base));
    }

    #[test]
    fn test_pawn_ids_and_order() {
        let state = GameState::new(players(2));
        let ids: Vec<&str> = state.pawns.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "local-0-pawn-0",
                "local-0-pawn-1",
                "local-0-pawn-2",
                "local-0-pawn-3",
                "local-1-pawn-0",
                "local-1-pawn-1",
                "local-1-pawn-2",
                "local-1-pawn-3",
            ]
        );
        assert_eq!(state.pawn_index(&PawnId::from("local-1-pawn-0")), Some(4));
        assert_eq!(state.pawn(&PawnId::from("nope")), None);
    }

    #[test]
    fn test_pawn_colors_follow_owner() {
        let state = GameState::new(players(4));
        for player in &state.players {
            assert!(state.pawns_of(&player.id).all(|p| p.color == player.color));
            assert_eq!(state.pawns_of(&player.id).count(), PAWNS_PER_PLAYER);
        }
    }

    #[test]
    fn test_next_player_wraps() {
        let mut state = GameState::new(players(3));
        state.current_player_index = 2;
        assert_eq!(state.next_player_index(), 0);
    }

    #[test]
    fn test_has_finished_all() {
        let mut state = GameState::new(players(2));
        let owner = PlayerId::local(0);
        assert!(!state.has_finished_all(&owner));

        for i in 0..4 {
            let mut pawn = state.pawns[i].clone();
            pawn.position = track::FINISHED;
            state.pawns.set(i, pawn);
        }
        assert!(state.has_finished_all(&owner));
        assert!(!state.has_finished_all(&PlayerId::local(1)));
        assert!(!state.has_finished_all(&PlayerId::from("ghost")));
    }

    #[test]
    fn test_pawn_predicates() {
        let player = Player::local(0, Default::default());
        let mut pawn = Pawn::new(&player, 0);
        assert!(pawn.is_in_base() && !pawn.is_in_play());

        pawn.position = 10;
        assert!(pawn.is_in_play());
        assert_eq!(pawn.track_cell(), Some(11));

        pawn.position = 55;
        assert!(pawn.is_in_play());
        assert_eq!(pawn.track_cell(), None);

        pawn.position = track::FINISHED;
        assert!(pawn.is_finished() && !pawn.is_in_play());
    }

    #[test]
    fn test_state_serialization_uses_camel_case() {
        let state = GameState::new(players(2));
        let json = serde_json::to_value(&state).unwrap();

        assert_eq!(json["currentPlayerIndex"], 0);
        assert_eq!(json["status"], "waiting");
        assert_eq!(json["diceValue"], serde_json::Value::Null);
        assert_eq!(json["pawns"][0]["ownerId"], "local-0");
        assert_eq!(json["pawns"][0]["position"], -1);

        let back: GameState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}
