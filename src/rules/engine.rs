//! Ludo rules: the only code that turns one `GameState` into the next.
//!
//! Every transition borrows the current snapshot and returns either a new
//! snapshot or a `Rejection`. The input is never touched, so a driver can
//! feed stale, duplicated or hostile input through these functions and simply
//! keep its old state on `Err`.

use smallvec::SmallVec;
use thiserror::Error;

use crate::board::track::{self, Square};
use crate::core::{
    Action, ActionRecord, Dice, DiceValue, GameConfig, GameState, GameStatus, PawnId, Player,
    PlayerId, SetupError,
};

/// Why an action was refused. The state is unchanged whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("the game has not started")]
    NotStarted,
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("the game is over")]
    GameOver,
    #[error("it is {expected}'s turn, not {actor}'s")]
    NotYourTurn { expected: PlayerId, actor: PlayerId },
    #[error("a {0} is already rolled; move a pawn first")]
    DicePending(DiceValue),
    #[error("the dice are already rolling")]
    AlreadyRolling,
    #[error("roll the dice first")]
    NotRolled,
    #[error("no pawn with id {0}")]
    UnknownPawn(PawnId),
    #[error("pawn {pawn} belongs to {owner}")]
    NotOwnPawn { pawn: PawnId, owner: PlayerId },
    #[error("pawn {pawn} cannot move {dice}")]
    PawnCannotMove { pawn: PawnId, dice: DiceValue },
    #[error("a pawn can still move with {0}")]
    MoveAvailable(DiceValue),
    #[error("action was taken at sequence {got}, state is at {expected}")]
    OutOfSequence { expected: u32, got: u32 },
    #[error("malformed action: {0}")]
    Malformed(String),
}

/// Result of a finished game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub winner: PlayerId,
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: &PlayerId) -> bool {
        &self.winner == player
    }
}

/// Everything a pawn selection did, for drivers that animate or play sounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    pub pawn: PawnId,
    pub from: i8,
    pub to: i8,
    /// Opponent pawn sent back to base.
    pub captured: Option<PawnId>,
    /// The mover rolls again.
    pub bonus_turn: bool,
    pub won: bool,
    /// Snapshot after the move.
    pub state: GameState,
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_actions`: empty if `player` cannot act; rolls are listed once per
///   face since the face is part of the action
/// - `apply_action`: must be deterministic so peers stay in sync
/// - `is_terminal`: `None` while the game continues
pub trait RulesEngine {
    /// Enumerate all legal actions for a player.
    fn legal_actions(&self, state: &GameState, player: &PlayerId) -> Vec<Action>;

    /// Apply an action taken by `player`.
    fn apply_action(
        &self,
        state: &GameState,
        player: &PlayerId,
        action: &Action,
    ) -> Result<GameState, Rejection>;

    /// Check if the game is over.
    fn is_terminal(&self, state: &GameState) -> Option<GameResult>;
}

/// Standard Ludo rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct LudoRules;

impl RulesEngine for LudoRules {
    fn legal_actions(&self, state: &GameState, player: &PlayerId) -> Vec<Action> {
        if check_actor(state, player).is_err() {
            return vec![];
        }

        match state.dice_value {
            None => DiceValue::all().map(|value| Action::Roll { value }).collect(),
            Some(_) => {
                let movable = movable_pawns(state);
                if movable.is_empty() {
                    vec![Action::PassTurn]
                } else {
                    movable.into_iter().map(|pawn_id| Action::SelectPawn { pawn_id }).collect()
                }
            }
        }
    }

    fn apply_action(
        &self,
        state: &GameState,
        player: &PlayerId,
        action: &Action,
    ) -> Result<GameState, Rejection> {
        apply_action(state, player, action)
    }

    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        if state.status != GameStatus::Finished {
            return None;
        }
        state.winner.clone().map(|winner| GameResult { winner })
    }
}

// === Setup ===

/// Validate a roster and start the game with all pawns in base.
pub fn initialize(players: impl IntoIterator<Item = Player>) -> Result<GameState, SetupError> {
    let config = GameConfig {
        players: players.into_iter().collect(),
        starting_player: 0,
    };
    Ok(started(config.build()?))
}

/// Move a seated game from `Waiting` to `Playing`.
pub fn start(state: &GameState) -> Result<GameState, Rejection> {
    match state.status {
        GameStatus::Waiting => {}
        GameStatus::Playing => return Err(Rejection::AlreadyStarted),
        GameStatus::Finished => return Err(Rejection::GameOver),
    }
    Ok(started(state.clone()))
}

fn started(mut state: GameState) -> GameState {
    state.status = GameStatus::Playing;
    state.last_action = Some("Game Started! Roll the dice.".to_string());
    state
}

// === Queries ===

fn check_playing(state: &GameState) -> Result<(), Rejection> {
    match state.status {
        GameStatus::Waiting => Err(Rejection::NotStarted),
        GameStatus::Playing => Ok(()),
        GameStatus::Finished => Err(Rejection::GameOver),
    }
}

fn check_actor(state: &GameState, actor: &PlayerId) -> Result<(), Rejection> {
    check_playing(state)?;
    match state.current_player() {
        Some(current) if &current.id == actor => Ok(()),
        Some(current) => Err(Rejection::NotYourTurn {
            expected: current.id.clone(),
            actor: actor.clone(),
        }),
        None => Err(Rejection::NotStarted),
    }
}

fn check_can_roll(state: &GameState) -> Result<(), Rejection> {
    check_playing(state)?;
    match state.dice_value {
        Some(pending) => Err(Rejection::DicePending(pending)),
        None => Ok(()),
    }
}

fn current_name(state: &GameState) -> String {
    state
        .current_player()
        .map_or_else(String::new, |p| p.name.clone())
}

/// Ids of the current player's pawns that may move with `dice`.
fn movable_with(state: &GameState, dice: DiceValue) -> SmallVec<[PawnId; 4]> {
    let Some(current) = state.current_player() else {
        return SmallVec::new();
    };
    state
        .pawns_of(&current.id)
        .filter(|p| p.can_move(dice))
        .map(|p| p.id.clone())
        .collect()
}

/// Pawns the current player may select. Empty unless a roll is pending.
#[must_use]
pub fn movable_pawns(state: &GameState) -> SmallVec<[PawnId; 4]> {
    match (state.status, state.dice_value) {
        (GameStatus::Playing, Some(dice)) => movable_with(state, dice),
        _ => SmallVec::new(),
    }
}

/// Whether the pending roll has no legal move, so the driver must schedule
/// `pass_turn`.
#[must_use]
pub fn must_pass(state: &GameState) -> bool {
    state.status == GameStatus::Playing
        && state.dice_value.is_some()
        && movable_pawns(state).is_empty()
}

// === Transitions ===

/// Raise the rolling flag while the driver animates the dice.
pub fn begin_roll(state: &GameState) -> Result<GameState, Rejection> {
    check_can_roll(state)?;
    if state.is_rolling {
        return Err(Rejection::AlreadyRolling);
    }
    let mut next = state.clone();
    next.is_rolling = true;
    Ok(next)
}

/// Roll `dice` for the current player. The die is not consumed on rejection.
pub fn roll(state: &GameState, dice: &mut impl Dice) -> Result<GameState, Rejection> {
    check_can_roll(state)?;
    apply_roll(state, dice.roll())
}

/// Commit an already-rolled face.
///
/// A roll with no legal move is still accepted: the state waits in the rolled
/// phase with a "no moves" message until the driver calls `pass_turn`.
pub fn apply_roll(state: &GameState, value: DiceValue) -> Result<GameState, Rejection> {
    check_can_roll(state)?;

    let mut next = state.clone();
    next.dice_value = Some(value);
    next.is_rolling = false;
    next.sequence += 1;
    next.last_action = Some(if movable_with(state, value).is_empty() {
        format!("Rolled a {value}. No moves possible!")
    } else {
        format!("Rolled a {value}!")
    });
    Ok(next)
}

/// Give up a roll that has no legal move.
///
/// A six keeps the turn, anything else passes it on.
pub fn pass_turn(state: &GameState) -> Result<GameState, Rejection> {
    check_playing(state)?;
    let dice = state.dice_value.ok_or(Rejection::NotRolled)?;
    if !movable_with(state, dice).is_empty() {
        return Err(Rejection::MoveAvailable(dice));
    }

    let mut next = state.clone();
    next.dice_value = None;
    next.is_rolling = false;
    next.sequence += 1;
    if dice.is_six() {
        next.last_action = Some("Rolled a 6! One more turn.".to_string());
    } else {
        next.current_player_index = state.next_player_index();
        next.last_action = Some(format!("{}'s turn", current_name(&next)));
    }
    Ok(next)
}

/// Move a pawn by the pending roll.
pub fn select_pawn(state: &GameState, pawn_id: &PawnId) -> Result<GameState, Rejection> {
    resolve_move(state, pawn_id).map(|m| m.state)
}

/// Move a pawn by the pending roll and report what happened.
///
/// In order: move, capture on the destination cell, win check, then either a
/// bonus turn (capture or six) or the next player's turn.
pub fn resolve_move(state: &GameState, pawn_id: &PawnId) -> Result<Move, Rejection> {
    check_playing(state)?;
    let dice = state.dice_value.ok_or(Rejection::NotRolled)?;
    let index = state
        .pawn_index(pawn_id)
        .ok_or_else(|| Rejection::UnknownPawn(pawn_id.clone()))?;
    let pawn = &state.pawns[index];

    let mover = match state.current_player() {
        Some(current) if current.id == pawn.owner_id => current.clone(),
        _ => {
            return Err(Rejection::NotOwnPawn {
                pawn: pawn_id.clone(),
                owner: pawn.owner_id.clone(),
            })
        }
    };
    if !pawn.can_move(dice) {
        return Err(Rejection::PawnCannotMove {
            pawn: pawn_id.clone(),
            dice,
        });
    }

    let from = pawn.position;
    let to = track::destination(from, dice);

    let mut next = state.clone();
    let mut moved = pawn.clone();
    moved.position = to;
    let landing = moved.track_cell();
    next.pawns.set(index, moved);

    let captured = match (Square::from_position(to), landing) {
        (Some(Square::Track(_)), Some(cell)) if !track::is_safe_cell(cell) => {
            capture_at(&mut next, &mover.id, cell)
        }
        _ => None,
    };

    next.dice_value = None;
    next.is_rolling = false;
    next.sequence += 1;

    let won = next.has_finished_all(&mover.id);
    let bonus_turn = !won && (captured.is_some() || dice.is_six());

    if won {
        next.status = GameStatus::Finished;
        next.winner = Some(mover.id.clone());
        next.last_action = Some(format!("{} WINS!", mover.name));
    } else if captured.is_some() {
        next.last_action = Some(format!("BOOM! {} killed a pawn!", mover.name));
    } else if dice.is_six() {
        next.last_action = Some("Rolled a 6! One more turn.".to_string());
    } else {
        next.current_player_index = state.next_player_index();
        next.last_action = Some(format!("{}'s turn", current_name(&next)));
    }

    Ok(Move {
        pawn: pawn_id.clone(),
        from,
        to,
        captured,
        bonus_turn,
        won,
        state: next,
    })
}

/// Send the first opponent pawn on absolute `cell` back to base.
fn capture_at(state: &mut GameState, mover: &PlayerId, cell: u8) -> Option<PawnId> {
    let index = state
        .pawns
        .iter()
        .position(|p| &p.owner_id != mover && p.track_cell() == Some(cell))?;

    let mut victim = state.pawns[index].clone();
    victim.position = track::BASE;
    let id = victim.id.clone();
    state.pawns.set(index, victim);
    Some(id)
}

// === Dispatch ===

/// Apply an action on behalf of `actor`, who must hold the turn.
pub fn apply_action(
    state: &GameState,
    actor: &PlayerId,
    action: &Action,
) -> Result<GameState, Rejection> {
    check_actor(state, actor)?;
    match action {
        Action::Roll { value } => apply_roll(state, *value),
        Action::SelectPawn { pawn_id } => select_pawn(state, pawn_id),
        Action::PassTurn => pass_turn(state),
    }
}

/// Apply a relayed record. Records not taken at the current sequence are
/// stale or duplicated and are refused.
pub fn apply_record(state: &GameState, record: &ActionRecord) -> Result<GameState, Rejection> {
    if record.sequence != state.sequence {
        return Err(Rejection::OutOfSequence {
            expected: state.sequence,
            got: record.sequence,
        });
    }
    apply_action(state, &record.player, &record.action)
}

/// Apply a raw relay payload. Anything that does not decode is `Malformed`.
pub fn apply_payload(state: &GameState, payload: &serde_json::Value) -> Result<GameState, Rejection> {
    let record: ActionRecord = serde_json::from_value(payload.clone())
        .map_err(|e| Rejection::Malformed(e.to_string()))?;
    apply_record(state, &record)
}
