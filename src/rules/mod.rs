//! Ludo rules engine.
//!
//! Pure transitions over `GameState`:
//! - `initialize`, `start`: seat a roster and begin play
//! - `begin_roll`, `roll`, `apply_roll`: the dice phase
//! - `select_pawn`, `resolve_move`: movement, capture, win and bonus turns
//! - `pass_turn`: give up a roll with no legal move
//! - `apply_action`, `apply_record`, `apply_payload`: dispatch for relayed input
//!
//! Illegal input yields a `Rejection` and never alters the snapshot passed in.

pub mod engine;

pub use engine::{
    apply_action, apply_payload, apply_record, apply_roll, begin_roll, initialize, movable_pawns,
    must_pass, pass_turn, resolve_move, roll, select_pawn, start, GameResult, LudoRules, Move,
    Rejection, RulesEngine,
};
