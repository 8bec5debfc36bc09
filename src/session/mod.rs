//! Driver-side session: one local copy of the game plus the dice.
//!
//! The session is what a client front end talks to. It applies local actions
//! through the rules engine and hands back the `ActionRecord` to publish on the
//! relay, and it applies records received from peers. Timers (roll animation,
//! auto-skip delay) stay with the caller: after a roll, `needs_auto_skip`
//! tells it to schedule `pass_turn`.

mod game_session;

pub use game_session::GameSession;
