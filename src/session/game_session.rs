use tracing::{debug, warn};

use crate::core::{Action, ActionRecord, Dice, GameState, PawnId, PlayerId};
use crate::rules::{self, Move, Rejection};

/// A live game as seen by one client.
pub struct GameSession<D: Dice> {
    state: GameState,
    dice: D,
    /// Seat this client controls. `None` for hot-seat play, where the session
    /// acts for whoever holds the turn.
    local: Option<PlayerId>,
}

impl<D: Dice> GameSession<D> {
    /// Hot-seat session acting for every player.
    pub fn new(state: GameState, dice: D) -> Self {
        Self {
            state,
            dice,
            local: None,
        }
    }

    /// Networked session acting only for `local`.
    pub fn for_player(state: GameState, dice: D, local: PlayerId) -> Self {
        Self {
            state,
            dice,
            local: Some(local),
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    #[must_use]
    pub fn local_player(&self) -> Option<&PlayerId> {
        self.local.as_ref()
    }

    /// Whether this client may act right now.
    #[must_use]
    pub fn is_local_turn(&self) -> bool {
        self.actor().is_ok()
    }

    /// The roll has no legal move; the caller should schedule `pass_turn`.
    #[must_use]
    pub fn needs_auto_skip(&self) -> bool {
        rules::must_pass(&self.state)
    }

    fn actor(&self) -> Result<PlayerId, Rejection> {
        let current = self
            .state
            .current_player()
            .map(|p| p.id.clone())
            .ok_or(Rejection::NotStarted)?;
        match &self.local {
            Some(local) if *local != current => Err(Rejection::NotYourTurn {
                expected: current,
                actor: local.clone(),
            }),
            _ => Ok(current),
        }
    }

    fn commit(&mut self, actor: PlayerId, action: Action, next: GameState) -> ActionRecord {
        let record = ActionRecord::new(actor, action, self.state.sequence);
        debug!(
            player = %record.player,
            action = record.action.kind(),
            sequence = record.sequence,
            last_action = next.last_action.as_deref().unwrap_or(""),
            "applied local action"
        );
        self.state = next;
        record
    }

    /// Start the roll animation.
    pub fn begin_roll(&mut self) -> Result<(), Rejection> {
        self.actor()?;
        self.state = rules::begin_roll(&self.state)?;
        Ok(())
    }

    /// Roll the dice for the local player.
    pub fn roll(&mut self) -> Result<ActionRecord, Rejection> {
        let actor = self.actor()?;
        let next = rules::roll(&self.state, &mut self.dice)?;
        let value = next.dice_value.ok_or(Rejection::NotRolled)?;
        Ok(self.commit(actor, Action::Roll { value }, next))
    }

    /// Move one of the local player's pawns.
    pub fn select_pawn(&mut self, pawn_id: &PawnId) -> Result<(ActionRecord, Move), Rejection> {
        let actor = self.actor()?;
        let outcome = rules::resolve_move(&self.state, pawn_id)?;
        let record = self.commit(
            actor,
            Action::select(pawn_id.clone()),
            outcome.state.clone(),
        );
        Ok((record, outcome))
    }

    /// Give up a roll with no legal move.
    pub fn pass_turn(&mut self) -> Result<ActionRecord, Rejection> {
        let actor = self.actor()?;
        let next = rules::pass_turn(&self.state)?;
        Ok(self.commit(actor, Action::PassTurn, next))
    }

    /// Apply a `game-action` payload relayed from a peer.
    ///
    /// Our own records come back through the relay too; they are already
    /// applied and are refused as out of sequence.
    pub fn apply_remote(&mut self, payload: &serde_json::Value) -> Result<(), Rejection> {
        match rules::apply_payload(&self.state, payload) {
            Ok(next) => {
                debug!(
                    sequence = next.sequence,
                    last_action = next.last_action.as_deref().unwrap_or(""),
                    "applied remote action"
                );
                self.state = next;
                Ok(())
            }
            Err(err) => {
                warn!(%err, "ignored remote action");
                Err(err)
            }
        }
    }
}
