//! Position encoding and the shared track.
//!
//! A pawn position is a single integer relative to its owner:
//!
//! | value     | meaning                                  |
//! |-----------|------------------------------------------|
//! | `-1`      | in base                                  |
//! | `0..=51`  | shared track, offset from own entry cell |
//! | `52..=57` | private home stretch                     |
//! | `58`      | finished                                 |
//!
//! Each color enters the shared track at its own offset, 13 cells apart, so a
//! pawn that has walked 52 cells from its entry is back at its own doorstep and
//! turns into its private stretch instead of lapping.

use serde::{Deserialize, Serialize};

use crate::core::{Color, DiceValue};

/// Position of a pawn still in base.
pub const BASE: i8 = -1;
/// First position (own entry cell) on the shared track.
pub const TRACK_START: i8 = 0;
/// Cells on the shared track.
pub const TRACK_LEN: u8 = 52;
/// First home-stretch position.
pub const HOME_STRETCH_START: i8 = 52;
/// Cells in each home stretch.
pub const HOME_STRETCH_LEN: u8 = 6;
/// Position of a finished pawn.
pub const FINISHED: i8 = 58;

/// Absolute track cells where captures never happen: the four entry cells
/// plus one star eight cells past each entry.
pub const SAFE_CELLS: [u8; 8] = [1, 9, 14, 22, 27, 35, 40, 48];

/// Decoded pawn position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    Base,
    /// Relative track offset `0..=51`.
    Track(u8),
    /// Home-stretch step `0..=5`.
    HomeStretch(u8),
    Finished,
}

impl Square {
    /// Decode a raw position. `None` for values outside `-1..=58`.
    #[must_use]
    pub const fn from_position(position: i8) -> Option<Self> {
        match position {
            BASE => Some(Square::Base),
            0..=51 => Some(Square::Track(position as u8)),
            52..=57 => Some(Square::HomeStretch((position - HOME_STRETCH_START) as u8)),
            FINISHED => Some(Square::Finished),
            _ => None,
        }
    }

    /// Encode back to a raw position.
    #[must_use]
    pub const fn position(self) -> i8 {
        match self {
            Square::Base => BASE,
            Square::Track(offset) => offset as i8,
            Square::HomeStretch(step) => HOME_STRETCH_START + step as i8,
            Square::Finished => FINISHED,
        }
    }
}

/// Shared-track index of a color's relative position `0`.
#[must_use]
pub const fn entry_offset(color: Color) -> u8 {
    match color {
        Color::Red => 1,
        Color::Green => 14,
        Color::Blue => 27,
        Color::Yellow => 40,
    }
}

/// Absolute shared-track index for a relative track offset.
#[must_use]
pub const fn absolute_cell(color: Color, relative: u8) -> u8 {
    (relative + entry_offset(color)) % TRACK_LEN
}

/// Absolute track cell a position occupies, `None` off the shared track.
#[must_use]
pub fn track_cell(color: Color, position: i8) -> Option<u8> {
    match Square::from_position(position)? {
        Square::Track(relative) => Some(absolute_cell(color, relative)),
        _ => None,
    }
}

#[must_use]
pub fn is_safe_cell(absolute: u8) -> bool {
    SAFE_CELLS.contains(&absolute)
}

/// Whether a pawn at `position` may move by `dice`.
///
/// Finished pawns never move, base pawns need a six, and home-stretch pawns
/// may not overshoot the finish.
#[must_use]
pub fn can_move(position: i8, dice: DiceValue) -> bool {
    match Square::from_position(position) {
        None | Some(Square::Finished) => false,
        Some(Square::Base) => dice.is_six(),
        Some(Square::HomeStretch(_)) => position + dice.get() as i8 <= FINISHED,
        Some(Square::Track(_)) => true,
    }
}

/// Destination of a legal move. Base pawns enter on their own entry cell.
///
/// Callers check `can_move` first; the result for an illegal move is
/// unspecified but never leaves `-1..=58`.
#[must_use]
pub fn destination(position: i8, dice: DiceValue) -> i8 {
    if position == BASE {
        TRACK_START
    } else {
        (position + dice.get() as i8).min(FINISHED)
    }
}
