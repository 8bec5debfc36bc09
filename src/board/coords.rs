//! Pixel coordinates for pawns on the 15x15 cross board.
//!
//! Everything here is a pure function of the pawn and the current snapshot:
//! no caching, no layout state. Cells are `(row, col)`; pixels put `x` on the
//! column axis.

use serde::{Deserialize, Serialize};

use super::track::{entry_offset, Square, TRACK_LEN};
use crate::core::{Color, GameState, Pawn, PawnId};

/// Grid cells per side.
pub const BOARD_SIZE: u8 = 15;
/// Pixel size of one grid cell.
pub const CELL_SIZE: f64 = 40.0;
/// Radius of the circle pawns sharing a cell are spread on.
pub const FAN_RADIUS: f64 = 8.0;

/// A grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: u8,
    pub col: u8,
}

const fn c(row: u8, col: u8) -> Cell {
    Cell { row, col }
}

/// Finishing cell in the middle of the board.
pub const CENTER: Cell = c(7, 7);

/// The shared track in walking order. Index `i` is absolute track cell `i`.
pub const TRACK_PATH: [Cell; TRACK_LEN as usize] = [
    c(6, 1), c(6, 2), c(6, 3), c(6, 4), c(6, 5),
    c(5, 6), c(4, 6), c(3, 6), c(2, 6), c(1, 6), c(0, 6),
    c(0, 7), c(0, 8),
    c(1, 8), c(2, 8), c(3, 8), c(4, 8), c(5, 8),
    c(6, 9), c(6, 10), c(6, 11), c(6, 12), c(6, 13), c(6, 14),
    c(7, 14), c(8, 14),
    c(8, 13), c(8, 12), c(8, 11), c(8, 10), c(8, 9),
    c(9, 8), c(10, 8), c(11, 8), c(12, 8), c(13, 8), c(14, 8),
    c(14, 7), c(14, 6),
    c(13, 6), c(12, 6), c(11, 6), c(10, 6), c(9, 6),
    c(8, 5), c(8, 4), c(8, 3), c(8, 2), c(8, 1), c(8, 0),
    c(7, 0), c(6, 0),
];

/// Private home stretches, indexed by `Color::index`.
const HOME_PATHS: [[Cell; 6]; 4] = [
    // red
    [c(1, 7), c(2, 7), c(3, 7), c(4, 7), c(5, 7), c(6, 7)],
    // blue
    [c(13, 7), c(12, 7), c(11, 7), c(10, 7), c(9, 7), c(8, 7)],
    // green
    [c(7, 13), c(7, 12), c(7, 11), c(7, 10), c(7, 9), c(7, 8)],
    // yellow
    [c(7, 1), c(7, 2), c(7, 3), c(7, 4), c(7, 5), c(7, 6)],
];

/// Base slots, indexed by `Color::index` then pawn ordinal.
const BASE_SLOTS: [[Cell; 4]; 4] = [
    [c(1, 1), c(1, 4), c(4, 1), c(4, 4)],
    [c(10, 10), c(10, 13), c(13, 10), c(13, 13)],
    [c(1, 10), c(1, 13), c(4, 10), c(4, 13)],
    [c(10, 1), c(10, 4), c(13, 1), c(13, 4)],
];

/// A pixel position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[must_use]
pub fn home_path(color: Color) -> &'static [Cell; 6] {
    &HOME_PATHS[color.index()]
}

#[must_use]
pub fn base_slot(color: Color, ordinal: usize) -> Cell {
    BASE_SLOTS[color.index()][ordinal % 4]
}

/// Grid cell for a raw position. `None` for positions outside `-1..=58`.
#[must_use]
pub fn cell_for(color: Color, position: i8, ordinal: usize) -> Option<Cell> {
    let cell = match Square::from_position(position)? {
        Square::Base => base_slot(color, ordinal),
        Square::Track(relative) => {
            let index = (relative as usize + entry_offset(color) as usize) % TRACK_LEN as usize;
            TRACK_PATH[index]
        }
        Square::HomeStretch(step) => home_path(color)[step as usize],
        Square::Finished => CENTER,
    };
    Some(cell)
}

/// Pixel offset for the `index`th of `len` pawns sharing a cell.
#[must_use]
pub fn fan_offset(index: usize, len: usize) -> (f64, f64) {
    if len <= 1 || index >= len {
        return (0.0, 0.0);
    }
    let angle = (index as f64 / len as f64) * std::f64::consts::TAU;
    (angle.cos() * FAN_RADIUS, angle.sin() * FAN_RADIUS)
}

/// Pixel centre of `cell`, fanned out for the `index`th of `len` occupants.
#[must_use]
pub fn coordinates_at(cell: Cell, index: usize, len: usize) -> Point {
    let (dx, dy) = fan_offset(index, len);
    Point {
        x: f64::from(cell.col) * CELL_SIZE + CELL_SIZE / 2.0 + dx,
        y: f64::from(cell.row) * CELL_SIZE + CELL_SIZE / 2.0 + dy,
    }
}

/// Ordinal of a pawn among its owner's pawns, in snapshot order.
fn ordinal_of(pawn: &Pawn, state: &GameState) -> usize {
    state
        .pawns
        .iter()
        .filter(|p| p.owner_id == pawn.owner_id)
        .position(|p| p.id == pawn.id)
        .unwrap_or(0)
}

/// Grid cell the pawn currently resolves to.
#[must_use]
pub fn resolved_cell(pawn: &Pawn, state: &GameState) -> Option<Cell> {
    cell_for(pawn.color, pawn.position, ordinal_of(pawn, state))
}

/// Pixel coordinates for a pawn in `state`.
///
/// Pawns sharing a track or home-stretch cell are spread by their order in
/// `state.pawns`; base slots and the centre are never fanned.
#[must_use]
pub fn coordinates_for(pawn: &Pawn, state: &GameState) -> Point {
    let Some(cell) = resolved_cell(pawn, state) else {
        return coordinates_at(CENTER, 0, 1);
    };

    if !pawn.is_in_play() {
        return coordinates_at(cell, 0, 1);
    }

    let group: Vec<&PawnId> = state
        .pawns
        .iter()
        .filter(|p| p.is_in_play() && resolved_cell(p, state) == Some(cell))
        .map(|p| &p.id)
        .collect();
    let index = group.iter().position(|id| **id == pawn.id).unwrap_or(0);

    coordinates_at(cell, index, group.len())
}

/// Coordinates for every pawn, in snapshot order.
#[must_use]
pub fn layout(state: &GameState) -> Vec<(PawnId, Point)> {
    state
        .pawns
        .iter()
        .map(|p| (p.id.clone(), coordinates_for(p, state)))
        .collect()
}
