//! Board geometry: position encoding, the shared track, safe cells and the
//! mapping from pawn positions to pixel coordinates.

pub mod track;
pub mod coords;

pub use track::{can_move, destination, is_safe_cell, Square, SAFE_CELLS};
pub use coords::{coordinates_for, layout, Cell, Point};
