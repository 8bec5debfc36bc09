//! Dice: the engine's only source of randomness.
//!
//! ## Key Features
//!
//! - **Injectable**: transitions take `&mut impl Dice`, never a global RNG
//! - **Deterministic**: `GameRng` with the same seed produces the same rolls
//! - **Serializable**: O(1) state capture and restore for resuming a session
//! - **Scriptable**: `ScriptedDice` replays a fixed sequence in tests
//!
//! ```
//! use ludo_engine::core::{Dice, GameRng};
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.roll(), b.roll());
//! ```

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// A single die face, always in `1..=6`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct DiceValue(u8);

impl DiceValue {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    /// The face that releases a pawn from base and grants a bonus turn.
    pub const SIX: DiceValue = DiceValue(6);

    /// Create a dice value, `None` outside `1..=6`.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value >= Self::MIN && value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Raw face value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_six(self) -> bool {
        self.0 == Self::MAX
    }

    /// Every face, lowest first.
    pub fn all() -> impl Iterator<Item = DiceValue> {
        (Self::MIN..=Self::MAX).map(DiceValue)
    }
}

impl TryFrom<u8> for DiceValue {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("dice value {value} outside 1..=6"))
    }
}

impl From<DiceValue> for u8 {
    fn from(value: DiceValue) -> Self {
        value.0
    }
}

impl std::fmt::Display for DiceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Dice capability. Implementations must return a uniformly distributed face.
pub trait Dice {
    fn roll(&mut self) -> DiceValue;
}

impl<D: Dice + ?Sized> Dice for &mut D {
    fn roll(&mut self) -> DiceValue {
        (**self).roll()
    }
}

/// Deterministic seeded dice.
///
/// Uses ChaCha8 for speed while keeping good statistical quality.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

impl Dice for GameRng {
    fn roll(&mut self) -> DiceValue {
        DiceValue(self.inner.gen_range(DiceValue::MIN..=DiceValue::MAX))
    }
}

/// Serializable RNG state.
///
/// Uses the ChaCha8 word position so capture is O(1) regardless of how many
/// rolls have been made.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter)
    pub word_pos: u128,
}

/// Replays a fixed list of faces, cycling when exhausted.
#[derive(Clone, Debug)]
pub struct ScriptedDice {
    faces: VecDeque<DiceValue>,
}

impl ScriptedDice {
    /// Build from raw faces.
    ///
    /// # Panics
    ///
    /// Panics if the script is empty or contains a face outside `1..=6`.
    #[must_use]
    pub fn new(faces: &[u8]) -> Self {
        assert!(!faces.is_empty(), "Dice script must not be empty");
        let faces = faces
            .iter()
            .map(|&f| DiceValue::new(f).unwrap_or_else(|| panic!("Invalid scripted face {f}")))
            .collect();
        Self { faces }
    }

    /// Number of faces left before the script wraps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> DiceValue {
        // Never empty: `new` rejects empty scripts and we rotate in place.
        let face = self.faces.pop_front().unwrap_or(DiceValue::SIX);
        self.faces.push_back(face);
        face
    }
}
