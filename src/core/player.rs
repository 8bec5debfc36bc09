//! Player identity: ids, team colors and animal avatars.
//!
//! ## PlayerId
//!
//! Client-asserted string identifier. In networked games this is the relay
//! connection id; local games use `local-N`.
//!
//! ## Color
//!
//! One of the four track colors. Each color owns an entry offset into the
//! shared track, a private home stretch and four base slots (see `board`).

use serde::{Deserialize, Serialize};

/// Player identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier used for the `index`th seat of a hot-seat game.
    #[must_use]
    pub fn local(index: usize) -> Self {
        Self(format!("local-{index}"))
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Team color. Serialized lowercase (`"red"`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Red,
    Blue,
    Green,
    Yellow,
}

impl Color {
    /// All colors in seat-assignment order.
    pub const ALL: [Color; 4] = [Color::Red, Color::Blue, Color::Green, Color::Yellow];

    /// Color given to the `seat`th player of a local game.
    #[must_use]
    pub const fn for_seat(seat: usize) -> Self {
        Self::ALL[seat % 4]
    }

    /// Dense index, usable for per-color tables.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Color::Red => 0,
            Color::Blue => 1,
            Color::Green => 2,
            Color::Yellow => 3,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Yellow => "yellow",
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Animal avatar. Purely cosmetic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Animal {
    #[default]
    Lion,
    Zebra,
    Giraffe,
    Elephant,
    Monkey,
    Hippo,
}

impl Animal {
    pub const ALL: [Animal; 6] = [
        Animal::Lion,
        Animal::Zebra,
        Animal::Giraffe,
        Animal::Elephant,
        Animal::Monkey,
        Animal::Hippo,
    ];
}

/// A seated player. Immutable for the game's duration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub animal: Animal,
    pub color: Color,
}

impl Player {
    /// Create a player with the default avatar.
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>, color: Color) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            animal: Animal::default(),
            color,
        }
    }

    /// Set the animal avatar.
    #[must_use]
    pub fn with_animal(mut self, animal: Animal) -> Self {
        self.animal = animal;
        self
    }

    /// Player for seat `index` of a hot-seat game: `local-N`, seat color,
    /// "You" for the first seat and "Player N" for the rest.
    #[must_use]
    pub fn local(index: usize, animal: Animal) -> Self {
        let name = if index == 0 {
            "You".to_string()
        } else {
            format!("Player {}", index + 1)
        };
        Self {
            id: PlayerId::local(index),
            name,
            animal,
            color: Color::for_seat(index),
        }
    }
}
