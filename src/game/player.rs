use serde::{Deserialize, Serialize};

/// Occupant of a board slot, or the winner field of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Owner {
    #[default]
    None,
    PlayerOne,
    PlayerTwo,
}

impl Owner {
    /// The side this owner names, if any.
    pub fn side(self) -> Option<Side> {
        match self {
            Owner::None => None,
            Owner::PlayerOne => Some(Side::PlayerOne),
            Owner::PlayerTwo => Some(Side::PlayerTwo),
        }
    }

    pub fn is_none(self) -> bool {
        self == Owner::None
    }
}

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    PlayerOne,
    PlayerTwo,
}

impl Side {
    /// Get the other side
    pub fn other(self) -> Side {
        match self {
            Side::PlayerOne => Side::PlayerTwo,
            Side::PlayerTwo => Side::PlayerOne,
        }
    }

    /// Label used in logs and the UI header
    pub fn label(self) -> &'static str {
        match self {
            Side::PlayerOne => "PlayerOne",
            Side::PlayerTwo => "PlayerTwo",
        }
    }
}

impl From<Side> for Owner {
    fn from(side: Side) -> Self {
        match side {
            Side::PlayerOne => Owner::PlayerOne,
            Side::PlayerTwo => Owner::PlayerTwo,
        }
    }
}

/// A named participant playing one side.
///
/// Players carry no input logic: columns arrive from whoever drives the
/// [`Game`](super::Game), and a remote player's moves arrive as snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    name: String,
    side: Side,
}

impl Player {
    pub fn new(name: impl Into<String>, side: Side) -> Self {
        Player {
            name: name.into(),
            side,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn side(&self) -> Side {
        self.side
    }
}
