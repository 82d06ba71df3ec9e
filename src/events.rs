//! Lane identities and the events a match emits to the frontend.

use crate::words::Word;
use std::fmt;

/// Handle for one side of the match. Lanes refer to each other only through this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneId {
    Player,
    Opponent,
}

impl LaneId {
    pub const ALL: [Self; 2] = [Self::Player, Self::Opponent];

    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Self::Player => 0,
            Self::Opponent => 1,
        }
    }

    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Player => Self::Opponent,
            Self::Opponent => Self::Player,
        }
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Player => f.write_str("player"),
            Self::Opponent => f.write_str("ai"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    /// The word at `index` of the first row is now the typing target.
    WordActivated(LaneId, usize),
    WordCompleted(LaneId, Word),
    RowCompleted(LaneId),
    PenaltyLinesAdded(LaneId, usize),
    ComboChanged(LaneId, u32),
    WpmChanged(LaneId, u32),
    /// Typed input diverged (or the AI fumbled); the active word was reset.
    Mistake(LaneId),
    /// The lane's rows exceeded the maximum: it lost.
    Overflow(LaneId),
    MatchEnded { winner: LaneId },
}
