//! Fixed match rules: lane geometry, AI odds and pacing constants.

use std::time::Duration;

/// Words per row.
pub const GRID_COLS: usize = 5;
/// A lane whose row count exceeds this loses.
pub const MAX_ROWS: usize = 8;
/// Rows dealt at match start; also the refill threshold.
pub const INITIAL_ROWS: usize = 4;
/// AI chance per word to fumble (flushes combo, no completion).
pub const MISTAKE_CHANCE: f64 = 0.05;
/// AI chance per word to send its combo.
pub const ATTACK_CHANCE: f64 = 0.10;
/// The AI always types this much faster than the player.
pub const AI_WPM_OFFSET: u32 = 10;
/// Player WPM assumed until a non-zero rate is measured.
pub const FALLBACK_PLAYER_WPM: u32 = 20;
pub const WPM_TICK_MS: u64 = 1000;

/// Characters per "word" in the WPM definition.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Rule set handed to a match. `Default` is the shipped game; tests build
/// variants (e.g. a certain mistake roll) through struct update syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    pub grid_cols: usize,
    pub max_rows: usize,
    pub initial_rows: usize,
    pub mistake_chance: f64,
    pub attack_chance: f64,
    pub ai_wpm_offset: u32,
    pub fallback_player_wpm: u32,
    pub wpm_tick: Duration,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            grid_cols: GRID_COLS,
            max_rows: MAX_ROWS,
            initial_rows: INITIAL_ROWS,
            mistake_chance: MISTAKE_CHANCE,
            attack_chance: ATTACK_CHANCE,
            ai_wpm_offset: AI_WPM_OFFSET,
            fallback_player_wpm: FALLBACK_PLAYER_WPM,
            wpm_tick: Duration::from_millis(WPM_TICK_MS),
        }
    }
}

impl Rules {
    /// Word count of a freshly dealt lane; queues longer than this carry a penalty backlog.
    #[inline]
    pub fn initial_words(&self) -> usize {
        self.initial_rows * self.grid_cols
    }
}
