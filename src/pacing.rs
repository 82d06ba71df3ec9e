//! AI pacing: one scheduled word completion at a time, timed from the
//! player's live WPM.

use crate::rules::{CHARS_PER_WORD, Rules};
use crate::timer::Timeout;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No pending tick. Terminal once the driver has been stopped or halted.
    Idle,
    Scheduled { due: Instant },
}

/// Outcome of the dice for one AI word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiTurn {
    /// Fumble: flush combo, no completion, no attack roll.
    Mistake,
    Complete { attack: bool },
}

/// Target AI speed for a given player speed. A player at 0 WPM (not started,
/// or too slow to register) counts as the fallback rate.
pub fn ai_wpm(player_wpm: u32, rules: &Rules) -> u32 {
    let base = if player_wpm == 0 {
        rules.fallback_player_wpm
    } else {
        player_wpm
    };
    base + rules.ai_wpm_offset
}

/// Time to type one character at `wpm`, in milliseconds.
pub fn char_delay_ms(wpm: u32) -> f64 {
    60_000.0 / (f64::from(wpm.max(1)) * CHARS_PER_WORD)
}

pub fn word_delay(wpm: u32, word_len: usize) -> Duration {
    let ms = char_delay_ms(wpm) * word_len as f64;
    Duration::from_micros((ms * 1000.0).round() as u64)
}

#[derive(Debug, Clone)]
pub struct PacingDriver {
    timer: Timeout,
    rng: ChaCha8Rng,
    mistake_chance: f64,
    attack_chance: f64,
}

impl PacingDriver {
    pub fn new(seed: u64, rules: &Rules) -> Self {
        Self {
            timer: Timeout::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            mistake_chance: rules.mistake_chance.clamp(0.0, 1.0),
            attack_chance: rules.attack_chance.clamp(0.0, 1.0),
        }
    }

    pub fn state(&self) -> DriverState {
        match self.timer.due() {
            Some(due) => DriverState::Scheduled { due },
            None => DriverState::Idle,
        }
    }

    #[cfg(test)]
    pub fn is_stopped(&self) -> bool {
        self.timer.is_cancelled()
    }

    /// Schedule the next word `delay` after `from` (the deadline that just
    /// fired, or the match start). A deadline already behind `now` counts
    /// from `now` instead, so a stalled loop never catches up in a burst.
    /// Returns the delay, or `None` if stopped.
    pub fn schedule(
        &mut self,
        from: Instant,
        now: Instant,
        wpm: u32,
        word_len: usize,
    ) -> Option<Duration> {
        let delay = word_delay(wpm, word_len);
        let at = from + delay;
        let at = if at > now { at } else { now + delay };
        self.timer.schedule(at).then_some(delay)
    }

    /// Cancel any pending tick. Nothing fires afterwards.
    pub fn stop(&mut self) {
        self.timer.cancel();
    }

    /// The deadline of the pending tick once `now` reaches it; consumes it.
    pub fn fire(&mut self, now: Instant) -> Option<Instant> {
        let due = self.timer.due()?;
        self.timer.fire(now).then_some(due)
    }

    /// Mistake is rolled first and short-circuits the attack roll.
    pub fn roll(&mut self) -> AiTurn {
        if self.rng.gen_bool(self.mistake_chance) {
            return AiTurn::Mistake;
        }
        AiTurn::Complete {
            attack: self.rng.gen_bool(self.attack_chance),
        }
    }
}
