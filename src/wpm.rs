//! Words-per-minute tracking.

use crate::rules::CHARS_PER_WORD;
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct WpmTracker {
    start: Option<Instant>,
    total_chars: u32,
    wpm: u32,
}

impl WpmTracker {
    /// Begin measuring. Returns true only on the first call.
    pub fn start(&mut self, now: Instant) -> bool {
        if self.start.is_some() {
            return false;
        }
        self.start = Some(now);
        true
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    /// Count a finished word plus its trailing separator.
    pub fn record_word(&mut self, word_len: usize) {
        self.total_chars = self.total_chars.saturating_add(word_len as u32 + 1);
    }

    pub fn total_chars(&self) -> u32 {
        self.total_chars
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    /// Recompute from elapsed time. Returns the new value when it changed.
    pub fn recompute(&mut self, now: Instant) -> Option<u32> {
        let start = self.start?;
        let minutes = now.saturating_duration_since(start).as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            return None;
        }
        let wpm = ((self.total_chars as f64 / CHARS_PER_WORD) / minutes).round() as u32;
        if wpm == self.wpm {
            return None;
        }
        self.wpm = wpm;
        Some(wpm)
    }
}
