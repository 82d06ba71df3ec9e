//! One side of the match: word queue, cursor, combo and typing progress.
//!
//! The queue is a flat sequence of words read in rows of `row_width`. Only
//! the first row is typed; `cursor` points at the active word inside it.

use crate::events::{LaneId, MatchEvent};
use crate::rules::Rules;
use crate::words::{Word, WordSource};
use crate::wpm::WpmTracker;
use std::collections::VecDeque;

/// Penalty to be delivered to another lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attack {
    pub target: LaneId,
    pub lines: usize,
}

/// Classification of a new input-field value against the active word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputVerdict {
    /// Still a prefix of the target word.
    Progress,
    /// Target word followed by a space was typed.
    WordDone,
    Mistake,
    /// No active word (stalled lane).
    Idle,
}

#[derive(Debug, Clone)]
pub struct Lane {
    pub id: LaneId,
    opponent: Option<LaneId>,
    queue: VecDeque<Word>,
    row_width: usize,
    max_rows: usize,
    initial_rows: usize,
    cursor: usize,
    combo: u32,
    /// Current input-field value (player lane).
    typed: String,
    /// Input accepted for the words already finished in this row.
    correct_prefix: String,
    pub wpm: WpmTracker,
}

impl Lane {
    /// Deal `initial_rows` rows of fresh words.
    pub fn new(id: LaneId, rules: &Rules, words: &mut impl WordSource) -> Self {
        let queue = (0..rules.initial_words()).map(|_| words.next_word()).collect();
        Self {
            id,
            opponent: None,
            queue,
            row_width: rules.grid_cols.max(1),
            max_rows: rules.max_rows,
            initial_rows: rules.initial_rows,
            cursor: 0,
            combo: 0,
            typed: String::new(),
            correct_prefix: String::new(),
            wpm: WpmTracker::default(),
        }
    }

    pub fn link(&mut self, opponent: LaneId) {
        self.opponent = Some(opponent);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = Word> + '_ {
        self.queue.iter().copied()
    }

    pub fn row_width(&self) -> usize {
        self.row_width
    }

    pub fn max_rows(&self) -> usize {
        self.max_rows
    }

    pub fn initial_rows(&self) -> usize {
        self.initial_rows
    }

    /// Rows occupied, counting a partial last row.
    pub fn rows(&self) -> usize {
        self.queue.len().div_ceil(self.row_width)
    }

    pub fn is_overflowing(&self) -> bool {
        self.rows() > self.max_rows
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn typed(&self) -> &str {
        &self.typed
    }

    pub fn correct_prefix(&self) -> &str {
        &self.correct_prefix
    }

    /// Characters typed toward the active word.
    pub fn active_typing(&self) -> &str {
        self.typed
            .strip_prefix(self.correct_prefix.as_str())
            .unwrap_or_default()
    }

    pub fn current_word(&self) -> Option<Word> {
        self.queue.get(self.cursor).copied()
    }

    /// Record a new input-field value and classify it. On `WordDone` the value
    /// becomes the confirmed prefix; the caller then completes the word.
    pub fn accept_input(&mut self, value: &str) -> InputVerdict {
        self.typed.clear();
        self.typed.push_str(value);
        let Some(target) = self.current_word() else {
            return InputVerdict::Idle;
        };
        let Some(active) = value.strip_prefix(self.correct_prefix.as_str()) else {
            return InputVerdict::Mistake;
        };
        if active.strip_suffix(' ') == Some(target) {
            self.correct_prefix.clear();
            self.correct_prefix.push_str(value);
            return InputVerdict::WordDone;
        }
        if target.starts_with(active) {
            InputVerdict::Progress
        } else {
            InputVerdict::Mistake
        }
    }

    /// Drop in-progress characters, keeping the words already confirmed in this row.
    pub fn reset_input(&mut self) {
        self.typed.clone_from(&self.correct_prefix);
    }

    /// Finish the active word: combo, WPM chars, cursor advance, maybe a row.
    pub fn complete_word(
        &mut self,
        words: &mut impl WordSource,
        events: &mut Vec<MatchEvent>,
    ) -> Option<Word> {
        let word = self.current_word()?;
        self.wpm.record_word(word.len());
        self.combo += 1;
        events.push(MatchEvent::WordCompleted(self.id, word));
        events.push(MatchEvent::ComboChanged(self.id, self.combo));
        self.cursor += 1;
        if self.cursor >= self.row_width {
            self.complete_row(words, events);
        } else {
            events.push(MatchEvent::WordActivated(self.id, self.cursor));
        }
        Some(word)
    }

    /// Remove the first row. Refill with one fresh row only when the queue
    /// carried no penalty backlog before the removal.
    pub fn complete_row(&mut self, words: &mut impl WordSource, events: &mut Vec<MatchEvent>) {
        let clearing_penalty = self.queue.len() > self.initial_rows * self.row_width;
        let take = self.row_width.min(self.queue.len());
        self.queue.drain(..take);
        if !clearing_penalty {
            self.queue.extend((0..self.row_width).map(|_| words.next_word()));
        }
        self.cursor = 0;
        self.typed.clear();
        self.correct_prefix.clear();
        events.push(MatchEvent::RowCompleted(self.id));
        if !self.queue.is_empty() {
            events.push(MatchEvent::WordActivated(self.id, 0));
        }
    }

    /// Append `count` penalty words. Returns true if the lane overflowed.
    pub fn add_penalty_lines(
        &mut self,
        count: usize,
        words: &mut impl WordSource,
        events: &mut Vec<MatchEvent>,
    ) -> bool {
        if count == 0 {
            return false;
        }
        self.queue.extend((0..count).map(|_| words.next_word()));
        events.push(MatchEvent::PenaltyLinesAdded(self.id, count));
        if self.is_overflowing() {
            events.push(MatchEvent::Overflow(self.id));
            return true;
        }
        false
    }

    /// Flush the combo. No-op while the combo is zero.
    pub fn trigger_attack(&mut self, events: &mut Vec<MatchEvent>) -> Option<Attack> {
        if self.combo == 0 {
            return None;
        }
        let lines = self.combo as usize;
        self.combo = 0;
        events.push(MatchEvent::ComboChanged(self.id, 0));
        self.opponent.map(|target| Attack { target, lines })
    }
}
