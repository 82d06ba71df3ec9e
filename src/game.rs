//! Match state: two linked lanes, the AI pacing driver and the WPM ticks.
//!
//! All mutation happens inside `player_input`, `player_send_attack` and
//! `tick`, each run to completion by the caller's loop. Every entry point is a
//! no-op once the match has ended.

use crate::events::{LaneId, MatchEvent};
use crate::lane::{InputVerdict, Lane};
use crate::pacing::{AiTurn, PacingDriver, ai_wpm};
use crate::rules::Rules;
use crate::timer::Interval;
use crate::words::WordSource;
use std::time::Instant;
use tracing::{debug, info};

/// Decorrelates the AI dice from the word draws when both come from one seed.
const DRIVER_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    Ended { winner: LaneId },
}

#[derive(Debug)]
pub struct Match<W: WordSource> {
    rules: Rules,
    lanes: [Lane; 2],
    words: W,
    driver: PacingDriver,
    wpm_ticks: [Interval; 2],
    phase: Phase,
    events: Vec<MatchEvent>,
}

impl<W: WordSource> Match<W> {
    /// Deal both lanes, link them and start the AI (its WPM clock runs from `now`).
    pub fn new(rules: Rules, mut words: W, seed: u64, now: Instant) -> Self {
        let mut player = Lane::new(LaneId::Player, &rules, &mut words);
        let mut opponent = Lane::new(LaneId::Opponent, &rules, &mut words);
        player.link(LaneId::Opponent);
        opponent.link(LaneId::Player);

        let driver = PacingDriver::new(seed ^ DRIVER_SEED_SALT, &rules);
        let wpm_ticks = [Interval::new(rules.wpm_tick), Interval::new(rules.wpm_tick)];
        let mut m = Self {
            rules,
            lanes: [player, opponent],
            words,
            driver,
            wpm_ticks,
            phase: Phase::Playing,
            events: Vec::new(),
        };
        for id in LaneId::ALL {
            m.events.push(MatchEvent::WordActivated(id, 0));
        }
        m.lane_mut(LaneId::Opponent).wpm.start(now);
        m.wpm_ticks[LaneId::Opponent.index()].start(now);
        m.schedule_ai(now, now);
        info!(seed, "match started");
        m
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn lane(&self, id: LaneId) -> &Lane {
        &self.lanes[id.index()]
    }

    fn lane_mut(&mut self, id: LaneId) -> &mut Lane {
        &mut self.lanes[id.index()]
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended { .. })
    }

    pub fn winner(&self) -> Option<LaneId> {
        match self.phase {
            Phase::Ended { winner } => Some(winner),
            Phase::Playing => None,
        }
    }

    #[cfg(test)]
    pub fn driver(&self) -> &PacingDriver {
        &self.driver
    }

    /// Hand over everything emitted since the last call.
    pub fn take_events(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    /// New value of the player's input field after a keystroke.
    pub fn player_input(&mut self, value: &str, now: Instant) {
        if self.is_ended() {
            return;
        }
        let lane = self.lane_mut(LaneId::Player);
        if lane.wpm.start(now) {
            self.wpm_ticks[LaneId::Player.index()].start(now);
            debug!("player started typing");
        }
        match self.lane_mut(LaneId::Player).accept_input(value) {
            InputVerdict::Progress | InputVerdict::Idle => {}
            InputVerdict::Mistake => self.mistake(LaneId::Player),
            InputVerdict::WordDone => {
                let (lanes, words, events) = (&mut self.lanes, &mut self.words, &mut self.events);
                lanes[LaneId::Player.index()].complete_word(words, events);
            }
        }
    }

    /// Explicit "send" key: flush the combo and drop the half-typed word.
    pub fn player_send_attack(&mut self) {
        if self.is_ended() {
            return;
        }
        self.attack(LaneId::Player);
        if !self.is_ended() {
            self.lane_mut(LaneId::Player).reset_input();
        }
    }

    /// Advance timers to `now`: WPM recomputation and at most one AI word.
    pub fn tick(&mut self, now: Instant) {
        if self.is_ended() {
            return;
        }
        for id in LaneId::ALL {
            if self.wpm_ticks[id.index()].poll(now) {
                if let Some(wpm) = self.lane_mut(id).wpm.recompute(now) {
                    self.events.push(MatchEvent::WpmChanged(id, wpm));
                }
            }
        }
        if let Some(due) = self.driver.fire(now) {
            self.ai_turn();
            if !self.is_ended() {
                self.schedule_ai(due, now);
            }
        }
    }

    fn ai_turn(&mut self) {
        match self.driver.roll() {
            AiTurn::Mistake => {
                debug!("ai fumbled");
                self.mistake(LaneId::Opponent);
            }
            AiTurn::Complete { attack } => {
                if attack {
                    self.attack(LaneId::Opponent);
                    if self.is_ended() {
                        return;
                    }
                }
                let (lanes, words, events) = (&mut self.lanes, &mut self.words, &mut self.events);
                lanes[LaneId::Opponent.index()].complete_word(words, events);
            }
        }
    }

    /// Queue the AI's next word from the player's current pace; halt for good
    /// when the AI lane has no word under its cursor.
    fn schedule_ai(&mut self, from: Instant, now: Instant) {
        let Some(word) = self.lane(LaneId::Opponent).current_word() else {
            self.driver.stop();
            info!("ai lane stalled, pacing driver halted");
            return;
        };
        let wpm = ai_wpm(self.lane(LaneId::Player).wpm.wpm(), &self.rules);
        if let Some(delay) = self.driver.schedule(from, now, wpm, word.len()) {
            debug!(word, wpm, delay_ms = delay.as_millis() as u64, "ai word scheduled");
        }
    }

    fn mistake(&mut self, id: LaneId) {
        self.events.push(MatchEvent::Mistake(id));
        self.attack(id);
        if !self.is_ended() {
            self.lane_mut(id).reset_input();
        }
    }

    fn attack(&mut self, id: LaneId) {
        let (lanes, events) = (&mut self.lanes, &mut self.events);
        if let Some(attack) = lanes[id.index()].trigger_attack(events) {
            info!(from = %id, to = %attack.target, lines = attack.lines, "attack");
            self.add_penalty_lines(attack.target, attack.lines);
        }
    }

    fn add_penalty_lines(&mut self, target: LaneId, count: usize) {
        let (lanes, words, events) = (&mut self.lanes, &mut self.words, &mut self.events);
        if lanes[target.index()].add_penalty_lines(count, words, events) {
            self.finish(target);
        }
    }

    fn finish(&mut self, loser: LaneId) {
        let winner = loser.opponent();
        self.phase = Phase::Ended { winner };
        self.driver.stop();
        for t in &mut self.wpm_ticks {
            t.cancel();
        }
        self.events.push(MatchEvent::MatchEnded { winner });
        info!(%winner, %loser, "match ended");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pacing::DriverState;
    use crate::words::CycleWords;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    /// AI that never fumbles and never attacks.
    fn calm_rules() -> Rules {
        Rules {
            mistake_chance: 0.0,
            attack_chance: 0.0,
            ..Rules::default()
        }
    }

    fn new_match(rules: Rules, words: &[&'static str], t0: Instant) -> Match<CycleWords> {
        Match::new(rules, CycleWords::new(words), 42, t0)
    }

    /// Type `word ` onto the current input value one key at a time.
    fn type_word(m: &mut Match<CycleWords>, word: &str, now: Instant) {
        for c in word.chars().chain(std::iter::once(' ')) {
            let mut value = m.lane(LaneId::Player).typed().to_string();
            value.push(c);
            m.player_input(&value, now);
        }
    }

    #[test]
    fn player_row_clear_builds_combo_and_refills() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        for _ in 0..5 {
            type_word(&mut m, "four", t0);
        }
        let p = m.lane(LaneId::Player);
        assert_eq!(p.combo(), 5);
        assert_eq!(p.len(), 20);
        assert_eq!(p.cursor(), 0);
        assert_eq!(p.typed(), "");
        let ev = m.take_events();
        assert!(ev.contains(&MatchEvent::RowCompleted(LaneId::Player)));
        assert!(ev.contains(&MatchEvent::ComboChanged(LaneId::Player, 5)));
    }

    #[test]
    fn mistake_sends_combo_and_resets_word() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        type_word(&mut m, "four", t0);
        type_word(&mut m, "four", t0);
        m.player_input("four four fx", t0);
        let p = m.lane(LaneId::Player);
        assert_eq!(p.combo(), 0);
        assert_eq!(p.typed(), "four four ");
        assert_eq!(p.cursor(), 2);
        assert_eq!(m.lane(LaneId::Opponent).len(), 22);
        let ev = m.take_events();
        assert!(ev.contains(&MatchEvent::Mistake(LaneId::Player)));
        assert!(ev.contains(&MatchEvent::PenaltyLinesAdded(LaneId::Opponent, 2)));
    }

    #[test]
    fn mistake_with_zero_combo_sends_nothing() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        m.take_events();
        m.player_input("x", t0);
        assert_eq!(m.lane(LaneId::Opponent).len(), 20);
        assert_eq!(m.lane(LaneId::Player).typed(), "");
        assert_eq!(m.take_events(), [MatchEvent::Mistake(LaneId::Player)]);
    }

    #[test]
    fn send_key_flushes_combo_and_drops_partial_word() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        type_word(&mut m, "four", t0);
        m.player_input("four fo", t0);
        m.player_send_attack();
        assert_eq!(m.lane(LaneId::Player).combo(), 0);
        assert_eq!(m.lane(LaneId::Player).typed(), "four ");
        assert_eq!(m.lane(LaneId::Opponent).len(), 21);
        m.player_send_attack();
        assert_eq!(m.lane(LaneId::Opponent).len(), 21, "zero combo is idempotent");
    }

    #[test]
    fn ai_word_delay_tracks_player_wpm() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        // Player idle: 20 + 10 = 30 WPM -> 400 ms/char -> 1600 ms.
        assert_eq!(m.driver().state(), DriverState::Scheduled { due: t0 + ms(1600) });

        m.tick(t0 + ms(1599));
        assert_eq!(m.lane(LaneId::Opponent).cursor(), 0);
        m.tick(t0 + ms(1600));
        assert_eq!(m.lane(LaneId::Opponent).cursor(), 1);
        assert_eq!(m.lane(LaneId::Opponent).combo(), 1);
        assert_eq!(m.driver().state(), DriverState::Scheduled { due: t0 + ms(3200) });
    }

    #[test]
    fn late_frame_does_not_slow_the_ai() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        m.tick(t0 + ms(1633));
        assert_eq!(m.lane(LaneId::Opponent).cursor(), 1);
        assert_eq!(m.driver().state(), DriverState::Scheduled { due: t0 + ms(3200) });
    }

    #[test]
    fn ai_speeds_up_with_player() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        // 6 words × 5 chars = 30 chars = 6 "words" in 12 s -> 30 WPM.
        for _ in 0..6 {
            type_word(&mut m, "four", t0);
        }
        m.tick(t0 + ms(12_000));
        assert_eq!(m.lane(LaneId::Player).wpm.wpm(), 30);
        // The AI tick due at 1600 fired during that same tick; it is far behind,
        // so the next word at 40 WPM counts from now.
        assert_eq!(
            m.driver().state(),
            DriverState::Scheduled { due: t0 + ms(12_000) + ms(1200) }
        );
    }

    #[test]
    fn ai_mistake_only_flushes_combo() {
        let t0 = Instant::now();
        let rules = Rules {
            mistake_chance: 1.0,
            attack_chance: 1.0,
            ..Rules::default()
        };
        let mut m = new_match(rules, &["four"], t0);
        // Give the AI a combo of 3 by hand.
        {
            let (lanes, words, events) = (&mut m.lanes, &mut m.words, &mut m.events);
            for _ in 0..3 {
                lanes[LaneId::Opponent.index()].complete_word(words, events);
            }
        }
        m.take_events();
        m.tick(t0 + ms(1600));
        let ai = m.lane(LaneId::Opponent);
        assert_eq!(ai.combo(), 0);
        assert_eq!(ai.cursor(), 3, "no word completed on a fumble");
        assert_eq!(m.lane(LaneId::Player).len(), 23);
        let ev = m.take_events();
        assert!(ev.contains(&MatchEvent::Mistake(LaneId::Opponent)));
        assert!(ev.contains(&MatchEvent::PenaltyLinesAdded(LaneId::Player, 3)));
        assert!(!ev.iter().any(|e| matches!(e, MatchEvent::WordCompleted(..))));
    }

    #[test]
    fn ai_attack_then_completes_word() {
        let t0 = Instant::now();
        let rules = Rules {
            mistake_chance: 0.0,
            attack_chance: 1.0,
            ..Rules::default()
        };
        let mut m = new_match(rules, &["four"], t0);
        m.tick(t0 + ms(1600));
        // First word: attack with zero combo is a no-op, then the word lands.
        assert_eq!(m.lane(LaneId::Opponent).combo(), 1);
        m.tick(t0 + ms(3200));
        // Second: combo 1 sent, then the new word makes it 1 again.
        assert_eq!(m.lane(LaneId::Player).len(), 21);
        assert_eq!(m.lane(LaneId::Opponent).combo(), 1);
        assert_eq!(m.lane(LaneId::Opponent).cursor(), 2);
    }

    #[test]
    fn overflow_ends_match_and_silences_timers() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        m.add_penalty_lines(LaneId::Player, 16);
        assert!(!m.is_ended());
        m.add_penalty_lines(LaneId::Player, 5);
        assert_eq!(m.winner(), Some(LaneId::Opponent));
        assert!(m.driver().is_stopped());
        assert_eq!(m.driver().state(), DriverState::Idle);
        let ev = m.take_events();
        let n = ev.len();
        assert_eq!(ev[n - 2], MatchEvent::Overflow(LaneId::Player));
        assert_eq!(
            ev[n - 1],
            MatchEvent::MatchEnded {
                winner: LaneId::Opponent
            }
        );

        // Stray timer callbacks and keystrokes after the end change nothing.
        let ai_before = m.lane(LaneId::Opponent).clone();
        m.tick(t0 + ms(60_000));
        m.player_input("f", t0 + ms(60_000));
        m.player_send_attack();
        assert!(m.take_events().is_empty());
        assert_eq!(m.lane(LaneId::Opponent).cursor(), ai_before.cursor());
        assert_eq!(m.lane(LaneId::Opponent).len(), ai_before.len());
        assert_eq!(m.lane(LaneId::Player).typed(), "");
    }

    /// Pad the player lane to exactly 8 rows and give the AI a combo of 3.
    fn player_at_cap_ai_armed(rules: Rules, t0: Instant) -> Match<CycleWords> {
        let mut m = new_match(rules, &["four"], t0);
        m.add_penalty_lines(LaneId::Player, 20);
        {
            let (lanes, words, events) = (&mut m.lanes, &mut m.words, &mut m.events);
            for _ in 0..3 {
                lanes[LaneId::Opponent.index()].complete_word(words, events);
            }
        }
        assert!(!m.is_ended());
        assert_eq!(m.lane(LaneId::Player).len(), 40);
        m.take_events();
        m
    }

    fn assert_ai_frozen_after_win(m: &mut Match<CycleWords>, t0: Instant) {
        assert_eq!(m.winner(), Some(LaneId::Opponent));
        assert_eq!(m.lane(LaneId::Player).len(), 43);
        assert_eq!(m.lane(LaneId::Opponent).cursor(), 3, "word not completed after the end");
        assert_eq!(m.driver().state(), DriverState::Idle);
        let ev = m.take_events();
        assert_eq!(
            ev.last(),
            Some(&MatchEvent::MatchEnded {
                winner: LaneId::Opponent
            })
        );
        assert!(!ev.iter().any(|e| matches!(e, MatchEvent::WordCompleted(..))));

        m.tick(t0 + ms(100_000));
        assert_eq!(m.lane(LaneId::Opponent).cursor(), 3);
        assert!(m.take_events().is_empty());
    }

    #[test]
    fn ai_attack_that_caps_the_player_ends_the_turn() {
        let t0 = Instant::now();
        let rules = Rules {
            mistake_chance: 0.0,
            attack_chance: 1.0,
            ..Rules::default()
        };
        let mut m = player_at_cap_ai_armed(rules, t0);
        m.tick(t0 + ms(1600));
        assert_ai_frozen_after_win(&mut m, t0);
    }

    #[test]
    fn ai_fumble_that_caps_the_player_ends_the_turn() {
        let t0 = Instant::now();
        let rules = Rules {
            mistake_chance: 1.0,
            attack_chance: 0.0,
            ..Rules::default()
        };
        let mut m = player_at_cap_ai_armed(rules, t0);
        m.tick(t0 + ms(1600));
        assert_ai_frozen_after_win(&mut m, t0);
    }

    #[test]
    fn player_attack_can_win() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["ab"], t0);
        m.add_penalty_lines(LaneId::Opponent, 18);
        assert_eq!(m.lane(LaneId::Opponent).len(), 38);
        for _ in 0..4 {
            type_word(&mut m, "ab", t0);
        }
        m.player_send_attack();
        assert_eq!(m.winner(), Some(LaneId::Player));
        assert!(m.lane(LaneId::Opponent).is_overflowing());
    }

    #[test]
    fn wpm_events_on_tick() {
        let t0 = Instant::now();
        let mut m = new_match(calm_rules(), &["four"], t0);
        m.take_events();
        type_word(&mut m, "four", t0);
        m.tick(t0 + ms(999));
        assert!(
            !m.take_events()
                .iter()
                .any(|e| matches!(e, MatchEvent::WpmChanged(..)))
        );
        m.tick(t0 + ms(1000));
        // 5 chars = 1 word in 1/60 min.
        assert!(m.take_events().contains(&MatchEvent::WpmChanged(LaneId::Player, 60)));
    }
}
