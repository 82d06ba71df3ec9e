//! App: terminal init, main loop, match ticking and key handling.

use crate::SessionConfig;
use crate::events::{LaneId, MatchEvent};
use crate::game::Match;
use crate::input::{Action, key_to_action};
use crate::rules::Rules;
use crate::theme::Theme;
use crate::words::RandomWords;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use ratatui::style::Color;
use std::time::{Duration, Instant};
use tachyonfx::Effect;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Intro,
    Playing,
    GameOver,
}

/// Region a flash effect covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashTarget {
    Lane(LaneId),
    Input,
}

/// Short colour fade; the effect itself is built by the renderer on first draw.
pub struct Flash {
    pub target: FlashTarget,
    pub color: Color,
    pub effect: Option<Effect>,
    /// Last time the effect was processed (for delta).
    pub last: Option<Instant>,
}

impl Flash {
    fn new(target: FlashTarget, color: Color) -> Self {
        Self {
            target,
            color,
            effect: None,
            last: None,
        }
    }

    fn is_done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

/// Whether the loop keeps going after a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    config: SessionConfig,
    theme: Theme,
    screen: Screen,
    game: Match<RandomWords>,
    flashes: Vec<Flash>,
    matches_played: u32,
}

fn new_match(seed: Option<u64>, now: Instant) -> Match<RandomWords> {
    let seed = seed.unwrap_or_else(rand::random);
    Match::new(Rules::default(), RandomWords::new(seed), seed, now)
}

impl App {
    pub fn new(config: SessionConfig, theme: Theme) -> Self {
        let screen = if config.no_menu {
            Screen::Playing
        } else {
            Screen::Intro
        };
        let game = new_match(config.seed, Instant::now());
        Self {
            config,
            theme,
            screen,
            game,
            flashes: Vec::new(),
            matches_played: u32::from(screen == Screen::Playing),
        }
    }

    /// Fresh match on a fresh clock; the old one (and its timers) is dropped.
    fn reset_game(&mut self) {
        self.game = new_match(self.config.seed, Instant::now());
        self.screen = Screen::Playing;
        self.flashes.clear();
        self.matches_played += 1;
        info!(matches = self.matches_played, "new match");
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // The intro may have sat on screen for a while; start the clock now.
        if self.screen == Screen::Playing {
            self.game = new_match(self.config.seed, Instant::now());
        }

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        loop {
            let now = Instant::now();
            if self.screen == Screen::Playing {
                self.game.tick(now);
                self.process_events();
            }

            terminal.draw(|f| {
                crate::ui::draw(
                    f,
                    self.screen,
                    &self.game,
                    &self.theme,
                    &mut self.flashes,
                    now,
                );
            })?;
            self.flashes.retain(|f| !f.is_done());

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_action(key_to_action(key), Instant::now()) == Flow::Quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    fn handle_action(&mut self, action: Action, now: Instant) -> Flow {
        match self.screen {
            Screen::Intro => match action {
                Action::Quit => return Flow::Quit,
                Action::Confirm => self.reset_game(),
                _ => {}
            },
            Screen::Playing => {
                match action {
                    Action::Quit => return Flow::Quit,
                    Action::Type(c) => {
                        let mut value = self.game.lane(LaneId::Player).typed().to_string();
                        value.push(c);
                        self.game.player_input(&value, now);
                    }
                    Action::Backspace => {
                        let mut value = self.game.lane(LaneId::Player).typed().to_string();
                        if value.pop().is_some() {
                            self.game.player_input(&value, now);
                        }
                    }
                    Action::Confirm => self.game.player_send_attack(),
                    Action::None => {}
                }
                self.process_events();
            }
            Screen::GameOver => match action {
                Action::Quit | Action::Type('q' | 'Q') => return Flow::Quit,
                Action::Type('r' | 'R') => self.reset_game(),
                _ => {}
            },
        }
        Flow::Continue
    }

    /// Route engine events to the screen and flash effects.
    fn process_events(&mut self) {
        for ev in self.game.take_events() {
            debug!(?ev, "match event");
            match ev {
                MatchEvent::PenaltyLinesAdded(lane, _) => {
                    self.flash(FlashTarget::Lane(lane), self.theme.penalty);
                }
                MatchEvent::Mistake(LaneId::Player) => {
                    self.flash(FlashTarget::Input, self.theme.error);
                }
                MatchEvent::MatchEnded { winner } => {
                    self.screen = Screen::GameOver;
                    self.flashes.clear();
                    info!(%winner, "game over");
                }
                _ => {}
            }
        }
    }

    fn flash(&mut self, target: FlashTarget, color: Color) {
        if self.config.no_animation {
            return;
        }
        // A new flash on the same region restarts it.
        self.flashes.retain(|f| f.target != target);
        self.flashes.push(Flash::new(target, color));
    }
}
