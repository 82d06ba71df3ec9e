//! Layout and drawing: intro, the two lanes, the input line, game over, flash effects.

use crate::app::{Flash, FlashTarget, Screen};
use crate::events::LaneId;
use crate::game::Match;
use crate::lane::Lane;
use crate::theme::Theme;
use crate::words::{Word, WordSource};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, EffectRenderer, Interpolation, fx};

/// One grid column: longest vocabulary word plus a gap.
const COL_WIDTH: usize = 9;
/// Lane box width: 5 columns, padding and border.
const LANE_WIDTH: u16 = 5 * COL_WIDTH as u16 + 4;
const LANE_GAP: u16 = 2;
/// Stats line + height gauge + gap above the grid.
const LANE_HEADER_ROWS: u16 = 3;
const INPUT_HEIGHT: u16 = 3;
const FLASH_MS: u32 = 250;

/// Screen regions flashes can target.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatchRects {
    pub lanes: [Rect; 2],
    pub input: Rect,
}

impl MatchRects {
    fn get(&self, target: FlashTarget) -> Rect {
        match target {
            FlashTarget::Lane(id) => self.lanes[id.index()],
            FlashTarget::Input => self.input,
        }
    }
}

fn bold(style: Style) -> Style {
    style.add_modifier(Modifier::BOLD)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Draw the current screen. While playing, pending flashes are advanced by
/// the time since their last frame.
pub fn draw<W: WordSource>(
    frame: &mut Frame,
    screen: Screen,
    game: &Match<W>,
    theme: &Theme,
    flashes: &mut [Flash],
    now: Instant,
) {
    let area = frame.area();
    match screen {
        Screen::Intro => draw_intro(frame, theme, area),
        Screen::Playing => {
            let rects = draw_match(frame, game, theme, area);
            apply_flashes(frame, theme, flashes, &rects, now);
        }
        Screen::GameOver => {
            draw_match(frame, game, theme, area);
            draw_game_over(frame, game, theme, area);
        }
    }
}

fn draw_intro(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 60, 18);
    let key = |k: &'static str| Span::styled(k, bold(Style::default().fg(theme.opponent)));
    let text = |t: &'static str| Span::styled(t, Style::default().fg(theme.main_fg));
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Type ", bold(Style::default().fg(theme.typed))),
            Span::styled(" duel ", bold(Style::default().fg(theme.error))),
        ]),
        Line::from(""),
        Line::from(Span::styled(" ─ HOW TO PLAY ─ ", Style::default().fg(theme.div_line))),
        Line::from(text("Type the highlighted word, then Space.")),
        Line::from(text("Five words clear a row. Every word adds to your combo.")),
        Line::from(text("Send your combo to the AI as extra words.")),
        Line::from(text("A typo sends it too, and resets the word.")),
        Line::from(text("More than 8 rows and you are capped out.")),
        Line::from(text("The AI always types 10 WPM faster than you.")),
        Line::from(""),
        Line::from(""),
        Line::from(vec![key(" ENTER "), text("START   "), key(" ESC "), text("QUIT")]),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .render(popup, frame.buffer_mut());
}

/// Both lanes side by side, input line and key help underneath.
fn draw_match<W: WordSource>(
    frame: &mut Frame,
    game: &Match<W>,
    theme: &Theme,
    area: Rect,
) -> MatchRects {
    let lane_h = game.rules().max_rows as u16 + LANE_HEADER_ROWS + 2;
    let total_h = lane_h + INPUT_HEIGHT + 1;
    let total_w = LANE_WIDTH * 2 + LANE_GAP;

    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(area);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(vert[1]);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(lane_h),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(horiz[1]);
    let lanes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(LANE_WIDTH),
            Constraint::Length(LANE_GAP),
            Constraint::Length(LANE_WIDTH),
        ])
        .split(rows[0]);

    let rects = MatchRects {
        lanes: [lanes[0], lanes[2]],
        input: rows[1],
    };
    for id in LaneId::ALL {
        draw_lane(frame, game, id, theme, rects.lanes[id.index()]);
    }
    draw_input(frame, game, theme, rects.input);

    let key = Style::default().fg(theme.opponent);
    let text = Style::default().fg(theme.inactive_fg);
    Paragraph::new(Line::from(vec![
        Span::styled(" ENTER ", key),
        Span::styled("send combo   ", text),
        Span::styled(" BACKSPACE ", key),
        Span::styled("delete   ", text),
        Span::styled(" ESC ", key),
        Span::styled("quit", text),
    ]))
    .alignment(Alignment::Center)
    .render(rows[2], frame.buffer_mut());
    rects
}

fn draw_lane<W: WordSource>(
    frame: &mut Frame,
    game: &Match<W>,
    id: LaneId,
    theme: &Theme,
    area: Rect,
) {
    let lane = game.lane(id);
    let lost = game.winner() == Some(id.opponent());
    let (name, accent) = match id {
        LaneId::Player => (" You ", theme.typed),
        LaneId::Opponent => (" AI ", theme.opponent),
    };
    let border = if lost { theme.error } else { theme.div_line };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border).bg(theme.bg))
        .title(Span::styled(name, bold(Style::default().fg(accent))));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    let inner = Rect {
        x: inner.x + 1,
        width: inner.width.saturating_sub(2),
        ..inner
    };

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
        ])
        .split(inner);

    let label = Style::default().fg(theme.title);
    let value = bold(Style::default().fg(theme.main_fg));
    Paragraph::new(Line::from(vec![
        Span::styled("WPM ", label),
        Span::styled(
            if lane.wpm.is_started() {
                format!("{:<5}", lane.wpm.wpm())
            } else {
                "--   ".to_string()
            },
            value,
        ),
        Span::styled("Combo ", label),
        Span::styled(format!("{:<5}", lane.combo()), value),
        Span::styled("Height ", label),
        Span::styled(format!("{}/{}", lane.rows(), lane.max_rows()), value),
    ]))
    .render(parts[0], frame.buffer_mut());

    let ratio = (lane.rows() as f64 / lane.max_rows().max(1) as f64).clamp(0.0, 1.0);
    let bar_color = if ratio > 0.75 {
        theme.error
    } else if ratio > 0.5 {
        theme.target
    } else {
        theme.typed
    };
    Gauge::default()
        .ratio(ratio)
        .label("")
        .gauge_style(Style::default().fg(bar_color).bg(theme.bg))
        .render(parts[1], frame.buffer_mut());

    let words: Vec<Word> = lane.words().collect();
    let grid: Vec<Line> = words
        .chunks(lane.row_width())
        .take(lane.max_rows())
        .enumerate()
        .map(|(row, chunk)| grid_row(lane, row, chunk, theme))
        .collect();
    Paragraph::new(grid).render(parts[3], frame.buffer_mut());
}

/// One row of words. The first row shows progress; rows past the initial
/// height are penalty rows.
fn grid_row<'a>(lane: &Lane, row: usize, chunk: &[Word], theme: &Theme) -> Line<'a> {
    let base = if row >= lane.initial_rows() {
        theme.penalty
    } else {
        theme.main_fg
    };
    let mut spans = Vec::with_capacity(chunk.len() + 1);
    for (i, word) in chunk.iter().copied().enumerate() {
        let pad = " ".repeat(COL_WIDTH.saturating_sub(word.len()));
        if row != 0 || i > lane.cursor() {
            spans.push(Span::styled(format!("{word}{pad}"), Style::default().fg(base)));
        } else if i < lane.cursor() {
            spans.push(Span::styled(
                format!("{word}{pad}"),
                Style::default().fg(theme.inactive_fg).add_modifier(Modifier::CROSSED_OUT),
            ));
        } else {
            let active = lane.active_typing();
            let done = if word.starts_with(active) { active.len() } else { 0 };
            let typed = bold(Style::default().fg(theme.typed));
            let target = bold(Style::default().fg(theme.target)).add_modifier(Modifier::UNDERLINED);
            spans.push(Span::styled(word[..done].to_string(), typed));
            spans.push(Span::styled(word[done..].to_string(), target));
            spans.push(Span::raw(pad));
        }
    }
    Line::from(spans)
}

fn draw_input<W: WordSource>(frame: &mut Frame, game: &Match<W>, theme: &Theme, area: Rect) {
    let lane = game.lane(LaneId::Player);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Type here ", Style::default().fg(theme.title)));
    let line = match game.winner() {
        Some(LaneId::Player) => Line::from(Span::styled(
            "YOU WIN!",
            bold(Style::default().fg(theme.typed)),
        )),
        Some(LaneId::Opponent) => Line::from(Span::styled(
            "GAME OVER - CAPPED OUT!",
            bold(Style::default().fg(theme.error)),
        )),
        None => {
            let confirmed = lane.correct_prefix();
            let active = lane.active_typing();
            // Keep the caret in view on narrow terminals.
            let room = area.width.saturating_sub(4) as usize;
            let shown = confirmed.len().saturating_sub(room.saturating_sub(active.len() + 1));
            Line::from(vec![
                Span::styled(
                    confirmed.get(shown..).unwrap_or_default().to_string(),
                    Style::default().fg(theme.inactive_fg),
                ),
                Span::styled(active.to_string(), bold(Style::default().fg(theme.typed))),
                Span::styled(
                    "▏",
                    Style::default().fg(theme.target).add_modifier(Modifier::SLOW_BLINK),
                ),
            ])
        }
    };
    Paragraph::new(line).block(block).render(area, frame.buffer_mut());
}

fn draw_game_over<W: WordSource>(frame: &mut Frame, game: &Match<W>, theme: &Theme, area: Rect) {
    let popup = centered(area, 40, 8);
    let (title, bg) = match game.winner() {
        Some(LaneId::Player) => (" YOU WIN! ", theme.typed),
        _ => (" GAME OVER - CAPPED OUT! ", theme.error),
    };
    let fg = Style::default().fg(theme.main_fg);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(title, bold(Style::default().fg(Color::Black).bg(bg)))),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                " You {} WPM  ·  AI {} WPM ",
                game.lane(LaneId::Player).wpm.wpm(),
                game.lane(LaneId::Opponent).wpm.wpm()
            ),
            fg,
        )),
        Line::from(""),
        Line::from(Span::styled(" R  Rematch    Q  Quit ", fg)),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
                .title(Span::styled(" Typeduel ", Style::default().fg(theme.title))),
        )
        .render(popup, frame.buffer_mut());
}

/// Create (on first frame) and advance each flash: a short fade of the
/// target region toward the flash colour.
fn apply_flashes(
    frame: &mut Frame,
    theme: &Theme,
    flashes: &mut [Flash],
    rects: &MatchRects,
    now: Instant,
) {
    for flash in flashes {
        let rect = rects.get(flash.target);
        let delta = flash
            .last
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        flash.last = Some(now);
        let effect = flash.effect.get_or_insert_with(|| {
            fx::fade_to(flash.color, theme.bg, (FLASH_MS, Interpolation::Linear)).with_area(rect)
        });
        frame.render_effect(effect, rect, TfxDuration::from_millis(delta_ms));
    }
}
