//! Typeduel: race an adaptive AI opponent to clear rows of words in the terminal.

mod app;
mod events;
mod game;
mod input;
mod lane;
mod pacing;
mod rules;
mod theme;
mod timer;
mod ui;
mod words;
mod wpm;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Options derived from CLI that affect the session (not the match rules, which are fixed).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed seed for every match of the session; random per match when `None`.
    pub seed: Option<u64>,
    pub frame_rate: f64,
    pub no_animation: bool,
    pub no_menu: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "theme load failed, using defaults");
        theme::Theme::default()
    });
    let config = SessionConfig {
        seed: args.seed,
        frame_rate: args.frame_rate.clamp(5.0, 240.0),
        no_animation: args.no_animation,
        no_menu: args.no_menu,
    };
    let mut app = App::new(config, theme);
    app.run()?;
    Ok(())
}

/// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("logging init failed: {e}"))?;
    Ok(())
}

/// Two-lane typing duel against an AI that always types 10 WPM faster than you.
#[derive(Debug, Parser)]
#[command(
    name = "typeduel",
    version,
    about = "Typing duel in the terminal. Clear rows of words faster than the AI; your combo becomes its penalty rows.",
    long_about = "Typeduel is a two-lane typing race against an AI opponent.\n\n\
        Type the highlighted word followed by a space. Every finished word adds to your combo; \
        five words clear a row. Press Enter to send your combo to the AI as extra words. \
        A typo also sends your combo, but resets the word. A lane taller than 8 rows is capped out.\n\n\
        The AI paces itself 10 WPM above your live speed.\n\n\
        CONTROLS:\n  letters / Space  Type    Backspace  Delete    Enter  Send combo    Esc  Quit\n\n\
        Use --theme to load a btop-style theme (e.g. onedark.theme)."
)]
pub struct Args {
    /// Seed for word draws and AI dice. Random when not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable flash effects on penalties and mistakes.
    #[arg(long)]
    pub no_animation: bool,

    /// Target render frames per second (also the timer resolution).
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Skip the intro screen and start a match immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Write logs to this file (filter with RUST_LOG, default info).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let args = Args::try_parse_from(["typeduel"]).unwrap();
        assert_eq!(args.seed, None);
        assert_eq!(args.palette, Palette::Normal);
        assert!((args.frame_rate - 30.0).abs() < f64::EPSILON);
        assert!(!args.no_menu);
    }

    #[test]
    fn cli_flags() {
        let args = Args::try_parse_from([
            "typeduel",
            "--seed",
            "7",
            "--palette",
            "contrast",
            "--no-menu",
            "--log-file",
            "duel.log",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.palette, Palette::HighContrast);
        assert!(args.no_menu);
        assert_eq!(args.log_file.as_deref(), Some(Path::new("duel.log")));
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }
}
