//! Lasermatch: match-3 meets vertical shooter, in the terminal.

use anyhow::{Context, Result};
use clap::Parser;
use lasermatch::app::App;
use lasermatch::config::{GameConfig, Rules};
use lasermatch::screen::ScreenContext;
use lasermatch::theme::{Palette, Theme};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config = args.game_config();
    config.validate().context("invalid game settings")?;
    let theme = Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        tracing::warn!("theme not loaded, using defaults: {}", e);
        Theme::default_for_palette(args.palette)
    });

    let ctx = ScreenContext {
        config,
        theme,
        animate: !args.no_animation,
        skip_menu: args.no_menu,
    };
    let mut app = App::new(ctx, args.frame_rate);
    app.run()?;
    Ok(())
}

/// Logs go to a file: stdout belongs to the TUI.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Match-3 with lasers, enemies and bombs, in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "lasermatch",
    version,
    about = "Match-3 puzzle with a vertical-shooter twist, in the terminal.",
    long_about = "Lasermatch is a terminal match-3 game. Swap neighbouring tiles to line up \
        three or more; line up an enemy, a column of your lasers and your ship to shoot it down.\n\n\
        Enemy lasers destroy your ship, bombs blow up a 3x3 block, and every move costs energy. \
        Clearing tiles earns it back. The game ends when energy runs out.\n\n\
        CONTROLS:\n  Arrows / hjkl  Move cursor     Space / Enter  Grab tile\n  \
        Arrow while grabbing  Swap      Mouse drag     Swap\n  \
        P  Pause    T  Tutorial (menu)    Q / Esc  Quit"
)]
pub struct Args {
    /// RNG seed for a reproducible board. Random if not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u32>,

    /// Swap animation length in ms.
    #[arg(long, default_value = "100", value_name = "MS")]
    pub swap_ms: u64,

    /// Length of one drop step in ms.
    #[arg(long, default_value = "100", value_name = "MS")]
    pub drop_ms: u64,

    /// Seconds between passive energy drains.
    #[arg(long, default_value = "5.0", value_name = "SECS")]
    pub energy_tick_secs: f32,

    /// Relaxed mode: no passive energy drain.
    #[arg(long)]
    pub relaxed: bool,

    /// Skip main menu and start game immediately.
    #[arg(long)]
    pub no_menu: bool,

    /// Disable swap/drop interpolation and the clear flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Target render frames per second.
    #[arg(long, default_value = "30.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Write logs to this file (filter with RUST_LOG).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    fn game_config(&self) -> GameConfig {
        GameConfig {
            rules: Rules {
                swap_secs: self.swap_ms as f32 / 1000.0,
                drop_secs: self.drop_ms as f32 / 1000.0,
                energy_tick_secs: (!self.relaxed).then_some(self.energy_tick_secs),
                ..Rules::default()
            },
            seed: self.seed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args_give_default_rules() {
        let args = Args::parse_from(["lasermatch"]);
        let config = args.game_config();
        assert_eq!(config.rules, Rules::default());
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_relaxed_disables_energy_tick() {
        let args = Args::parse_from(["lasermatch", "--relaxed", "--seed", "7", "--drop-ms", "250"]);
        let config = args.game_config();
        assert_eq!(config.rules.energy_tick_secs, None);
        assert_eq!(config.rules.drop_secs, 0.25);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_zero_swap_time_is_rejected() {
        let args = Args::parse_from(["lasermatch", "--swap-ms", "0"]);
        assert!(args.game_config().validate().is_err());
    }

    #[test]
    fn test_palette_aliases() {
        let args = Args::parse_from(["lasermatch", "--palette", "colourblind"]);
        assert_eq!(args.palette, Palette::Colorblind);
    }
}
