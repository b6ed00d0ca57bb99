#[cfg(feature = "line")]
mod line_mode;
mod render_help;
#[cfg(feature = "tui")]
mod tui_mode;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use fastcalc::config::Config;
use fastcalc::history::History;
use fastcalc::localization::Localization;
use log::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Full-screen interface
    Tui,
    /// Plain line editor
    Line,
}

/// Single-line calculator with a 15-character result display.
#[derive(Debug, Parser)]
#[command(name = "fastcalc", version, about)]
struct Args {
    /// Expression to evaluate once; starts an interactive shell when absent
    expr: Vec<String>,

    /// Interactive shell to start
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Configuration file [default: <config dir>/fastcalc/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Neither read nor write the history file
    #[arg(long)]
    no_history: bool,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let args = Args::parse();

    if !args.expr.is_empty() {
        let input = args.expr.join(" ");
        return Ok(match fastcalc::evaluate_expression(&input) {
            Ok(value) => {
                println!("{}", value);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        });
    }

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)?;
    let texts = load_localization(&mut config, Localization::default_dir());

    let history = if args.no_history {
        None
    } else {
        let mut history = History::open(config.history_path(), config.history.limit);
        if let Err(e) = history.load() {
            warn!("starting with empty history: {:#}", e);
        }
        Some(history)
    };

    let mode = args.mode.unwrap_or(if cfg!(feature = "tui") { Mode::Tui } else { Mode::Line });
    debug!("starting {:?} shell", mode);
    let outcome = run_shell(mode, &config, texts, history);
    persist_config(&config, &config_path);
    outcome?;
    Ok(ExitCode::SUCCESS)
}

/// Loads the configured locale, or the detected one, and records the choice
/// in the config.
fn load_localization(config: &mut Config, dir: PathBuf) -> Localization {
    let mut texts = Localization::new(dir);
    texts.select(config.locale.as_deref());
    if let Some(code) = texts.current_locale() {
        config.locale = Some(code.to_string());
    }
    texts
}

/// Writes the config back on exit so every setting, defaults included, is
/// there to edit.
fn persist_config(config: &Config, path: &Path) {
    if let Err(e) = config.save(path) {
        warn!("could not save config: {:#}", e);
    }
}

#[allow(unused_variables)]
fn run_shell(
    mode: Mode,
    config: &Config,
    texts: Localization,
    history: Option<History>,
) -> Result<()> {
    match mode {
        #[cfg(feature = "tui")]
        Mode::Tui => tui_mode::run_tui(config, texts, history),
        #[cfg(feature = "line")]
        Mode::Line => line_mode::run_line(config, &texts, history),
        #[allow(unreachable_patterns)]
        other => bail!(
            "{:?} mode is not available in this build; rebuild with `--features {}`",
            other,
            match other {
                Mode::Tui => "tui",
                Mode::Line => "line",
            }
        ),
    }
}
